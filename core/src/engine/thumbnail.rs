use std::{
	fs,
	io::Cursor,
	path::{Path, PathBuf},
	process::{Command, Stdio},
};

use image::{imageops::FilterType, ImageFormat};
use resvg::{tiny_skia, usvg};

use crate::{config::ThumbnailConfig, util::is_visual_media};

/// Best-effort preview generation. There is no error channel: anything that
/// cannot be previewed yields `None`.
pub trait ThumbnailExtractor: Send + Sync {
	fn extract(&self, source: &Path, content_type: &str) -> Option<Vec<u8>>;
}

/// PNG previews of a fixed square size. Raster images are decoded and SVG is
/// rendered in process, videos go through `ffmpeg`.
#[derive(Debug, Clone)]
pub struct MediaThumbnailer {
	size: u32,
	video_offset_secs: f64,
	ffmpeg: PathBuf,
}

impl MediaThumbnailer {
	pub fn new(cfg: &ThumbnailConfig) -> Self {
		Self {
			size: cfg.size.max(1),
			video_offset_secs: cfg.video_offset_secs.max(0.0),
			ffmpeg: cfg.ffmpeg_bin.clone(),
		}
	}

	fn image_preview(&self, source: &Path) -> Option<Vec<u8>> {
		let img = image::open(source).ok()?;
		// Aspect ratio is deliberately not preserved.
		let resized = img.resize_exact(self.size, self.size, FilterType::Triangle);

		let mut png = Cursor::new(Vec::new());
		resized.write_to(&mut png, ImageFormat::Png).ok()?;
		Some(png.into_inner())
	}

	fn svg_preview(&self, source: &Path) -> Option<Vec<u8>> {
		let data = fs::read(source).ok()?;
		let tree = usvg::Tree::from_data(&data, &usvg::Options::default()).ok()?;
		let view = tree.size();

		// Render straight at the preview size, stretched like raster images.
		let mut pixmap = tiny_skia::Pixmap::new(self.size, self.size)?;
		let transform = tiny_skia::Transform::from_scale(
			self.size as f32 / view.width(),
			self.size as f32 / view.height(),
		);
		resvg::render(&tree, transform, &mut pixmap.as_mut());
		pixmap.encode_png().ok()
	}

	fn video_preview(&self, source: &Path) -> Option<Vec<u8>> {
		// Removed on drop, whichever way this function returns.
		let frame = tempfile::Builder::new()
			.prefix("archivist-frame-")
			.suffix(".png")
			.tempfile()
			.ok()?;

		let scale = format!("scale={0}:{0}", self.size);
		let status = Command::new(&self.ffmpeg)
			.args(["-v", "error", "-y", "-ss"])
			.arg(format!("{:.3}", self.video_offset_secs))
			.arg("-i")
			.arg(source)
			.args(["-frames:v", "1", "-vf", &scale, "-f", "image2", "-vcodec", "png"])
			.arg(frame.path())
			.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.status()
			.ok()?;

		if !status.success() {
			return None;
		}
		fs::read(frame.path()).ok().filter(|bytes| !bytes.is_empty())
	}
}

impl ThumbnailExtractor for MediaThumbnailer {
	fn extract(&self, source: &Path, content_type: &str) -> Option<Vec<u8>> {
		if !is_visual_media(content_type) {
			return None;
		}
		if content_type == "image/svg+xml" {
			self.svg_preview(source)
		} else if content_type.starts_with("image/") {
			self.image_preview(source)
		} else {
			self.video_preview(source)
		}
	}
}
