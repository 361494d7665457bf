use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_COMPRESSION_LEVEL: u8 = 1;
pub const MAX_COMPRESSION_LEVEL: u8 = 9;
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 128;
pub const DEFAULT_VIDEO_OFFSET_SECS: f64 = 1.0;

/// Everything the archive run needs, as plain values.
/// Presence of the paths is checked by whoever builds this; existence and
/// writability are checked when the run starts.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
	pub source_dir: PathBuf,
	pub dest_dir: PathBuf,
	pub db_path: PathBuf,
	#[serde(default)]
	pub compression: CompressionConfig,
	#[serde(default)]
	pub thumbnail: ThumbnailConfig,
	#[serde(default)]
	pub remote: Option<RemoteConfig>,
}

impl ArchiveConfig {
	pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
		Self {
			source_dir: source_dir.into(),
			dest_dir: dest_dir.into(),
			db_path: db_path.into(),
			compression: CompressionConfig::default(),
			thumbnail: ThumbnailConfig::default(),
			remote: None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
	/// External `7z` process, `.7z` artifacts.
	#[default]
	#[serde(alias = "7z")]
	SevenZip,
	/// In-process zstd stream, `.zst` artifacts.
	Zstd,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
	pub codec: Codec,
	/// 0 = store/fastest … 9 = best ratio.
	pub level: u8,
	pub seven_zip_bin: PathBuf,
}

impl Default for CompressionConfig {
	fn default() -> Self {
		Self {
			codec: Codec::SevenZip,
			level: DEFAULT_COMPRESSION_LEVEL,
			seven_zip_bin: PathBuf::from("7z"),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
	/// Edge length of the square preview, in pixels.
	pub size: u32,
	pub video_offset_secs: f64,
	pub ffmpeg_bin: PathBuf,
}

impl Default for ThumbnailConfig {
	fn default() -> Self {
		Self {
			size: DEFAULT_THUMBNAIL_SIZE,
			video_offset_secs: DEFAULT_VIDEO_OFFSET_SECS,
			ffmpeg_bin: PathBuf::from("ffmpeg"),
		}
	}
}

/// Azure Blob Storage target.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
	pub container: String,
	pub connection_string: String,
	/// Delete the local destination tree once every artifact had an upload attempt.
	#[serde(default = "default_purge")]
	pub purge_after_upload: bool,
}

fn default_purge() -> bool {
	true
}
