use std::{
	fs, io,
	path::{Path, PathBuf},
	process::{Command, Stdio},
	sync::Arc,
};

use thiserror::Error;
use tracing::debug;

use crate::config::{Codec, CompressionConfig, MAX_COMPRESSION_LEVEL};

#[derive(Debug, Error)]
pub enum CompressError {
	#[error("compression level {0} is out of range 0..=9")]
	InvalidLevel(u8),

	#[error("cannot start {tool}: {reason}")]
	Spawn { tool: String, reason: String },

	#[error("{tool} exited with {status}: {stderr}")]
	ToolFailed { tool: String, status: String, stderr: String },

	#[error("I/O error on {path}: {reason}")]
	Io { path: String, reason: String },
}

fn io_error(path: &Path, err: io::Error) -> CompressError {
	CompressError::Io {
		path: path.display().to_string(),
		reason: err.to_string(),
	}
}

/// Turns one source file into one compressed artifact. Blocking.
pub trait Compressor: Send + Sync {
	/// Extension appended to the source file name, including the dot.
	fn extension(&self) -> &str;

	fn compress(&self, source: &Path, artifact: &Path) -> Result<(), CompressError>;
}

/// Build the compressor selected by the configuration.
pub fn from_config(cfg: &CompressionConfig) -> Result<Arc<dyn Compressor>, CompressError> {
	Ok(match cfg.codec {
		Codec::SevenZip => Arc::new(SevenZip::new(cfg.seven_zip_bin.clone(), cfg.level)?),
		Codec::Zstd => Arc::new(ZstdCompressor::new(cfg.level)?),
	})
}

fn check_level(level: u8) -> Result<u8, CompressError> {
	if level > MAX_COMPRESSION_LEVEL {
		return Err(CompressError::InvalidLevel(level));
	}
	Ok(level)
}

/// Remove a previous or partial artifact. Missing files are fine.
pub(crate) fn remove_artifact(artifact: &Path) -> Result<(), CompressError> {
	match fs::remove_file(artifact) {
		Ok(()) => Ok(()),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
		Err(e) => Err(io_error(artifact, e)),
	}
}

/// External `7z` archiver, one `.7z` container per file.
#[derive(Debug, Clone)]
pub struct SevenZip {
	binary: PathBuf,
	level: u8,
}

impl SevenZip {
	pub fn new(binary: impl Into<PathBuf>, level: u8) -> Result<Self, CompressError> {
		Ok(Self {
			binary: binary.into(),
			level: check_level(level)?,
		})
	}

	fn tool_name(&self) -> String {
		self.binary.display().to_string()
	}
}

impl Compressor for SevenZip {
	fn extension(&self) -> &str {
		".7z"
	}

	fn compress(&self, source: &Path, artifact: &Path) -> Result<(), CompressError> {
		// `7z a` appends to an existing archive; start from scratch.
		remove_artifact(artifact)?;

		let output = Command::new(&self.binary)
			.arg("a")
			.arg("-t7z")
			.arg(format!("-mx={}", self.level))
			.args(["-m0=LZMA2", "-md=32m", "-ms=64m", "-mmt=4", "-bd", "-y"])
			// `*` and `?` in file names are literal characters, not wildcards.
			.arg("-spd")
			.arg(artifact)
			.arg(source)
			.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::piped())
			.output()
			.map_err(|e| CompressError::Spawn {
				tool: self.tool_name(),
				reason: e.to_string(),
			})?;

		if !output.status.success() {
			let _ = remove_artifact(artifact);
			return Err(CompressError::ToolFailed {
				tool: self.tool_name(),
				status: output.status.to_string(),
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
			});
		}

		debug!("7z wrote {}", artifact.display());
		Ok(())
	}
}

/// In-process zstd stream, one `.zst` file per source file.
/// Level 0 maps to zstd level 1, otherwise twice the configured level.
#[derive(Debug, Clone)]
pub struct ZstdCompressor {
	level: i32,
}

impl ZstdCompressor {
	pub fn new(level: u8) -> Result<Self, CompressError> {
		let level = match check_level(level)? {
			0 => 1,
			l => i32::from(l) * 2,
		};
		Ok(Self { level })
	}

	fn encode(&self, source: &Path, artifact: &Path) -> Result<(), CompressError> {
		let mut input = fs::File::open(source).map_err(|e| io_error(source, e))?;
		let output = fs::File::create(artifact).map_err(|e| io_error(artifact, e))?;
		let mut encoder = zstd::stream::write::Encoder::new(output, self.level).map_err(|e| io_error(artifact, e))?;
		io::copy(&mut input, &mut encoder).map_err(|e| io_error(source, e))?;
		encoder.finish().map_err(|e| io_error(artifact, e))?;
		Ok(())
	}
}

impl Compressor for ZstdCompressor {
	fn extension(&self) -> &str {
		".zst"
	}

	fn compress(&self, source: &Path, artifact: &Path) -> Result<(), CompressError> {
		let result = self.encode(source, artifact);
		if result.is_err() {
			let _ = remove_artifact(artifact);
		}
		result
	}
}
