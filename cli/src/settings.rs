//! Merges the optional TOML file under the command-line flags.

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use archivist_core::{ArchiveConfig, CompressionConfig, RemoteConfig, ThumbnailConfig};
use serde::Deserialize;

use crate::args::RunArgs;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
	pub source_dir: Option<PathBuf>,
	pub dest_dir: Option<PathBuf>,
	pub db_path: Option<PathBuf>,
	pub compression: Option<CompressionConfig>,
	pub thumbnail: Option<ThumbnailConfig>,
	pub remote: Option<RemoteSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSettings {
	pub container: Option<String>,
	pub connection_string: Option<String>,
	pub purge_after_upload: Option<bool>,
}

impl FileSettings {
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else {
			return Ok(Self::default());
		};
		let text = fs::read_to_string(path).with_context(|| format!("reading settings file {}", path.display()))?;
		toml::from_str(&text).with_context(|| format!("parsing settings file {}", path.display()))
	}
}

pub fn default_db_path() -> PathBuf {
	dirs::data_dir()
		.unwrap_or_else(|| PathBuf::from("."))
		.join("archivist")
		.join("metadata.db")
}

pub fn resolve_db_path(flag: Option<&Path>, file: &FileSettings) -> PathBuf {
	flag.map(Path::to_path_buf)
		.or_else(|| file.db_path.clone())
		.unwrap_or_else(default_db_path)
}

/// Build the run configuration. Flags override the file; source and
/// destination must come from one of them.
pub fn archive_config(args: &RunArgs, db_path: PathBuf, file: FileSettings) -> Result<ArchiveConfig> {
	let Some(source_dir) = args.source.clone().or(file.source_dir) else {
		bail!("no source directory: pass --source or set SOURCE_DIRECTORY");
	};
	let Some(dest_dir) = args.dest.clone().or(file.dest_dir) else {
		bail!("no destination directory: pass --dest or set DESTINATION_DIRECTORY");
	};

	let mut compression = file.compression.unwrap_or_default();
	if let Some(level) = args.level {
		compression.level = level;
	}
	if let Some(codec) = args.codec {
		compression.codec = codec.into();
	}

	let file_remote = file.remote.unwrap_or_default();
	let container = args.azure_container.clone().or(file_remote.container);
	let connection_string = args.azure_connection_string.clone().or(file_remote.connection_string);
	let remote = match (container, connection_string) {
		(Some(container), Some(connection_string)) => Some(RemoteConfig {
			container,
			connection_string,
			purge_after_upload: !args.keep_local && file_remote.purge_after_upload.unwrap_or(true),
		}),
		(None, None) => None,
		(Some(_), None) => bail!("remote container given without a connection string"),
		(None, Some(_)) => bail!("connection string given without a container"),
	};

	Ok(ArchiveConfig {
		source_dir,
		dest_dir,
		db_path,
		compression,
		thumbnail: file.thumbnail.unwrap_or_default(),
		remote,
	})
}
