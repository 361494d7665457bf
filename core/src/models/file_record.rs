use std::{fs::Metadata, time::SystemTime};

use serde::Serialize;

use crate::util::iso_from_system;

/// The tuple two files must share to be considered the same content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileIdentity {
	pub filename: String,
	pub size: u64,
	pub creation_time: String,
	pub modification_time: String,
}

impl FileIdentity {
	/// Build the identity from filesystem metadata.
	/// Filesystems without a birth time fall back to the modification time.
	pub fn from_metadata(filename: impl Into<String>, metadata: &Metadata) -> Self {
		let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
		let created = metadata.created().unwrap_or(modified);
		Self {
			filename: filename.into(),
			size: metadata.len(),
			creation_time: iso_from_system(created),
			modification_time: iso_from_system(modified),
		}
	}
}

/// One archived or duplicate-skipped source file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileRecord {
	/// Assigned by the store on insert.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub filename: String,
	/// Artifact path relative to the destination root, `/`-separated.
	pub filepath: String,
	pub content_type: Option<String>,
	pub size: u64,
	pub creation_time: String,
	pub modification_time: String,
	#[serde(skip)]
	pub thumbnail: Option<Vec<u8>>,
	pub is_duplicate: bool,
	/// Absolute source path, or the first-seen artifact path for duplicates.
	pub original_path: String,
	pub batch: String,
}

impl FileRecord {
	pub fn identity(&self) -> FileIdentity {
		FileIdentity {
			filename: self.filename.clone(),
			size: self.size,
			creation_time: self.creation_time.clone(),
			modification_time: self.modification_time.clone(),
		}
	}
}
