use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
	#[error("source path does not exist: {0}")]
	SourcePathNotExists(String),

	#[error("source path is not a directory: {0}")]
	SourcePathNotDir(String),

	#[error("cannot resolve source path {path}: {reason}")]
	SourcePathUnresolved { path: String, reason: String },
}

/// A regular file discovered under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
	/// Absolute path of the source file.
	pub path: PathBuf,
	/// Path relative to the source root.
	pub relative_path: PathBuf,
}

/// Result of enumerating a source tree.
#[derive(Debug, Default)]
pub struct SourceListing {
	pub entries: Vec<SourceEntry>,
	/// Unreadable entries and symlinks.
	pub skipped: u64,
}

/// Check that `source` is an existing directory and return its canonical form.
pub fn resolve_source_root(source: &Path) -> Result<PathBuf, ScanError> {
	let display = source.display().to_string();
	if !source.exists() {
		return Err(ScanError::SourcePathNotExists(display));
	}
	if !source.is_dir() {
		return Err(ScanError::SourcePathNotDir(display));
	}
	source
		.canonicalize()
		.map_err(|e| ScanError::SourcePathUnresolved { path: display, reason: e.to_string() })
}

/// Enumerate every regular file under `root`, depth first, entries of each
/// directory in file-name order. Symlinks are not followed and not archived.
pub fn walk_source(root: &Path) -> Result<SourceListing, ScanError> {
	let root = resolve_source_root(root)?;
	let mut listing = SourceListing::default();

	for result in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
		let entry = match result {
			Ok(e) => e,
			Err(e) => {
				warn!("skipping unreadable entry: {e}");
				listing.skipped += 1;
				continue;
			}
		};

		let file_type = entry.file_type();
		if file_type.is_dir() {
			continue;
		}
		if file_type.is_symlink() {
			warn!("skipping symlink {}", entry.path().display());
			listing.skipped += 1;
			continue;
		}

		let relative_path = match entry.path().strip_prefix(&root) {
			Ok(rel) => rel.to_path_buf(),
			Err(_) => {
				listing.skipped += 1;
				continue;
			}
		};

		listing.entries.push(SourceEntry {
			path: entry.path().to_path_buf(),
			relative_path,
		});
	}

	Ok(listing)
}

/// Total size in bytes of the regular files under `dir`.
/// A missing directory counts as empty; unreadable entries are ignored.
pub fn dir_size(dir: &Path) -> u64 {
	if !dir.exists() {
		return 0;
	}
	WalkDir::new(dir)
		.follow_links(false)
		.into_iter()
		.filter_map(Result::ok)
		.filter(|e| e.file_type().is_file())
		.filter_map(|e| e.metadata().ok())
		.map(|m| m.len())
		.sum()
}
