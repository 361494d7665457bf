use std::{fs, io, path::Path};

use crate::{
	db::{MetadataStore, StoreError},
	models::FileIdentity,
};

/// Read the identity tuple of a file on disk.
pub fn probe_identity(path: &Path) -> io::Result<FileIdentity> {
	let metadata = fs::metadata(path)?;
	let filename = path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
	Ok(FileIdentity::from_metadata(filename, &metadata))
}

/// Asks the store whether an equivalent file was archived before.
/// Holds no state of its own.
pub struct DuplicateDetector<'a> {
	store: &'a MetadataStore,
}

impl<'a> DuplicateDetector<'a> {
	pub fn new(store: &'a MetadataStore) -> Self {
		Self { store }
	}

	/// Artifact path of the prior equivalent file, if any.
	pub async fn check(&self, identity: &FileIdentity) -> Result<Option<String>, StoreError> {
		self.store.find_duplicate(identity).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::FileRecord;

	#[test]
	fn probe_reads_name_and_size() {
		let tmp = tempfile::tempdir().unwrap();
		let file = tmp.path().join("a.txt");
		fs::write(&file, "0123456789").unwrap();

		let identity = probe_identity(&file).unwrap();
		assert_eq!(identity.filename, "a.txt");
		assert_eq!(identity.size, 10);
		assert!(identity.modification_time.ends_with('Z'));
		assert_eq!(identity, probe_identity(&file).unwrap());
	}

	#[test]
	fn probe_missing_file_fails() {
		assert!(probe_identity(Path::new("/tmp/archivist_definitely_not_real.txt")).is_err());
	}

	#[tokio::test]
	async fn detects_prior_record() {
		let tmp = tempfile::tempdir().unwrap();
		let file = tmp.path().join("a.txt");
		fs::write(&file, "0123456789").unwrap();
		let identity = probe_identity(&file).unwrap();

		let store = MetadataStore::open_in_memory().await.unwrap();
		let detector = DuplicateDetector::new(&store);
		assert_eq!(detector.check(&identity).await.unwrap(), None);

		store
			.insert_file(&FileRecord {
				id: None,
				filename: identity.filename.clone(),
				filepath: "a.txt.7z".to_string(),
				content_type: Some("text/plain".to_string()),
				size: identity.size,
				creation_time: identity.creation_time.clone(),
				modification_time: identity.modification_time.clone(),
				thumbnail: None,
				is_duplicate: false,
				original_path: file.display().to_string(),
				batch: "20240101000000".to_string(),
			})
			.await
			.unwrap();

		assert_eq!(detector.check(&identity).await.unwrap().as_deref(), Some("a.txt.7z"));
	}
}
