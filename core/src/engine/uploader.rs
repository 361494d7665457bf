use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::{db::MetadataStore, models::EventKind, util::to_slash};

#[derive(Debug, Error)]
pub enum UploadError {
	#[error("remote storage misconfigured: {0}")]
	Config(String),

	#[error("transport error: {0}")]
	Transport(String),

	#[error("remote rejected upload with HTTP {status}: {detail}")]
	Rejected { status: u16, detail: String },

	#[error("cannot read {path}: {reason}")]
	Read { path: String, reason: String },
}

/// Blob storage as a plain "file to key" primitive. Implementations read the
/// artifact themselves so they can stream it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
	async fn put(&self, key: &str, artifact: &Path) -> Result<(), UploadError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
	pub uploaded: u64,
	pub failed: u64,
	/// Whether the local destination tree was removed afterwards.
	pub purged: bool,
}

/// Ships every artifact under the destination root to `<batch>/<relative path>`.
pub struct RemoteUploader<'a> {
	store: &'a MetadataStore,
	target: Arc<dyn ObjectStore>,
}

impl<'a> RemoteUploader<'a> {
	pub fn new(store: &'a MetadataStore, target: Arc<dyn ObjectStore>) -> Self {
		Self { store, target }
	}

	/// Upload every file under `dest_root`. Each failure is written to the
	/// event log and the walk continues.
	pub async fn upload_tree(&self, dest_root: &Path, batch: &str) -> UploadReport {
		let mut report = UploadReport::default();

		for (path, relative) in artifacts(dest_root) {
			let key = format!("{batch}/{relative}");
			match self.target.put(&key, &path).await {
				Ok(()) => {
					debug!("uploaded {} -> {key}", path.display());
					report.uploaded += 1;
				}
				Err(e) => {
					warn!("upload of {} failed: {e}", path.display());
					report.failed += 1;
					if let Err(log_err) = self
						.store
						.append_event(EventKind::UploadError, &relative, &e.to_string())
						.await
					{
						error!("cannot record upload failure for {relative}: {log_err}");
					}
				}
			}
		}

		info!(uploaded = report.uploaded, failed = report.failed, "upload phase finished");
		report
	}

	/// Upload, then remove the local destination tree. The tree is only removed
	/// after every artifact has had its attempt.
	pub async fn upload_and_purge(&self, dest_root: &Path, batch: &str) -> UploadReport {
		let mut report = self.upload_tree(dest_root, batch).await;
		match fs::remove_dir_all(dest_root) {
			Ok(()) => {
				info!("removed destination directory {}", dest_root.display());
				report.purged = true;
			}
			Err(e) => warn!("cannot remove destination directory {}: {e}", dest_root.display()),
		}
		report
	}
}

/// Regular files under `root` with their `/`-separated relative paths, in
/// stable order.
fn artifacts(root: &Path) -> Vec<(PathBuf, String)> {
	WalkDir::new(root)
		.follow_links(false)
		.sort_by_file_name()
		.into_iter()
		.filter_map(|entry| match entry {
			Ok(e) => Some(e),
			Err(e) => {
				warn!("skipping unreadable destination entry: {e}");
				None
			}
		})
		.filter(|e| e.file_type().is_file())
		.filter_map(|e| {
			let relative = e.path().strip_prefix(root).ok().map(to_slash)?;
			Some((e.path().to_path_buf(), relative))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use super::*;

	/// Records every key; refuses keys containing `reject`.
	#[derive(Default)]
	struct RecordingStore {
		puts: Mutex<Vec<(String, Vec<u8>)>>,
	}

	#[async_trait]
	impl ObjectStore for RecordingStore {
		async fn put(&self, key: &str, artifact: &Path) -> Result<(), UploadError> {
			if key.contains("reject") {
				return Err(UploadError::Rejected { status: 403, detail: "AuthorizationFailure".into() });
			}
			let body = tokio::fs::read(artifact).await.map_err(|e| UploadError::Read {
				path: artifact.display().to_string(),
				reason: e.to_string(),
			})?;
			self.puts.lock().unwrap().push((key.to_string(), body));
			Ok(())
		}
	}

	fn setup_dest(dir: &Path) {
		fs::create_dir_all(dir.join("docs/deep")).unwrap();
		fs::write(dir.join("a.txt.7z"), "A").unwrap();
		fs::write(dir.join("docs/deep/b.jpg.7z"), "BB").unwrap();
		fs::write(dir.join("docs/reject.bin.7z"), "C").unwrap();
	}

	#[tokio::test]
	async fn keys_combine_batch_and_relative_path() {
		let tmp = tempfile::tempdir().unwrap();
		setup_dest(tmp.path());
		let store = MetadataStore::open_in_memory().await.unwrap();
		let target = Arc::new(RecordingStore::default());

		let report = RemoteUploader::new(&store, target.clone())
			.upload_tree(tmp.path(), "20240101000000")
			.await;

		assert_eq!(report, UploadReport { uploaded: 2, failed: 1, purged: false });
		let puts = target.puts.lock().unwrap();
		let keys: Vec<&str> = puts.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["20240101000000/a.txt.7z", "20240101000000/docs/deep/b.jpg.7z"]);
		assert_eq!(puts[1].1, b"BB");
	}

	#[tokio::test]
	async fn failures_are_logged_not_fatal() {
		let tmp = tempfile::tempdir().unwrap();
		setup_dest(tmp.path());
		let store = MetadataStore::open_in_memory().await.unwrap();

		RemoteUploader::new(&store, Arc::new(RecordingStore::default()))
			.upload_tree(tmp.path(), "b1")
			.await;

		let events = store.events_for_path("docs/reject.bin.7z").await.unwrap();
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].event_type, "Error uploading file to Azure");
		assert!(events[0].message.contains("403"));
	}

	#[tokio::test]
	async fn purge_runs_after_all_attempts_and_keeps_store() {
		let tmp = tempfile::tempdir().unwrap();
		let dest = tmp.path().join("dest");
		setup_dest(&dest);
		let store = MetadataStore::open_in_memory().await.unwrap();
		let target = Arc::new(RecordingStore::default());

		let report = RemoteUploader::new(&store, target.clone())
			.upload_and_purge(&dest, "b1")
			.await;

		assert!(report.purged);
		assert_eq!(report.uploaded + report.failed, 3);
		assert!(!dest.exists());
		assert_eq!(target.puts.lock().unwrap().len(), 2);
		assert_eq!(store.recent_events(10).await.unwrap().len(), 1);
	}
}
