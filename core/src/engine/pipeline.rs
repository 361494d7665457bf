//! Per-file archival state machine.
//!
//! ```text
//! Discovered → IdentityComputed ─┬─ DuplicateFound → [Recorded]
//!                                └─ DuplicateNotFound → Compressed → ThumbnailAttempted → [Recorded]
//! any step ─→ [Errored: logged to event_record, skipped]
//! ```
//!
//! Files are processed strictly one after another. A failure on one file never
//! stops the batch.

use std::{
	fs, io,
	path::{Path, PathBuf},
	sync::Arc,
};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
	archiver::ArchiveError,
	db::{MetadataStore, StoreError},
	engine::{
		compressor::{remove_artifact, CompressError, Compressor},
		dedup::{probe_identity, DuplicateDetector},
		scanner::{resolve_source_root, walk_source, SourceEntry},
		thumbnail::ThumbnailExtractor,
	},
	models::{EventKind, FileIdentity, FileRecord},
	util::{guess_content_type, is_visual_media, to_slash},
};

/// Why a single file was skipped.
#[derive(Debug, Error)]
pub enum FileError {
	#[error("{path}: {reason}")]
	Io { path: String, reason: String },

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Compress(#[from] CompressError),

	#[error("worker task failed: {0}")]
	Join(String),
}

impl FileError {
	fn io(path: &Path, err: io::Error) -> Self {
		FileError::Io {
			path: path.display().to_string(),
			reason: err.to_string(),
		}
	}
}

/// Terminal state of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
	Archived { filepath: String, thumbnail: bool },
	Duplicate { filepath: String, original: String },
	Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct ProcessedFile {
	pub source: PathBuf,
	pub outcome: FileOutcome,
}

/// Observer for long runs. Both hooks default to doing nothing.
pub trait Progress: Send + Sync {
	fn start(&self, _total: u64) {}
	fn advance(&self, _file: &ProcessedFile) {}
}

/// Progress sink that ignores everything.
pub struct NoProgress;

impl Progress for NoProgress {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
	pub discovered: u64,
	pub archived: u64,
	pub duplicates: u64,
	pub failed: u64,
	/// Symlinks and unreadable entries never handed to the pipeline.
	pub skipped: u64,
	pub thumbnails: u64,
}

impl PipelineReport {
	pub fn processed(&self) -> u64 {
		self.archived + self.duplicates
	}
}

pub struct ArchivePipeline<'a> {
	store: &'a MetadataStore,
	compressor: Arc<dyn Compressor>,
	thumbnailer: Arc<dyn ThumbnailExtractor>,
	source_root: PathBuf,
	dest_root: PathBuf,
	batch: String,
	probe: fn(&Path) -> io::Result<FileIdentity>,
}

impl<'a> ArchivePipeline<'a> {
	/// Validate both roots up front. Every error here is fatal for the run.
	pub fn new(
		store: &'a MetadataStore,
		compressor: Arc<dyn Compressor>,
		thumbnailer: Arc<dyn ThumbnailExtractor>,
		source: &Path,
		dest: &Path,
		batch: impl Into<String>,
	) -> Result<Self, ArchiveError> {
		let source_root = resolve_source_root(source)?;
		// Nesting is checked before anything is created on disk.
		let dest_root = resolve_destination(dest)?;
		check_disjoint(&source_root, &dest_root)?;
		let dest_root = prepare_destination(&dest_root)?;

		Ok(Self {
			store,
			compressor,
			thumbnailer,
			source_root,
			dest_root,
			batch: batch.into(),
			probe: probe_identity,
		})
	}

	/// Replace the filesystem identity probe.
	#[cfg(test)]
	fn with_probe(mut self, probe: fn(&Path) -> io::Result<FileIdentity>) -> Self {
		self.probe = probe;
		self
	}

	pub fn source_root(&self) -> &Path {
		&self.source_root
	}

	pub fn dest_root(&self) -> &Path {
		&self.dest_root
	}

	pub fn batch(&self) -> &str {
		&self.batch
	}

	/// Process every file under the source root, one at a time.
	pub async fn run(&self, progress: &dyn Progress) -> Result<PipelineReport, ArchiveError> {
		let listing = walk_source(&self.source_root)?;
		let mut report = PipelineReport {
			discovered: listing.entries.len() as u64,
			skipped: listing.skipped,
			..PipelineReport::default()
		};

		info!(
			batch = %self.batch,
			files = report.discovered,
			"archiving {} -> {}",
			self.source_root.display(),
			self.dest_root.display()
		);
		progress.start(report.discovered);

		for entry in &listing.entries {
			let outcome = match self.process_file(entry).await {
				Ok(outcome) => outcome,
				Err(err) => {
					warn!("skipping {}: {err}", entry.path.display());
					self.record_failure(&entry.path, &err).await;
					FileOutcome::Failed { reason: err.to_string() }
				}
			};

			match &outcome {
				FileOutcome::Archived { thumbnail, .. } => {
					report.archived += 1;
					report.thumbnails += u64::from(*thumbnail);
				}
				FileOutcome::Duplicate { .. } => report.duplicates += 1,
				FileOutcome::Failed { .. } => report.failed += 1,
			}

			progress.advance(&ProcessedFile {
				source: entry.path.clone(),
				outcome,
			});
		}

		info!(
			batch = %self.batch,
			archived = report.archived,
			duplicates = report.duplicates,
			failed = report.failed,
			"batch finished"
		);
		Ok(report)
	}

	async fn process_file(&self, entry: &SourceEntry) -> Result<FileOutcome, FileError> {
		// Mirror the directory before the duplicate check: duplicates still
		// record the artifact path they would have had.
		let dest_dir = match entry.relative_path.parent().filter(|p| !p.as_os_str().is_empty()) {
			Some(parent) => self.dest_root.join(parent),
			None => self.dest_root.clone(),
		};
		fs::create_dir_all(&dest_dir).map_err(|e| FileError::io(&dest_dir, e))?;

		let extension = self.compressor.extension();
		let filepath = format!("{}{extension}", to_slash(&entry.relative_path));
		let artifact = match entry.relative_path.file_name() {
			Some(name) => dest_dir.join(format!("{}{extension}", name.to_string_lossy())),
			None => {
				return Err(FileError::Io {
					path: entry.path.display().to_string(),
					reason: "no file name".to_string(),
				})
			}
		};

		let identity = (self.probe)(&entry.path).map_err(|e| FileError::io(&entry.path, e))?;
		let content_type = guess_content_type(&entry.path);

		if let Some(original) = DuplicateDetector::new(self.store).check(&identity).await? {
			debug!("{} duplicates {original}", entry.path.display());
			let record = self.record(identity, filepath.clone(), content_type, None, true, original.clone());
			self.store.insert_file(&record).await?;
			return Ok(FileOutcome::Duplicate { filepath, original });
		}

		let compressor = Arc::clone(&self.compressor);
		let (source, target) = (entry.path.clone(), artifact.clone());
		tokio::task::spawn_blocking(move || compressor.compress(&source, &target))
			.await
			.map_err(|e| FileError::Join(e.to_string()))??;

		let thumbnail = match content_type.as_deref() {
			Some(ct) if is_visual_media(ct) => self.thumbnail(&entry.path, ct).await,
			_ => None,
		};
		let has_thumbnail = thumbnail.is_some();

		let record = self.record(
			identity,
			filepath.clone(),
			content_type,
			thumbnail,
			false,
			entry.path.display().to_string(),
		);
		if let Err(err) = self.store.insert_file(&record).await {
			// An artifact without a record must not reach the upload phase.
			if let Err(cleanup) = remove_artifact(&artifact) {
				warn!("cannot remove unrecorded artifact {}: {cleanup}", artifact.display());
			}
			return Err(err.into());
		}
		debug!("archived {} as {filepath}", entry.path.display());

		Ok(FileOutcome::Archived {
			filepath,
			thumbnail: has_thumbnail,
		})
	}

	async fn thumbnail(&self, source: &Path, content_type: &str) -> Option<Vec<u8>> {
		let thumbnailer = Arc::clone(&self.thumbnailer);
		let (source, content_type) = (source.to_path_buf(), content_type.to_string());
		tokio::task::spawn_blocking(move || thumbnailer.extract(&source, &content_type))
			.await
			.ok()
			.flatten()
	}

	fn record(
		&self,
		identity: FileIdentity,
		filepath: String,
		content_type: Option<String>,
		thumbnail: Option<Vec<u8>>,
		is_duplicate: bool,
		original_path: String,
	) -> FileRecord {
		FileRecord {
			id: None,
			filename: identity.filename,
			filepath,
			content_type,
			size: identity.size,
			creation_time: identity.creation_time,
			modification_time: identity.modification_time,
			thumbnail,
			is_duplicate,
			original_path,
			batch: self.batch.clone(),
		}
	}

	async fn record_failure(&self, source: &Path, err: &FileError) {
		let path = source.display().to_string();
		if let Err(log_err) = self
			.store
			.append_event(EventKind::ProcessingError, &path, &err.to_string())
			.await
		{
			error!("cannot record failure for {path}: {log_err}");
		}
	}
}

/// Absolute form of `dest` without touching the disk: the deepest existing
/// ancestor is canonicalized and the missing components appended.
fn resolve_destination(dest: &Path) -> Result<PathBuf, ArchiveError> {
	let fail = |reason: String| ArchiveError::Destination {
		path: dest.display().to_string(),
		reason,
	};

	let absolute = if dest.is_absolute() {
		dest.to_path_buf()
	} else {
		std::env::current_dir().map_err(|e| fail(e.to_string()))?.join(dest)
	};

	let mut missing = Vec::new();
	let mut existing = absolute.as_path();
	while !existing.exists() {
		let name = existing
			.file_name()
			.ok_or_else(|| fail("path cannot be resolved".to_string()))?;
		missing.push(name.to_os_string());
		existing = existing
			.parent()
			.ok_or_else(|| fail("no existing ancestor".to_string()))?;
	}

	let mut resolved = existing.canonicalize().map_err(|e| fail(e.to_string()))?;
	resolved.extend(missing.iter().rev());
	Ok(resolved)
}

/// The source is read-only and the destination may be purged after upload,
/// so neither tree may contain the other.
fn check_disjoint(source_root: &Path, dest_root: &Path) -> Result<(), ArchiveError> {
	let (source_dir, dest) = (source_root.display().to_string(), dest_root.display().to_string());
	if dest_root.starts_with(source_root) {
		return Err(ArchiveError::DestinationInsideSource { dest, source_dir });
	}
	if source_root.starts_with(dest_root) {
		return Err(ArchiveError::SourceInsideDestination { source_dir, dest });
	}
	Ok(())
}

/// Create the destination root if needed and make sure we can write into it.
fn prepare_destination(dest: &Path) -> Result<PathBuf, ArchiveError> {
	let fail = |reason: String| ArchiveError::Destination {
		path: dest.display().to_string(),
		reason,
	};

	fs::create_dir_all(dest).map_err(|e| fail(e.to_string()))?;
	let dest = dest.canonicalize().map_err(|e| fail(e.to_string()))?;
	tempfile::tempfile_in(&dest).map_err(|e| fail(format!("not writable: {e}")))?;
	Ok(dest)
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use image::{ImageBuffer, Rgb};

	use super::*;
	use crate::{
		config::ThumbnailConfig,
		engine::{compressor::ZstdCompressor, thumbnail::MediaThumbnailer},
	};

	/// zstd, except for files whose name starts with `bad`.
	struct PickyCompressor(ZstdCompressor);

	impl Compressor for PickyCompressor {
		fn extension(&self) -> &str {
			".zst"
		}

		fn compress(&self, source: &Path, artifact: &Path) -> Result<(), CompressError> {
			let name = source.file_name().unwrap().to_string_lossy();
			if name.starts_with("bad") {
				return Err(CompressError::ToolFailed {
					tool: "7z".into(),
					status: "exit status: 2".into(),
					stderr: "ERROR: unsupported".into(),
				});
			}
			self.0.compress(source, artifact)
		}
	}

	#[derive(Default)]
	struct Recorder {
		total: Mutex<Option<u64>>,
		seen: Mutex<Vec<FileOutcome>>,
	}

	impl Progress for Recorder {
		fn start(&self, total: u64) {
			*self.total.lock().unwrap() = Some(total);
		}

		fn advance(&self, file: &ProcessedFile) {
			self.seen.lock().unwrap().push(file.outcome.clone());
		}
	}

	struct Fixture {
		_tmp: tempfile::TempDir,
		source: PathBuf,
		dest: PathBuf,
	}

	fn fixture() -> Fixture {
		let tmp = tempfile::tempdir().unwrap();
		let source = tmp.path().join("source");
		let dest = tmp.path().join("dest");
		fs::create_dir_all(source.join("docs")).unwrap();
		fs::write(source.join("a.txt"), "0123456789").unwrap();
		ImageBuffer::from_pixel(200, 100, Rgb([12u8, 34, 56]))
			.save(source.join("b.jpg"))
			.unwrap();
		fs::write(source.join("docs/notes.md"), "# notes\n").unwrap();
		Fixture { _tmp: tmp, source, dest }
	}

	fn pipeline<'a>(store: &'a MetadataStore, fx: &Fixture, dest: &Path, batch: &str) -> ArchivePipeline<'a> {
		ArchivePipeline::new(
			store,
			Arc::new(PickyCompressor(ZstdCompressor::new(1).unwrap())),
			Arc::new(MediaThumbnailer::new(&ThumbnailConfig::default())),
			&fx.source,
			dest,
			batch,
		)
		.unwrap()
	}

	fn files_under(dir: &Path) -> Vec<String> {
		let mut files: Vec<String> = walkdir::WalkDir::new(dir)
			.into_iter()
			.filter_map(Result::ok)
			.filter(|e| e.file_type().is_file())
			.map(|e| to_slash(e.path().strip_prefix(dir).unwrap()))
			.collect();
		files.sort();
		files
	}

	#[tokio::test]
	async fn archives_every_file_with_mirrored_paths() {
		let fx = fixture();
		let store = MetadataStore::open_in_memory().await.unwrap();

		let report = pipeline(&store, &fx, &fx.dest, "b1").run(&NoProgress).await.unwrap();

		assert_eq!(report.discovered, 3);
		assert_eq!(report.archived, 3);
		assert_eq!(report.failed, 0);
		assert_eq!(files_under(&fx.dest), vec!["a.txt.zst", "b.jpg.zst", "docs/notes.md.zst"]);

		let records = store.files_in_batch("b1").await.unwrap();
		assert_eq!(records.len(), 3);
		for record in &records {
			assert!(!record.is_duplicate);
			assert!(record.filepath.ends_with(".zst"));
			assert!(Path::new(&record.original_path).is_absolute());
			assert!(fx.dest.join(&record.filepath).is_file());
		}

		let a = records.iter().find(|r| r.filename == "a.txt").unwrap();
		assert_eq!(a.size, 10);
		assert_eq!(a.content_type.as_deref(), Some("text/plain"));
		assert_eq!(a.thumbnail, None);

		let b = records.iter().find(|r| r.filename == "b.jpg").unwrap();
		assert_eq!(b.content_type.as_deref(), Some("image/jpeg"));
		assert!(b.thumbnail.as_ref().is_some_and(|t| !t.is_empty()));
		assert_eq!(report.thumbnails, 1);
	}

	#[tokio::test]
	async fn second_run_records_only_duplicates() {
		let fx = fixture();
		let store = MetadataStore::open_in_memory().await.unwrap();
		pipeline(&store, &fx, &fx.dest, "b1").run(&NoProgress).await.unwrap();

		let second_dest = fx._tmp.path().join("dest2");
		let report = pipeline(&store, &fx, &second_dest, "b2").run(&NoProgress).await.unwrap();

		assert_eq!(report.duplicates, 3);
		assert_eq!(report.archived, 0);
		assert!(files_under(&second_dest).is_empty());
		// directories are still mirrored
		assert!(second_dest.join("docs").is_dir());

		let first = store.files_in_batch("b1").await.unwrap();
		let second = store.files_in_batch("b2").await.unwrap();
		assert_eq!(second.len(), 3);
		for dup in &second {
			let original = first.iter().find(|r| r.filename == dup.filename).unwrap();
			assert!(dup.is_duplicate);
			assert_eq!(dup.original_path, original.filepath);
			assert_eq!(dup.filepath, original.filepath);
			assert_eq!(dup.thumbnail, None);
		}
	}

	#[tokio::test]
	async fn compression_failure_is_isolated() {
		let fx = fixture();
		fs::write(fx.source.join("bad.bin"), [0u8; 64]).unwrap();
		fs::write(fx.source.join("docs/zz_last.txt"), "still here").unwrap();
		let store = MetadataStore::open_in_memory().await.unwrap();
		let progress = Recorder::default();

		let report = pipeline(&store, &fx, &fx.dest, "b1").run(&progress).await.unwrap();

		assert_eq!(report.failed, 1);
		assert_eq!(report.archived, 4);
		assert!(!fx.dest.join("bad.bin.zst").exists());
		assert!(fx.dest.join("docs/zz_last.txt.zst").exists());

		let records = store.files_in_batch("b1").await.unwrap();
		assert!(records.iter().all(|r| r.filename != "bad.bin"));

		let bad_path = fx.source.canonicalize().unwrap().join("bad.bin");
		let events = store.events_for_path(&bad_path.display().to_string()).await.unwrap();
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].event_type, "Error processing file");
		assert!(events[0].message.contains("unsupported"));

		assert_eq!(*progress.total.lock().unwrap(), Some(5));
		let seen = progress.seen.lock().unwrap();
		assert_eq!(seen.len(), 5);
		assert_eq!(seen.iter().filter(|o| matches!(o, FileOutcome::Failed { .. })).count(), 1);
	}

	#[tokio::test]
	async fn broken_image_is_archived_without_thumbnail_or_event() {
		let fx = fixture();
		fs::write(fx.source.join("broken.png"), b"not really a png").unwrap();
		let store = MetadataStore::open_in_memory().await.unwrap();

		let report = pipeline(&store, &fx, &fx.dest, "b1").run(&NoProgress).await.unwrap();

		assert_eq!(report.failed, 0);
		let records = store.files_in_batch("b1").await.unwrap();
		let broken = records.iter().find(|r| r.filename == "broken.png").unwrap();
		assert_eq!(broken.content_type.as_deref(), Some("image/png"));
		assert_eq!(broken.thumbnail, None);
		assert!(store.recent_events(10).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn prior_record_makes_file_a_duplicate() {
		let fx = fixture();
		let store = MetadataStore::open_in_memory().await.unwrap();
		let identity = probe_identity(&fx.source.join("a.txt")).unwrap();
		store
			.insert_file(&FileRecord {
				id: None,
				filename: identity.filename.clone(),
				filepath: "elsewhere/a.txt.zst".to_string(),
				content_type: Some("text/plain".to_string()),
				size: identity.size,
				creation_time: identity.creation_time.clone(),
				modification_time: identity.modification_time.clone(),
				thumbnail: None,
				is_duplicate: false,
				original_path: "/old/a.txt".to_string(),
				batch: "b0".to_string(),
			})
			.await
			.unwrap();

		let report = pipeline(&store, &fx, &fx.dest, "b1").run(&NoProgress).await.unwrap();

		assert_eq!(report.duplicates, 1);
		assert_eq!(report.archived, 2);
		assert!(!fx.dest.join("a.txt.zst").exists());
		let records = store.files_in_batch("b1").await.unwrap();
		let a = records.iter().find(|r| r.filename == "a.txt").unwrap();
		assert!(a.is_duplicate);
		assert_eq!(a.original_path, "elsewhere/a.txt.zst");
		assert_eq!(a.filepath, "a.txt.zst");
	}

	#[tokio::test]
	async fn missing_source_is_fatal() {
		let tmp = tempfile::tempdir().unwrap();
		let store = MetadataStore::open_in_memory().await.unwrap();

		let result = ArchivePipeline::new(
			&store,
			Arc::new(ZstdCompressor::new(1).unwrap()),
			Arc::new(MediaThumbnailer::new(&ThumbnailConfig::default())),
			&tmp.path().join("nope"),
			&tmp.path().join("dest"),
			"b1",
		);

		assert!(matches!(result, Err(ArchiveError::Scan(_))));
	}

	#[tokio::test]
	async fn unusable_destination_is_fatal() {
		let fx = fixture();
		let blocker = fx._tmp.path().join("occupied");
		fs::write(&blocker, "a file, not a dir").unwrap();
		let store = MetadataStore::open_in_memory().await.unwrap();

		let result = ArchivePipeline::new(
			&store,
			Arc::new(ZstdCompressor::new(1).unwrap()),
			Arc::new(MediaThumbnailer::new(&ThumbnailConfig::default())),
			&fx.source,
			&blocker,
			"b1",
		);
		assert!(matches!(result, Err(ArchiveError::Destination { .. })));

		let nested = ArchivePipeline::new(
			&store,
			Arc::new(ZstdCompressor::new(1).unwrap()),
			Arc::new(MediaThumbnailer::new(&ThumbnailConfig::default())),
			&fx.source,
			&fx.source.join("out"),
			"b1",
		);
		assert!(matches!(nested, Err(ArchiveError::DestinationInsideSource { .. })));
		assert!(!fx.source.join("out").exists());
	}

	#[tokio::test]
	async fn rejected_nesting_creates_nothing() {
		let fx = fixture();
		let store = MetadataStore::open_in_memory().await.unwrap();

		let deep = ArchivePipeline::new(
			&store,
			Arc::new(ZstdCompressor::new(1).unwrap()),
			Arc::new(MediaThumbnailer::new(&ThumbnailConfig::default())),
			&fx.source,
			&fx.source.join("docs/out/deeper"),
			"b1",
		);
		assert!(matches!(deep, Err(ArchiveError::DestinationInsideSource { .. })));
		assert!(!fx.source.join("docs/out").exists());

		let inner_source = ArchivePipeline::new(
			&store,
			Arc::new(ZstdCompressor::new(1).unwrap()),
			Arc::new(MediaThumbnailer::new(&ThumbnailConfig::default())),
			&fx.source.join("docs"),
			&fx.source,
			"b1",
		);
		assert!(matches!(inner_source, Err(ArchiveError::SourceInsideDestination { .. })));
		assert!(files_under(&fx.source).iter().all(|f| !f.ends_with(".zst")));
	}

	#[tokio::test]
	async fn failed_insert_removes_artifact_and_logs() {
		let fx = fixture();
		let store = MetadataStore::open_in_memory().await.unwrap();
		store
			.execute(
				"DEFINE FIELD OVERWRITE filepath ON file_record TYPE string \
				 ASSERT $value != 'docs/notes.md.zst'",
			)
			.await
			.unwrap();

		let report = pipeline(&store, &fx, &fx.dest, "b1").run(&NoProgress).await.unwrap();

		assert_eq!(report.failed, 1);
		assert_eq!(report.archived, 2);
		assert!(!fx.dest.join("docs/notes.md.zst").exists());
		assert_eq!(files_under(&fx.dest), vec!["a.txt.zst", "b.jpg.zst"]);

		let notes = fx.source.canonicalize().unwrap().join("docs/notes.md");
		let events = store.events_for_path(&notes.display().to_string()).await.unwrap();
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].event_type, "Error processing file");
	}

	/// Real name and size, fixed timestamps.
	fn pinned_times(path: &Path) -> io::Result<FileIdentity> {
		let mut identity = probe_identity(path)?;
		identity.creation_time = "2024-01-01T00:00:00.000000Z".to_string();
		identity.modification_time = identity.creation_time.clone();
		Ok(identity)
	}

	#[tokio::test]
	async fn duplicate_within_one_run() {
		let fx = fixture();
		fs::write(fx.source.join("docs/a.txt"), "0123456789").unwrap();
		let store = MetadataStore::open_in_memory().await.unwrap();

		let report = pipeline(&store, &fx, &fx.dest, "b1")
			.with_probe(pinned_times)
			.run(&NoProgress)
			.await
			.unwrap();

		assert_eq!(report.archived, 3);
		assert_eq!(report.duplicates, 1);
		assert!(fx.dest.join("a.txt.zst").is_file());
		assert!(!fx.dest.join("docs/a.txt.zst").exists());

		let records = store.files_in_batch("b1").await.unwrap();
		let dup = records.iter().find(|r| r.filepath == "docs/a.txt.zst").unwrap();
		assert!(dup.is_duplicate);
		assert_eq!(dup.original_path, "a.txt.zst");
	}
}
