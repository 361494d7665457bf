use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::info;

use crate::{
	config::ArchiveConfig,
	db::{MetadataStore, StoreError},
	engine::{
		azure::AzureBlobStore,
		compressor::{self, CompressError, Compressor},
		pipeline::{ArchivePipeline, PipelineReport, Progress},
		scanner::{dir_size, ScanError},
		thumbnail::{MediaThumbnailer, ThumbnailExtractor},
		uploader::{ObjectStore, RemoteUploader, UploadError, UploadReport},
	},
	util::{batch_id, format_size},
};

/// Errors that abort a whole run. Per-file problems never surface here; they
/// go to the event log.
#[derive(Debug, Error)]
pub enum ArchiveError {
	#[error(transparent)]
	Scan(#[from] ScanError),

	#[error("cannot use destination {path}: {reason}")]
	Destination { path: String, reason: String },

	#[error("destination {dest} lies inside source {source_dir}")]
	DestinationInsideSource { dest: String, source_dir: String },

	#[error("source {source_dir} lies inside destination {dest}")]
	SourceInsideDestination { source_dir: String, dest: String },

	#[error("invalid compression settings: {0}")]
	Compression(#[from] CompressError),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Remote(#[from] UploadError),
}

/// What one invocation did, for the caller to print.
#[derive(Debug, Clone)]
pub struct RunSummary {
	pub batch: String,
	pub started_at: DateTime<Utc>,
	pub finished_at: DateTime<Utc>,
	pub original_bytes: u64,
	pub compressed_bytes: u64,
	pub files: PipelineReport,
	pub upload: Option<UploadReport>,
}

impl RunSummary {
	pub fn duration(&self) -> Duration {
		self.finished_at - self.started_at
	}

	/// Compressed over original size; `None` for an empty source.
	pub fn compression_ratio(&self) -> Option<f64> {
		(self.original_bytes > 0).then(|| self.compressed_bytes as f64 / self.original_bytes as f64)
	}

	/// Per-file failures across both phases.
	pub fn errors(&self) -> u64 {
		self.files.failed + self.upload.as_ref().map_or(0, |u| u.failed)
	}
}

/// Open the metadata store named by the configuration. Failure here is fatal
/// for the run.
pub async fn open_store(config: &ArchiveConfig) -> Result<MetadataStore, ArchiveError> {
	Ok(MetadataStore::open(&config.db_path).await?)
}

/// One archive run: validate, pipeline, measure, optionally upload and purge.
pub struct Archiver<'a> {
	store: &'a MetadataStore,
	source_dir: PathBuf,
	dest_dir: PathBuf,
	compressor: Arc<dyn Compressor>,
	thumbnailer: Arc<dyn ThumbnailExtractor>,
	remote: Option<Arc<dyn ObjectStore>>,
	purge_after_upload: bool,
	batch: Option<String>,
}

impl<'a> Archiver<'a> {
	pub fn new(config: &ArchiveConfig, store: &'a MetadataStore) -> Result<Self, ArchiveError> {
		let compressor = compressor::from_config(&config.compression)?;
		let remote = match &config.remote {
			Some(remote) => Some(Arc::new(AzureBlobStore::from_connection_string(
				&remote.connection_string,
				&remote.container,
			)?) as Arc<dyn ObjectStore>),
			None => None,
		};

		Ok(Self {
			store,
			source_dir: config.source_dir.clone(),
			dest_dir: config.dest_dir.clone(),
			compressor,
			thumbnailer: Arc::new(MediaThumbnailer::new(&config.thumbnail)),
			remote,
			purge_after_upload: config.remote.as_ref().is_some_and(|r| r.purge_after_upload),
			batch: None,
		})
	}

	pub fn with_compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
		self.compressor = compressor;
		self
	}

	pub fn with_thumbnailer(mut self, thumbnailer: Arc<dyn ThumbnailExtractor>) -> Self {
		self.thumbnailer = thumbnailer;
		self
	}

	pub fn with_remote(mut self, target: Arc<dyn ObjectStore>, purge_after_upload: bool) -> Self {
		self.remote = Some(target);
		self.purge_after_upload = purge_after_upload;
		self
	}

	/// Override the batch label, which otherwise comes from the start time.
	pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
		self.batch = Some(batch.into());
		self
	}

	pub async fn run(&self, progress: &dyn Progress) -> Result<RunSummary, ArchiveError> {
		let started_at = Utc::now();
		let batch = self.batch.clone().unwrap_or_else(|| batch_id(started_at));

		let pipeline = ArchivePipeline::new(
			self.store,
			Arc::clone(&self.compressor),
			Arc::clone(&self.thumbnailer),
			&self.source_dir,
			&self.dest_dir,
			batch.clone(),
		)?;

		let original_bytes = dir_size(pipeline.source_root());
		let files = pipeline.run(progress).await?;
		let compressed_bytes = dir_size(pipeline.dest_root());
		info!(
			"{} compressed to {}",
			format_size(original_bytes),
			format_size(compressed_bytes)
		);

		let upload = match &self.remote {
			Some(target) => {
				let uploader = RemoteUploader::new(self.store, Arc::clone(target));
				Some(if self.purge_after_upload {
					uploader.upload_and_purge(pipeline.dest_root(), &batch).await
				} else {
					uploader.upload_tree(pipeline.dest_root(), &batch).await
				})
			}
			None => None,
		};

		Ok(RunSummary {
			batch,
			started_at,
			finished_at: Utc::now(),
			original_bytes,
			compressed_bytes,
			files,
			upload,
		})
	}
}
