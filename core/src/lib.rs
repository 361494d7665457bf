//! Archive a directory tree into per-file compressed artifacts, with a
//! SurrealDB metadata index, duplicate detection and optional remote upload.

pub mod archiver;
pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod util;

pub use archiver::{open_store, ArchiveError, Archiver, RunSummary};
pub use config::{ArchiveConfig, Codec, CompressionConfig, RemoteConfig, ThumbnailConfig};
pub use db::{FileFilter, MetadataStore, StoreError};
pub use engine::pipeline::{FileOutcome, NoProgress, PipelineReport, ProcessedFile, Progress};
pub use engine::uploader::UploadReport;
pub use models::{EventKind, EventRecord, FileIdentity, FileRecord};
