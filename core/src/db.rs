use std::{fmt::Display, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use surrealdb::engine::local::{Db, Mem, SurrealKv};
use surrealdb::types::{RecordId, RecordIdKey, SurrealValue};
use surrealdb::Surreal;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
	models::{EventKind, EventRecord, FileIdentity, FileRecord},
	util::iso_utc,
};

const NAMESPACE: &str = "archivist";
const DATABASE: &str = "archivist";

const FILE_FIELDS: &str = "id, filename, filepath, content_type, size, creation_time, modification_time, \
	thumbnail, is_duplicate, original_path, batch, recorded_at";

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("cannot open metadata store at {path}: {reason}")]
	Open { path: String, reason: String },

	#[error("schema migration failed: {0}")]
	Schema(String),

	#[error("database error: {0}")]
	DbError(String),

	#[error("stored thumbnail is not valid base64: {0}")]
	Thumbnail(String),

	#[error("insert into {0} returned no record id")]
	MissingId(&'static str),
}

/// Handle to the SurrealDB metadata store.
/// Clone is cheap (Arc internally); pass it explicitly, never as a global.
#[derive(Clone)]
pub struct MetadataStore {
	db: Surreal<Db>,
}

/// Substring filters for `search_files`. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
	pub filename: Option<String>,
	pub filepath: Option<String>,
	pub content_type: Option<String>,
	pub batch: Option<String>,
	pub duplicates: Option<bool>,
	pub limit: Option<usize>,
}

// ─── Typed DB response structs ───────────────────────────────

#[derive(Debug, Clone, SurrealValue)]
struct IdRow {
	id: RecordId,
}

#[derive(Debug, Clone, SurrealValue)]
struct DuplicateRow {
	filepath: String,
	recorded_at: String,
}

#[derive(Debug, Clone, SurrealValue)]
struct CountRow {
	count: i64,
}

#[derive(Debug, Clone, SurrealValue)]
struct FileRow {
	id: RecordId,
	filename: String,
	filepath: String,
	content_type: Option<String>,
	size: i64,
	creation_time: String,
	modification_time: String,
	thumbnail: Option<String>,
	is_duplicate: bool,
	original_path: String,
	batch: String,
	recorded_at: String,
}

#[derive(Debug, Clone, SurrealValue)]
struct EventRow {
	id: RecordId,
	event_type: String,
	file_path: String,
	message: String,
	recorded_at: String,
}

impl TryFrom<FileRow> for FileRecord {
	type Error = StoreError;

	fn try_from(row: FileRow) -> Result<Self, Self::Error> {
		let thumbnail = row
			.thumbnail
			.map(|encoded| STANDARD.decode(encoded))
			.transpose()
			.map_err(|e| StoreError::Thumbnail(e.to_string()))?;

		Ok(FileRecord {
			id: Some(rid_string(&row.id)),
			filename: row.filename,
			filepath: row.filepath,
			content_type: row.content_type,
			size: u64::try_from(row.size).unwrap_or_default(),
			creation_time: row.creation_time,
			modification_time: row.modification_time,
			thumbnail,
			is_duplicate: row.is_duplicate,
			original_path: row.original_path,
			batch: row.batch,
		})
	}
}

impl From<EventRow> for EventRecord {
	fn from(row: EventRow) -> Self {
		EventRecord {
			id: rid_string(&row.id),
			event_type: row.event_type,
			file_path: row.file_path,
			message: row.message,
			timestamp: row.recorded_at,
		}
	}
}

pub(crate) fn rid_string(id: &RecordId) -> String {
	let table = id.table.to_string();
	match &id.key {
		RecordIdKey::String(s) => format!("{table}:{s}"),
		RecordIdKey::Number(n) => format!("{table}:{n}"),
		_ => format!("{table}:{:?}", id.key),
	}
}

fn db_err(e: impl Display) -> StoreError {
	StoreError::DbError(e.to_string())
}

impl MetadataStore {
	/// Open (or create) the file-backed store and run migrations.
	pub async fn open(path: &Path) -> Result<Self, StoreError> {
		let open_error = |e: &dyn Display| StoreError::Open {
			path: path.display().to_string(),
			reason: e.to_string(),
		};

		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(|e| open_error(&e))?;
		}

		let db = Surreal::new::<SurrealKv>(path.to_path_buf())
			.await
			.map_err(|e| open_error(&e))?;
		let store = Self::init(db).await?;
		info!("metadata store opened at {}", path.display());
		Ok(store)
	}

	/// Ephemeral store with the same schema, for tests and dry runs.
	pub async fn open_in_memory() -> Result<Self, StoreError> {
		let db = Surreal::new::<Mem>(()).await.map_err(|e| StoreError::Open {
			path: "memory".to_string(),
			reason: e.to_string(),
		})?;
		Self::init(db).await
	}

	async fn init(db: Surreal<Db>) -> Result<Self, StoreError> {
		db.use_ns(NAMESPACE).use_db(DATABASE).await.map_err(db_err)?;
		let store = Self { db };
		store.ensure_schema().await?;
		Ok(store)
	}

	/// Create both collections if absent. DEFINE statements are idempotent.
	pub async fn ensure_schema(&self) -> Result<(), StoreError> {
		self.db
			.query(SCHEMA_V1)
			.await
			.map_err(|e| StoreError::Schema(e.to_string()))?
			.check()
			.map_err(|e| StoreError::Schema(e.to_string()))?;
		Ok(())
	}

	/// Run raw SurrealQL against the store.
	#[cfg(test)]
	pub(crate) async fn execute(&self, sql: &str) -> Result<(), StoreError> {
		self.db.query(sql.to_string()).await.map_err(db_err)?.check().map_err(db_err)?;
		Ok(())
	}

	/// Artifact path of the earliest non-duplicate record with this identity.
	pub async fn find_duplicate(&self, identity: &FileIdentity) -> Result<Option<String>, StoreError> {
		let mut response = self
			.db
			.query(
				"SELECT filepath, recorded_at FROM file_record
                 WHERE filename = $filename
                    AND size = $size
                    AND creation_time = $creation_time
                    AND modification_time = $modification_time
                    AND is_duplicate = false
                 ORDER BY recorded_at ASC
                 LIMIT 1",
			)
			.bind(("filename", identity.filename.clone()))
			.bind(("size", identity.size as i64))
			.bind(("creation_time", identity.creation_time.clone()))
			.bind(("modification_time", identity.modification_time.clone()))
			.await
			.map_err(db_err)?;

		let rows: Vec<DuplicateRow> = response.take(0).map_err(db_err)?;
		Ok(rows.into_iter().next().map(|row| row.filepath))
	}

	/// Append a file record. Any `id` on the input is ignored; the new id is returned.
	pub async fn insert_file(&self, record: &FileRecord) -> Result<String, StoreError> {
		let thumbnail = record.thumbnail.as_ref().map(|bytes| STANDARD.encode(bytes));

		let mut response = self
			.db
			.query(
				"CREATE file_record CONTENT {
                    filename: $filename,
                    filepath: $filepath,
                    content_type: $content_type,
                    size: $size,
                    creation_time: $creation_time,
                    modification_time: $modification_time,
                    thumbnail: $thumbnail,
                    is_duplicate: $is_duplicate,
                    original_path: $original_path,
                    batch: $batch,
                    recorded_at: $recorded_at,
                } RETURN id",
			)
			.bind(("filename", record.filename.clone()))
			.bind(("filepath", record.filepath.clone()))
			.bind(("content_type", record.content_type.clone()))
			.bind(("size", record.size as i64))
			.bind(("creation_time", record.creation_time.clone()))
			.bind(("modification_time", record.modification_time.clone()))
			.bind(("thumbnail", thumbnail))
			.bind(("is_duplicate", record.is_duplicate))
			.bind(("original_path", record.original_path.clone()))
			.bind(("batch", record.batch.clone()))
			.bind(("recorded_at", iso_utc(Utc::now())))
			.await
			.map_err(db_err)?
			.check()
			.map_err(db_err)?;

		let rows: Vec<IdRow> = response.take(0).map_err(db_err)?;
		let id = rows
			.first()
			.map(|row| rid_string(&row.id))
			.ok_or(StoreError::MissingId("file_record"))?;
		debug!(%id, filepath = %record.filepath, duplicate = record.is_duplicate, "file record inserted");
		Ok(id)
	}

	/// Append an event with a fresh id and the current UTC time.
	pub async fn append_event(&self, kind: EventKind, file_path: &str, message: &str) -> Result<String, StoreError> {
		let mut response = self
			.db
			.query(
				"CREATE event_record CONTENT {
                    event_type: $kind,
                    file_path: $file_path,
                    message: $message,
                    recorded_at: $recorded_at,
                } RETURN id",
			)
			.bind(("kind", kind.as_str().to_string()))
			.bind(("file_path", file_path.to_string()))
			.bind(("message", message.to_string()))
			.bind(("recorded_at", iso_utc(Utc::now())))
			.await
			.map_err(db_err)?
			.check()
			.map_err(db_err)?;

		let rows: Vec<IdRow> = response.take(0).map_err(db_err)?;
		rows.first()
			.map(|row| rid_string(&row.id))
			.ok_or(StoreError::MissingId("event_record"))
	}

	pub async fn files_in_batch(&self, batch: &str) -> Result<Vec<FileRecord>, StoreError> {
		let mut response = self
			.db
			.query(format!(
				"SELECT {FILE_FIELDS} FROM file_record WHERE batch = $batch ORDER BY recorded_at ASC"
			))
			.bind(("batch", batch.to_string()))
			.await
			.map_err(db_err)?;

		let rows: Vec<FileRow> = response.take(0).map_err(db_err)?;
		rows.into_iter().map(FileRecord::try_from).collect()
	}

	/// Case-insensitive substring search over file records, oldest first.
	pub async fn search_files(&self, filter: &FileFilter) -> Result<Vec<FileRecord>, StoreError> {
		let mut clauses = Vec::new();
		if filter.filename.is_some() {
			clauses.push("string::contains(string::lowercase(filename), $filename)");
		}
		if filter.filepath.is_some() {
			clauses.push("string::contains(string::lowercase(filepath), $filepath)");
		}
		if filter.content_type.is_some() {
			clauses.push("string::contains(string::lowercase(content_type ?? ''), $content_type)");
		}
		if filter.batch.is_some() {
			clauses.push("batch = $batch");
		}
		if filter.duplicates.is_some() {
			clauses.push("is_duplicate = $is_duplicate");
		}

		let mut sql = format!("SELECT {FILE_FIELDS} FROM file_record");
		if !clauses.is_empty() {
			sql.push_str(" WHERE ");
			sql.push_str(&clauses.join(" AND "));
		}
		sql.push_str(" ORDER BY recorded_at ASC");
		if filter.limit.is_some() {
			sql.push_str(" LIMIT $limit");
		}

		let mut query = self.db.query(sql);
		if let Some(filename) = &filter.filename {
			query = query.bind(("filename", filename.to_lowercase()));
		}
		if let Some(filepath) = &filter.filepath {
			query = query.bind(("filepath", filepath.to_lowercase()));
		}
		if let Some(content_type) = &filter.content_type {
			query = query.bind(("content_type", content_type.to_lowercase()));
		}
		if let Some(batch) = &filter.batch {
			query = query.bind(("batch", batch.clone()));
		}
		if let Some(duplicates) = filter.duplicates {
			query = query.bind(("is_duplicate", duplicates));
		}
		if let Some(limit) = filter.limit {
			query = query.bind(("limit", limit as i64));
		}

		let mut response = query.await.map_err(db_err)?;
		let rows: Vec<FileRow> = response.take(0).map_err(db_err)?;
		rows.into_iter().map(FileRecord::try_from).collect()
	}

	pub async fn count_files(&self) -> Result<u64, StoreError> {
		let mut response = self
			.db
			.query("SELECT count() AS count FROM file_record GROUP ALL")
			.await
			.map_err(db_err)?;
		let rows: Vec<CountRow> = response.take(0).map_err(db_err)?;
		Ok(rows.first().map(|r| r.count.max(0) as u64).unwrap_or(0))
	}

	/// Newest events first.
	pub async fn recent_events(&self, limit: usize) -> Result<Vec<EventRecord>, StoreError> {
		let mut response = self
			.db
			.query(
				"SELECT id, event_type, file_path, message, recorded_at FROM event_record
                 ORDER BY recorded_at DESC LIMIT $limit",
			)
			.bind(("limit", limit as i64))
			.await
			.map_err(db_err)?;
		let rows: Vec<EventRow> = response.take(0).map_err(db_err)?;
		Ok(rows.into_iter().map(EventRecord::from).collect())
	}

	pub async fn events_for_path(&self, file_path: &str) -> Result<Vec<EventRecord>, StoreError> {
		let mut response = self
			.db
			.query(
				"SELECT id, event_type, file_path, message, recorded_at FROM event_record
                 WHERE file_path = $file_path ORDER BY recorded_at ASC",
			)
			.bind(("file_path", file_path.to_string()))
			.await
			.map_err(db_err)?;
		let rows: Vec<EventRow> = response.take(0).map_err(db_err)?;
		Ok(rows.into_iter().map(EventRecord::from).collect())
	}
}

const SCHEMA_V1: &str = "
    DEFINE TABLE OVERWRITE file_record SCHEMAFULL;
    DEFINE FIELD OVERWRITE filename ON file_record TYPE string;
    DEFINE FIELD OVERWRITE filepath ON file_record TYPE string;
    DEFINE FIELD OVERWRITE content_type ON file_record TYPE option<string>;
    DEFINE FIELD OVERWRITE size ON file_record TYPE int;
    DEFINE FIELD OVERWRITE creation_time ON file_record TYPE string;
    DEFINE FIELD OVERWRITE modification_time ON file_record TYPE string;
    DEFINE FIELD OVERWRITE thumbnail ON file_record TYPE option<string>;
    DEFINE FIELD OVERWRITE is_duplicate ON file_record TYPE bool;
    DEFINE FIELD OVERWRITE original_path ON file_record TYPE string;
    DEFINE FIELD OVERWRITE batch ON file_record TYPE string;
    DEFINE FIELD OVERWRITE recorded_at ON file_record TYPE string;
    DEFINE INDEX OVERWRITE idx_identity ON file_record FIELDS filename, size, creation_time, modification_time;
    DEFINE INDEX OVERWRITE idx_batch ON file_record FIELDS batch;

    DEFINE TABLE OVERWRITE event_record SCHEMAFULL;
    DEFINE FIELD OVERWRITE event_type ON event_record TYPE string;
    DEFINE FIELD OVERWRITE file_path ON event_record TYPE string;
    DEFINE FIELD OVERWRITE message ON event_record TYPE string;
    DEFINE FIELD OVERWRITE recorded_at ON event_record TYPE string;
    DEFINE INDEX OVERWRITE idx_event_path ON event_record FIELDS file_path;
";
