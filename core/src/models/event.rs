use std::fmt;

use serde::Serialize;

/// Kinds of recoverable failure written to the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
	ProcessingError,
	UploadError,
}

impl EventKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			EventKind::ProcessingError => "Error processing file",
			EventKind::UploadError => "Error uploading file to Azure",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Append-only log entry. Never updated once written.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventRecord {
	pub id: String,
	pub event_type: String,
	pub file_path: String,
	pub message: String,
	pub timestamp: String,
}
