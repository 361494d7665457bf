use std::{
	path::{Component, Path},
	time::SystemTime,
};

use chrono::{DateTime, SecondsFormat, Utc};

/// Human readable size with two decimals, binary units.
pub fn format_size(bytes: u64) -> String {
	const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
	let mut size = bytes as f64;
	for unit in &UNITS[..UNITS.len() - 1] {
		if size < 1024.0 {
			return format!("{size:.2} {unit}");
		}
		size /= 1024.0;
	}
	format!("{size:.2} {}", UNITS[UNITS.len() - 1])
}

/// RFC 3339 in UTC with fixed microsecond precision, so that string order
/// matches chronological order.
pub fn iso_utc(time: DateTime<Utc>) -> String {
	time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn iso_from_system(time: SystemTime) -> String {
	iso_utc(DateTime::<Utc>::from(time))
}

/// Batch identifier for a run started at `started`.
pub fn batch_id(started: DateTime<Utc>) -> String {
	started.format("%Y%m%d%H%M%S").to_string()
}

/// Forward-slash form of a relative path, independent of the host separator.
pub fn to_slash(relative: &Path) -> String {
	relative
		.components()
		.filter_map(|c| match c {
			Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
			_ => None,
		})
		.collect::<Vec<_>>()
		.join("/")
}

/// MIME type guessed from the file name, `None` when the extension is unknown.
pub fn guess_content_type(path: &Path) -> Option<String> {
	mime_guess::from_path(path).first().map(|m| m.essence_str().to_string())
}

/// Image and video files get a thumbnail.
pub fn is_visual_media(content_type: &str) -> bool {
	content_type.starts_with("image/") || content_type.starts_with("video/")
}
