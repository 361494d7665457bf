use std::time::Duration;

use archivist_core::{
	util::format_size, EventRecord, FileOutcome, FileRecord, ProcessedFile, Progress, RunSummary,
};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Terminal progress bar for the archive phase.
pub struct BarProgress {
	bar: ProgressBar,
}

impl BarProgress {
	pub fn new() -> Self {
		let bar = ProgressBar::new(0);
		bar.set_style(
			ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {wide_msg}")
				.unwrap_or_else(|_| ProgressStyle::default_bar()),
		);
		bar.enable_steady_tick(Duration::from_millis(120));
		Self { bar }
	}

	pub fn finish(&self) {
		self.bar.finish_and_clear();
	}
}

impl Progress for BarProgress {
	fn start(&self, total: u64) {
		self.bar.set_length(total);
	}

	fn advance(&self, file: &ProcessedFile) {
		let name = file
			.source
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_default();
		if let FileOutcome::Failed { reason } = &file.outcome {
			self.bar.println(format!("{} {name}: {reason}", style("failed").red()));
		}
		self.bar.set_message(name);
		self.bar.inc(1);
	}
}

pub fn print_summary(summary: &RunSummary) {
	let files = &summary.files;
	let seconds = summary.duration().num_milliseconds() as f64 / 1000.0;

	println!("{} batch {}", style("Archived").green().bold(), style(&summary.batch).cyan());
	println!("  duration     {seconds:.2}s");
	println!(
		"  size         {} -> {}{}",
		format_size(summary.original_bytes),
		format_size(summary.compressed_bytes),
		summary
			.compression_ratio()
			.map(|r| format!(" ({:.1}%)", r * 100.0))
			.unwrap_or_default()
	);
	println!("  archived     {}", files.archived);
	println!("  duplicates   {}", files.duplicates);
	println!("  thumbnails   {}", files.thumbnails);
	if files.skipped > 0 {
		println!("  skipped      {}", style(files.skipped).yellow());
	}
	if files.failed > 0 {
		println!("  failed       {}", style(files.failed).red());
	}

	if let Some(upload) = &summary.upload {
		println!(
			"  uploaded     {}{}",
			upload.uploaded,
			if upload.purged { ", local copy removed" } else { "" }
		);
		if upload.failed > 0 {
			println!("  upload fails {}", style(upload.failed).red());
		}
	}

	if summary.errors() > 0 {
		println!(
			"{} see `archivist events` for details",
			style(format!("{} error(s) logged;", summary.errors())).yellow()
		);
	}
}

pub fn print_files(records: &[FileRecord]) {
	if records.is_empty() {
		println!("{}", style("no matching files").dim());
		return;
	}
	for record in records {
		let id = record.id.as_deref().unwrap_or("-");
		let kind = if record.is_duplicate {
			style("dup").yellow()
		} else {
			style("   ").dim()
		};
		println!(
			"{} {kind} {:<32} {:<24} {:>12}  {}",
			style(id).dim(),
			record.filename,
			record.content_type.as_deref().unwrap_or("unknown"),
			format_size(record.size),
			record.filepath
		);
	}
	println!("{}", style(format!("{} record(s)", records.len())).dim());
}

pub fn print_events(events: &[EventRecord]) {
	if events.is_empty() {
		println!("{}", style("no events").dim());
		return;
	}
	for event in events {
		println!(
			"{} {} {}\n    {}",
			style(&event.timestamp).dim(),
			style(&event.event_type).red(),
			event.file_path,
			event.message
		);
	}
}
