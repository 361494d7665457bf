mod args;
mod report;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archivist_core::{open_store, Archiver, FileFilter, MetadataStore, NoProgress};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
	args::{Cli, Command, EventsArgs, RunArgs, SearchArgs},
	report::BarProgress,
	settings::FileSettings,
};

fn init_logging(log_dir: Option<&Path>) -> Result<()> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	let file_layer = match log_dir {
		Some(dir) => {
			std::fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;
			let file_appender = tracing_appender::rolling::never(dir, "archivist.log");
			Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_appender))
		}
		None => None,
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
		.with(file_layer)
		.init();
	Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.log_dir.as_deref())?;

	let file = FileSettings::load(cli.config.as_deref())?;
	let db_path = settings::resolve_db_path(cli.db_path.as_deref(), &file);

	match cli.command {
		Command::Run(args) => run(args, db_path, file).await,
		Command::Search(args) => search(args, &db_path).await,
		Command::Events(args) => events(args, &db_path).await,
	}
}

async fn run(args: RunArgs, db_path: PathBuf, file: FileSettings) -> Result<()> {
	let config = settings::archive_config(&args, db_path, file)?;
	let store = open_store(&config).await?;
	let archiver = Archiver::new(&config, &store)?;

	let summary = if args.no_progress {
		archiver.run(&NoProgress).await?
	} else {
		let progress = BarProgress::new();
		let result = archiver.run(&progress).await;
		progress.finish();
		result?
	};

	info!(batch = %summary.batch, "run complete");
	report::print_summary(&summary);
	Ok(())
}

async fn search(args: SearchArgs, db_path: &Path) -> Result<()> {
	let store = MetadataStore::open(db_path).await?;
	let filter = FileFilter {
		filename: args.filename,
		filepath: args.filepath,
		content_type: args.content_type,
		batch: args.batch,
		duplicates: args.duplicates,
		limit: Some(args.limit),
	};
	let records = store.search_files(&filter).await?;

	if args.json {
		println!("{}", serde_json::to_string_pretty(&records)?);
	} else {
		report::print_files(&records);
	}
	Ok(())
}

async fn events(args: EventsArgs, db_path: &Path) -> Result<()> {
	let store = MetadataStore::open(db_path).await?;
	let events = match &args.path {
		Some(path) => store.events_for_path(path).await?,
		None => store.recent_events(args.limit).await?,
	};

	if args.json {
		println!("{}", serde_json::to_string_pretty(&events)?);
	} else {
		report::print_events(&events);
	}
	Ok(())
}
