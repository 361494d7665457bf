use std::path::PathBuf;

use archivist_core::Codec;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "archivist", version, about = "Compress a directory tree into an indexed, deduplicated archive")]
pub struct Cli {
	/// TOML settings file; command-line flags win over its values.
	#[arg(long, global = true, env = "ARCHIVIST_CONFIG")]
	pub config: Option<PathBuf>,

	/// Metadata database location.
	#[arg(long, global = true, env = "DB_PATH")]
	pub db_path: Option<PathBuf>,

	/// Also write logs to <DIR>/archivist.log.
	#[arg(long, global = true, env = "ARCHIVIST_LOG_DIR")]
	pub log_dir: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Archive the source directory into the destination directory
	Run(RunArgs),
	/// Query archived file records
	Search(SearchArgs),
	/// Show the most recent logged errors
	Events(EventsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
	#[arg(long, env = "SOURCE_DIRECTORY")]
	pub source: Option<PathBuf>,

	#[arg(long, env = "DESTINATION_DIRECTORY")]
	pub dest: Option<PathBuf>,

	/// 0 (fastest) to 9 (smallest).
	#[arg(long, env = "COMPRESSION_LEVEL", value_parser = clap::value_parser!(u8).range(0..=9))]
	pub level: Option<u8>,

	#[arg(long, value_enum)]
	pub codec: Option<CodecArg>,

	#[arg(long, env = "AZURE_CONTAINER")]
	pub azure_container: Option<String>,

	#[arg(long, env = "AZURE_CONNECTION_STRING", hide_env_values = true)]
	pub azure_connection_string: Option<String>,

	/// Keep the local artifacts after a remote upload.
	#[arg(long)]
	pub keep_local: bool,

	#[arg(long)]
	pub no_progress: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
	/// Substring of the file name
	#[arg(long)]
	pub filename: Option<String>,

	/// Substring of the artifact path
	#[arg(long)]
	pub filepath: Option<String>,

	/// Substring of the content type, e.g. `image`
	#[arg(long)]
	pub content_type: Option<String>,

	#[arg(long)]
	pub batch: Option<String>,

	/// Only duplicates (`true`) or only stored artifacts (`false`)
	#[arg(long)]
	pub duplicates: Option<bool>,

	#[arg(long, default_value_t = 50)]
	pub limit: usize,

	#[arg(long)]
	pub json: bool,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
	#[arg(long, default_value_t = 20)]
	pub limit: usize,

	/// Only events for this path
	#[arg(long)]
	pub path: Option<String>,

	#[arg(long)]
	pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
	#[value(name = "7z")]
	SevenZip,
	Zstd,
}

impl From<CodecArg> for Codec {
	fn from(arg: CodecArg) -> Self {
		match arg {
			CodecArg::SevenZip => Codec::SevenZip,
			CodecArg::Zstd => Codec::Zstd,
		}
	}
}
