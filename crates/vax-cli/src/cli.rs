//! CLI argument definitions for the vaccination pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "vaxpipe",
    version,
    about = "Global vaccination data pipeline - consolidate, validate, aggregate, publish",
    long_about = "Consolidate per-location vaccination observations into the global dataset.\n\n\
                  Adapter output is merged into per-location series, validated against the\n\
                  data contract, aggregated into regional series, and enriched with daily\n\
                  and per-capita rates before export."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one batch cycle: validate, aggregate, derive, export.
    Run(RunArgs),

    /// Merge a file of adapter records into the persisted series.
    Ingest(IngestArgs),

    /// List persisted locations and their latest observation.
    Locations(LocationsArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory holding one CSV series file per location.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory with reference tables (locations, population, vaccines).
    #[arg(long = "reference-dir", value_name = "DIR")]
    pub reference_dir: PathBuf,

    /// Output directory for generated files (default: <DATA_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Treat this date as "today" (default: the current UTC date).
    #[arg(long = "as-of", value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Validate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct IngestArgs {
    /// JSON file with an array of adapter records.
    #[arg(value_name = "RECORDS_JSON")]
    pub records: PathBuf,

    /// Directory holding one CSV series file per location.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Batch mode: the records replace overlapping dates wholesale instead
    /// of passing through the one-at-a-time upsert rules.
    #[arg(long = "batch")]
    pub batch: bool,
}

#[derive(Parser)]
pub struct LocationsArgs {
    /// Directory holding one CSV series file per location.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
