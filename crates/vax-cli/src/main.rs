//! Vaccination pipeline CLI.

use clap::Parser;
use std::io::IsTerminal;

mod cli;
mod commands;
mod summary;

use vax_cli::logging::{LogConfig, LogFormat, init_logging};

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run, run_ingest, run_locations};
use crate::summary::{print_ingest_summary, print_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Run(args) => match run(&args) {
            Ok(result) => {
                print_summary(&result);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Ingest(args) => match run_ingest(&args) {
            Ok(report) => {
                print_ingest_summary(&report);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Locations(args) => match run_locations(&args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level: cli.verbosity.tracing_level_filter(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: match cli.color.color {
            clap::ColorChoice::Always => true,
            clap::ColorChoice::Never => false,
            clap::ColorChoice::Auto => cli.log_file.is_none() && std::io::stderr().is_terminal(),
        },
        log_file: cli.log_file.clone(),
    }
}
