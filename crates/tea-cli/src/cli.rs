//! CLI argument definitions for the `tea` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tea_cli::commands::parse_param;
use tea_output::Format;

#[derive(Parser)]
#[command(
    name = "tea",
    version,
    about = "Tracked entity analytics queries and response contract checks",
    long_about = "Answer tracked entity queries against a local dataset and check \
                  query responses.\n\n\
                  Responses can be validated against the response contract, compared \
                  structurally and fingerprinted, all tolerant of the order of rows \
                  tied under the sort keys."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

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
    /// Run a tracked entity query against a dataset file.
    Query(QueryArgs),

    /// Check a JSON response against the response contract.
    Validate(ValidateArgs),

    /// Compare two JSON responses structurally.
    Diff(DiffArgs),

    /// Print the order-tolerant fingerprint of a JSON response.
    Fingerprint(FingerprintArgs),
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Dataset file with catalog metadata and tracked entities.
    #[arg(long = "dataset", value_name = "FILE")]
    pub dataset: PathBuf,

    /// Tracked entity type UID.
    #[arg(long = "type", value_name = "UID")]
    pub tracked_entity_type: String,

    /// Request parameter, repeatable and applied in order (e.g. dimension=w75KJ2mc4zz).
    #[arg(long = "param", short = 'p', value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Response rendering.
    #[arg(long = "format", default_value = "json", value_parser = parse_format)]
    pub format: Format,

    /// Query configuration file (TOML).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the response to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// JSON response file.
    #[arg(value_name = "RESPONSE")]
    pub response: PathBuf,

    /// Sort key the response was requested with, in order (asc:NAME or desc:NAME).
    #[arg(long = "sort", value_name = "KEY")]
    pub sort: Vec<String>,
}

#[derive(Parser)]
pub struct DiffArgs {
    #[arg(value_name = "EXPECTED")]
    pub expected: PathBuf,

    #[arg(value_name = "ACTUAL")]
    pub actual: PathBuf,

    /// Sort key both responses were requested with, in order.
    #[arg(long = "sort", value_name = "KEY")]
    pub sort: Vec<String>,
}

#[derive(Parser)]
pub struct FingerprintArgs {
    #[arg(value_name = "RESPONSE")]
    pub response: PathBuf,

    /// Sort key the response was requested with, in order.
    #[arg(long = "sort", value_name = "KEY")]
    pub sort: Vec<String>,
}

fn parse_format(value: &str) -> Result<Format, String> {
    value.parse()
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
