//! Tracked entity analytics CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tea_cli::commands::{
    QueryOutcome, parse_sort_keys, run_diff, run_fingerprint, run_query, run_validate,
};
use tea_cli::logging::{LogConfig, LogFormat, init_logging};
use tea_output::{render, write_response};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, DiffArgs, LogFormatArg, LogLevelArg, QueryArgs, ValidateArgs};
use crate::summary::{print_differences, print_report};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Query(args) => query(args),
        Command::Validate(args) => validate(args),
        Command::Diff(args) => diff(args),
        Command::Fingerprint(args) => parse_sort_keys(&args.sort)
            .and_then(|keys| run_fingerprint(&args.response, &keys))
            .map(|fingerprint| {
                println!("{fingerprint}");
                0
            }),
    };
    let exit_code = match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn query(args: &QueryArgs) -> Result<i32> {
    let outcome = run_query(
        &args.dataset,
        &args.tracked_entity_type,
        &args.params,
        args.config.as_deref(),
    )?;
    match outcome {
        QueryOutcome::Response(envelope) => {
            match &args.output {
                Some(path) => {
                    write_response(path, &envelope, args.format)?;
                    eprintln!("Wrote {} row(s) to {}", envelope.height, path.display());
                }
                None => println!("{}", render(&envelope, args.format)?),
            }
            Ok(0)
        }
        QueryOutcome::Rejected(error) => {
            println!("{}", serde_json::to_string_pretty(&error)?);
            Ok(1)
        }
    }
}

fn validate(args: &ValidateArgs) -> Result<i32> {
    let keys = parse_sort_keys(&args.sort)?;
    let report = run_validate(&args.response, &keys)?;
    print_report(&report);
    Ok(if report.has_errors() { 1 } else { 0 })
}

fn diff(args: &DiffArgs) -> Result<i32> {
    let keys = parse_sort_keys(&args.sort)?;
    let differences = run_diff(&args.expected, &args.actual, &keys)?;
    print_differences(&differences);
    Ok(if differences.is_empty() { 0 } else { 1 })
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
