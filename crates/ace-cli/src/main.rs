//! ACE translator CLI.

use std::io::{self, IsTerminal};

use ace_cli::commands::{run_inspect, run_translate};
use ace_cli::logging::{LogConfig, LogFormat, init_logging};
use ace_cli::types::TranslateRequest;
use ace_core::TranslateOptions;
use ace_output::{OutputFormat, OutputOptions};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputFormatArg, TranslateArgs};
use crate::summary::{print_inspection, print_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Translate(args) => match run_translate(&translate_request(args)) {
            Ok(result) => {
                print_summary(&result);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Inspect(args) => match run_inspect(&args.input, args.lookup.as_deref()) {
            Ok(result) => {
                print_inspection(&result);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn translate_request(args: TranslateArgs) -> TranslateRequest {
    TranslateRequest {
        input: args.input,
        output: args.output,
        lookup: args.lookup,
        output_options: OutputOptions {
            format: args.format.map(|format| match format {
                OutputFormatArg::Json => OutputFormat::Json,
                OutputFormatArg::Aceb => OutputFormat::Aceb,
            }),
            pretty: args.pretty,
        },
        translate_options: TranslateOptions {
            name_separator: args.name_separator,
            link_experiments: !args.no_link,
        },
        dry_run: args.dry_run,
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level_filter(level_filter)
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()))
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_ansi(ansi)
}
