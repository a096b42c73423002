//! CLI argument definitions for the ACE translator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ace-cli",
    version,
    about = "Translate field-trial workbooks into ACE datasets",
    long_about = "Translate field-trial workbooks into ACE datasets.\n\n\
                  Reads an .xlsx/.xls/.ods workbook or a folder of CSV files, infers\n\
                  how the sheets relate, and writes experiments, weather stations and\n\
                  soil profiles as JSON or gzip-compressed ACEB."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -vvv for trace, -q for errors only).
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
    /// Translate a workbook and write the dataset.
    Translate(TranslateArgs),

    /// Show discovered keys and the sheet forest without translating.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct TranslateArgs {
    /// Workbook file or folder of CSV files.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (.json, or .aceb for gzip-compressed output).
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Variable lookup table CSV (default: $ACE_LOOKUP_PATH or the built-in table).
    #[arg(long = "lookup", value_name = "CSV")]
    pub lookup: Option<PathBuf>,

    /// Output format (default: from the OUTPUT extension).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Indent the JSON output.
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Separator between experiment name and treatment number.
    #[arg(long = "name-separator", value_name = "SEP", default_value = "_")]
    pub name_separator: String,

    /// Skip linking experiments to weather stations and soil profiles.
    #[arg(long = "no-link")]
    pub no_link: bool,

    /// Translate and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Workbook file or folder of CSV files.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Variable lookup table CSV (default: $ACE_LOOKUP_PATH or the built-in table).
    #[arg(long = "lookup", value_name = "CSV")]
    pub lookup: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Json,
    Aceb,
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
