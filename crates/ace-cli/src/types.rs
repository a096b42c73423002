use std::path::PathBuf;

use ace_core::{DiscoveryReport, TranslateOptions, TranslationReport};
use ace_output::{OutputFormat, OutputOptions};

/// Everything `translate` needs, independent of how it was parsed.
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Lookup table CSV replacing the default one.
    pub lookup: Option<PathBuf>,
    pub output_options: OutputOptions,
    pub translate_options: TranslateOptions,
    /// Translate and summarise without writing.
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct TranslateResult {
    pub input: PathBuf,
    /// Written file and its format; `None` on a dry run.
    pub written: Option<(PathBuf, OutputFormat)>,
    pub experiments: usize,
    pub weathers: usize,
    pub soils: usize,
    pub discovery: DiscoveryReport,
    pub report: TranslationReport,
}

#[derive(Debug)]
pub struct InspectResult {
    pub input: PathBuf,
    pub discovery: DiscoveryReport,
    /// Indented rendering of the sheet forest.
    pub forest: String,
    pub report: TranslationReport,
}
