//! Output formats and the dataset writer.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use ace_model::Dataset;
use anyhow::{Context, Result, anyhow};
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::common::ensure_parent_dir;
use crate::document::build_document;

/// File extension that selects the compressed format.
pub const ACEB_EXTENSION: &str = "aceb";

/// Serialized form of a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    /// Gzip-compressed JSON.
    Aceb,
}

impl OutputFormat {
    /// Format implied by a file extension: `.aceb` is compressed, anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(ACEB_EXTENSION) => Self::Aceb,
            _ => Self::Json,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Aceb => "aceb",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "aceb" => Ok(Self::Aceb),
            other => Err(anyhow!("unknown output format {other:?}")),
        }
    }
}

/// How a dataset is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Explicit format; when unset the output path's extension decides.
    pub format: Option<OutputFormat>,
    /// Indent the JSON.
    pub pretty: bool,
}

impl OutputOptions {
    pub fn format_for(&self, path: &Path) -> OutputFormat {
        self.format.unwrap_or_else(|| OutputFormat::from_path(path))
    }
}

/// Renders the dataset document into memory.
pub fn render_dataset(dataset: &Dataset, format: OutputFormat, pretty: bool) -> Result<Vec<u8>> {
    let document = build_document(dataset)?;
    let json = if pretty {
        serde_json::to_vec_pretty(&document)
    } else {
        serde_json::to_vec(&document)
    }
    .context("serialize dataset")?;
    debug!(bytes = json.len(), pretty, "dataset rendered");
    match format {
        OutputFormat::Json => Ok(json),
        OutputFormat::Aceb => gzip(&json),
    }
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).context("compress dataset")?;
    encoder.finish().context("finish gzip stream")
}

/// Writes the dataset to `path` and returns the format used.
///
/// The whole output is rendered before the file is created, so a failure
/// leaves no partial file behind.
pub fn write_dataset(dataset: &Dataset, path: &Path, options: &OutputOptions) -> Result<OutputFormat> {
    let format = options.format_for(path);
    let bytes = render_dataset(dataset, format, options.pretty)?;
    ensure_parent_dir(path)?;
    fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
    info!(
        path = %path.display(),
        %format,
        bytes = bytes.len(),
        experiments = dataset.experiments().len(),
        "dataset written"
    );
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension_unless_set() {
        assert_eq!(OutputFormat::from_path(Path::new("out/trial.aceb")), OutputFormat::Aceb);
        assert_eq!(OutputFormat::from_path(Path::new("trial.ACEB")), OutputFormat::Aceb);
        assert_eq!(OutputFormat::from_path(Path::new("trial.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("trial")), OutputFormat::Json);

        let forced = OutputOptions {
            format: Some(OutputFormat::Json),
            pretty: false,
        };
        assert_eq!(forced.format_for(Path::new("trial.aceb")), OutputFormat::Json);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("ACEB".parse::<OutputFormat>().expect("aceb"), OutputFormat::Aceb);
        assert_eq!(" json ".parse::<OutputFormat>().expect("json"), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
