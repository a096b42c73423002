#![deny(unsafe_code)]

//! Variable → category path lookup table.
//!
//! The table is a CSV with a `variable` and a `path` column (extra columns
//! are ignored). Variable names are standardized on load; an empty path is
//! the experiment-level `management` category.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::category::{normalize, standardize_variable};
use crate::error::StandardsError;
use crate::paths::{BUILTIN_ORIGIN, lookup_override};

const BUILTIN_TABLE: &str = include_str!("../data/variables.csv");

/// Read-only mapping from standardized variable name to category path.
#[derive(Debug, Clone, Default)]
pub struct DomainLookup {
    paths: HashMap<String, String>,
}

impl DomainLookup {
    /// Builds a table from `(variable, raw path)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let paths = entries
            .into_iter()
            .map(|(variable, path)| {
                (
                    standardize_variable(variable.as_ref()),
                    normalize(path.as_ref()),
                )
            })
            .collect();
        Self { paths }
    }

    /// Category path of a standardized variable name.
    pub fn resolve(&self, variable: &str) -> Option<&str> {
        self.paths.get(variable).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Parses a lookup table from CSV bytes; `origin` labels errors.
pub fn parse_lookup_csv(bytes: &[u8], origin: &Path) -> Result<DomainLookup, StandardsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| StandardsError::csv(origin, &e))?
        .clone();

    let missing = |column: &str| StandardsError::MissingColumn {
        path: origin.to_path_buf(),
        column: column.to_string(),
    };
    let idx_variable = header_index(&headers, "variable").ok_or_else(|| missing("variable"))?;
    let idx_path = header_index(&headers, "path").ok_or_else(|| missing("path"))?;

    let mut entries = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| StandardsError::csv(origin, &e))?;
        let Some(variable) = row.get(idx_variable).map(str::trim) else {
            continue;
        };
        if variable.is_empty() {
            continue;
        }
        let path = row.get(idx_path).unwrap_or("");
        entries.push((variable.to_string(), path.to_string()));
    }
    Ok(DomainLookup::from_entries(entries))
}

/// Loads a lookup table from a CSV file.
pub fn load_lookup_csv(path: &Path) -> Result<DomainLookup, StandardsError> {
    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
    parse_lookup_csv(&bytes, path)
}

/// The lookup table compiled into the crate.
pub fn builtin_lookup() -> Result<DomainLookup, StandardsError> {
    parse_lookup_csv(BUILTIN_TABLE.as_bytes(), Path::new(BUILTIN_ORIGIN))
}

/// Loads the default table: the `ACE_LOOKUP_PATH` file when set, else the built-in one.
pub fn load_default_lookup() -> Result<DomainLookup, StandardsError> {
    let lookup = match lookup_override() {
        Some(path) => load_lookup_csv(&path)?,
        None => builtin_lookup()?,
    };
    debug!(variables = lookup.len(), "lookup table loaded");
    Ok(lookup)
}
