//! The sheet-iteration contract.
//!
//! A source lists its sheets once and reads each sheet in two phases: the
//! standardized header, then the data rows aligned to that header. Every
//! read re-opens the underlying data, so a sheet can be read any number of
//! times.

use std::path::Path;

use ace_standards::standardize_variable;
use tracing::debug;

use crate::csv_folder::CsvFolderSource;
use crate::error::{IngestError, Result};
use crate::workbook::{WorkbookSource, is_workbook_path};

/// Sheet name prefix marking documentation-only sheets.
pub const DEFAULT_DOC_PREFIX: &str = "DOC_";

/// Options shared by every sheet source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Sheets whose name starts with this prefix (ASCII case-insensitive)
    /// are never listed. Empty disables the filter.
    pub doc_prefix: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            doc_prefix: DEFAULT_DOC_PREFIX.to_string(),
        }
    }
}

impl IngestOptions {
    pub fn is_documentation(&self, sheet_name: &str) -> bool {
        if self.doc_prefix.is_empty() {
            return false;
        }
        sheet_name
            .get(..self.doc_prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.doc_prefix))
    }
}

/// Identity of one listed sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// Stable position of the sheet in its source.
    pub id: usize,
    pub name: String,
}

/// Lazily produced data rows, each aligned to the sheet's header.
pub type Rows<'a> = Box<dyn Iterator<Item = Result<Vec<String>>> + 'a>;

/// A collection of flat tables readable by header and rows.
pub trait SheetSource {
    /// Listed sheets in source order, documentation sheets excluded.
    fn sheets(&self) -> &[SheetInfo];

    /// Standardized variable names of the sheet's kept columns.
    fn read_header(&self, sheet: usize) -> Result<Vec<String>>;

    /// Data rows of the sheet. Date columns are rendered `YYYY-MM-DD`.
    fn read_rows(&self, sheet: usize) -> Result<Rows<'_>>;

    fn sheet(&self, id: usize) -> Result<&SheetInfo> {
        self.sheets()
            .iter()
            .find(|sheet| sheet.id == id)
            .ok_or(IngestError::UnknownSheet { id })
    }
}

/// Which raw columns of a sheet are kept, and under which variable name.
///
/// Columns with a blank header or a header starting with `!` are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLayout {
    columns: Vec<(usize, String)>,
}

impl HeaderLayout {
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = raw
            .into_iter()
            .enumerate()
            .filter_map(|(position, header)| {
                let header = header.as_ref().trim();
                if header.is_empty() || header.starts_with('!') {
                    return None;
                }
                Some((position, standardize_variable(header)))
            })
            .collect();
        Self { columns }
    }

    pub fn variables(&self) -> Vec<String> {
        self.columns.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Aligns one raw row to the kept columns, rendering each cell for its
    /// variable. Missing trailing cells are empty; wholly empty rows yield `None`.
    pub fn align<T>(&self, row: &[T], render: impl Fn(&T, &str) -> String) -> Option<Vec<String>> {
        let values: Vec<String> = self
            .columns
            .iter()
            .map(|(position, variable)| {
                row.get(*position)
                    .map(|cell| render(cell, variable))
                    .unwrap_or_default()
            })
            .collect();
        if values.iter().all(String::is_empty) {
            None
        } else {
            Some(values)
        }
    }
}

/// Opens a sheet source for `path`: a directory of CSV files or a spreadsheet workbook.
pub fn open_source(path: &Path, options: &IngestOptions) -> Result<Box<dyn SheetSource>> {
    if !path.exists() {
        return Err(IngestError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        debug!(path = %path.display(), "opening CSV folder");
        return Ok(Box::new(CsvFolderSource::open(path, options)?));
    }
    if is_workbook_path(path) {
        debug!(path = %path.display(), "opening workbook");
        return Ok(Box::new(WorkbookSource::open(path, options)?));
    }
    Err(IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}
