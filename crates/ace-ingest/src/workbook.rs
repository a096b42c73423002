//! Spreadsheet workbooks (xlsx, xlsm, xlsb, xls, ods) through calamine.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ace_standards::is_date_variable;
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use tracing::{debug, trace};

use crate::cell::{format_number, iso_date_part, render_serial, render_text};
use crate::error::{IngestError, Result};
use crate::source::{HeaderLayout, IngestOptions, Rows, SheetInfo, SheetSource};

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// A workbook on disk. Sheet ids are positions in the workbook's sheet list.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
    sheets: Vec<SheetInfo>,
}

impl WorkbookSource {
    pub fn open(path: &Path, options: &IngestOptions) -> Result<Self> {
        let source = Self {
            path: path.to_path_buf(),
            sheets: Vec::new(),
        };
        let workbook = source.open_workbook()?;
        let sheets = workbook
            .sheet_names()
            .into_iter()
            .enumerate()
            .filter(|(_, name)| {
                let skip = options.is_documentation(name);
                if skip {
                    debug!(sheet = %name, "skipping documentation sheet");
                }
                !skip
            })
            .map(|(id, name)| SheetInfo { id, name })
            .collect();
        Ok(Self { sheets, ..source })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_workbook(&self) -> Result<Sheets<BufReader<File>>> {
        open_workbook_auto(&self.path).map_err(|e| IngestError::workbook(&self.path, e))
    }

    fn range(&self, sheet: usize) -> Result<Range<Data>> {
        let name = self.sheet(sheet)?.name.clone();
        let mut workbook = self.open_workbook()?;
        workbook
            .worksheet_range(&name)
            .map_err(|e| IngestError::workbook(&self.path, e))
    }
}

fn header_layout(range: &Range<Data>) -> HeaderLayout {
    match range.rows().next() {
        Some(header) => HeaderLayout::from_raw(header.iter().map(header_text)),
        None => HeaderLayout::default(),
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.clone(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

/// Renders one workbook cell for `variable`.
pub fn render_cell(cell: &Data, variable: &str) -> String {
    let date_column = is_date_variable(variable);
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => render_text(text, variable),
        Data::Int(value) if date_column => render_serial(*value as f64),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if date_column => render_serial(*value),
        Data::Float(value) => format_number(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => render_serial(value.as_f64()),
        Data::DateTimeIso(text) => iso_date_part(text).unwrap_or(text).to_string(),
        Data::DurationIso(text) => text.clone(),
        Data::Error(error) => {
            trace!(variable, ?error, "cell error rendered empty");
            String::new()
        }
    }
}

impl SheetSource for WorkbookSource {
    fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    fn read_header(&self, sheet: usize) -> Result<Vec<String>> {
        Ok(header_layout(&self.range(sheet)?).variables())
    }

    fn read_rows(&self, sheet: usize) -> Result<Rows<'_>> {
        let range = self.range(sheet)?;
        let layout = header_layout(&range);
        let rows: Vec<Vec<String>> = range
            .rows()
            .skip(1)
            .filter_map(|row| layout.align(row, render_cell))
            .collect();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_workbook_extensions() {
        assert!(is_workbook_path(Path::new("trial.xlsx")));
        assert!(is_workbook_path(Path::new("TRIAL.XLS")));
        assert!(is_workbook_path(Path::new("trial.ods")));
        assert!(!is_workbook_path(Path::new("trial.csv")));
        assert!(!is_workbook_path(Path::new("trial")));
    }

    #[test]
    fn renders_cells_by_column_kind() {
        assert_eq!(render_cell(&Data::Float(36950.0), "pdate"), "2001-02-28");
        assert_eq!(render_cell(&Data::Int(43831), "w_date"), "2020-01-01");
        assert_eq!(render_cell(&Data::Float(7.0), "plpop"), "7");
        assert_eq!(render_cell(&Data::Float(7.25), "plpop"), "7.25");
        assert_eq!(render_cell(&Data::String(" MAZ ".into()), "crid"), "MAZ");
        assert_eq!(
            render_cell(&Data::DateTimeIso("2001-06-03T00:00:00".into()), "idate"),
            "2001-06-03"
        );
        assert_eq!(render_cell(&Data::Empty, "crid"), "");
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let err = WorkbookSource::open(Path::new("/nonexistent/trial.xlsx"), &IngestOptions::default())
            .expect_err("missing workbook");
        assert!(matches!(err, IngestError::Workbook { .. }));
    }
}
