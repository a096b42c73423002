//! A directory of CSV files read as one workbook: each file is a sheet.

use std::path::{Path, PathBuf};

use csv::StringRecordsIntoIter;
use tracing::debug;

use crate::cell::render_text;
use crate::error::{IngestError, Result};
use crate::source::{HeaderLayout, IngestOptions, Rows, SheetInfo, SheetSource};

/// Lists all CSV files in a directory, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// CSV files of one directory; the sheet name is the file stem.
#[derive(Debug, Clone)]
pub struct CsvFolderSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    sheets: Vec<SheetInfo>,
}

impl CsvFolderSource {
    pub fn open(dir: &Path, options: &IngestOptions) -> Result<Self> {
        let mut files = Vec::new();
        let mut sheets = Vec::new();
        for path in list_csv_files(dir)? {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            if options.is_documentation(&name) {
                debug!(sheet = %name, "skipping documentation sheet");
                continue;
            }
            sheets.push(SheetInfo {
                id: files.len(),
                name,
            });
            files.push(path);
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            files,
            sheets,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, sheet: usize) -> Result<&Path> {
        self.files
            .get(sheet)
            .map(PathBuf::as_path)
            .ok_or(IngestError::UnknownSheet { id: sheet })
    }

    /// Opens the file and splits off its header record.
    fn open_records(&self, sheet: usize) -> Result<(HeaderLayout, StringRecordsIntoIter<std::fs::File>)> {
        let path = self.file(sheet)?;
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| IngestError::csv(path, &e))?;
        let mut records = reader.into_records();
        let layout = match records.next() {
            Some(header) => {
                let header = header.map_err(|e| IngestError::csv(path, &e))?;
                HeaderLayout::from_raw(header.iter())
            }
            None => HeaderLayout::default(),
        };
        Ok((layout, records))
    }
}

impl SheetSource for CsvFolderSource {
    fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    fn read_header(&self, sheet: usize) -> Result<Vec<String>> {
        let (layout, _) = self.open_records(sheet)?;
        Ok(layout.variables())
    }

    fn read_rows(&self, sheet: usize) -> Result<Rows<'_>> {
        let path = self.file(sheet)?;
        let (layout, records) = self.open_records(sheet)?;
        Ok(Box::new(records.filter_map(move |record| match record {
            Ok(record) => {
                let cells: Vec<&str> = record.iter().collect();
                layout
                    .align(&cells, |cell, variable| render_text(cell, variable))
                    .map(Ok)
            }
            Err(e) => Some(Err(IngestError::csv(path, &e))),
        })))
    }
}
