//! In-memory sheets, for tests and for callers that already hold the tables.

use crate::cell::render_text;
use crate::error::{IngestError, Result};
use crate::source::{HeaderLayout, IngestOptions, Rows, SheetInfo, SheetSource};

#[derive(Debug, Clone)]
struct MemorySheet {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Sheets held as raw text; cells go through the same rendering as files.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetSource {
    options: IngestOptions,
    data: Vec<MemorySheet>,
    sheets: Vec<SheetInfo>,
}

impl MemorySheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: IngestOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Adds a sheet with a raw header row and raw data rows.
    pub fn add_sheet<H, R, C>(&mut self, name: &str, header: H, rows: R) -> usize
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let id = self.data.len();
        self.data.push(MemorySheet {
            header: header.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        });
        if !self.options.is_documentation(name) {
            self.sheets.push(SheetInfo {
                id,
                name: name.to_string(),
            });
        }
        id
    }

    /// Builder form of [`MemorySheetSource::add_sheet`].
    pub fn with_sheet<H, R, C>(mut self, name: &str, header: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.add_sheet(name, header, rows);
        self
    }

    fn data(&self, sheet: usize) -> Result<&MemorySheet> {
        self.sheet(sheet)?;
        self.data
            .get(sheet)
            .ok_or(IngestError::UnknownSheet { id: sheet })
    }
}

impl SheetSource for MemorySheetSource {
    fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    fn read_header(&self, sheet: usize) -> Result<Vec<String>> {
        let data = self.data(sheet)?;
        Ok(HeaderLayout::from_raw(&data.header).variables())
    }

    fn read_rows(&self, sheet: usize) -> Result<Rows<'_>> {
        let data = self.data(sheet)?;
        let layout = HeaderLayout::from_raw(&data.header);
        Ok(Box::new(data.rows.iter().filter_map(move |row| {
            layout
                .align(row, |cell, variable| render_text(cell, variable))
                .map(Ok)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sheets_hide_documentation_and_render_dates() {
        let source = MemorySheetSource::new()
            .with_sheet("DOC_Info", ["text"], [["about"]])
            .with_sheet(
                "Planting",
                ["PL_LEVEL", "PDATE", "!comment"],
                [["1", "36950", "skip"], ["", "", ""]],
            );

        assert_eq!(source.sheets().len(), 1);
        let planting = &source.sheets()[0];
        assert_eq!(planting.id, 1);
        assert_eq!(planting.name, "Planting");
        assert_eq!(
            source.read_header(planting.id).expect("header"),
            vec!["pl_level", "pdate"]
        );

        let rows: Vec<Vec<String>> = source
            .read_rows(planting.id)
            .expect("rows")
            .collect::<Result<_>>()
            .expect("decode");
        assert_eq!(rows, vec![vec!["1".to_string(), "2001-02-28".to_string()]]);

        assert!(matches!(
            source.read_header(0),
            Err(IngestError::UnknownSheet { id: 0 })
        ));
    }
}
