//! Sheet sources for ACE translation.
//!
//! A sheet source exposes a workbook-like collection of flat tables: the
//! list of sheets, each sheet's standardized header, and its data rows
//! aligned to that header with date columns rendered as `YYYY-MM-DD`.

pub mod cell;
pub mod csv_folder;
pub mod error;
pub mod memory;
pub mod source;
pub mod workbook;

pub use csv_folder::{CsvFolderSource, list_csv_files};
pub use error::{IngestError, Result};
pub use memory::MemorySheetSource;
pub use source::{
    DEFAULT_DOC_PREFIX, HeaderLayout, IngestOptions, Rows, SheetInfo, SheetSource, open_source,
};
pub use workbook::{WorkbookSource, is_workbook_path};
