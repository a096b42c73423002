//! ACE dataset output.
//!
//! A translated [`ace_model::Dataset`] is written as one JSON document with
//! `experiments`, `weathers` and `soils` lists:
//!
//! - **JSON**: plain or pretty-printed
//! - **ACEB**: the same JSON, gzip-compressed
//!
//! Every object carries a content `id`; experiments point at their linked
//! weather station and soil profile through `weather_ref` and `soil_ref`.

mod common;
mod document;
mod writer;

pub use common::ensure_parent_dir;
pub use document::{DatasetDocument, ExperimentEntry, Identified, build_document};
pub use writer::{ACEB_EXTENSION, OutputFormat, OutputOptions, render_dataset, write_dataset};
