//! Relationship inference and merge engine for ACE translation.
//!
//! Sheets of a workbook are treated as denormalized tables sharing key
//! columns. [`keys`] finds each sheet's key, [`graph`] arranges the sheets
//! into a forest of roots, children and references, [`domain_path`] assigns
//! each sheet a category, and the merge engine walks the forest to build
//! experiments, weather stations and soil profiles, which [`links`] then
//! connects.

pub mod domain_path;
pub mod error;
pub mod graph;
pub mod keys;
pub mod links;
pub mod merge;
pub mod node;
pub mod pipeline;
pub mod report;
mod translate;

pub use domain_path::{DomainPathResolver, PathResolution};
pub use error::{Result, TranslateError};
pub use graph::Forest;
pub use keys::{DiscoveryReport, KeyEntry, KeyOutcome, VariableCensus, discover_keys};
pub use links::link_experiments;
pub use merge::{DomainObject, reference_key};
pub use node::{Key, NodeId, SheetNode};
pub use pipeline::{Analysis, Translation, Translator};
pub use report::{Diagnostic, LinkSummary, TranslationReport};
pub use translate::{DEFAULT_NAME_SEPARATOR, TranslateOptions};
