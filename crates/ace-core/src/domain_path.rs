//! Domain path resolution: which category a sheet's payload belongs to.

use std::fmt;

use ace_standards::{DomainLookup, is_date_variable, is_root_field};
use tracing::{debug, trace, warn};

use crate::node::SheetNode;

/// Outcome of resolving a node's domain path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    Resolved(String),
    /// No variable voted for a category.
    Undetermined,
    /// Variables voted for more than one category.
    Ambiguous(Vec<String>),
}

impl PathResolution {
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::Undetermined | Self::Ambiguous(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl fmt::Display for PathResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(path) => f.write_str(path),
            Self::Undetermined => f.write_str("undetermined"),
            Self::Ambiguous(paths) => write!(f, "ambiguous ({})", paths.join(", ")),
        }
    }
}

/// Resolves nodes against an injected lookup table.
#[derive(Debug, Clone, Copy)]
pub struct DomainPathResolver<'a> {
    lookup: &'a DomainLookup,
}

impl<'a> DomainPathResolver<'a> {
    pub fn new(lookup: &'a DomainLookup) -> Self {
        Self { lookup }
    }

    /// Distinct categories voted for by the node's payload variables, in column order.
    pub fn candidates(&self, node: &SheetNode) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        for variable in node.variables() {
            if is_root_field(variable) && node.root_field() != Some(variable.as_str()) {
                continue;
            }
            if node.link_chain().contains(variable) {
                continue;
            }
            if node.is_reference() && node.index_key().is_some_and(|key| key.contains(variable)) {
                continue;
            }
            if is_date_variable(variable) {
                continue;
            }
            let Some(path) = self.lookup.resolve(variable) else {
                trace!(sheet = %node.name(), variable = %variable, "variable not in lookup");
                continue;
            };
            if !candidates.iter().any(|known| known == path) {
                trace!(sheet = %node.name(), variable = %variable, path, "category vote");
                candidates.push(path.to_string());
            }
        }
        candidates
    }

    /// Resolves the node once; later calls return the memoized outcome.
    pub fn resolve<'n>(&self, node: &'n SheetNode) -> &'n PathResolution {
        node.domain_path.get_or_init(|| {
            let mut candidates = self.candidates(node);
            let resolution = match candidates.len() {
                0 => PathResolution::Undetermined,
                1 => PathResolution::Resolved(candidates.remove(0)),
                _ => PathResolution::Ambiguous(candidates),
            };
            if resolution.is_resolved() {
                debug!(sheet = %node.name(), path = %resolution, "domain path resolved");
            } else {
                warn!(sheet = %node.name(), path = %resolution, "domain path not resolved");
            }
            resolution
        })
    }
}
