//! Key discovery: which leading columns of each sheet form its key, and
//! whether the sheet uniquely defines that key.
//!
//! A variable shared by more than one sheet is a *duplicate*; a sheet's index
//! columns are its longest leading run of duplicates. The first sheet whose
//! index tuples are all distinct defines the key; a later sheet with the same
//! key inherits it, and a sheet with a repeated tuple is downgraded to a
//! detail sheet.

use std::collections::{HashMap, HashSet};
use std::fmt;

use ace_ingest::SheetSource;
use ace_standards::is_root_field;
use tracing::{debug, info, trace};

use crate::error::Result;
use crate::node::{Key, SheetNode};

/// Literal variable excluded from the duplicate census.
const GENERIC_DATE: &str = "date";
/// Variables containing this fragment are excluded from the census.
const TIME_FRAGMENT: &str = "time";

/// Which variables occur in more than one sheet.
#[derive(Debug, Clone, Default)]
pub struct VariableCensus {
    /// Duplicates in the order they were first seen twice.
    duplicates: Vec<String>,
    sheet_counts: HashMap<String, usize>,
}

impl VariableCensus {
    pub fn from_nodes(nodes: &[SheetNode]) -> Self {
        let mut census = Self::default();
        for node in nodes {
            let mut seen = HashSet::new();
            for variable in node.variables() {
                if variable == GENERIC_DATE || variable.contains(TIME_FRAGMENT) {
                    continue;
                }
                if !seen.insert(variable.as_str()) {
                    continue;
                }
                let count = census.sheet_counts.entry(variable.clone()).or_insert(0);
                *count += 1;
                if *count == 2 {
                    census.duplicates.push(variable.clone());
                }
            }
        }
        census
    }

    pub fn is_duplicate(&self, variable: &str) -> bool {
        self.sheet_counts.get(variable).is_some_and(|count| *count > 1)
    }

    /// Whether the variable occurs in exactly one sheet.
    pub fn is_unique(&self, variable: &str) -> bool {
        self.sheet_counts.get(variable) == Some(&1)
    }

    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Length of the leading run of duplicate variables.
    pub fn index_columns(&self, variables: &[String]) -> usize {
        variables
            .iter()
            .take_while(|variable| self.is_duplicate(variable))
            .count()
    }
}

/// How discovery settled a sheet's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// All index tuples distinct: the sheet defines its key.
    Defines,
    /// The key was already defined by an earlier sheet.
    AlreadyDefined,
    /// An index tuple repeats: the sheet only indexes its key.
    Downgraded,
    /// Defined after the scan, as the only candidate for an otherwise undefined variable.
    Promoted,
    /// No index columns.
    NoKey,
}

impl fmt::Display for KeyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Defines => "defines",
            Self::AlreadyDefined => "already defined",
            Self::Downgraded => "downgraded",
            Self::Promoted => "promoted",
            Self::NoKey => "no key",
        };
        f.write_str(label)
    }
}

/// Discovery result for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub sheet: String,
    pub index_columns: usize,
    pub defined_key: Option<Key>,
    pub index_key: Option<Key>,
    pub root_field: Option<String>,
    pub outcome: KeyOutcome,
}

/// Per-sheet discovery results, in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub entries: Vec<KeyEntry>,
}

impl DiscoveryReport {
    pub fn entry(&self, sheet: &str) -> Option<&KeyEntry> {
        self.entries.iter().find(|entry| entry.sheet == sheet)
    }

    pub fn count(&self, outcome: KeyOutcome) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == outcome)
            .count()
    }
}

/// Key strings registered by defining sheets: each full key and its last component.
#[derive(Debug, Default)]
struct Registry {
    keys: HashSet<String>,
}

impl Registry {
    fn register(&mut self, key: &Key) {
        self.keys.insert(key.to_string());
        if let Some(last) = key.last() {
            self.keys.insert(last.to_string());
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

enum Scan {
    Unique,
    AlreadyDefined,
    Repeated,
}

/// Runs key discovery over every node, filling in defined keys, index keys
/// and root fields. Nodes are processed in order; order matters.
pub fn discover_keys(source: &dyn SheetSource, nodes: &mut [SheetNode]) -> Result<DiscoveryReport> {
    let census = VariableCensus::from_nodes(nodes);
    debug!(duplicates = ?census.duplicates(), "variable census");

    // A root field held by exactly one sheet roots that sheet.
    for node in nodes.iter_mut() {
        let unique_root = node
            .variables()
            .iter()
            .rev()
            .find(|variable| census.is_unique(variable) && is_root_field(variable))
            .cloned();
        if let Some(field) = unique_root {
            debug!(sheet = %node.name(), root = %field, "root field unique to sheet");
            node.set_root_field(field);
        }
    }

    let mut registry = Registry::default();
    let mut outcomes = Vec::with_capacity(nodes.len());
    for node in nodes.iter_mut() {
        let index_columns = census.index_columns(node.variables());
        if index_columns == 0 {
            debug!(sheet = %node.name(), "no index columns");
            outcomes.push((index_columns, KeyOutcome::NoKey));
            continue;
        }
        let candidate = Key::new(node.variables()[..index_columns].iter().cloned());
        let outcome = match scan_rows(source, node, &candidate, index_columns, &registry)? {
            Scan::Unique => {
                node.define(candidate.clone());
                registry.register(&candidate);
                if let Some(field) = candidate.single().filter(|field| is_root_field(field)) {
                    node.set_root_field(field);
                }
                KeyOutcome::Defines
            }
            Scan::AlreadyDefined => KeyOutcome::AlreadyDefined,
            Scan::Repeated => KeyOutcome::Downgraded,
        };
        info!(sheet = %node.name(), key = %candidate, %outcome, "key discovered");
        node.set_index_key(candidate);
        outcomes.push((index_columns, outcome));
    }

    promote_keys(&census, nodes, &mut registry, &mut outcomes);

    let entries = nodes
        .iter()
        .zip(outcomes)
        .map(|(node, (index_columns, outcome))| KeyEntry {
            sheet: node.name().to_string(),
            index_columns,
            defined_key: node.defined_key().cloned(),
            index_key: node.index_key().cloned(),
            root_field: node.root_field().map(str::to_string),
            outcome,
        })
        .collect();
    Ok(DiscoveryReport { entries })
}

fn scan_rows(
    source: &dyn SheetSource,
    node: &SheetNode,
    candidate: &Key,
    index_columns: usize,
    registry: &Registry,
) -> Result<Scan> {
    let already_defined = registry.contains(&candidate.to_string());
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    for row in source.read_rows(node.sheet())? {
        let row = row?;
        if already_defined {
            return Ok(Scan::AlreadyDefined);
        }
        let tuple: Vec<String> = row.into_iter().take(index_columns).collect();
        if !seen.insert(tuple) {
            trace!(sheet = %node.name(), "repeated index tuple");
            return Ok(Scan::Repeated);
        }
    }
    Ok(Scan::Unique)
}

/// Offers every still-undefined duplicate variable to the first non-defining
/// sheet whose index key ends in it.
fn promote_keys(
    census: &VariableCensus,
    nodes: &mut [SheetNode],
    registry: &mut Registry,
    outcomes: &mut [(usize, KeyOutcome)],
) {
    for variable in census.duplicates() {
        if registry.contains(variable) {
            continue;
        }
        let candidate = nodes.iter().position(|node| {
            !node.defines() && node.index_key().and_then(Key::last) == Some(variable.as_str())
        });
        let Some(position) = candidate else {
            continue;
        };
        let node = &mut nodes[position];
        let key = Key::new([variable.clone()]);
        node.define(key.clone());
        registry.register(&key);
        if is_root_field(variable) {
            node.set_root_field(variable.clone());
        }
        outcomes[position].1 = KeyOutcome::Promoted;
        info!(sheet = %node.name(), key = %key, "key promoted");
    }
}
