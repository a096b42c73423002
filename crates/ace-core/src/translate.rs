//! The translation and merge engine.
//!
//! Walks the forest depth-first from each root. A root's rows seed one
//! domain object each; every child sheet is joined against the pool left by
//! its previous sibling (or its parent) and either folds into the matched
//! objects (flat merge) or clones them once per matching row (expansion).
//! Reference sheets are decoded once per root and merged by join key.

use std::collections::{HashMap, HashSet};

use ace_ingest::SheetSource;
use ace_model::{Dataset, Experiment, Record, Soil, Weather};
use ace_standards::category::{self, MANAGEMENT, SOIL, WEATHER};
use tracing::{debug, error, info_span, trace, warn};

use crate::error::Result;
use crate::graph::Forest;
use crate::merge::{DomainObject, reference_key, without_key};
use crate::node::{NodeId, SheetNode};
use crate::report::{Diagnostic, TranslationReport};

/// Default separator between an experiment name and its treatment number.
pub const DEFAULT_NAME_SEPARATOR: &str = "_";

/// Options for the merge engine and the pipeline around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Joins experiment name and treatment number in expanded experiments.
    pub name_separator: String,
    /// Run the cross-link pass after translation.
    pub link_experiments: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            name_separator: DEFAULT_NAME_SEPARATOR.to_string(),
            link_experiments: true,
        }
    }
}

pub(crate) struct Engine<'a> {
    source: &'a dyn SheetSource,
    forest: &'a Forest,
    options: &'a TranslateOptions,
    report: TranslationReport,
    /// Reference rows of the current root, by reference node and join key.
    references: HashMap<(NodeId, String), Vec<Record>>,
    loaded: HashSet<NodeId>,
    misplaced: HashSet<NodeId>,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(
        source: &'a dyn SheetSource,
        forest: &'a Forest,
        options: &'a TranslateOptions,
        report: TranslationReport,
    ) -> Self {
        Self {
            source,
            forest,
            options,
            report,
            references: HashMap::new(),
            loaded: HashSet::new(),
            misplaced: HashSet::new(),
        }
    }

    /// Translates every typed root into the dataset.
    pub(crate) fn run(mut self) -> Result<(Dataset, TranslationReport)> {
        let forest = self.forest;
        let mut dataset = Dataset::new();
        for &root in forest.roots() {
            let node = forest.node(root);
            let span = info_span!("walk", root = %node.name());
            let _guard = span.enter();
            self.references.clear();
            self.loaded.clear();

            let Some(path) = node.domain_path() else {
                debug!("untyped root skipped");
                continue;
            };
            match category::front(path) {
                MANAGEMENT => {
                    for experiment in self.walk_root::<Experiment>(node)? {
                        dataset.add_experiment(experiment);
                    }
                }
                WEATHER => {
                    for weather in self.walk_root::<Weather>(node)? {
                        dataset.add_weather(weather);
                    }
                }
                SOIL => {
                    for soil in self.walk_root::<Soil>(node)? {
                        dataset.add_soil(soil);
                    }
                }
                _ => self.misplaced(node, path),
            }
        }
        Ok((dataset, self.report))
    }

    fn walk_root<T: DomainObject>(&mut self, node: &'a SheetNode) -> Result<Vec<T>> {
        let mut pool: Vec<T> = self.decode(node)?.into_iter().map(T::from_record).collect();
        debug!(sheet = %node.name(), objects = pool.len(), "root decoded");
        self.merge_references(node, pool.iter_mut().collect())?;
        for &child in node.children() {
            pool = self.walk_child(child, pool)?;
        }
        Ok(pool)
    }

    fn walk_child<T: DomainObject>(&mut self, id: NodeId, pool: Vec<T>) -> Result<Vec<T>> {
        let forest = self.forest;
        let node = forest.node(id);
        let Some(path) = node.domain_path() else {
            debug!(sheet = %node.name(), "untyped sheet skipped with its subtree");
            return Ok(pool);
        };
        if !T::accepts_child(path) {
            self.misplaced(node, path);
            return Ok(pool);
        }
        let parent_key = node
            .parent()
            .and_then(|parent| forest.node(parent).index_key());
        let (Some(parent_key), Some(own_key)) = (parent_key, node.index_key()) else {
            return Ok(pool);
        };
        let flat = !T::EXPANDS || own_key == parent_key;
        debug!(sheet = %node.name(), path, flat, "merging child");

        // Parent objects by join key; the first object wins a key.
        let mut objects: Vec<T> = Vec::with_capacity(pool.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for object in pool {
            let key = reference_key(parent_key, object.fields());
            if positions.contains_key(&key) {
                error!(sheet = %node.name(), key = %key, "duplicate parent key, later object dropped");
                self.report.push(Diagnostic::DuplicateKey {
                    sheet: node.name().to_string(),
                    key,
                });
                continue;
            }
            positions.insert(key, objects.len());
            objects.push(object);
        }

        let mut matched: Vec<Vec<Record>> = vec![Vec::new(); objects.len()];
        let mut unmatched = 0;
        for record in self.decode(node)? {
            let key = reference_key(parent_key, &record);
            match positions.get(&key) {
                Some(&position) => matched[position].push(record),
                None => {
                    trace!(sheet = %node.name(), key = %key, "child row without parent");
                    unmatched += 1;
                }
            }
        }
        if unmatched > 0 {
            warn!(sheet = %node.name(), rows = unmatched, "child rows without a parent object");
            self.report.push(Diagnostic::UnmatchedRows {
                sheet: node.name().to_string(),
                count: unmatched,
            });
        }

        let mut pool = if flat {
            let mut overwriting = 0;
            for (object, rows) in objects.iter_mut().zip(matched) {
                for (position, row) in rows.into_iter().enumerate() {
                    let replaced = object.merge_child(path, without_key(&row, Some(own_key)));
                    if position > 0 && replaced > 0 {
                        overwriting += 1;
                    }
                }
            }
            if overwriting > 0 {
                warn!(sheet = %node.name(), rows = overwriting, "rows folded into one parent object replaced earlier values");
                self.report.push(Diagnostic::Overwritten {
                    sheet: node.name().to_string(),
                    count: overwriting,
                });
            }
            objects
        } else {
            let mut expanded = Vec::with_capacity(objects.len());
            let mut fresh = Vec::with_capacity(objects.len());
            for (object, rows) in objects.into_iter().zip(matched) {
                if rows.is_empty() {
                    expanded.push(object);
                    fresh.push(false);
                    continue;
                }
                for row in &rows {
                    expanded.push(object.expanded(row, &self.options.name_separator));
                    fresh.push(true);
                }
            }
            let targets = expanded
                .iter_mut()
                .zip(&fresh)
                .filter_map(|(object, is_fresh)| is_fresh.then_some(object))
                .collect();
            self.merge_references(node, targets)?;
            expanded
        };
        debug!(sheet = %node.name(), objects = pool.len(), "child merged");

        for &child in node.children() {
            pool = self.walk_child(child, pool)?;
        }
        Ok(pool)
    }

    fn merge_references<T: DomainObject>(
        &mut self,
        node: &'a SheetNode,
        mut objects: Vec<&mut T>,
    ) -> Result<()> {
        let forest = self.forest;
        for &id in node.references() {
            let reference = forest.node(id);
            let Some(path) = reference.domain_path() else {
                debug!(reference = %reference.name(), "untyped reference skipped");
                continue;
            };
            if !T::accepts_reference(path) {
                self.misplaced(reference, path);
                continue;
            }
            let Some(key) = reference.index_key() else {
                continue;
            };
            self.load_reference(reference)?;
            for object in objects.iter_mut() {
                let lookup = (id, reference_key(key, object.fields()));
                match self.references.get(&lookup) {
                    Some(records) => {
                        trace!(reference = %reference.name(), key = %lookup.1, rows = records.len(), "reference matched");
                        object.merge_reference(path, records);
                    }
                    None => trace!(reference = %reference.name(), key = %lookup.1, "reference not matched"),
                }
            }
        }
        Ok(())
    }

    /// Decodes a reference sheet once per root and groups its rows by join key.
    fn load_reference(&mut self, reference: &SheetNode) -> Result<()> {
        if !self.loaded.insert(reference.id()) {
            return Ok(());
        }
        let key = reference.index_key();
        let records = self.decode(reference)?;
        debug!(reference = %reference.name(), rows = records.len(), "reference decoded");
        for record in records {
            let join = key.map(|key| reference_key(key, &record)).unwrap_or_default();
            self.references
                .entry((reference.id(), join))
                .or_default()
                .push(without_key(&record, key));
        }
        Ok(())
    }

    /// One record per data row; empty cells are left out.
    fn decode(&self, node: &SheetNode) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for row in self.source.read_rows(node.sheet())? {
            let row = row?;
            let record: Record = node
                .variables()
                .iter()
                .zip(row)
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| (name.as_str(), value))
                .collect();
            records.push(record);
        }
        Ok(records)
    }

    fn misplaced(&mut self, node: &SheetNode, path: &str) {
        if !self.misplaced.insert(node.id()) {
            return;
        }
        warn!(sheet = %node.name(), path, "sheet category has no place under its root, skipped");
        self.report.push(Diagnostic::Misplaced {
            sheet: node.name().to_string(),
            path: path.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_path::DomainPathResolver;
    use crate::node::Key;
    use ace_ingest::MemorySheetSource;
    use ace_standards::DomainLookup;

    fn node(index: usize, name: &str, source: &MemorySheetSource, key: &str) -> SheetNode {
        let variables = source.read_header(index).expect("header");
        let mut node = SheetNode::new(NodeId::new(index), index, name, variables);
        node.define(Key::parse(key));
        node.set_index_key(Key::parse(key));
        node
    }

    #[test]
    fn later_objects_with_a_known_parent_key_are_dropped() {
        let source = MemorySheetSource::new()
            .with_sheet("Management", ["EXPER_ID", "EXNAME"], [["E1", "UFGA8201"]])
            .with_sheet(
                "Treatments",
                ["EXPER_ID", "TRTNO", "CUL_ID"],
                [["E1", "1", "IB0001"], ["E1", "2", "IB0002"]],
            )
            .with_sheet("Sequences", ["EXPER_ID", "SQ", "CRID"], [["E1", "1", "MZ"]]);
        let lookup = DomainLookup::from_entries([
            ("exper_id", ""),
            ("exname", ""),
            ("trtno", ""),
            ("cul_id", ""),
            ("sq", ""),
            ("crid", ""),
        ]);
        let nodes = vec![
            node(0, "Management", &source, "exper_id"),
            node(1, "Treatments", &source, "exper_id,trtno"),
            node(2, "Sequences", &source, "exper_id,sq"),
        ];
        let forest = Forest::build(nodes);
        assert_eq!(forest.node(NodeId::new(0)).children(), [NodeId::new(1), NodeId::new(2)]);
        assert!(forest.resolve_paths(&DomainPathResolver::new(&lookup)).is_empty());

        let options = TranslateOptions::default();
        let (dataset, report) = Engine::new(&source, &forest, &options, TranslationReport::default())
            .run()
            .expect("run");

        // Sequences joins on the experiment id, which both treatments share.
        assert_eq!(dataset.experiments().len(), 1);
        assert_eq!(dataset.experiments()[0].fields.get("cul_id"), Some("IB0001"));
        assert_eq!(dataset.experiments()[0].fields.get("crid"), Some("MZ"));
        assert_eq!(
            report.diagnostics,
            [Diagnostic::DuplicateKey {
                sheet: "Sequences".to_string(),
                key: "exper_id:E1".to_string(),
            }]
        );
    }
}
