//! The translation pipeline: sheet headers → key discovery → forest →
//! domain paths → merge engine → cross-links.

use std::time::Instant;

use ace_ingest::SheetSource;
use ace_model::Dataset;
use ace_standards::DomainLookup;
use tracing::{debug, info, info_span};

use crate::domain_path::DomainPathResolver;
use crate::error::{Result, TranslateError};
use crate::graph::Forest;
use crate::keys::{DiscoveryReport, discover_keys};
use crate::links::link_experiments;
use crate::node::{NodeId, SheetNode};
use crate::report::{Diagnostic, TranslationReport};
use crate::translate::{Engine, TranslateOptions};

/// Discovery and graph building results, before any row is merged.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub discovery: DiscoveryReport,
    pub forest: Forest,
    pub report: TranslationReport,
}

/// A finished translation.
#[derive(Debug, Clone)]
pub struct Translation {
    pub dataset: Dataset,
    pub discovery: DiscoveryReport,
    pub report: TranslationReport,
}

/// Translates one sheet source with an injected lookup table.
pub struct Translator<'a> {
    source: &'a dyn SheetSource,
    lookup: &'a DomainLookup,
    options: TranslateOptions,
}

impl<'a> Translator<'a> {
    pub fn new(source: &'a dyn SheetSource, lookup: &'a DomainLookup) -> Self {
        Self {
            source,
            lookup,
            options: TranslateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// One node per listed sheet, holding the sheet's standardized header.
    pub fn load_nodes(&self) -> Result<Vec<SheetNode>> {
        let sheets = self.source.sheets();
        if sheets.is_empty() {
            return Err(TranslateError::EmptyWorkbook);
        }
        sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| -> Result<SheetNode> {
                let variables = self.source.read_header(sheet.id)?;
                debug!(sheet = %sheet.name, columns = variables.len(), "header read");
                Ok(SheetNode::new(NodeId::new(index), sheet.id, &sheet.name, variables))
            })
            .collect()
    }

    /// Runs key discovery and graph building, and resolves domain paths.
    pub fn analyze(&self) -> Result<Analysis> {
        let mut nodes = self.load_nodes()?;
        let discovery = info_span!("discover").in_scope(|| discover_keys(self.source, &mut nodes))?;
        let forest = info_span!("build").in_scope(|| Forest::build(nodes));

        let resolver = DomainPathResolver::new(self.lookup);
        let untyped = forest.resolve_paths(&resolver);
        info!("sheet forest\n{}", forest.render());

        let mut report = TranslationReport::default();
        for orphan in forest.orphans() {
            report.push(Diagnostic::Orphan {
                sheet: forest.node(*orphan).name().to_string(),
            });
        }
        for id in untyped {
            let node = forest.node(id);
            if let Some(resolution) = node.resolution() {
                report.push(Diagnostic::Untyped {
                    sheet: node.name().to_string(),
                    resolution: resolution.clone(),
                });
            }
        }
        Ok(Analysis {
            discovery,
            forest,
            report,
        })
    }

    /// Runs the whole pipeline.
    pub fn run(&self) -> Result<Translation> {
        let span = info_span!("translate", sheets = self.source.sheets().len());
        let _guard = span.enter();
        let start = Instant::now();

        let Analysis {
            discovery,
            forest,
            report,
        } = self.analyze()?;
        let (mut dataset, mut report) = Engine::new(self.source, &forest, &self.options, report).run()?;
        if self.options.link_experiments {
            report.links = link_experiments(&mut dataset);
        }

        info!(
            experiments = dataset.experiments().len(),
            weathers = dataset.weathers().len(),
            soils = dataset.soils().len(),
            diagnostics = report.diagnostics.len(),
            duration_ms = start.elapsed().as_millis(),
            "translation complete"
        );
        Ok(Translation {
            dataset,
            discovery,
            report,
        })
    }
}
