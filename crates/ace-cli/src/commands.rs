use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ace_core::Translator;
use ace_ingest::{IngestOptions, SheetSource, open_source};
use ace_output::write_dataset;
use ace_standards::{DomainLookup, load_default_lookup, load_lookup_csv};

use crate::types::{InspectResult, TranslateRequest, TranslateResult};

/// Loads the lookup table: an explicit CSV, else the environment override
/// or the built-in table.
pub fn load_lookup(path: Option<&Path>) -> Result<DomainLookup> {
    match path {
        Some(path) => {
            load_lookup_csv(path).with_context(|| format!("load lookup table {}", path.display()))
        }
        None => load_default_lookup().context("load default lookup table"),
    }
}

fn open_input(input: &Path) -> Result<Box<dyn SheetSource>> {
    let source = open_source(input, &IngestOptions::default())
        .with_context(|| format!("open {}", input.display()))?;
    info!(input = %input.display(), sheets = source.sheets().len(), "input opened");
    Ok(source)
}

pub fn run_translate(request: &TranslateRequest) -> Result<TranslateResult> {
    let span = info_span!("run", input = %request.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let lookup = load_lookup(request.lookup.as_deref())?;
    let source = open_input(&request.input)?;
    let translation = Translator::new(source.as_ref(), &lookup)
        .with_options(request.translate_options.clone())
        .run()
        .with_context(|| format!("translate {}", request.input.display()))?;

    let written = if request.dry_run {
        info!("dry run, no output written");
        None
    } else {
        let format = write_dataset(&translation.dataset, &request.output, &request.output_options)?;
        Some((request.output.clone(), format))
    };

    info!(duration_ms = start.elapsed().as_millis(), "run complete");
    Ok(TranslateResult {
        input: request.input.clone(),
        written,
        experiments: translation.dataset.experiments().len(),
        weathers: translation.dataset.weathers().len(),
        soils: translation.dataset.soils().len(),
        discovery: translation.discovery,
        report: translation.report,
    })
}

pub fn run_inspect(input: &Path, lookup: Option<&Path>) -> Result<InspectResult> {
    let span = info_span!("inspect", input = %input.display());
    let _guard = span.enter();

    let lookup = load_lookup(lookup)?;
    let source = open_input(input)?;
    let analysis = Translator::new(source.as_ref(), &lookup)
        .analyze()
        .with_context(|| format!("analyze {}", input.display()))?;
    Ok(InspectResult {
        input: input.to_path_buf(),
        discovery: analysis.discovery,
        forest: analysis.forest.render(),
        report: analysis.report,
    })
}
