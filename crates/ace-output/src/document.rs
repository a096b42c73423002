//! Serializable view of a dataset with content ids and resolved links.

use ace_model::{ContentId, Dataset, Experiment, Soil, Weather};
use anyhow::{Context, Result};
use serde::Serialize;

/// An object tagged with the content id of its own JSON.
#[derive(Debug, Serialize)]
pub struct Identified<'a, T> {
    pub id: ContentId,
    #[serde(flatten)]
    pub object: &'a T,
}

/// An experiment with its id and the ids of the objects it is linked to.
#[derive(Debug, Serialize)]
pub struct ExperimentEntry<'a> {
    pub id: ContentId,
    #[serde(flatten)]
    pub experiment: &'a Experiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_ref: Option<ContentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_ref: Option<ContentId>,
}

/// The document written for a dataset.
#[derive(Debug, Serialize)]
pub struct DatasetDocument<'a> {
    pub experiments: Vec<ExperimentEntry<'a>>,
    pub weathers: Vec<Identified<'a, Weather>>,
    pub soils: Vec<Identified<'a, Soil>>,
}

fn identify<'a, T: Serialize>(object: &'a T, kind: &str) -> Result<Identified<'a, T>> {
    let id = ContentId::of(object).with_context(|| format!("hash {kind}"))?;
    Ok(Identified { id, object })
}

/// Hashes every object and turns experiment link indices into ids.
pub fn build_document(dataset: &Dataset) -> Result<DatasetDocument<'_>> {
    let weathers = dataset
        .weathers()
        .iter()
        .map(|weather| identify(weather, "weather station"))
        .collect::<Result<Vec<_>>>()?;
    let soils = dataset
        .soils()
        .iter()
        .map(|soil| identify(soil, "soil profile"))
        .collect::<Result<Vec<_>>>()?;
    let experiments = dataset
        .experiments()
        .iter()
        .map(|experiment| {
            let id = ContentId::of(experiment)
                .with_context(|| format!("hash experiment {}", experiment.name()))?;
            Ok(ExperimentEntry {
                id,
                experiment,
                weather_ref: experiment
                    .weather
                    .and_then(|idx| weathers.get(idx))
                    .map(|weather| weather.id),
                soil_ref: experiment
                    .soil
                    .and_then(|idx| soils.get(idx))
                    .map(|soil| soil.id),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DatasetDocument {
        experiments,
        weathers,
        soils,
    })
}
