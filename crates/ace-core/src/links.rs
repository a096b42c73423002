//! Cross-linking: experiments point at the weather station and soil profile
//! named by their `wst_id` and `soil_id` fields.

use std::collections::HashMap;

use ace_model::{Dataset, SOIL_ID_FIELD, WEATHER_ID_FIELD};
use tracing::{debug, trace};

use crate::report::LinkSummary;

/// Links every experiment whose identifiers match a weather or soil object.
///
/// When several objects share an identifier the last one wins. Experiments
/// without a match stay unlinked.
pub fn link_experiments(dataset: &mut Dataset) -> LinkSummary {
    let weathers: HashMap<String, usize> = dataset
        .weathers()
        .iter()
        .enumerate()
        .filter(|(_, weather)| !weather.station_id().is_empty())
        .map(|(idx, weather)| (weather.station_id().to_string(), idx))
        .collect();
    let soils: HashMap<String, usize> = dataset
        .soils()
        .iter()
        .enumerate()
        .filter(|(_, soil)| !soil.soil_id().is_empty())
        .map(|(idx, soil)| (soil.soil_id().to_string(), idx))
        .collect();

    let mut summary = LinkSummary::default();
    for experiment in dataset.experiments_mut() {
        if let Some(idx) = experiment.fields.get(WEATHER_ID_FIELD).and_then(|id| weathers.get(id)) {
            experiment.weather = Some(*idx);
            summary.weather += 1;
        } else {
            trace!(experiment = %experiment.name(), "no weather link");
        }
        if let Some(idx) = experiment.fields.get(SOIL_ID_FIELD).and_then(|id| soils.get(id)) {
            experiment.soil = Some(*idx);
            summary.soil += 1;
        } else {
            trace!(experiment = %experiment.name(), "no soil link");
        }
    }
    debug!(weather = summary.weather, soil = summary.soil, "experiments linked");
    summary
}
