use crate::domain::{Experiment, Soil, Weather};

/// The translated dataset: experiments, weather stations and soil profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    experiments: Vec<Experiment>,
    weathers: Vec<Weather>,
    soils: Vec<Soil>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_experiment(&mut self, experiment: Experiment) {
        self.experiments.push(experiment);
    }

    pub fn add_weather(&mut self, weather: Weather) {
        self.weathers.push(weather);
    }

    pub fn add_soil(&mut self, soil: Soil) {
        self.soils.push(soil);
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn experiments_mut(&mut self) -> &mut [Experiment] {
        &mut self.experiments
    }

    pub fn weathers(&self) -> &[Weather] {
        &self.weathers
    }

    pub fn soils(&self) -> &[Soil] {
        &self.soils
    }

    /// The weather station an experiment is linked to, if any.
    pub fn weather_of(&self, experiment: &Experiment) -> Option<&Weather> {
        experiment.weather.and_then(|idx| self.weathers.get(idx))
    }

    /// The soil profile an experiment is linked to, if any.
    pub fn soil_of(&self, experiment: &Experiment) -> Option<&Soil> {
        experiment.soil.and_then(|idx| self.soils.get(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty() && self.weathers.is_empty() && self.soils.is_empty()
    }
}
