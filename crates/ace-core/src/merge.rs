//! Record-level merge rules for each kind of domain object.

use ace_model::{EXPERIMENT_NAME_FIELD, EventKind, Experiment, Record, Soil, TREATMENT_FIELD, Weather};
use ace_standards::category::{self, INITIAL_CONDITIONS, MANAGEMENT, OBSERVED, SOIL, WEATHER};

use crate::node::Key;

const OBSERVED_TIMESERIES: &str = "observed@timeSeries";
const INITIAL_SOIL_LAYERS: &str = "initial_conditions@soilLayer";
const DAILY_WEATHER: &str = "weather@dailyWeather";
const SOIL_LAYERS: &str = "soil@soilLayer";

/// Join key of a record against an index key: `name:value` pairs joined by `,`.
/// Missing variables contribute an empty value.
pub fn reference_key(key: &Key, record: &Record) -> String {
    key.components()
        .iter()
        .map(|name| format!("{name}:{}", record.value_or(name, "")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Copy of `record` without the given key variables, for sub-records that
/// live under an object already carrying those keys.
pub fn without_key(record: &Record, key: Option<&Key>) -> Record {
    match key {
        Some(key) => record
            .iter()
            .filter(|(name, _)| !key.contains(name))
            .collect(),
        None => record.clone(),
    }
}

/// A root-category object that rows and references are merged into.
pub trait DomainObject: Clone {
    /// Front category of paths this object accepts as children.
    const FRONT: &'static str;
    /// Whether a child row with a finer key clones the parent object.
    const EXPANDS: bool;

    fn from_record(record: Record) -> Self;

    fn fields(&self) -> &Record;

    /// Whether a child sheet with this domain path can be merged here.
    fn accepts_child(path: &str) -> bool {
        category::front(path) == Self::FRONT
    }

    /// Folds one matched child row into the object without changing
    /// cardinality. Returns the number of field values the row replaced.
    fn merge_child(&mut self, path: &str, record: Record) -> usize;

    /// Whether reference rows with this domain path have a home here.
    fn accepts_reference(path: &str) -> bool;

    /// Merges the reference rows matched for this object.
    fn merge_reference(&mut self, path: &str, records: &[Record]);

    /// A copy of the object specialised by one child row.
    fn expanded(&self, _child: &Record, _separator: &str) -> Self {
        self.clone()
    }
}

impl DomainObject for Experiment {
    const FRONT: &'static str = MANAGEMENT;
    const EXPANDS: bool = true;

    fn from_record(record: Record) -> Self {
        Experiment::new(record)
    }

    fn fields(&self) -> &Record {
        &self.fields
    }

    fn accepts_child(path: &str) -> bool {
        matches!(category::front(path), MANAGEMENT | INITIAL_CONDITIONS | OBSERVED)
    }

    fn merge_child(&mut self, path: &str, record: Record) -> usize {
        match path {
            OBSERVED => self.observed.fields.merge_replacing(&record),
            OBSERVED_TIMESERIES => {
                self.observed.timeseries.push(record);
                0
            }
            INITIAL_CONDITIONS => self.initial_conditions.fields.merge_replacing(&record),
            INITIAL_SOIL_LAYERS => {
                self.initial_conditions.soil_layers.push(record);
                0
            }
            _ => match category::event_kind(path) {
                Some(kind) => {
                    merge_events(self, &EventKind::parse(kind), std::slice::from_ref(&record));
                    0
                }
                None => self.fields.merge_replacing(&record),
            },
        }
    }

    fn accepts_reference(path: &str) -> bool {
        matches!(
            path,
            MANAGEMENT | INITIAL_CONDITIONS | INITIAL_SOIL_LAYERS | OBSERVED | OBSERVED_TIMESERIES
        ) || (category::front(path) == MANAGEMENT && category::event_kind(path).is_some())
    }

    fn merge_reference(&mut self, path: &str, records: &[Record]) {
        match path {
            MANAGEMENT => records.iter().for_each(|r| self.fields.merge_from(r)),
            INITIAL_CONDITIONS => records
                .iter()
                .for_each(|r| self.initial_conditions.fields.merge_from(r)),
            INITIAL_SOIL_LAYERS => self
                .initial_conditions
                .soil_layers
                .extend(records.iter().cloned()),
            OBSERVED => records.iter().for_each(|r| self.observed.fields.merge_from(r)),
            OBSERVED_TIMESERIES => self.observed.timeseries.extend(records.iter().cloned()),
            _ => {
                if let Some(kind) = category::event_kind(path) {
                    merge_events(self, &EventKind::parse(kind), records);
                }
            }
        }
    }

    /// Clones the experiment, lays the child row over its fields and derives
    /// a per-treatment name.
    fn expanded(&self, child: &Record, separator: &str) -> Self {
        let mut experiment = self.clone();
        experiment.fields.merge_from(child);
        let name = experiment.fields.value_or(EXPERIMENT_NAME_FIELD, "");
        let treatment = experiment.fields.value_or(TREATMENT_FIELD, "");
        if !name.is_empty() && !treatment.is_empty() {
            let derived = format!("{name}{separator}{treatment}");
            experiment.fields.set(EXPERIMENT_NAME_FIELD, derived);
        }
        experiment
    }
}

/// Planting rows merge into the experiment's existing planting events when
/// there are any; every other kind appends one event per row.
fn merge_events(experiment: &mut Experiment, kind: &EventKind, records: &[Record]) {
    if *kind == EventKind::Planting && experiment.events_of(kind).next().is_some() {
        for event in experiment.events_of_mut(kind) {
            for record in records {
                event.merge_from(&kind.event_record(record));
            }
        }
        return;
    }
    for record in records {
        experiment.push_event(kind.event_record(record));
    }
}

impl DomainObject for Weather {
    const FRONT: &'static str = WEATHER;
    const EXPANDS: bool = false;

    fn from_record(record: Record) -> Self {
        Weather::new(record)
    }

    fn fields(&self) -> &Record {
        &self.fields
    }

    fn merge_child(&mut self, path: &str, record: Record) -> usize {
        if path == WEATHER {
            return self.fields.merge_replacing(&record);
        }
        self.daily.push(record);
        0
    }

    fn accepts_reference(path: &str) -> bool {
        matches!(path, WEATHER | DAILY_WEATHER)
    }

    fn merge_reference(&mut self, path: &str, records: &[Record]) {
        if path == DAILY_WEATHER {
            self.daily.extend(records.iter().cloned());
        } else {
            records.iter().for_each(|r| self.fields.merge_from(r));
        }
    }
}

impl DomainObject for Soil {
    const FRONT: &'static str = SOIL;
    const EXPANDS: bool = false;

    fn from_record(record: Record) -> Self {
        Soil::new(record)
    }

    fn fields(&self) -> &Record {
        &self.fields
    }

    fn merge_child(&mut self, path: &str, record: Record) -> usize {
        if path == SOIL {
            return self.fields.merge_replacing(&record);
        }
        self.layers.push(record);
        0
    }

    fn accepts_reference(path: &str) -> bool {
        matches!(path, SOIL | SOIL_LAYERS)
    }

    fn merge_reference(&mut self, path: &str, records: &[Record]) {
        if path == SOIL_LAYERS {
            self.layers.extend(records.iter().cloned());
        } else {
            records.iter().for_each(|r| self.fields.merge_from(r));
        }
    }
}
