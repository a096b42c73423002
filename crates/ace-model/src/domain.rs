//! Root-category domain objects and their sub-collections.
//!
//! An [`Experiment`] carries management events, initial conditions and
//! observed data; a [`Weather`] station carries daily readings; a [`Soil`]
//! profile carries soil layers. Every sub-collection is an ordered list of
//! [`Record`]s.

use std::fmt;

use serde::Serialize;

use crate::record::Record;

/// Field holding an experiment's weather-station identifier.
pub const WEATHER_ID_FIELD: &str = "wst_id";
/// Field holding an experiment's soil-profile identifier.
pub const SOIL_ID_FIELD: &str = "soil_id";
/// Field holding the experiment name.
pub const EXPERIMENT_NAME_FIELD: &str = "exname";
/// Field holding the treatment number.
pub const TREATMENT_FIELD: &str = "trtno";
/// Field tagging an event record with its kind.
pub const EVENT_FIELD: &str = "event";
/// Generic event date field.
pub const DATE_FIELD: &str = "date";

/// Management event kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Planting,
    Irrigation,
    Fertilizer,
    Tillage,
    Harvest,
    Other(String),
}

impl EventKind {
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "planting" => Self::Planting,
            "irrigation" => Self::Irrigation,
            "fertilizer" => Self::Fertilizer,
            "tillage" => Self::Tillage,
            "harvest" => Self::Harvest,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Planting => "planting",
            Self::Irrigation => "irrigation",
            Self::Fertilizer => "fertilizer",
            Self::Tillage => "tillage",
            Self::Harvest => "harvest",
            Self::Other(kind) => kind,
        }
    }

    /// The kind-specific date column aliased into [`DATE_FIELD`].
    pub fn date_variable(&self) -> Option<&'static str> {
        match self {
            Self::Planting => Some("pdate"),
            Self::Irrigation => Some("idate"),
            Self::Fertilizer => Some("fedate"),
            Self::Tillage => Some("tdate"),
            Self::Harvest => Some("hadat"),
            Self::Other(_) => None,
        }
    }

    /// Builds an event record: tags the kind and aliases the date column.
    pub fn event_record(&self, source: &Record) -> Record {
        let mut event = source.clone();
        event.set(EVENT_FIELD, self.as_str());
        if let Some(date) = self.date_variable() {
            event.alias(date, DATE_FIELD);
        }
        event
    }

    fn matches(&self, event: &Record) -> bool {
        event.get(EVENT_FIELD) == Some(self.as_str())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Management {
    pub events: Vec<Record>,
}

impl Management {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitialConditions {
    #[serde(flatten)]
    pub fields: Record,
    #[serde(rename = "soilLayer", skip_serializing_if = "Vec::is_empty")]
    pub soil_layers: Vec<Record>,
}

impl InitialConditions {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.soil_layers.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservedData {
    #[serde(flatten)]
    pub fields: Record,
    #[serde(rename = "timeSeries", skip_serializing_if = "Vec::is_empty")]
    pub timeseries: Vec<Record>,
}

impl ObservedData {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.timeseries.is_empty()
    }
}

/// One experiment (a treatment of a field trial).
///
/// `weather` and `soil` are non-owning links: indices into the owning
/// dataset's weather and soil lists, set by the cross-link pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Experiment {
    #[serde(flatten)]
    pub fields: Record,
    #[serde(skip_serializing_if = "Management::is_empty")]
    pub management: Management,
    #[serde(skip_serializing_if = "InitialConditions::is_empty")]
    pub initial_conditions: InitialConditions,
    #[serde(skip_serializing_if = "ObservedData::is_empty")]
    pub observed: ObservedData,
    #[serde(skip)]
    pub weather: Option<usize>,
    #[serde(skip)]
    pub soil: Option<usize>,
}

impl Experiment {
    pub fn new(fields: Record) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        self.fields.value_or(EXPERIMENT_NAME_FIELD, "")
    }

    pub fn events(&self) -> &[Record] {
        &self.management.events
    }

    pub fn events_of<'a>(&'a self, kind: &'a EventKind) -> impl Iterator<Item = &'a Record> {
        self.management
            .events
            .iter()
            .filter(move |event| kind.matches(event))
    }

    pub fn events_of_mut<'a>(
        &'a mut self,
        kind: &'a EventKind,
    ) -> impl Iterator<Item = &'a mut Record> {
        self.management
            .events
            .iter_mut()
            .filter(move |event| kind.matches(event))
    }

    pub fn push_event(&mut self, event: Record) {
        self.management.events.push(event);
    }
}

/// One weather station with its ordered daily readings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Weather {
    #[serde(flatten)]
    pub fields: Record,
    #[serde(rename = "dailyWeather", skip_serializing_if = "Vec::is_empty")]
    pub daily: Vec<Record>,
}

impl Weather {
    pub fn new(fields: Record) -> Self {
        Self {
            fields,
            daily: Vec::new(),
        }
    }

    pub fn station_id(&self) -> &str {
        self.fields.value_or(WEATHER_ID_FIELD, "")
    }
}

/// One soil profile with its ordered layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Soil {
    #[serde(flatten)]
    pub fields: Record,
    #[serde(rename = "soilLayer", skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Record>,
}

impl Soil {
    pub fn new(fields: Record) -> Self {
        Self {
            fields,
            layers: Vec::new(),
        }
    }

    pub fn soil_id(&self) -> &str {
        self.fields.value_or(SOIL_ID_FIELD, "")
    }
}
