pub mod dataset;
pub mod domain;
pub mod error;
pub mod ids;
pub mod record;

pub use dataset::Dataset;
pub use domain::{
    DATE_FIELD, EVENT_FIELD, EXPERIMENT_NAME_FIELD, EventKind, Experiment, InitialConditions,
    Management, ObservedData, SOIL_ID_FIELD, Soil, TREATMENT_FIELD, WEATHER_ID_FIELD, Weather,
};
pub use error::{ModelError, Result};
pub use ids::ContentId;
pub use record::{FieldUpdate, Record};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_serializes_sections() {
        let mut experiment = Experiment::new(Record::from_pairs([
            ("exname", "UFGA8201"),
            ("wst_id", "UFGA"),
        ]));
        experiment.push_event(EventKind::Planting.event_record(&Record::from_pairs([(
            "pdate", "1982-02-25",
        )])));
        experiment.weather = Some(0);

        let json = serde_json::to_value(&experiment).expect("serialize experiment");

        assert_eq!(json["exname"], "UFGA8201");
        assert_eq!(json["management"]["events"][0]["event"], "planting");
        assert_eq!(json["management"]["events"][0]["date"], "1982-02-25");
        assert!(json.get("initial_conditions").is_none());
        assert!(json.get("weather").is_none());
    }

    #[test]
    fn content_id_is_stable_and_content_sensitive() {
        let a = Weather::new(Record::from_pairs([("wst_id", "WS001")]));
        let b = Weather::new(Record::from_pairs([("wst_id", "WS002")]));

        let id_a = ContentId::of(&a).expect("id");
        assert_eq!(id_a, ContentId::of(&a.clone()).expect("id"));
        assert_ne!(id_a, ContentId::of(&b).expect("id"));
        assert_eq!(id_a.to_hex().len(), 32);
    }

    #[test]
    fn dataset_resolves_links_by_index() {
        let mut dataset = Dataset::new();
        dataset.add_weather(Weather::new(Record::from_pairs([("wst_id", "WS001")])));
        let mut experiment = Experiment::new(Record::from_pairs([("wst_id", "WS001")]));
        experiment.weather = Some(0);
        experiment.soil = Some(3);
        dataset.add_experiment(experiment);

        let linked = &dataset.experiments()[0];
        assert_eq!(
            dataset.weather_of(linked).map(Weather::station_id),
            Some("WS001")
        );
        assert!(dataset.soil_of(linked).is_none());
    }
}
