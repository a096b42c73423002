//! End-to-end translations of small in-memory workbooks.

use ace_core::{
    Diagnostic, KeyOutcome, PathResolution, TranslateError, TranslateOptions, Translator,
};
use ace_ingest::MemorySheetSource;
use ace_model::EventKind;
use ace_standards::{DomainLookup, builtin_lookup};

fn lookup() -> DomainLookup {
    builtin_lookup().expect("builtin lookup")
}

/// Two experiments, two treatments for the first, fertilizer levels shared
/// by reference, one weather station with a year of daily readings, one
/// soil profile.
fn field_trial() -> MemorySheetSource {
    let daily: Vec<Vec<String>> = (0..365)
        .map(|day| {
            vec![
                "UFGA".to_string(),
                (36892 + day).to_string(),
                format!("{}", 10 + day % 15),
                "28.5".to_string(),
            ]
        })
        .collect();

    MemorySheetSource::new()
        .with_sheet("DOC_Readme", ["notes"], [["field trial template"]])
        .with_sheet(
            "Management",
            ["EXPER_ID", "EXNAME", "CRID", "WST_ID", "SOIL_ID"],
            [
                ["E1", "UFGA8201", "MZ", "UFGA", "IBMZ001"],
                ["E2", "UFGA8202", "MZ", "UFGA", "MISSING"],
            ],
        )
        .with_sheet(
            "Treatments",
            ["EXPER_ID", "TRTNO", "CUL_ID", "FE_LEVEL", "!note"],
            [
                ["E1", "1", "IB0001", "1", "low N"],
                ["E1", "2", "IB0002", "2", "high N"],
            ],
        )
        .with_sheet(
            "Fertilizer",
            ["FE_LEVEL", "FEDATE", "FEAMN"],
            [
                ["1", "36951", "20"],
                ["1", "2001-04-01", "40"],
                ["2", "36951", "60"],
                ["2", "2001-04-15T00:00:00", "80"],
            ],
        )
        .with_sheet(
            "Observed",
            ["EXPER_ID", "TRTNO", "HWAH", "MDAT"],
            [["E1", "1", "5000", "37073"], ["E1", "2", "6200", "37075"]],
        )
        .with_sheet(
            "Weather",
            ["WST_ID", "WST_NAME", "WST_LAT"],
            [["UFGA", "Gainesville", "29.63"]],
        )
        .with_sheet("Daily", ["WST_ID", "W_DATE", "SRAD", "TMAX"], daily)
        .with_sheet(
            "Soil",
            ["SOIL_ID", "SOIL_NAME", "SLDP"],
            [["IBMZ001", "Millhopper", "180"]],
        )
        .with_sheet(
            "Layers",
            ["SOIL_ID", "SLLB", "SLLL"],
            [
                ["IBMZ001", "5", "0.026"],
                ["IBMZ001", "15", "0.025"],
                ["IBMZ001", "30", "0.075"],
            ],
        )
}

#[test]
fn field_trial_discovers_keys() {
    let source = field_trial();
    let lookup = lookup();
    let analysis = Translator::new(&source, &lookup).analyze().expect("analyze");
    let discovery = &analysis.discovery;

    assert_eq!(discovery.entries.len(), 8);
    let management = discovery.entry("Management").expect("management");
    assert_eq!(management.outcome, KeyOutcome::Defines);
    assert_eq!(management.root_field.as_deref(), Some("exper_id"));

    let treatments = discovery.entry("Treatments").expect("treatments");
    assert_eq!(treatments.outcome, KeyOutcome::Defines);
    assert_eq!(treatments.index_columns, 2);

    // Repeated levels downgrade the sheet; nothing else defines the level.
    let fertilizer = discovery.entry("Fertilizer").expect("fertilizer");
    assert_eq!(fertilizer.outcome, KeyOutcome::Promoted);
    assert_eq!(fertilizer.defined_key.as_ref().map(ToString::to_string).as_deref(), Some("fe_level"));

    for sheet in ["Observed", "Daily", "Layers"] {
        assert_eq!(
            discovery.entry(sheet).map(|entry| entry.outcome),
            Some(KeyOutcome::AlreadyDefined),
            "{sheet}"
        );
    }
    assert_eq!(discovery.count(KeyOutcome::NoKey), 0);
}

#[test]
fn field_trial_forest() {
    let source = field_trial();
    let lookup = lookup();
    let analysis = Translator::new(&source, &lookup).analyze().expect("analyze");

    insta::assert_snapshot!(analysis.forest.render(), @r"
    Management *exper_id* <management>
      Treatments (Management) [Fertilizer] <management>
        Observed (Treatments) <observed>
    Weather *wst_id* <weather>
      Daily (Weather) <weather@dailyWeather>
    Soil *soil_id* <soil>
      Layers (Soil) <soil@soilLayer>
    ");
    assert!(analysis.report.is_clean());

    let forest = &analysis.forest;
    let observed = forest.find("Observed").expect("observed");
    assert_eq!(forest.depth(observed.id()), 2);
    assert_eq!(observed.link_chain(), ["exper_id", "trtno"]);
    let treatments = forest.find("Treatments").expect("treatments");
    assert_eq!(treatments.link_chain(), ["exper_id", "fe_level"]);
    assert!(forest.find("Fertilizer").expect("fertilizer").is_reference());
}

#[test]
fn field_trial_attaches_every_sheet_once() {
    let source = field_trial();
    let lookup = lookup();
    let analysis = Translator::new(&source, &lookup).analyze().expect("analyze");
    let forest = &analysis.forest;

    for node in forest.nodes() {
        let as_root = forest.roots().iter().filter(|&&id| id == node.id()).count();
        let as_child = forest
            .nodes()
            .iter()
            .flat_map(|other| other.children())
            .filter(|&&id| id == node.id())
            .count();
        let as_orphan = forest.orphans().iter().filter(|&&id| id == node.id()).count();
        let as_reference = usize::from(node.is_reference());
        assert_eq!(as_root + as_child + as_orphan + as_reference, 1, "{}", node.name());

        if let Some(parent) = node.parent() {
            assert_eq!(as_child, 1, "{}", node.name());
            assert!(forest.node(parent).children().contains(&node.id()));
            assert!(!forest.is_ancestor(node.id(), parent), "{}", node.name());
        }
    }
}

#[test]
fn field_trial_translates_and_links() {
    let source = field_trial();
    let lookup = lookup();
    let translation = Translator::new(&source, &lookup).run().expect("translate");
    let dataset = &translation.dataset;

    let names: Vec<&str> = dataset.experiments().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["UFGA8201_1", "UFGA8201_2", "UFGA8202"]);

    let first = &dataset.experiments()[0];
    assert_eq!(first.fields.get("cul_id"), Some("IB0001"));
    assert_eq!(first.fields.get("crid"), Some("MZ"));
    assert!(!first.fields.contains("note"));
    let fertilizer: Vec<_> = first.events_of(&EventKind::Fertilizer).collect();
    assert_eq!(fertilizer.len(), 2);
    assert_eq!(fertilizer[0].get("date"), Some("2001-03-01"));
    assert_eq!(fertilizer[0].get("feamn"), Some("20"));
    assert_eq!(fertilizer[0].get("event"), Some("fertilizer"));
    assert!(!fertilizer[0].contains("fe_level"));
    assert_eq!(first.observed.fields.get("hwah"), Some("5000"));
    assert_eq!(first.observed.fields.get("mdat"), Some("2001-07-01"));
    assert!(!first.observed.fields.contains("trtno"));

    let second = &dataset.experiments()[1];
    let fertilizer: Vec<_> = second.events_of(&EventKind::Fertilizer).collect();
    assert_eq!(fertilizer[1].get("date"), Some("2001-04-15"));
    assert_eq!(second.observed.fields.get("hwah"), Some("6200"));

    // No treatment rows: the experiment passes through unexpanded.
    let untreated = &dataset.experiments()[2];
    assert!(untreated.events().is_empty());
    assert!(untreated.observed.is_empty());

    assert_eq!(dataset.weathers().len(), 1);
    let weather = &dataset.weathers()[0];
    assert_eq!(weather.station_id(), "UFGA");
    assert_eq!(weather.daily.len(), 365);
    assert_eq!(weather.daily[0].get("w_date"), Some("2001-01-01"));
    assert_eq!(weather.daily[364].get("w_date"), Some("2001-12-31"));
    assert!(!weather.daily[0].contains("wst_id"));

    assert_eq!(dataset.soils().len(), 1);
    assert_eq!(dataset.soils()[0].layers.len(), 3);

    assert_eq!(translation.report.links.weather, 3);
    assert_eq!(translation.report.links.soil, 2);
    assert_eq!(dataset.weather_of(untreated).map(|w| w.station_id()), Some("UFGA"));
    assert!(dataset.soil_of(untreated).is_none());
    assert!(translation.report.is_clean());
}

#[test]
fn name_separator_and_linking_are_configurable() {
    let source = field_trial();
    let lookup = lookup();
    let options = TranslateOptions {
        name_separator: "-".to_string(),
        link_experiments: false,
    };
    let translation = Translator::new(&source, &lookup)
        .with_options(options)
        .run()
        .expect("translate");

    let first = &translation.dataset.experiments()[0];
    assert_eq!(first.name(), "UFGA8201-1");
    assert_eq!(first.weather, None);
    assert_eq!(translation.report.links.weather, 0);
}

/// Treatments share only the experiment id with their parent, so they fold
/// into the experiment instead of expanding it.
#[test]
fn treatments_keyed_like_their_experiment_merge_flat() {
    let source = MemorySheetSource::new()
        .with_sheet(
            "Management",
            ["EXPER_ID", "EXNAME"],
            [["E1", "UFGA8201"], ["E2", "UFGA8202"]],
        )
        .with_sheet(
            "Treatments",
            ["EXPER_ID", "TRTNO", "CUL_ID"],
            [["E1", "1", "IB0001"], ["E1", "2", "IB0002"]],
        )
        .with_sheet(
            "Fertilizer",
            ["EXPER_ID", "FEDATE", "FEAMN"],
            [["E1", "36951", "20"], ["E1", "2001-04-15", "40"]],
        );
    let lookup = lookup();
    let translation = Translator::new(&source, &lookup).run().expect("translate");

    let experiments = translation.dataset.experiments();
    let names: Vec<&str> = experiments.iter().map(|e| e.name()).collect();
    assert_eq!(names, ["UFGA8201", "UFGA8202"]);

    let first = &experiments[0];
    assert_eq!(first.fields.get("trtno"), Some("2"));
    assert_eq!(first.fields.get("cul_id"), Some("IB0002"));
    let fertilizer: Vec<_> = first.events_of(&EventKind::Fertilizer).collect();
    assert_eq!(fertilizer.len(), 2);
    assert_eq!(fertilizer[0].get("date"), Some("2001-03-01"));
    assert!(experiments[1].events().is_empty());

    assert_eq!(
        translation.report.diagnostics,
        [Diagnostic::Overwritten {
            sheet: "Treatments".to_string(),
            count: 1,
        }]
    );
}

#[test]
fn several_references_feed_one_treatment() {
    let source = MemorySheetSource::new()
        .with_sheet("Management", ["EXPER_ID", "EXNAME", "CRID"], [["E1", "UFGA8301", "MZ"]])
        .with_sheet(
            "Treatments",
            ["EXPER_ID", "TRTNO", "CUL_ID", "PL_LEVEL", "IR_LEVEL"],
            [["E1", "1", "IB0035", "1", "1"]],
        )
        .with_sheet("Planting", ["PL_LEVEL", "PDATE", "PLPOP"], [["1", "36950", "7.2"]])
        .with_sheet(
            "Irrigation",
            ["IR_LEVEL", "IDATE", "IRVAL"],
            [["1", "2001-05-01", "20"], ["1", "2001-06-01", "25"]],
        )
        .with_sheet("Observed", ["EXPER_ID", "TRTNO", "HWAH"], [["E1", "1", "4100"]]);
    let lookup = lookup();
    let translation = Translator::new(&source, &lookup).run().expect("translate");

    let experiments = translation.dataset.experiments();
    assert_eq!(experiments.len(), 1);
    let experiment = &experiments[0];
    assert_eq!(experiment.name(), "UFGA8301_1");

    let kinds: Vec<&str> = experiment
        .events()
        .iter()
        .filter_map(|event| event.get("event"))
        .collect();
    assert_eq!(kinds, ["planting", "irrigation", "irrigation"]);
    assert_eq!(experiment.events()[0].get("date"), Some("2001-02-28"));
    assert_eq!(experiment.events()[0].get("plpop"), Some("7.2"));
    assert_eq!(experiment.events()[2].get("irval"), Some("25"));
    assert!(translation.report.is_clean());
}

#[test]
fn untyped_and_unattached_sheets_are_reported() {
    let source = MemorySheetSource::new()
        .with_sheet("Management", ["EXPER_ID", "EXNAME"], [["E1", "UFGA8401"]])
        .with_sheet("Extras", ["EXPER_ID", "MYSTERY"], [["E1", "42"]])
        .with_sheet("Scratch", ["ZZ_A", "ZZ_B"], [["1", "2"]]);
    let lookup = lookup();
    let translation = Translator::new(&source, &lookup).run().expect("translate");

    let report = &translation.report;
    assert!(!report.is_clean());
    assert_eq!(report.orphans().collect::<Vec<_>>(), ["Scratch"]);
    assert!(report.diagnostics.contains(&Diagnostic::Untyped {
        sheet: "Extras".to_string(),
        resolution: PathResolution::Undetermined,
    }));
    assert_eq!(
        translation.discovery.entry("Scratch").map(|entry| entry.outcome),
        Some(KeyOutcome::NoKey)
    );

    let experiments = translation.dataset.experiments();
    assert_eq!(experiments.len(), 1);
    assert!(!experiments[0].fields.contains("mystery"));
}

#[test]
fn child_rows_without_parent_are_counted() {
    let source = MemorySheetSource::new()
        .with_sheet("Weather", ["WST_ID", "WST_NAME"], [["UFGA", "Gainesville"]])
        .with_sheet(
            "Daily",
            ["WST_ID", "W_DATE", "TMAX"],
            [["UFGA", "36892", "21"], ["KSAS", "36892", "3"], ["KSAS", "36893", "4"]],
        );
    let lookup = lookup();
    let translation = Translator::new(&source, &lookup).run().expect("translate");

    assert_eq!(translation.dataset.weathers()[0].daily.len(), 1);
    assert_eq!(translation.report.unmatched_rows(), 2);
}

#[test]
fn workbook_without_sheets_is_an_error() {
    let source = MemorySheetSource::new().with_sheet("DOC_Only", ["notes"], [["nothing here"]]);
    let lookup = lookup();
    let err = Translator::new(&source, &lookup).run().expect_err("no sheets");
    assert!(matches!(err, TranslateError::EmptyWorkbook));
}
