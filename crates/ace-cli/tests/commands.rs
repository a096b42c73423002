//! Integration tests for the translate and inspect commands.

use std::fs;
use std::path::{Path, PathBuf};

use ace_cli::commands::{load_lookup, run_inspect, run_translate};
use ace_cli::types::TranslateRequest;
use ace_core::TranslateOptions;
use ace_output::{OutputFormat, OutputOptions};
use tempfile::TempDir;

fn write_trial(dir: &Path) {
    let sheets = [
        ("01_Management.csv", "EXPER_ID,EXNAME,WST_ID\nE1,UFGA8201,UFGA\n"),
        ("02_Treatments.csv", "EXPER_ID,TRTNO,CUL_ID\nE1,1,IB0001\nE1,2,IB0002\n"),
        ("03_Observed.csv", "EXPER_ID,TRTNO,HWAH\nE1,1,5000\nE1,2,6200\n"),
        ("04_Weather.csv", "WST_ID,WST_NAME\nUFGA,Gainesville\n"),
        ("05_Daily.csv", "WST_ID,W_DATE,TMAX\nUFGA,2001-01-01,21\nUFGA,2001-01-02,22\n"),
        ("DOC_Readme.csv", "notes\nnot a data sheet\n"),
    ];
    for (name, content) in sheets {
        fs::write(dir.join(name), content).expect("write sheet");
    }
}

fn request(input: &Path, output: PathBuf) -> TranslateRequest {
    TranslateRequest {
        input: input.to_path_buf(),
        output,
        lookup: None,
        output_options: OutputOptions::default(),
        translate_options: TranslateOptions::default(),
        dry_run: false,
    }
}

fn trial_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("trial")).expect("mkdir");
    write_trial(&dir.path().join("trial"));
    dir
}

#[test]
fn translate_writes_json_dataset() {
    let dir = trial_dir();
    let output = dir.path().join("out").join("trial.json");

    let result = run_translate(&request(&dir.path().join("trial"), output.clone())).expect("translate");

    assert_eq!(result.experiments, 2);
    assert_eq!(result.weathers, 1);
    assert_eq!(result.soils, 0);
    assert_eq!(result.report.links.weather, 2);
    assert!(result.report.is_clean());
    assert_eq!(result.written, Some((output.clone(), OutputFormat::Json)));

    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(&output).expect("read output")).expect("parse");
    assert_eq!(json["experiments"][1]["exname"], "UFGA8201_2");
    assert_eq!(json["experiments"][1]["observed"]["hwah"], "6200");
    assert_eq!(json["weathers"][0]["dailyWeather"][1]["w_date"], "2001-01-02");
    assert_eq!(json["experiments"][0]["weather_ref"], json["weathers"][0]["id"]);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = trial_dir();
    let output = dir.path().join("trial.aceb");
    let mut request = request(&dir.path().join("trial"), output.clone());
    request.dry_run = true;

    let result = run_translate(&request).expect("translate");

    assert_eq!(result.written, None);
    assert_eq!(result.experiments, 2);
    assert!(!output.exists());
}

#[test]
fn missing_input_fails_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("trial.json");

    let error = run_translate(&request(&dir.path().join("absent"), output.clone()))
        .expect_err("missing input");

    assert!(format!("{error:#}").contains("input not found"));
    assert!(!output.exists());
}

#[test]
fn inspect_reports_keys_and_forest() {
    let dir = trial_dir();

    let result = run_inspect(&dir.path().join("trial"), None).expect("inspect");

    assert_eq!(result.discovery.entries.len(), 5);
    assert!(result.forest.starts_with("01_Management *exper_id* <management>\n"));
    assert!(result.forest.contains("    03_Observed (02_Treatments) <observed>\n"));
    assert!(result.forest.contains("  05_Daily (04_Weather) <weather@dailyWeather>\n"));
    assert!(result.report.is_clean());
}

#[test]
fn explicit_lookup_table_replaces_builtin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lookup.csv");
    fs::write(&path, "variable,path\nexper_id,\nmystery,observed\n").expect("write lookup");

    let lookup = load_lookup(Some(&path)).expect("lookup");

    assert_eq!(lookup.len(), 2);
    assert_eq!(lookup.resolve("mystery"), Some("observed"));
    assert!(load_lookup(Some(&dir.path().join("absent.csv"))).is_err());
}
