use std::path::Path;

use ace_ingest::{IngestError, IngestOptions, SheetSource, open_source};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write sheet");
}

fn collect_rows(source: &dyn SheetSource, id: usize) -> Vec<Vec<String>> {
    source
        .read_rows(id)
        .expect("open rows")
        .collect::<Result<_, _>>()
        .expect("decode rows")
}

#[test]
fn csv_folder_reads_each_file_as_a_sheet() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "10_Management.csv",
        "EXPER_ID,EXNAME,!Comment,WST_ID\nE1,UFGA8201,ignore me,UFGA\n,,,\nE2,UFGA8202,,UFGA\n",
    );
    write(
        dir.path(),
        "20_Weather.csv",
        "WST_ID,W_DATE,SRAD\nUFGA,2001-01-01,12.5\nUFGA,36892,13\n",
    );
    write(dir.path(), "DOC_Readme.csv", "Text\nDocumentation only\n");

    let source = open_source(dir.path(), &IngestOptions::default()).expect("open folder");

    let names: Vec<&str> = source.sheets().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["10_Management", "20_Weather"]);

    let management = source.sheets()[0].id;
    assert_eq!(
        source.read_header(management).expect("header"),
        vec!["exper_id", "exname", "wst_id"]
    );
    assert_eq!(
        collect_rows(source.as_ref(), management),
        vec![
            vec!["E1".to_string(), "UFGA8201".to_string(), "UFGA".to_string()],
            vec!["E2".to_string(), "UFGA8202".to_string(), "UFGA".to_string()],
        ]
    );

    let weather = source.sheets()[1].id;
    let rows = collect_rows(source.as_ref(), weather);
    assert_eq!(rows[0][1], "2001-01-01");
    assert_eq!(rows[1][1], "2001-01-01");
    assert_eq!(rows[1][2], "13");
}

#[test]
fn rows_can_be_read_more_than_once() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "Soil.csv", "SOIL_ID,SLLB\nIBSB910015,5\nIBSB910015,15\n");
    let source = open_source(dir.path(), &IngestOptions::default()).expect("open folder");

    let first = collect_rows(source.as_ref(), 0);
    let second = collect_rows(source.as_ref(), 0);
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn open_source_rejects_missing_and_unknown_inputs() {
    let dir = TempDir::new().expect("temp dir");

    let missing = dir.path().join("absent.xlsx");
    assert!(matches!(
        open_source(&missing, &IngestOptions::default()),
        Err(IngestError::InputNotFound { .. })
    ));

    let text = dir.path().join("trial.txt");
    std::fs::write(&text, "not a workbook").expect("write");
    assert!(matches!(
        open_source(&text, &IngestOptions::default()),
        Err(IngestError::UnsupportedFormat { .. })
    ));
}
