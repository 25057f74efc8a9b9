//! Integration tests for the full sweeping workflow
//!
//! These run fixture files from `testdata/` through load, cleaning,
//! projection and conversion, then write the artifacts to disk the way the
//! command-line tool does.

use data_sweeper::config::SweeperConfig;
use data_sweeper::error::SweeperError;
use data_sweeper::sweeper::{
    BatchSummary, ChartView, CleaningStep, ExportFormat, FileRequest, FileSession, LoadOptions,
    UploadedFile, process_uploads,
};
use std::path::PathBuf;

fn fixture(name: &str) -> UploadedFile {
    let path = PathBuf::from("testdata").join(name);
    UploadedFile::from_path(&path).unwrap()
}

fn full_clean() -> FileRequest {
    FileRequest {
        cleaning_enabled: true,
        steps: vec![CleaningStep::RemoveDuplicates, CleaningStep::FillMissing],
        ..Default::default()
    }
}

#[test]
fn test_sales_fixture_metadata() {
    let session = FileSession::open(fixture("sales.csv"), &LoadOptions::default()).unwrap();
    let meta = session.metadata();

    assert_eq!(meta.name, "sales.csv");
    assert_eq!(meta.rows, 6, "Should have 6 rows");
    assert_eq!(meta.columns, 4, "Should have 4 columns");
    assert!(meta.to_string().contains("6 rows × 4 columns"));
}

#[test]
fn test_sales_fixture_clean_and_convert() {
    let mut session = FileSession::open(fixture("sales.csv"), &LoadOptions::default()).unwrap();

    let report = session
        .run(&FileRequest {
            columns: Some(vec!["region".to_owned(), "units".to_owned()]),
            convert_to: Some(ExportFormat::Csv),
            ..full_clean()
        })
        .unwrap();

    assert_eq!(report.duplicates_removed(), Some(1));
    assert_eq!(report.row_count, 5);

    let artifact = report.artifact.unwrap();
    assert_eq!(artifact.file_name, "sales.csv");
    let text = String::from_utf8(artifact.bytes).unwrap();
    assert_eq!(
        text,
        "region,units\nNorth,10.0\nSouth,8.5\nEast,7.0\nWest,12.0\nSouth,5.0\n"
    );

    // text columns keep their gaps
    assert_eq!(session.table().column("rep").unwrap().null_count(), 1);
}

#[test]
fn test_excel_artifact_written_and_reloaded() {
    let out_dir = tempfile::tempdir().unwrap();

    let mut session = FileSession::open(fixture("sales.csv"), &LoadOptions::default()).unwrap();
    let report = session
        .run(&FileRequest {
            convert_to: Some(ExportFormat::Excel),
            ..full_clean()
        })
        .unwrap();
    let artifact = report.artifact.unwrap();

    let target = out_dir.path().join(&artifact.file_name);
    std::fs::write(&target, &artifact.bytes).unwrap();
    assert!(target.ends_with("sales.xlsx"));

    let reloaded = FileSession::open(
        UploadedFile::from_path(&target).unwrap(),
        &LoadOptions::default(),
    )
    .unwrap();
    assert_eq!(reloaded.metadata().rows, 5);
    assert_eq!(reloaded.metadata().columns, 4);
    assert!(
        reloaded.table().equals_missing(session.table()),
        "Excel round trip should preserve the cleaned table"
    );
}

#[test]
fn test_batch_with_unsupported_file() {
    let files = vec![
        fixture("sales.csv"),
        fixture("notes.txt"),
        fixture("no_numeric.csv"),
    ];
    let request = FileRequest {
        show_chart: true,
        ..Default::default()
    };

    let outcomes = process_uploads(files, &LoadOptions::default(), &request);
    assert_eq!(outcomes.len(), 3);

    match &outcomes[1].result {
        Err(SweeperError::Load { file, .. }) => assert_eq!(file, "notes.txt"),
        other => panic!("expected a load error for notes.txt, got {other:?}"),
    }

    let no_numeric = outcomes[2].result.as_ref().unwrap();
    assert_eq!(no_numeric.chart, Some(ChartView::NoNumericColumns));

    assert_eq!(
        BatchSummary::from_outcomes(&outcomes),
        BatchSummary {
            succeeded: 2,
            failed: 1
        }
    );
}

#[test]
fn test_config_file_drives_cleaning_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweeper.json");
    std::fs::write(
        &path,
        r#"{"cleaning_order": ["FillMissing", "RemoveDuplicates"], "preview_rows": 3}"#,
    )
    .unwrap();

    let config = SweeperConfig::load_or_default(Some(&path)).unwrap();
    let steps = config.order_steps(&[CleaningStep::RemoveDuplicates, CleaningStep::FillMissing]);
    assert_eq!(
        steps,
        vec![CleaningStep::FillMissing, CleaningStep::RemoveDuplicates]
    );

    let mut session =
        FileSession::open(fixture("sales.csv"), &config.load_options()).unwrap();
    let report = session
        .run(&FileRequest {
            cleaning_enabled: true,
            steps,
            show_preview: true,
            ..config.base_request()
        })
        .unwrap();

    // filling first uses the mean over all six rows, so the repeated row is still removed
    assert_eq!(report.duplicates_removed(), Some(1));
    assert_eq!(report.preview.unwrap().height(), 3);
}
