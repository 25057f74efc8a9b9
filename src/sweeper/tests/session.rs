use super::csv_upload;
use crate::error::SweeperError;
use crate::sweeper::*;
use anyhow::Result;

fn clean_and_convert(format: ExportFormat) -> FileRequest {
    FileRequest {
        cleaning_enabled: true,
        steps: vec![CleaningStep::RemoveDuplicates, CleaningStep::FillMissing],
        convert_to: Some(format),
        ..Default::default()
    }
}

#[test]
fn test_clean_and_convert_scenario() -> Result<()> {
    let file = csv_upload("scores.csv", "a,b\n1,\n2,5\n1,5\n");
    let mut session = FileSession::open(file, &LoadOptions::default())?;

    let report = session.run(&clean_and_convert(ExportFormat::Csv))?;

    assert_eq!(report.duplicates_removed(), Some(0));
    assert!(report.missing_filled());
    assert_eq!(
        report.cleaning,
        vec![
            StepOutcome::DuplicatesRemoved(0),
            StepOutcome::MissingFilled { columns: 1 }
        ]
    );

    let artifact = report.artifact.expect("conversion requested");
    assert_eq!(artifact.file_name, "scores.csv");
    assert_eq!(String::from_utf8(artifact.bytes)?, "a,b\n1,5.0\n2,5.0\n1,5.0\n");

    let state = session.cleaning_state();
    assert!(state.enabled && state.duplicates_removed && state.missing_filled);
    Ok(())
}

#[test]
fn test_steps_ignored_while_cleaning_disabled() -> Result<()> {
    let file = csv_upload("d.csv", "a\n1\n1\n");
    let mut session = FileSession::open(file, &LoadOptions::default())?;

    let report = session.run(&FileRequest {
        cleaning_enabled: false,
        steps: vec![CleaningStep::RemoveDuplicates],
        ..Default::default()
    })?;

    assert!(report.cleaning.is_empty());
    assert_eq!(report.row_count, 2);
    assert!(!session.cleaning_state().duplicates_removed);
    Ok(())
}

#[test]
fn test_cleaning_persists_across_requests() -> Result<()> {
    let file = csv_upload("d.csv", "a,b\n1,x\n1,x\n2,y\n");
    let mut session = FileSession::open(file, &LoadOptions::default())?;

    session.run(&FileRequest {
        cleaning_enabled: true,
        steps: vec![CleaningStep::RemoveDuplicates],
        ..Default::default()
    })?;
    assert_eq!(session.table().height(), 2);

    // a later request with only a projection sees the cleaned table
    let report = session.run(&FileRequest {
        columns: Some(vec!["b".to_owned()]),
        show_preview: true,
        ..Default::default()
    })?;
    assert_eq!(report.row_count, 2);
    assert_eq!(report.selected_columns, vec!["b"]);
    assert_eq!(report.metadata.rows, 2);
    assert_eq!(report.preview.map(|p| p.height()), Some(2));
    Ok(())
}

#[test]
fn test_preview_and_summary_reflect_stored_table() -> Result<()> {
    let file = csv_upload("d.csv", "a,b\n1,x\n2,y\n3,z\n");
    let mut session = FileSession::open(file, &LoadOptions::default())?;

    let report = session.run(&FileRequest {
        show_preview: true,
        preview_rows: 2,
        show_summary: true,
        columns: Some(vec!["b".to_owned()]),
        ..Default::default()
    })?;

    let preview = report.preview.expect("preview requested");
    assert_eq!(preview.shape(), (2, 2));
    let summary = report.summary.expect("summary requested");
    assert_eq!(summary.get("a").and_then(|s| s.mean), Some(2.0));
    Ok(())
}

#[test]
fn test_chart_without_numeric_columns() -> Result<()> {
    let file = csv_upload("t.csv", "name\nalpha\nbeta\n");
    let mut session = FileSession::open(file, &LoadOptions::default())?;

    let report = session.run(&FileRequest {
        show_chart: true,
        ..Default::default()
    })?;
    assert_eq!(report.chart, Some(ChartView::NoNumericColumns));
    Ok(())
}

#[test]
fn test_chart_follows_projection() -> Result<()> {
    let file = csv_upload("t.csv", "x,y,z\n1,2,a\n3,4,b\n");
    let mut session = FileSession::open(file, &LoadOptions::default())?;

    let report = session.run(&FileRequest {
        show_chart: true,
        columns: Some(vec!["y".to_owned(), "z".to_owned()]),
        ..Default::default()
    })?;
    match report.chart {
        Some(ChartView::Chart(chart)) => {
            assert_eq!(chart.series.len(), 1);
            assert_eq!(chart.series[0].name, "y");
        }
        other => panic!("expected a chart, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unknown_column_fails_only_that_request() -> Result<()> {
    let file = csv_upload("t.csv", "x\n1\n");
    let mut session = FileSession::open(file, &LoadOptions::default())?;

    let err = session
        .run(&FileRequest {
            columns: Some(vec!["missing".to_owned()]),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.is_per_file());
    assert_eq!(err.file(), Some("t.csv"));

    assert!(session.run(&FileRequest::default()).is_ok());
    Ok(())
}

#[test]
fn test_batch_continues_after_failure() {
    let files = vec![
        csv_upload("good.csv", "a\n1\n"),
        csv_upload("data.txt", "a\n1\n"),
        csv_upload("also_good.csv", "a,b\n1,2\n"),
    ];

    let outcomes = process_uploads(
        files,
        &LoadOptions::default(),
        &clean_and_convert(ExportFormat::Excel),
    );

    let names: Vec<&str> = outcomes.iter().map(|o| o.file_name.as_str()).collect();
    assert_eq!(names, vec!["good.csv", "data.txt", "also_good.csv"]);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(outcomes[1].result, Err(SweeperError::Load { .. })));

    let last = outcomes[2].result.as_ref().expect("third file processed");
    assert_eq!(
        last.artifact.as_ref().map(|a| a.file_name.as_str()),
        Some("also_good.xlsx")
    );

    let summary = BatchSummary::from_outcomes(&outcomes);
    assert_eq!(summary, BatchSummary { succeeded: 2, failed: 1 });
    assert_eq!(
        summary.to_string(),
        "Processed 3 files: 2 succeeded, 1 failed."
    );
}

#[test]
fn test_batch_summary_all_succeeded() {
    let outcomes = process_uploads(
        vec![csv_upload("a.csv", "x\n1\n")],
        &LoadOptions::default(),
        &FileRequest::default(),
    );
    assert_eq!(
        BatchSummary::from_outcomes(&outcomes).to_string(),
        "All 1 files processed successfully!"
    );
}
