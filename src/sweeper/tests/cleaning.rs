use super::load_csv;
use crate::sweeper::*;
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_remove_duplicates_keeps_first_occurrence() -> Result<()> {
    let df = df!(
        "a" => &[1i64, 2, 1, 3, 2],
        "b" => &["x", "y", "x", "z", "y"]
    )?;

    let (deduped, removed) = remove_duplicates(&df)?;
    assert_eq!(removed, 2);
    let expected = df!("a" => &[1i64, 2, 3], "b" => &["x", "y", "z"])?;
    assert!(deduped.equals(&expected));
    Ok(())
}

#[test]
fn test_remove_duplicates_is_idempotent() -> Result<()> {
    let df = load_csv("a,b\n1,\n1,\n2,3\n2,3\n2,4\n")?;

    let (once, removed) = remove_duplicates(&df)?;
    assert_eq!(removed, 2, "missing cells compare equal");
    let (twice, removed_again) = remove_duplicates(&once)?;
    assert_eq!(removed_again, 0);
    assert!(twice.equals_missing(&once));
    Ok(())
}

#[test]
fn test_remove_duplicates_on_empty_table() -> Result<()> {
    let df = load_csv("a,b\n")?;
    let (deduped, removed) = remove_duplicates(&df)?;
    assert_eq!(removed, 0);
    assert_eq!(deduped.shape(), (0, 2));
    Ok(())
}

#[test]
fn test_fill_missing_uses_column_mean() -> Result<()> {
    let df = df!(
        "x" => &[Some(1i64), None, Some(3)],
        "label" => &[Some("a"), None, Some("c")]
    )?;

    let (filled, columns) = fill_missing_numeric(&df)?;
    assert_eq!(columns, 1);

    let x = filled.column("x")?.as_materialized_series();
    let values: Vec<Option<f64>> = x.f64()?.into_iter().collect();
    assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    assert_eq!(filled.column("label")?.null_count(), 1, "text columns untouched");
    Ok(())
}

#[test]
fn test_fill_missing_leaves_all_null_and_complete_columns() -> Result<()> {
    let df = df!(
        "empty" => &[None::<f64>, None],
        "full" => &[1i64, 2]
    )?;

    let (filled, columns) = fill_missing_numeric(&df)?;
    assert_eq!(columns, 0);
    assert_eq!(filled.column("empty")?.null_count(), 2);
    assert_eq!(filled.column("full")?.dtype(), &DataType::Int64);
    Ok(())
}

#[test]
fn test_fill_then_dedupe_differs_from_dedupe_then_fill() -> Result<()> {
    // the mean is taken from the table as it stands when filling runs
    let df = load_csv("k,v\n1,\n2,4\n2,4\n3,10\n")?;

    let (dedupe_first, _) = apply_steps(
        df.clone(),
        &[CleaningStep::RemoveDuplicates, CleaningStep::FillMissing],
    )?;
    let (fill_first, outcomes) = apply_steps(
        df,
        &[CleaningStep::FillMissing, CleaningStep::RemoveDuplicates],
    )?;

    let first_value = |df: &DataFrame| -> Result<Option<f64>> {
        Ok(df.column("v")?.as_materialized_series().f64()?.get(0))
    };
    assert_eq!(first_value(&dedupe_first)?, Some(7.0));
    assert_eq!(first_value(&fill_first)?, Some(6.0));
    assert_eq!(
        outcomes,
        vec![
            StepOutcome::MissingFilled { columns: 1 },
            StepOutcome::DuplicatesRemoved(1)
        ]
    );
    Ok(())
}

#[test]
fn test_step_messages() {
    assert_eq!(
        StepOutcome::DuplicatesRemoved(3).message(),
        "Removed 3 duplicate rows."
    );
    assert_eq!(
        StepOutcome::MissingFilled { columns: 2 }.message(),
        "Missing values filled with column means."
    );
}

#[test]
fn test_fill_missing_with_infinite_mean() -> Result<()> {
    let df = df!(
        "v" => &[Some(1.0), Some(f64::INFINITY), None],
        "w" => &[Some(f64::INFINITY), Some(f64::NEG_INFINITY), None]
    )?;

    let (filled, columns) = fill_missing_numeric(&df)?;
    assert_eq!(columns, 1);
    let v = filled.column("v")?.as_materialized_series();
    assert_eq!(v.f64()?.get(2), Some(f64::INFINITY));
    // inf and -inf average to NaN, so there is nothing to fill with
    assert_eq!(filled.column("w")?.null_count(), 1);
    Ok(())
}
