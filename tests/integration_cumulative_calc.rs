//! Integration tests for the cumulative-to-rate conversion
//!
//! Exercises the conversion through the public API, from an assembled
//! ensemble table and from per-realization CSV files loaded through the
//! summary provider.

use chrono::NaiveDate;
use ensemble_provider::app::services::cumulative_calc::calc_from_cumulatives;
use ensemble_provider::app::services::summary_provider::load_ensemble_summary;
use ensemble_provider::{EnsembleLayout, EnsembleSummaryProvider, Error, Frequency, StorageConfig};
use polars::prelude::*;
use std::fs;
use tempfile::TempDir;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn monthly_table(values: Vec<f64>) -> DataFrame {
    let dates: Vec<NaiveDate> = (0..values.len())
        .map(|i| ymd(2020, 1 + i as u32, 1))
        .collect();
    let columns: Vec<Column> = vec![
        Series::new("ENSEMBLE".into(), vec!["iter-0"; values.len()]).into(),
        Series::new("REAL".into(), vec![0; values.len()]).into(),
        DateChunked::from_naive_date("DATE".into(), dates)
            .into_series()
            .into(),
        Series::new("FOPT".into(), values).into(),
    ];
    DataFrame::new(columns).unwrap()
}

fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

#[test]
fn test_monthly_intervals_and_rates_end_to_end() {
    let table = monthly_table(vec![0.0, 10.0, 25.0, 25.0]);

    let intervals =
        calc_from_cumulatives(&table, &["FOPT"], Frequency::Monthly, Frequency::Monthly, false)
            .unwrap();
    assert_eq!(
        column_values(&intervals, "INTVL_FOPT"),
        vec![10.0, 15.0, 0.0, 0.0]
    );

    let rates =
        calc_from_cumulatives(&table, &["FOPT"], Frequency::Monthly, Frequency::Monthly, true)
            .unwrap();
    let expected = [10.0 / 31.0, 15.0 / 29.0, 0.0, 0.0];
    for (actual, expected) in column_values(&rates, "AVG_FOPR").iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-12);
    }
}

#[test]
fn test_monthly_data_declared_daily_is_rejected() {
    let table = monthly_table(vec![0.0, 10.0, 25.0]);

    let result =
        calc_from_cumulatives(&table, &["FOPT"], Frequency::Monthly, Frequency::Daily, false);
    assert!(matches!(result, Err(Error::FrequencyMismatch { .. })));

    let result =
        calc_from_cumulatives(&table, &["FOPT"], Frequency::Monthly, Frequency::Monthly, false);
    assert!(result.is_ok());
}

#[test]
fn test_loaded_ensemble_feeds_the_conversion() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Two realizations with different production profiles
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("case");
    for (real, csv) in [
        (
            0,
            "DATE,FOPT\n2020-01-01,0.0\n2020-02-01,31.0\n2020-03-01,60.0\n",
        ),
        (
            1,
            "DATE,FOPT\n2020-01-01,0.0\n2020-02-01,62.0\n2020-03-01,120.0\n",
        ),
    ] {
        let tables = root
            .join(format!("realization-{}", real))
            .join("share/results/tables");
        fs::create_dir_all(&tables).unwrap();
        fs::write(tables.join("summary.csv"), csv).unwrap();
    }

    let provider = load_ensemble_summary(
        "iter-0",
        &root,
        &EnsembleLayout::default(),
        &StorageConfig::default(),
    )
    .unwrap();
    assert_eq!(provider.frequency(), Frequency::Monthly);

    let table = provider.get_vectors_df(&["FOPT"], None).unwrap();
    let rates =
        calc_from_cumulatives(&table, &["FOPT"], Frequency::Monthly, Frequency::Monthly, true)
            .unwrap();

    // Realization 0 averages 1/day in January, realization 1 twice that;
    // last sample of each realization is forced to zero
    assert_eq!(
        column_values(&rates, "AVG_FOPR"),
        vec![1.0, 1.0, 0.0, 2.0, 2.0, 0.0]
    );
}
