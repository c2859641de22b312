//! Tests for the cumulative-to-rate conversion service


use crate::constants::{DATE_COLUMN, ENSEMBLE_COLUMN, REAL_COLUMN};
use chrono::NaiveDate;
use polars::prelude::*;

/// Shorthand date constructor for test fixtures
pub(crate) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// First-of-month dates starting at the given year/month
pub(crate) fn monthly_dates(mut year: i32, mut month: u32, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    for _ in 0..count {
        dates.push(ymd(year, month, 1));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    dates
}

/// Build an ensemble summary table from parallel row vectors
pub(crate) fn make_table(
    ensembles: Vec<&str>,
    reals: Vec<i32>,
    dates: Vec<NaiveDate>,
    vectors: &[(&str, Vec<f64>)],
) -> DataFrame {
    let mut columns: Vec<Column> = vec![
        Series::new(ENSEMBLE_COLUMN.into(), ensembles).into(),
        Series::new(REAL_COLUMN.into(), reals).into(),
        DateChunked::from_naive_date(DATE_COLUMN.into(), dates)
            .into_series()
            .into(),
    ];
    for (name, values) in vectors {
        columns.push(Series::new((*name).into(), values.as_slice()).into());
    }
    DataFrame::new(columns).unwrap()
}

/// Extract a float column as a plain vector
pub(crate) fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}
