//! Sampling-frequency inference and verification
//!
//! The transformer refuses to process data whose actual sampling frequency
//! does not match the declared one, so misaligned input is caught before any
//! numbers are produced. Inference is strict gap analysis over the combined
//! unique date set: consecutive one-day gaps classify as daily, first-of-month
//! dates in consecutive months as monthly, January-1st dates in consecutive
//! years as yearly. Anything else is unclassifiable.

use crate::app::models::Frequency;
use crate::constants::DATE_COLUMN;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Infer the sampling frequency of a set of dates
///
/// The dates are sorted and deduplicated internally; at least two distinct
/// dates are required for a classification.
pub fn infer_frequency(dates: &[NaiveDate]) -> Option<Frequency> {
    let mut unique: Vec<NaiveDate> = dates.to_vec();
    unique.sort_unstable();
    unique.dedup();

    if unique.len() < 2 {
        return None;
    }

    if unique.windows(2).all(|w| (w[1] - w[0]).num_days() == 1) {
        return Some(Frequency::Daily);
    }

    if unique.iter().all(|d| d.month() == 1 && d.day() == 1)
        && unique.windows(2).all(|w| w[1].year() == w[0].year() + 1)
    {
        return Some(Frequency::Yearly);
    }

    if unique.iter().all(|d| d.day() == 1)
        && unique.windows(2).all(|w| months_between(w[0], w[1]) == 1)
    {
        return Some(Frequency::Monthly);
    }

    None
}

/// Verify that the table's DATE column matches the declared input frequency
/// and that the requested output frequency is not finer than the input
///
/// Both failures are user-input errors surfaced before any transformation;
/// there is no partial-success mode.
pub fn verify_time_index(
    data: &DataFrame,
    time_index: Frequency,
    time_index_input: Frequency,
) -> Result<()> {
    let dates = date_column_to_naive(data)?;
    match infer_frequency(&dates) {
        Some(inferred) if inferred == time_index_input => {}
        inferred => {
            return Err(Error::frequency_mismatch(
                time_index_input.to_string(),
                inferred
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "unclassifiable".to_string()),
            ));
        }
    }

    if !time_index.is_coarser_or_equal(time_index_input) {
        return Err(Error::invalid_time_index(
            time_index.to_string(),
            time_index_input.to_string(),
        ));
    }

    Ok(())
}

/// Extract the DATE column as `NaiveDate` values
///
/// The column must have Date dtype (date-only, no time-of-day component) and
/// contain no nulls.
pub(crate) fn date_column_to_naive(data: &DataFrame) -> Result<Vec<NaiveDate>> {
    let column = data
        .column(DATE_COLUMN)
        .map_err(|_| Error::missing_column(DATE_COLUMN))?;
    let dates = column.as_materialized_series().date().map_err(|_| {
        Error::data_validation(format!(
            "The {} column must have Date dtype (date-only values)",
            DATE_COLUMN
        ))
    })?;

    let mut out = Vec::with_capacity(dates.len());
    for value in dates.as_date_iter() {
        match value {
            Some(date) => out.push(date),
            None => {
                return Err(Error::data_validation(format!(
                    "The {} column contains null values",
                    DATE_COLUMN
                )));
            }
        }
    }
    Ok(out)
}

/// Whole months from `a` to `b`
fn months_between(a: NaiveDate, b: NaiveDate) -> i32 {
    (b.year() - a.year()) * 12 + (b.month() as i32 - a.month() as i32)
}
