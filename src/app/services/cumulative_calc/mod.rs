//! Cumulative-to-rate conversion for ensemble summary tables
//!
//! Converts cumulative (total) vectors sampled at a fine frequency into
//! interval deltas or average daily rates at a coarser-or-equal frequency,
//! per realization. The conversion is strict about its inputs: the declared
//! input frequency is verified against the data, and the requested output
//! frequency must not be finer than the input. Either violation aborts the
//! whole call; there is no partial-success mode.
//!
//! Derived values are stamped at the *start* of the interval they describe.
//! This deliberately diverges from simulator rate conventions (which stamp
//! values at the period end) and follows the ensemble-processing convention
//! that a value represents the interval beginning at its date. The final
//! sample of each realization has no following sample to diff against and is
//! forced to zero.

pub mod frequency;
pub mod naming;

#[cfg(test)]
mod tests;

pub use frequency::infer_frequency;
pub use naming::rename_vec_from_cum;

use crate::app::models::Frequency;
use crate::constants::{DATE_COLUMN, ENSEMBLE_COLUMN, KEY_COLUMNS, REAL_COLUMN};
use crate::{Error, Result};
use polars::prelude::*;
use tracing::debug;

/// Convert cumulative vectors to interval deltas or average daily rates
///
/// # Arguments
/// * `data` - Table with `ENSEMBLE`, `REAL`, `DATE` key columns and the
///   requested cumulative columns, sampled at `time_index_input`
/// * `column_keys` - Names of the cumulative columns to convert
/// * `time_index` - Requested output frequency, coarser than or equal to the
///   input frequency
/// * `time_index_input` - Declared sampling frequency of the input; verified
///   against the data, not assumed
/// * `as_rate` - Divide each interval delta by its day count to produce an
///   average daily rate
///
/// # Returns
/// A table with the key columns plus one derived column per requested
/// vector, named via [`rename_vec_from_cum`]. Division across a zero-day
/// interval produces NaN/inf rather than raising; the values propagate
/// visibly downstream.
pub fn calc_from_cumulatives(
    data: &DataFrame,
    column_keys: &[&str],
    time_index: Frequency,
    time_index_input: Frequency,
    as_rate: bool,
) -> Result<DataFrame> {
    for name in KEY_COLUMNS.iter().copied().chain(column_keys.iter().copied()) {
        if data.column(name).is_err() {
            return Err(Error::missing_column(name));
        }
    }

    frequency::verify_time_index(data, time_index, time_index_input)?;

    debug!(
        "Converting {} cumulative column(s) from {} to {} (as_rate={})",
        column_keys.len(),
        time_index_input,
        time_index,
        as_rate
    );

    let mut selection: Vec<&str> = KEY_COLUMNS.to_vec();
    selection.extend_from_slice(column_keys);
    let subset = data.select(selection)?;
    let sorted = subset.sort(
        [ENSEMBLE_COLUMN, REAL_COLUMN, DATE_COLUMN],
        SortMultipleOptions::default(),
    )?;

    let resampled = if time_index != time_index_input {
        resample_time_index(sorted, time_index)?
    } else {
        sorted
    };

    // Forward difference within each (ENSEMBLE, REAL) group: realizations
    // never bleed into each other's windows. The shift leaves the last row
    // of each group null, which the fill then forces to zero.
    let day_count = (col(DATE_COLUMN)
        .shift(lit(-1))
        .over([col(ENSEMBLE_COLUMN), col(REAL_COLUMN)])
        - col(DATE_COLUMN))
    .dt()
    .total_days();

    let mut calc_exprs: Vec<Expr> = Vec::with_capacity(column_keys.len());
    let mut out_names: Vec<String> = Vec::with_capacity(column_keys.len());
    for key in column_keys {
        let out_name = rename_vec_from_cum(key, as_rate);
        let delta = col(*key)
            .shift(lit(-1))
            .over([col(ENSEMBLE_COLUMN), col(REAL_COLUMN)])
            - col(*key);
        let expr = if as_rate {
            delta.cast(DataType::Float64) / day_count.clone().cast(DataType::Float64)
        } else {
            delta.cast(DataType::Float64)
        };
        calc_exprs.push(expr.fill_null(lit(0.0)).alias(out_name.as_str()));
        out_names.push(out_name);
    }

    let mut select_exprs = vec![col(ENSEMBLE_COLUMN), col(REAL_COLUMN), col(DATE_COLUMN)];
    select_exprs.extend(out_names.iter().map(|name| col(name.as_str())));

    let result = resampled
        .lazy()
        .with_columns(calc_exprs)
        .select(select_exprs)
        .collect()?;

    Ok(result)
}

/// Resample a sorted table to a coarser frequency by keeping the first
/// sample within each output period, independently per `(ENSEMBLE, REAL)`
///
/// The DATE of each kept row becomes the output period start.
fn resample_time_index(sorted: DataFrame, time_index: Frequency) -> Result<DataFrame> {
    let every = match time_index {
        Frequency::Daily => "1d",
        Frequency::Monthly => "1mo",
        Frequency::Yearly => "1y",
    };

    let truncated = sorted
        .lazy()
        .with_column(
            col(DATE_COLUMN)
                .dt()
                .truncate(lit(every))
                .alias(DATE_COLUMN),
        )
        .collect()?;

    let subset = [
        ENSEMBLE_COLUMN.to_string(),
        REAL_COLUMN.to_string(),
        DATE_COLUMN.to_string(),
    ];
    let resampled = truncated.unique_stable(Some(&subset), UniqueKeepStrategy::First, None)?;
    Ok(resampled)
}
