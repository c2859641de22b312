//! Table-backed summary provider
//!
//! Serves vectors from one in-memory ensemble table plus an optional
//! per-column field-metadata map. The table is validated and normalized once
//! at construction (key columns present, `REAL` as 32-bit integers, rows
//! sorted by realization and date, a single supported sampling frequency)
//! and treated as read-only afterwards.

use super::EnsembleSummaryProvider;
use crate::app::models::{FieldMeta, Frequency, VectorMetadata};
use crate::app::services::cumulative_calc::frequency::date_column_to_naive;
use crate::app::services::cumulative_calc::infer_frequency;
use crate::app::services::field_meta::{is_rate_from_field_meta, vector_metadata_from_field_meta};
use crate::constants::{DATE_COLUMN, KEY_COLUMNS, REAL_COLUMN};
use crate::{Error, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Summary provider over one ensemble's assembled table
#[derive(Debug)]
pub struct TableSummaryProvider {
    table: DataFrame,
    field_meta: HashMap<String, FieldMeta>,
    frequency: Frequency,
    realizations: Vec<i32>,
    dates: Vec<NaiveDate>,
}

impl TableSummaryProvider {
    /// Build a provider from an assembled table and per-column metadata
    ///
    /// Rejects tables with missing key columns, null or non-Date dates, or
    /// dates that do not classify to a single supported frequency.
    pub fn new(table: DataFrame, field_meta: HashMap<String, FieldMeta>) -> Result<Self> {
        for name in KEY_COLUMNS {
            if table.column(name).is_err() {
                return Err(Error::missing_column(*name));
            }
        }

        let table = table
            .lazy()
            .with_column(col(REAL_COLUMN).cast(DataType::Int32))
            .collect()?
            .sort(KEY_COLUMNS.to_vec(), SortMultipleOptions::default())?;

        let all_dates = date_column_to_naive(&table)?;
        let frequency = infer_frequency(&all_dates).ok_or_else(|| {
            Error::data_validation(
                "The DATE column does not classify to a single supported sampling frequency \
                 (daily, monthly or yearly)"
                    .to_string(),
            )
        })?;

        let mut dates = all_dates;
        dates.sort_unstable();
        dates.dedup();

        let mut realizations: Vec<i32> = table
            .column(REAL_COLUMN)?
            .as_materialized_series()
            .i32()?
            .into_no_null_iter()
            .collect();
        realizations.sort_unstable();
        realizations.dedup();

        debug!(
            "Indexed summary table: {} row(s), {} realization(s), {} sampling",
            table.height(),
            realizations.len(),
            frequency
        );

        Ok(Self {
            table,
            field_meta,
            frequency,
            realizations,
            dates,
        })
    }

    /// Sampling frequency of the indexed table
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Whether a vector is a rate, from its field metadata
    ///
    /// A vector without any metadata is not a rate; a vector whose metadata
    /// lacks the `is_rate` key is malformed and raises.
    pub fn vector_is_rate(&self, vector_name: &str) -> Result<bool> {
        match self.field_meta.get(vector_name) {
            Some(meta) => is_rate_from_field_meta(vector_name, meta),
            None => Ok(false),
        }
    }

    fn select_vectors(&self, vector_names: &[&str]) -> Result<DataFrame> {
        for name in vector_names {
            if self.table.column(name).is_err() {
                return Err(Error::missing_column(*name));
            }
        }
        let mut selection: Vec<&str> = KEY_COLUMNS.to_vec();
        selection.extend_from_slice(vector_names);
        Ok(self.table.select(selection)?)
    }

    fn filter_realizations(&self, df: DataFrame, realizations: &[i32]) -> Result<DataFrame> {
        let wanted: HashSet<i32> = realizations.iter().copied().collect();
        let mask: BooleanChunked = df
            .column(REAL_COLUMN)?
            .as_materialized_series()
            .i32()?
            .into_iter()
            .map(|value| value.map(|real| wanted.contains(&real)))
            .collect();
        Ok(df.filter(&mask)?)
    }

    fn filter_date(&self, df: DataFrame, date: NaiveDate) -> Result<DataFrame> {
        let mask: BooleanChunked = df
            .column(DATE_COLUMN)?
            .as_materialized_series()
            .date()?
            .as_date_iter()
            .map(|value| value.map(|d| d == date))
            .collect();
        Ok(df.filter(&mask)?)
    }
}

impl EnsembleSummaryProvider for TableSummaryProvider {
    fn vector_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .table
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .filter(|name| !KEY_COLUMNS.contains(&name.as_str()))
            .collect();
        names.sort();
        names
    }

    fn vector_metadata(&self, vector_name: &str) -> Option<VectorMetadata> {
        self.field_meta
            .get(vector_name)
            .and_then(vector_metadata_from_field_meta)
    }

    fn realizations(&self) -> Vec<i32> {
        self.realizations.clone()
    }

    fn dates(&self) -> Vec<NaiveDate> {
        self.dates.clone()
    }

    fn get_vectors_df(
        &self,
        vector_names: &[&str],
        realizations: Option<&[i32]>,
    ) -> Result<DataFrame> {
        let df = self.select_vectors(vector_names)?;
        match realizations {
            Some(wanted) => self.filter_realizations(df, wanted),
            None => Ok(df),
        }
    }

    fn get_vectors_for_date_df(
        &self,
        date: NaiveDate,
        vector_names: &[&str],
        realizations: Option<&[i32]>,
    ) -> Result<DataFrame> {
        let df = self.get_vectors_df(vector_names, realizations)?;
        self.filter_date(df, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::field_meta::field_meta_from_vector_metadata;
    use crate::constants::ENSEMBLE_COLUMN;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_table() -> DataFrame {
        let dates = vec![
            ymd(2020, 1, 1),
            ymd(2020, 2, 1),
            ymd(2020, 3, 1),
            ymd(2020, 1, 1),
            ymd(2020, 2, 1),
            ymd(2020, 3, 1),
        ];
        let columns: Vec<Column> = vec![
            Series::new(ENSEMBLE_COLUMN.into(), vec!["iter-0"; 6]).into(),
            Series::new(REAL_COLUMN.into(), vec![0, 0, 0, 1, 1, 1]).into(),
            DateChunked::from_naive_date(DATE_COLUMN.into(), dates)
                .into_series()
                .into(),
            Series::new("FOPT".into(), vec![0.0, 10.0, 20.0, 0.0, 5.0, 15.0]).into(),
            Series::new("FOPR".into(), vec![1.0; 6]).into(),
        ];
        DataFrame::new(columns).unwrap()
    }

    fn rate_meta() -> HashMap<String, FieldMeta> {
        let metadata = VectorMetadata {
            unit: "SM3/DAY".to_string(),
            is_total: false,
            is_rate: true,
            is_historical: false,
            keyword: "FOPR".to_string(),
            wgname: None,
            get_num: None,
        };
        let mut map = HashMap::new();
        map.insert("FOPR".to_string(), field_meta_from_vector_metadata(&metadata));
        map
    }

    #[test]
    fn test_construction_and_enumerations() {
        let provider = TableSummaryProvider::new(sample_table(), rate_meta()).unwrap();
        assert_eq!(provider.vector_names(), vec!["FOPR", "FOPT"]);
        assert_eq!(provider.realizations(), vec![0, 1]);
        assert_eq!(
            provider.dates(),
            vec![ymd(2020, 1, 1), ymd(2020, 2, 1), ymd(2020, 3, 1)]
        );
        assert_eq!(provider.frequency(), Frequency::Monthly);
    }

    #[test]
    fn test_missing_key_column_rejected() {
        let table = sample_table().drop(REAL_COLUMN).unwrap();
        let result = TableSummaryProvider::new(table, HashMap::new());
        assert!(matches!(result, Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn test_mixed_frequency_rejected() {
        let dates = vec![ymd(2020, 1, 1), ymd(2020, 2, 1), ymd(2020, 2, 15)];
        let columns: Vec<Column> = vec![
            Series::new(ENSEMBLE_COLUMN.into(), vec!["iter-0"; 3]).into(),
            Series::new(REAL_COLUMN.into(), vec![0, 0, 0]).into(),
            DateChunked::from_naive_date(DATE_COLUMN.into(), dates)
                .into_series()
                .into(),
            Series::new("FOPT".into(), vec![0.0, 1.0, 2.0]).into(),
        ];
        let table = DataFrame::new(columns).unwrap();
        assert!(TableSummaryProvider::new(table, HashMap::new()).is_err());
    }

    #[test]
    fn test_vector_metadata_decoding() {
        let provider = TableSummaryProvider::new(sample_table(), rate_meta()).unwrap();
        let metadata = provider.vector_metadata("FOPR").unwrap();
        assert!(metadata.is_rate);
        assert_eq!(metadata.unit, "SM3/DAY");
        // No metadata registered for FOPT
        assert!(provider.vector_metadata("FOPT").is_none());
    }

    #[test]
    fn test_vector_is_rate_paths() {
        let provider = TableSummaryProvider::new(sample_table(), rate_meta()).unwrap();
        assert!(provider.vector_is_rate("FOPR").unwrap());
        // No metadata at all: false, not an error
        assert!(!provider.vector_is_rate("FOPT").unwrap());

        // Metadata present but missing is_rate: malformed
        let mut broken = rate_meta();
        broken
            .get_mut("FOPR")
            .unwrap()
            .remove(&b"is_rate".to_vec());
        let provider = TableSummaryProvider::new(sample_table(), broken).unwrap();
        assert!(matches!(
            provider.vector_is_rate("FOPR"),
            Err(Error::MalformedMetadata { .. })
        ));
    }

    #[test]
    fn test_get_vectors_df_with_realization_filter() {
        let provider = TableSummaryProvider::new(sample_table(), HashMap::new()).unwrap();
        let df = provider.get_vectors_df(&["FOPT"], Some(&[1])).unwrap();
        assert_eq!(df.height(), 3);
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["ENSEMBLE", "REAL", "DATE", "FOPT"]);

        let reals: Vec<i32> = df
            .column(REAL_COLUMN)
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert!(reals.iter().all(|&r| r == 1));
    }

    #[test]
    fn test_get_vectors_for_date_df() {
        let provider = TableSummaryProvider::new(sample_table(), HashMap::new()).unwrap();
        let df = provider
            .get_vectors_for_date_df(ymd(2020, 2, 1), &["FOPT"], None)
            .unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_unknown_vector_is_an_error() {
        let provider = TableSummaryProvider::new(sample_table(), HashMap::new()).unwrap();
        let result = provider.get_vectors_df(&["FGPT"], None);
        assert!(matches!(result, Err(Error::MissingColumn { .. })));
    }
}
