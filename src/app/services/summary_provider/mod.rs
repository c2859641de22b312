//! Ensemble summary-vector provider interface and backends
//!
//! A summary provider indexes one ensemble's per-realization time-series
//! vectors and serves slices of them as tables keyed by
//! `(ENSEMBLE, REAL, DATE)`. Callers depend only on the
//! [`EnsembleSummaryProvider`] trait.

pub mod loader;
pub mod table;

pub use loader::load_ensemble_summary;
pub use table::TableSummaryProvider;

use crate::app::models::VectorMetadata;
use crate::Result;
use chrono::NaiveDate;
use polars::prelude::DataFrame;

/// Contract a concrete summary backing store must satisfy
///
/// Each operation is a pure query against already-indexed data. The indexed
/// table is immutable for the provider's lifetime; a refreshed table means a
/// new provider instance.
pub trait EnsembleSummaryProvider: Send + Sync {
    /// All vector (non-key) column names, sorted
    fn vector_names(&self) -> Vec<String>;

    /// Decoded metadata for one vector; `None` when the column carries no or
    /// insufficient metadata
    fn vector_metadata(&self, vector_name: &str) -> Option<VectorMetadata>;

    /// All realization indices present
    fn realizations(&self) -> Vec<i32>;

    /// All distinct dates present, ascending, across all realizations
    fn dates(&self) -> Vec<NaiveDate>;

    /// Table of the requested vectors plus key columns, optionally filtered
    /// to a realization subset
    fn get_vectors_df(
        &self,
        vector_names: &[&str],
        realizations: Option<&[i32]>,
    ) -> Result<DataFrame>;

    /// Same as [`get_vectors_df`](Self::get_vectors_df) restricted to a
    /// single date
    fn get_vectors_for_date_df(
        &self,
        date: NaiveDate,
        vector_names: &[&str],
        realizations: Option<&[i32]>,
    ) -> Result<DataFrame>;
}
