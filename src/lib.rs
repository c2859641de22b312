//! Ensemble Provider Library
//!
//! A Rust library for indexing reservoir simulation ensembles and serving
//! their data through a uniform addressing scheme.
//!
//! This library provides tools for:
//! - Addressing surfaces by attribute/name/date and realization or statistic
//! - Decoding per-column field metadata embedded by columnar stores
//! - Converting cumulative summary vectors to interval or average-rate form
//! - Computing cell-by-cell statistical surfaces across a realization set
//! - Scanning ensemble directory trees and caching assembled tables as Parquet
//! - Comprehensive error handling with descriptive validation failures

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod cumulative_calc;
        pub mod field_meta;
        pub mod summary_provider;
        pub mod surface_provider;
        pub mod surface_statistics;
    }
    pub mod adapters {
        pub mod filesystem;
        pub mod irap;
    }
}

// Re-export commonly used types
pub use app::models::{
    Frequency, GridGeometry, SurfaceAddress, SurfaceGrid, SurfaceStatistic, VectorMetadata,
};
pub use app::services::summary_provider::EnsembleSummaryProvider;
pub use app::services::surface_provider::EnsembleSurfaceProvider;
pub use config::{EnsembleLayout, StorageConfig};

/// Result type alias for the ensemble provider
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for ensemble provider operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Polars table operation failed
    #[error("Table operation error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// A mandatory table column is missing
    #[error("Required column '{column}' not found in table")]
    MissingColumn { column: String },

    /// Field metadata present but missing a required key
    #[error("Malformed field metadata for vector '{vector}': {message}")]
    MalformedMetadata { vector: String, message: String },

    /// Declared sampling frequency does not match the data
    #[error(
        "The DATE column does not have a sampling frequency matching the declared input \
         frequency '{declared}' (inferred: {inferred})"
    )]
    FrequencyMismatch { declared: String, inferred: String },

    /// Requested output frequency is finer than the input frequency
    #[error(
        "Invalid time index '{requested}': must be equal to or coarser than the input \
         frequency '{input}'"
    )]
    InvalidTimeIndex { requested: String, input: String },

    /// Surface grids differ in geometry where identical geometry is required
    #[error("Grid geometry mismatch: {details}")]
    GeometryMismatch { details: String },

    /// Surface file could not be parsed
    #[error("Surface format error in file '{path}': {message}")]
    SurfaceFormat { path: String, message: String },

    /// Ensemble root directory does not exist
    #[error("Ensemble not found at path: {path}")]
    EnsembleNotFound { path: std::path::PathBuf },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Date parsing error
    #[error("Date parsing error: {message}")]
    DateParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create a malformed metadata error
    pub fn malformed_metadata(vector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            vector: vector.into(),
            message: message.into(),
        }
    }

    /// Create a frequency mismatch error
    pub fn frequency_mismatch(declared: impl Into<String>, inferred: impl Into<String>) -> Self {
        Self::FrequencyMismatch {
            declared: declared.into(),
            inferred: inferred.into(),
        }
    }

    /// Create an invalid time index error
    pub fn invalid_time_index(requested: impl Into<String>, input: impl Into<String>) -> Self {
        Self::InvalidTimeIndex {
            requested: requested.into(),
            input: input.into(),
        }
    }

    /// Create a geometry mismatch error
    pub fn geometry_mismatch(details: impl Into<String>) -> Self {
        Self::GeometryMismatch {
            details: details.into(),
        }
    }

    /// Create a surface format error
    pub fn surface_format(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SurfaceFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateParsing {
            message: "Date parsing failed".to_string(),
            source: error,
        }
    }
}
