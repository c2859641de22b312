//! Configuration objects for provider construction.
//!
//! Providers receive an explicitly constructed configuration scoped to one
//! provider instance; there is no global registry or ambient state. A
//! configuration is built by the caller, validated once, and passed down.

use crate::constants;
use crate::Result;
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Storage and caching configuration for ensemble loaders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for cached Parquet tables; `None` disables caching
    pub cache_dir: Option<PathBuf>,

    /// Rebuild cached tables even when an up-to-date cache entry exists
    pub rebuild_cache: bool,

    /// Compression algorithm for written Parquet files
    pub compression: CompressionAlgorithm,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            rebuild_cache: false,
            compression: CompressionAlgorithm::Snappy,
        }
    }
}

impl StorageConfig {
    /// Create a configuration caching into the given directory
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(cache_dir.into()),
            ..Default::default()
        }
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.cache_dir {
            if dir.as_os_str().is_empty() {
                return Err(crate::Error::data_validation(
                    "Cache directory path cannot be empty".to_string(),
                ));
            }
        }
        debug!("Validated storage config: {:?}", self);
        Ok(())
    }
}

/// Supported compression algorithms for cached Parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Fast compression, good general-purpose default
    Snappy,
    /// Higher compression ratio at higher CPU cost
    Zstd,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Map to the polars Parquet compression setting
    pub fn to_parquet_compression(self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Relative layout of an ensemble directory tree
///
/// The defaults follow the conventional FMU-style realization structure; a
/// non-standard tree can be described by overriding individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleLayout {
    /// Simulated surface directory, relative to each realization directory
    pub surface_dir: PathBuf,

    /// Observed surface directory, relative to the ensemble root
    pub observed_surface_dir: PathBuf,

    /// Summary table file, relative to each realization directory
    pub summary_table: PathBuf,
}

impl Default for EnsembleLayout {
    fn default() -> Self {
        Self {
            surface_dir: PathBuf::from(constants::SURFACE_DIR_REL),
            observed_surface_dir: PathBuf::from(constants::OBSERVED_SURFACE_DIR_REL),
            summary_table: PathBuf::from(constants::SUMMARY_TABLE_REL),
        }
    }
}
