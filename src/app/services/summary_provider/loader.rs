//! Per-realization summary loading with a content-addressed Parquet cache
//!
//! Scans an ensemble tree for per-realization summary CSV files, stamps each
//! with its `REAL` and `ENSEMBLE` keys, and concatenates them into one
//! table. Assembling a large ensemble is dominated by CSV parsing, so the
//! assembled table is cached as Parquet keyed by a content address over the
//! input files (path, size, mtime): unchanged inputs hit the cache, any
//! change produces a new key and a rebuild. A JSON manifest recording the
//! inputs is written next to each cache entry.

use super::table::TableSummaryProvider;
use crate::app::adapters::filesystem::discover_realizations;
use crate::config::{EnsembleLayout, StorageConfig};
use crate::constants::{
    CACHE_FILE_PREFIX, CACHE_MANIFEST_SUFFIX, DATE_COLUMN, ENSEMBLE_COLUMN, KEY_COLUMNS,
    REAL_COLUMN,
};
use crate::{Error, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

/// One summary input file contributing to a cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheInput {
    realization: i32,
    path: String,
    size: u64,
    modified_secs: u64,
}

/// Manifest written next to each cached table
#[derive(Debug, Serialize, Deserialize)]
struct CacheManifest {
    ensemble: String,
    inputs: Vec<CacheInput>,
}

/// Load an ensemble's summary vectors from per-realization CSV files
///
/// Realizations without a summary table are skipped with a warning; an
/// ensemble yielding no tables at all is an error. The resulting provider
/// carries no field metadata (the CSV transport has no metadata
/// side-channel), so metadata queries report absence.
pub fn load_ensemble_summary(
    ensemble_name: &str,
    ensemble_path: &Path,
    layout: &EnsembleLayout,
    storage: &StorageConfig,
) -> Result<TableSummaryProvider> {
    storage.validate()?;

    let realizations = discover_realizations(ensemble_path)?;
    let mut inputs: Vec<CacheInput> = Vec::new();
    for realization in &realizations {
        let path = realization.path.join(&layout.summary_table);
        if !path.is_file() {
            warn!(
                "Realization {} has no summary table at {}",
                realization.index,
                path.display()
            );
            continue;
        }
        let metadata = std::fs::metadata(&path)
            .map_err(|e| Error::io(format!("Failed to stat {}", path.display()), e))?;
        let modified_secs = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|duration| duration.as_secs())
            .unwrap_or(0);
        inputs.push(CacheInput {
            realization: realization.index,
            path: path.to_string_lossy().into_owned(),
            size: metadata.len(),
            modified_secs,
        });
    }

    if inputs.is_empty() {
        return Err(Error::data_validation(format!(
            "No summary tables found under {}",
            ensemble_path.display()
        )));
    }

    if let Some(cache_dir) = &storage.cache_dir {
        let cache_path = cache_file_path(cache_dir, ensemble_name, &inputs);
        if cache_path.is_file() && !storage.rebuild_cache {
            info!("Summary cache hit: {}", cache_path.display());
            let table = read_cached_table(&cache_path)?;
            return TableSummaryProvider::new(table, HashMap::new());
        }

        let table = assemble_table(ensemble_name, &inputs)?;
        write_cache(&cache_path, ensemble_name, &inputs, &table, storage)?;
        return TableSummaryProvider::new(table, HashMap::new());
    }

    let table = assemble_table(ensemble_name, &inputs)?;
    TableSummaryProvider::new(table, HashMap::new())
}

/// Read and stamp every input CSV, then concatenate
fn assemble_table(ensemble_name: &str, inputs: &[CacheInput]) -> Result<DataFrame> {
    let mut frames = Vec::with_capacity(inputs.len());
    for input in inputs {
        debug!(
            "Reading summary table for realization {}: {}",
            input.realization, input.path
        );
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(PathBuf::from(&input.path)))?
            .finish()?;

        if frame.column(DATE_COLUMN).is_err() {
            return Err(Error::missing_column(DATE_COLUMN));
        }

        let frame = frame
            .lazy()
            .with_columns([
                lit(ensemble_name).alias(ENSEMBLE_COLUMN),
                lit(input.realization).cast(DataType::Int32).alias(REAL_COLUMN),
                col(DATE_COLUMN).cast(DataType::Date),
            ])
            .collect()?;
        frames.push(frame);
    }

    let table = polars::functions::concat_df_diagonal(&frames)?
        .sort(KEY_COLUMNS.to_vec(), SortMultipleOptions::default())?;
    info!(
        "Assembled summary table: {} row(s) from {} realization(s)",
        table.height(),
        inputs.len()
    );
    Ok(table)
}

/// Content-addressed cache file path for a set of inputs
fn cache_file_path(cache_dir: &Path, ensemble_name: &str, inputs: &[CacheInput]) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    ensemble_name.hash(&mut hasher);
    for input in inputs {
        input.realization.hash(&mut hasher);
        input.path.hash(&mut hasher);
        input.size.hash(&mut hasher);
        input.modified_secs.hash(&mut hasher);
    }
    cache_dir.join(format!(
        "{}{}_{:016x}.parquet",
        CACHE_FILE_PREFIX,
        ensemble_name,
        hasher.finish()
    ))
}

fn read_cached_table(cache_path: &Path) -> Result<DataFrame> {
    let file = std::fs::File::open(cache_path)
        .map_err(|e| Error::io(format!("Failed to open cache {}", cache_path.display()), e))?;
    Ok(ParquetReader::new(file).finish()?)
}

fn write_cache(
    cache_path: &Path,
    ensemble_name: &str,
    inputs: &[CacheInput],
    table: &DataFrame,
    storage: &StorageConfig,
) -> Result<()> {
    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("Failed to create cache dir {}", parent.display()), e))?;
    }

    let file = std::fs::File::create(cache_path)
        .map_err(|e| Error::io(format!("Failed to create cache {}", cache_path.display()), e))?;
    let mut to_write = table.clone();
    ParquetWriter::new(file)
        .with_compression(storage.compression.to_parquet_compression())
        .finish(&mut to_write)?;

    let manifest = CacheManifest {
        ensemble: ensemble_name.to_string(),
        inputs: inputs.to_vec(),
    };
    let manifest_path = manifest_file_path(cache_path);
    let manifest_json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| Error::data_validation(format!("Failed to encode cache manifest: {}", e)))?;
    std::fs::write(&manifest_path, manifest_json).map_err(|e| {
        Error::io(
            format!("Failed to write cache manifest {}", manifest_path.display()),
            e,
        )
    })?;

    info!("Wrote summary cache: {}", cache_path.display());
    Ok(())
}

fn manifest_file_path(cache_path: &Path) -> PathBuf {
    let mut name = cache_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(CACHE_MANIFEST_SUFFIX);
    cache_path.with_file_name(name)
}
