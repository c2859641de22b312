//! Ensemble directory tree discovery
//!
//! An ensemble root contains one `realization-<N>` directory per member run.
//! Simulated surfaces live under each realization's `share/results/maps/`,
//! observed surfaces under the ensemble-level `share/observations/maps/`,
//! and summary tables under `share/results/tables/`. Surface file stems
//! follow the `<name>--<attribute>[--<YYYYMMDD>]` convention.

use crate::constants::{
    REALIZATION_DIR_PATTERN, SURFACE_DATE_FORMAT, SURFACE_EXTENSION, SURFACE_STEM_SEPARATOR,
};
use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;
use walkdir::WalkDir;

/// One discovered realization directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealizationDir {
    /// Realization index parsed from the directory name
    pub index: i32,

    /// Absolute path of the realization directory
    pub path: PathBuf,
}

/// One discovered surface file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceFileInfo {
    /// Surface name (first stem part)
    pub name: String,

    /// Attribute (second stem part)
    pub attribute: String,

    /// Date (third stem part), absent for static surfaces
    pub date: Option<NaiveDate>,

    /// Absolute path of the surface file
    pub path: PathBuf,
}

fn realization_dir_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(REALIZATION_DIR_PATTERN).expect("realization directory pattern is valid")
    })
}

/// Discover the realization directories of an ensemble root
///
/// Only immediate subdirectories matching `realization-<N>` are considered;
/// the result is sorted by realization index. A missing ensemble root is an
/// error, an ensemble without matching subdirectories is simply empty.
pub fn discover_realizations(ensemble_path: &Path) -> Result<Vec<RealizationDir>> {
    if !ensemble_path.is_dir() {
        return Err(Error::EnsembleNotFound {
            path: ensemble_path.to_path_buf(),
        });
    }

    let mut realizations = Vec::new();
    for entry in std::fs::read_dir(ensemble_path)
        .map_err(|e| Error::io(format!("Failed to list {}", ensemble_path.display()), e))?
    {
        let entry =
            entry.map_err(|e| Error::io(format!("Failed to list {}", ensemble_path.display()), e))?;
        if !entry.path().is_dir() {
            continue;
        }
        let dir_name = entry.file_name();
        let Some(dir_name) = dir_name.to_str() else {
            continue;
        };
        if let Some(captures) = realization_dir_regex().captures(dir_name) {
            let index: i32 = captures[1].parse().map_err(|_| {
                Error::data_validation(format!(
                    "Realization index out of range in directory '{}'",
                    dir_name
                ))
            })?;
            realizations.push(RealizationDir {
                index,
                path: entry.path(),
            });
        }
    }

    realizations.sort_by_key(|r| r.index);
    debug!(
        "Discovered {} realization(s) under {}",
        realizations.len(),
        ensemble_path.display()
    );
    Ok(realizations)
}

/// List the surface files directly inside a directory
///
/// A missing directory yields an empty list (a realization without exported
/// surfaces is normal); files whose stems do not parse are skipped.
pub fn list_surface_files(dir: &Path) -> Result<Vec<SurfaceFileInfo>> {
    if !dir.is_dir() {
        debug!("No surface directory at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut surfaces = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SURFACE_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match parse_surface_stem(stem) {
            Some((name, attribute, date)) => surfaces.push(SurfaceFileInfo {
                name,
                attribute,
                date,
                path: path.to_path_buf(),
            }),
            None => {
                debug!("Skipping unparsable surface file name: {}", path.display());
            }
        }
    }

    surfaces.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(surfaces)
}

/// Parse a surface file stem of the form `<name>--<attribute>[--<YYYYMMDD>]`
pub fn parse_surface_stem(stem: &str) -> Option<(String, String, Option<NaiveDate>)> {
    let parts: Vec<&str> = stem.split(SURFACE_STEM_SEPARATOR).collect();
    match parts.as_slice() {
        [name, attribute] if !name.is_empty() && !attribute.is_empty() => {
            Some((name.to_string(), attribute.to_string(), None))
        }
        [name, attribute, datestr] if !name.is_empty() && !attribute.is_empty() => {
            let date = NaiveDate::parse_from_str(datestr, SURFACE_DATE_FORMAT).ok()?;
            Some((name.to_string(), attribute.to_string(), Some(date)))
        }
        _ => None,
    }
}

/// Build the canonical surface file name for the given address components
pub fn surface_file_name(name: &str, attribute: &str, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!(
            "{name}{sep}{attribute}{sep}{date}.{ext}",
            sep = SURFACE_STEM_SEPARATOR,
            date = date.format(SURFACE_DATE_FORMAT),
            ext = SURFACE_EXTENSION,
        ),
        None => format!(
            "{name}{sep}{attribute}.{ext}",
            sep = SURFACE_STEM_SEPARATOR,
            ext = SURFACE_EXTENSION,
        ),
    }
}
