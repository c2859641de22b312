//! Flat-file surface provider backend
//!
//! Indexes an ensemble directory tree once at construction and reads surface
//! files on demand. Simulated surfaces are discovered per realization under
//! the layout's surface directory, observed surfaces under the
//! ensemble-level observation directory.

use super::{resolve_statistical, EnsembleSurfaceProvider};
use crate::app::adapters::filesystem::{discover_realizations, list_surface_files};
use crate::app::adapters::irap;
use crate::app::models::{SurfaceAddress, SurfaceGrid};
use crate::config::EnsembleLayout;
use crate::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// One indexed surface file
#[derive(Debug, Clone)]
struct IndexEntry {
    attribute: String,
    name: String,
    date: Option<NaiveDate>,
    /// `None` for observed surfaces
    realization: Option<i32>,
    path: PathBuf,
}

/// Surface provider over a scanned ensemble directory tree
#[derive(Debug)]
pub struct FilesystemSurfaceProvider {
    realizations: Vec<i32>,
    entries: Vec<IndexEntry>,
}

impl FilesystemSurfaceProvider {
    /// Scan an ensemble root and build the surface index
    ///
    /// Surface files themselves are read lazily on lookup; only the
    /// directory structure and file names are touched here.
    pub fn scan(ensemble_path: &Path, layout: &EnsembleLayout) -> Result<Self> {
        let realization_dirs = discover_realizations(ensemble_path)?;

        let mut entries = Vec::new();
        for realization in &realization_dirs {
            let surface_dir = realization.path.join(&layout.surface_dir);
            for file in list_surface_files(&surface_dir)? {
                entries.push(IndexEntry {
                    attribute: file.attribute,
                    name: file.name,
                    date: file.date,
                    realization: Some(realization.index),
                    path: file.path,
                });
            }
        }

        let observed_dir = ensemble_path.join(&layout.observed_surface_dir);
        for file in list_surface_files(&observed_dir)? {
            entries.push(IndexEntry {
                attribute: file.attribute,
                name: file.name,
                date: file.date,
                realization: None,
                path: file.path,
            });
        }

        info!(
            "Indexed {} surface file(s) across {} realization(s) under {}",
            entries.len(),
            realization_dirs.len(),
            ensemble_path.display()
        );

        Ok(Self {
            realizations: realization_dirs.iter().map(|r| r.index).collect(),
            entries,
        })
    }

    fn find_entry(
        &self,
        attribute: &str,
        name: &str,
        date: Option<NaiveDate>,
        realization: Option<i32>,
    ) -> Option<&IndexEntry> {
        self.entries.iter().find(|entry| {
            entry.attribute == attribute
                && entry.name == name
                && entry.date == date
                && entry.realization == realization
        })
    }

    fn load_entry(&self, entry: Option<&IndexEntry>) -> Result<Option<SurfaceGrid>> {
        match entry {
            Some(entry) => irap::read_surface(&entry.path).map(Some),
            None => Ok(None),
        }
    }
}

impl EnsembleSurfaceProvider for FilesystemSurfaceProvider {
    fn attributes(&self) -> Vec<String> {
        let mut attributes: Vec<String> =
            self.entries.iter().map(|e| e.attribute.clone()).collect();
        attributes.sort();
        attributes.dedup();
        attributes
    }

    fn surface_names_for_attribute(&self, attribute: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.attribute == attribute)
            .map(|e| e.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn surface_dates_for_attribute(&self, attribute: &str) -> Option<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self
            .entries
            .iter()
            .filter(|e| e.attribute == attribute)
            .filter_map(|e| e.date)
            .collect();
        if dates.is_empty() {
            return None;
        }
        dates.sort();
        dates.dedup();
        Some(dates)
    }

    fn realizations(&self) -> Vec<i32> {
        self.realizations.clone()
    }

    fn get_surface(&self, address: &SurfaceAddress) -> Result<Option<SurfaceGrid>> {
        address.validate()?;
        match address {
            SurfaceAddress::Observed(a) => {
                self.load_entry(self.find_entry(&a.attribute, &a.name, a.date, None))
            }
            SurfaceAddress::Simulated(a) => self.load_entry(self.find_entry(
                &a.attribute,
                &a.name,
                a.date,
                Some(a.realization),
            )),
            SurfaceAddress::Statistical(a) => resolve_statistical(a, |realization| {
                self.load_entry(self.find_entry(&a.attribute, &a.name, a.date, Some(realization)))
            }),
        }
    }
}
