//! In-memory surface provider backend
//!
//! Holds explicitly registered surfaces. Used as the reference backend in
//! tests and wherever surfaces are produced in memory rather than scanned
//! from an ensemble tree.

use super::{resolve_statistical, EnsembleSurfaceProvider};
use crate::app::models::{SurfaceAddress, SurfaceGrid};
use crate::Result;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Key shared by observed and simulated surface entries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SurfaceKey {
    attribute: String,
    name: String,
    date: Option<NaiveDate>,
}

/// Surface provider over explicitly registered in-memory surfaces
#[derive(Debug, Default)]
pub struct InMemorySurfaceProvider {
    observed: HashMap<SurfaceKey, SurfaceGrid>,
    simulated: HashMap<(SurfaceKey, i32), SurfaceGrid>,
}

impl InMemorySurfaceProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observed surface
    pub fn add_observed(
        &mut self,
        attribute: impl Into<String>,
        name: impl Into<String>,
        date: Option<NaiveDate>,
        surface: SurfaceGrid,
    ) {
        self.observed.insert(
            SurfaceKey {
                attribute: attribute.into(),
                name: name.into(),
                date,
            },
            surface,
        );
    }

    /// Register one realization's simulated surface
    pub fn add_simulated(
        &mut self,
        attribute: impl Into<String>,
        name: impl Into<String>,
        date: Option<NaiveDate>,
        realization: i32,
        surface: SurfaceGrid,
    ) {
        self.simulated.insert(
            (
                SurfaceKey {
                    attribute: attribute.into(),
                    name: name.into(),
                    date,
                },
                realization,
            ),
            surface,
        );
    }

    fn keys(&self) -> impl Iterator<Item = &SurfaceKey> {
        self.observed
            .keys()
            .chain(self.simulated.keys().map(|(key, _)| key))
    }

    fn fetch_simulated(
        &self,
        attribute: &str,
        name: &str,
        date: Option<NaiveDate>,
        realization: i32,
    ) -> Option<&SurfaceGrid> {
        let key = SurfaceKey {
            attribute: attribute.to_string(),
            name: name.to_string(),
            date,
        };
        self.simulated.get(&(key, realization))
    }
}

impl EnsembleSurfaceProvider for InMemorySurfaceProvider {
    fn attributes(&self) -> Vec<String> {
        let mut attributes: Vec<String> = self.keys().map(|k| k.attribute.clone()).collect();
        attributes.sort();
        attributes.dedup();
        attributes
    }

    fn surface_names_for_attribute(&self, attribute: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .keys()
            .filter(|k| k.attribute == attribute)
            .map(|k| k.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn surface_dates_for_attribute(&self, attribute: &str) -> Option<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self
            .keys()
            .filter(|k| k.attribute == attribute)
            .filter_map(|k| k.date)
            .collect();
        if dates.is_empty() {
            return None;
        }
        dates.sort();
        dates.dedup();
        Some(dates)
    }

    fn realizations(&self) -> Vec<i32> {
        let mut reals: Vec<i32> = self.simulated.keys().map(|(_, real)| *real).collect();
        reals.sort_unstable();
        reals.dedup();
        reals
    }

    fn get_surface(&self, address: &SurfaceAddress) -> Result<Option<SurfaceGrid>> {
        address.validate()?;
        match address {
            SurfaceAddress::Observed(a) => {
                let key = SurfaceKey {
                    attribute: a.attribute.clone(),
                    name: a.name.clone(),
                    date: a.date,
                };
                Ok(self.observed.get(&key).cloned())
            }
            SurfaceAddress::Simulated(a) => Ok(self
                .fetch_simulated(&a.attribute, &a.name, a.date, a.realization)
                .cloned()),
            SurfaceAddress::Statistical(a) => resolve_statistical(a, |realization| {
                Ok(self
                    .fetch_simulated(&a.attribute, &a.name, a.date, realization)
                    .cloned())
            }),
        }
    }
}
