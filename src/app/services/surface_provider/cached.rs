//! Statistical-surface memoization
//!
//! Repeated interactive requests frequently re-address the same statistical
//! surface, and each computation loads and aggregates every listed
//! realization. This wrapper memoizes statistical lookups keyed by the full
//! address with at most one computation in flight per distinct address:
//! concurrent callers of the same address block on a per-address lock while
//! the first caller computes. Misses are cached like hits; errors are never
//! cached. There is no eviction: the cache lives and dies with the provider
//! instance.

use super::EnsembleSurfaceProvider;
use crate::app::models::{SurfaceAddress, SurfaceGrid};
use crate::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type CacheSlot = Arc<Mutex<Option<Option<SurfaceGrid>>>>;

/// Memoizing wrapper around any surface provider
#[derive(Debug)]
pub struct CachedSurfaceProvider<P> {
    inner: P,
    cache: Mutex<HashMap<SurfaceAddress, CacheSlot>>,
}

impl<P: EnsembleSurfaceProvider> CachedSurfaceProvider<P> {
    /// Wrap a provider with a statistical-surface cache
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached statistical results
    pub fn cached_count(&self) -> usize {
        lock(&self.cache).len()
    }

    /// Drop all cached results
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }

    /// Access the wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

/// Lock recovering from poisoning: a panicking computation must not wedge
/// every later lookup of the same address
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<P: EnsembleSurfaceProvider> EnsembleSurfaceProvider for CachedSurfaceProvider<P> {
    fn attributes(&self) -> Vec<String> {
        self.inner.attributes()
    }

    fn surface_names_for_attribute(&self, attribute: &str) -> Vec<String> {
        self.inner.surface_names_for_attribute(attribute)
    }

    fn surface_dates_for_attribute(&self, attribute: &str) -> Option<Vec<NaiveDate>> {
        self.inner.surface_dates_for_attribute(attribute)
    }

    fn realizations(&self) -> Vec<i32> {
        self.inner.realizations()
    }

    fn get_surface(&self, address: &SurfaceAddress) -> Result<Option<SurfaceGrid>> {
        if !matches!(address, SurfaceAddress::Statistical(_)) {
            return self.inner.get_surface(address);
        }

        // Take or create the per-address slot under the map lock, then
        // release the map lock before computing so distinct addresses do not
        // serialize behind each other.
        let slot = {
            let mut cache = lock(&self.cache);
            cache.entry(address.clone()).or_default().clone()
        };

        let mut slot_guard = lock(&slot);
        if let Some(cached) = slot_guard.as_ref() {
            debug!("Statistical surface cache hit");
            return Ok(cached.clone());
        }

        let computed = self.inner.get_surface(address)?;
        *slot_guard = Some(computed.clone());
        Ok(computed)
    }
}
