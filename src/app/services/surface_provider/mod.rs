//! Ensemble surface provider interface and backends
//!
//! A surface provider indexes one ensemble's worth of surface grids and
//! resolves [`SurfaceAddress`] values against it. Callers depend only on the
//! [`EnsembleSurfaceProvider`] trait; the concrete backends (in-memory store,
//! flat-file ensemble scan) implement it independently, and
//! [`CachedSurfaceProvider`] layers statistical-surface memoization over any
//! of them.

pub mod cached;
pub mod filesystem;
pub mod memory;

pub use cached::CachedSurfaceProvider;
pub use filesystem::FilesystemSurfaceProvider;
pub use memory::InMemorySurfaceProvider;

use crate::app::models::{StatisticalSurfaceAddress, SurfaceAddress, SurfaceGrid};
use crate::app::services::surface_statistics::compute_statistical_surface;
use crate::Result;
use chrono::NaiveDate;

/// Contract a concrete surface backing store must satisfy
///
/// Each operation is a pure query against already-indexed data; the only
/// implied latency is "may read from disk". Lookup misses are absences
/// (`Ok(None)`), not exceptions; only inconsistent data (geometry mismatch
/// within a statistical aggregate) or I/O failures raise.
pub trait EnsembleSurfaceProvider: Send + Sync {
    /// All distinct attribute names known to the ensemble
    fn attributes(&self) -> Vec<String>;

    /// Surface names available for one attribute
    fn surface_names_for_attribute(&self, attribute: &str) -> Vec<String>;

    /// Surface dates available for one attribute; `None` when the attribute
    /// is static (carries no dates) or unknown
    fn surface_dates_for_attribute(&self, attribute: &str) -> Option<Vec<NaiveDate>>;

    /// All realization indices present in the ensemble
    fn realizations(&self) -> Vec<i32>;

    /// Resolve an address to a concrete surface grid
    ///
    /// For a statistical address the provider computes the requested
    /// aggregate across exactly the listed realizations; if any listed
    /// realization has no matching surface the lookup is a miss.
    fn get_surface(&self, address: &SurfaceAddress) -> Result<Option<SurfaceGrid>>;
}

/// Resolve a statistical address by fetching each listed realization's
/// surface and aggregating
///
/// Shared by the concrete backends: any listed realization without a surface
/// makes the whole lookup a miss, while geometry inconsistency among the
/// fetched surfaces is a hard error from the aggregation.
pub(crate) fn resolve_statistical<F>(
    address: &StatisticalSurfaceAddress,
    mut fetch: F,
) -> Result<Option<SurfaceGrid>>
where
    F: FnMut(i32) -> Result<Option<SurfaceGrid>>,
{
    let mut surfaces = Vec::with_capacity(address.realizations.len());
    for &realization in &address.realizations {
        match fetch(realization)? {
            Some(surface) => surfaces.push(surface),
            None => return Ok(None),
        }
    }
    compute_statistical_surface(address.statistic, &surfaces).map(Some)
}
