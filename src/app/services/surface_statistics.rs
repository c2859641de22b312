//! Cell-by-cell statistical aggregation of realization surfaces
//!
//! Computes an aggregate surface (mean, stddev, min, max, P10, P90) across a
//! set of realization surfaces sharing identical grid geometry. Aggregating
//! misaligned grids would silently corrupt results, so any geometry
//! difference is a hard failure rather than something to average past.
//!
//! Undefined cells (NaN) are excluded per cell; a cell undefined in every
//! contributing surface stays undefined in the result. Percentiles use the
//! nearest-rank method with P10 as the high case (the value exceeded by 10%
//! of the population) and P90 as the low case.

use crate::app::models::{SurfaceGrid, SurfaceStatistic};
use crate::{Error, Result};
use ndarray::Array2;
use tracing::debug;

/// Compute a statistical surface across realizations
///
/// All surfaces must share the geometry of the first; the result carries
/// that geometry.
pub fn compute_statistical_surface(
    statistic: SurfaceStatistic,
    surfaces: &[SurfaceGrid],
) -> Result<SurfaceGrid> {
    let first = surfaces.first().ok_or_else(|| {
        Error::data_validation(
            "Statistical surface computation requires at least one input surface".to_string(),
        )
    })?;

    for (index, surface) in surfaces.iter().enumerate().skip(1) {
        if surface.geometry != first.geometry {
            return Err(Error::geometry_mismatch(format!(
                "surface {} has geometry [{}], expected [{}]",
                index, surface.geometry, first.geometry
            )));
        }
    }

    debug!(
        "Computing {} across {} surface(s) of {}x{} cells",
        statistic,
        surfaces.len(),
        first.geometry.ncol,
        first.geometry.nrow
    );

    let mut cell_values: Vec<f64> = Vec::with_capacity(surfaces.len());
    let values = Array2::from_shape_fn((first.geometry.nrow, first.geometry.ncol), |cell| {
        cell_values.clear();
        cell_values.extend(
            surfaces
                .iter()
                .map(|surface| surface.values[cell])
                .filter(|v| !v.is_nan()),
        );
        if cell_values.is_empty() {
            return f64::NAN;
        }
        match statistic {
            SurfaceStatistic::Mean => mean(&cell_values),
            SurfaceStatistic::StdDev => population_stddev(&cell_values),
            SurfaceStatistic::Min => cell_values.iter().copied().fold(f64::INFINITY, f64::min),
            SurfaceStatistic::Max => cell_values
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
            SurfaceStatistic::P10 => {
                sort_defined(&mut cell_values);
                nearest_rank(&cell_values, 90.0)
            }
            SurfaceStatistic::P90 => {
                sort_defined(&mut cell_values);
                nearest_rank(&cell_values, 10.0)
            }
        }
    });

    SurfaceGrid::new(first.geometry, values)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0)
fn population_stddev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sort ascending; callers guarantee the slice holds no NaN
fn sort_defined(values: &mut [f64]) {
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Nearest-rank order statistic of an ascending-sorted slice
fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let rank = ((percentile / 100.0) * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::GridGeometry;
    use ndarray::array;

    fn geometry() -> GridGeometry {
        GridGeometry::new(2, 2, 0.0, 0.0, 100.0, 100.0, 0.0).unwrap()
    }

    fn surface(values: Array2<f64>) -> SurfaceGrid {
        SurfaceGrid::new(geometry(), values).unwrap()
    }

    fn three_surfaces() -> Vec<SurfaceGrid> {
        vec![
            surface(array![[1.0, 10.0], [100.0, 4.0]]),
            surface(array![[2.0, 20.0], [200.0, 4.0]]),
            surface(array![[3.0, 30.0], [300.0, 4.0]]),
        ]
    }

    #[test]
    fn test_mean_is_arithmetic_per_cell() {
        let result =
            compute_statistical_surface(SurfaceStatistic::Mean, &three_surfaces()).unwrap();
        assert_eq!(result.values, array![[2.0, 20.0], [200.0, 4.0]]);
    }

    #[test]
    fn test_min_max() {
        let surfaces = three_surfaces();
        let min = compute_statistical_surface(SurfaceStatistic::Min, &surfaces).unwrap();
        let max = compute_statistical_surface(SurfaceStatistic::Max, &surfaces).unwrap();
        assert_eq!(min.values, array![[1.0, 10.0], [100.0, 4.0]]);
        assert_eq!(max.values, array![[3.0, 30.0], [300.0, 4.0]]);
    }

    #[test]
    fn test_population_stddev() {
        let result =
            compute_statistical_surface(SurfaceStatistic::StdDev, &three_surfaces()).unwrap();
        // Values 1, 2, 3 have population variance 2/3
        let expected = (2.0_f64 / 3.0).sqrt();
        assert!((result.values[(0, 0)] - expected).abs() < 1e-12);
        assert_eq!(result.values[(1, 1)], 0.0);
    }

    #[test]
    fn test_percentiles_nearest_rank_high_low_convention() {
        // Ten realizations with distinct values 1..=10 in one cell
        let geometry = GridGeometry::new(1, 1, 0.0, 0.0, 1.0, 1.0, 0.0).unwrap();
        let surfaces: Vec<SurfaceGrid> = (1..=10)
            .map(|v| SurfaceGrid::new(geometry, array![[v as f64]]).unwrap())
            .collect();

        // P10 is the high case: exceeded by 10% of the population
        let p10 = compute_statistical_surface(SurfaceStatistic::P10, &surfaces).unwrap();
        assert_eq!(p10.values[(0, 0)], 9.0);

        let p90 = compute_statistical_surface(SurfaceStatistic::P90, &surfaces).unwrap();
        assert_eq!(p90.values[(0, 0)], 1.0);
    }

    #[test]
    fn test_undefined_cells_excluded_per_cell() {
        let surfaces = vec![
            surface(array![[1.0, f64::NAN], [f64::NAN, 4.0]]),
            surface(array![[3.0, 20.0], [f64::NAN, 6.0]]),
        ];
        let result = compute_statistical_surface(SurfaceStatistic::Mean, &surfaces).unwrap();
        assert_eq!(result.values[(0, 0)], 2.0);
        // Only one defined contributor
        assert_eq!(result.values[(0, 1)], 20.0);
        // No defined contributors at all
        assert!(result.values[(1, 0)].is_nan());
        assert_eq!(result.values[(1, 1)], 5.0);
    }

    #[test]
    fn test_geometry_mismatch_is_a_hard_failure() {
        let other_geometry = GridGeometry::new(3, 1, 0.0, 0.0, 100.0, 100.0, 0.0).unwrap();
        let surfaces = vec![
            surface(array![[1.0, 2.0], [3.0, 4.0]]),
            SurfaceGrid::new(other_geometry, array![[1.0, 2.0, 3.0]]).unwrap(),
        ];
        let result = compute_statistical_surface(SurfaceStatistic::Mean, &surfaces);
        assert!(matches!(result, Err(crate::Error::GeometryMismatch { .. })));
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = compute_statistical_surface(SurfaceStatistic::Mean, &[]);
        assert!(result.is_err());
    }
}
