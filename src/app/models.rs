//! Data models for ensemble addressing
//!
//! This module contains the value types used to address surfaces and vectors
//! within a simulation ensemble, the typed per-vector metadata record, and
//! the in-memory surface grid container.

use crate::{Error, Result};
use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Raw per-column field metadata as stored by the backing columnar store:
/// byte-string keys mapped to byte-string values
pub type FieldMeta = HashMap<Vec<u8>, Vec<u8>>;

// =============================================================================
// Sampling Frequency
// =============================================================================

/// Sampling frequency of an ensemble summary table
///
/// A table carries exactly one frequency; the cumulative transform accepts an
/// output frequency equal to or coarser than the input (yearly ⊇ monthly ⊇
/// daily).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Coarseness rank; higher means coarser
    fn rank(self) -> u8 {
        match self {
            Frequency::Daily => 0,
            Frequency::Monthly => 1,
            Frequency::Yearly => 2,
        }
    }

    /// Whether this frequency is equal to or coarser than `other`
    pub fn is_coarser_or_equal(self, other: Frequency) -> bool {
        self.rank() >= other.rank()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(Error::data_validation(format!(
                "Invalid frequency '{}': must be daily, monthly or yearly",
                s
            ))),
        }
    }
}

// =============================================================================
// Surface Statistic
// =============================================================================

/// Statistic computed cell-by-cell across a realization population
///
/// Percentiles follow the reservoir-engineering convention where P10 is the
/// *high* case (the value exceeded by 10% of the population) and P90 the low
/// case, using the nearest-rank method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceStatistic {
    Mean,
    StdDev,
    Min,
    Max,
    P10,
    P90,
}

impl fmt::Display for SurfaceStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SurfaceStatistic::Mean => "MEAN",
            SurfaceStatistic::StdDev => "STDDEV",
            SurfaceStatistic::Min => "MIN",
            SurfaceStatistic::Max => "MAX",
            SurfaceStatistic::P10 => "P10",
            SurfaceStatistic::P90 => "P90",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SurfaceStatistic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "MEAN" => Ok(SurfaceStatistic::Mean),
            "STDDEV" => Ok(SurfaceStatistic::StdDev),
            "MIN" => Ok(SurfaceStatistic::Min),
            "MAX" => Ok(SurfaceStatistic::Max),
            "P10" => Ok(SurfaceStatistic::P10),
            "P90" => Ok(SurfaceStatistic::P90),
            _ => Err(Error::data_validation(format!(
                "Invalid surface statistic '{}': must be MEAN, STDDEV, MIN, MAX, P10 or P90",
                s
            ))),
        }
    }
}

// =============================================================================
// Surface Addresses
// =============================================================================

/// Address of a single measured (observed) surface; carries no realization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservedSurfaceAddress {
    /// Attribute the surface represents (e.g. depth, thickness)
    pub attribute: String,

    /// Surface name, typically a horizon or zone name
    pub name: String,

    /// Acquisition date; `None` for static surfaces
    pub date: Option<NaiveDate>,
}

/// Address of one realization's simulated surface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulatedSurfaceAddress {
    /// Attribute the surface represents
    pub attribute: String,

    /// Surface name
    pub name: String,

    /// Simulation date; `None` for static surfaces
    pub date: Option<NaiveDate>,

    /// Realization index within the ensemble
    pub realization: i32,
}

/// Address of an aggregate surface computed across a realization set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatisticalSurfaceAddress {
    /// Attribute the surface represents
    pub attribute: String,

    /// Surface name
    pub name: String,

    /// Simulation date; `None` for static surfaces
    pub date: Option<NaiveDate>,

    /// Statistic to compute cell-by-cell
    pub statistic: SurfaceStatistic,

    /// Realization indices to aggregate across; sorted and deduplicated at
    /// construction so equal selections hash identically
    pub realizations: Vec<i32>,
}

/// Address identifying a specific surface within an ensemble
///
/// Addresses are immutable value types used only as lookup keys; they carry
/// no cached payload. Construct through the variant constructors to uphold
/// the non-empty attribute/name invariants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceAddress {
    Observed(ObservedSurfaceAddress),
    Simulated(SimulatedSurfaceAddress),
    Statistical(StatisticalSurfaceAddress),
}

impl SurfaceAddress {
    /// Create a validated observed-surface address
    pub fn observed(
        attribute: impl Into<String>,
        name: impl Into<String>,
        date: Option<NaiveDate>,
    ) -> Result<Self> {
        let address = SurfaceAddress::Observed(ObservedSurfaceAddress {
            attribute: attribute.into(),
            name: name.into(),
            date,
        });
        address.validate()?;
        Ok(address)
    }

    /// Create a validated simulated-surface address
    pub fn simulated(
        attribute: impl Into<String>,
        name: impl Into<String>,
        date: Option<NaiveDate>,
        realization: i32,
    ) -> Result<Self> {
        let address = SurfaceAddress::Simulated(SimulatedSurfaceAddress {
            attribute: attribute.into(),
            name: name.into(),
            date,
            realization,
        });
        address.validate()?;
        Ok(address)
    }

    /// Create a validated statistical-surface address
    ///
    /// The realization list is sorted and deduplicated so that equal
    /// selections produce equal addresses regardless of input order.
    pub fn statistical(
        attribute: impl Into<String>,
        name: impl Into<String>,
        date: Option<NaiveDate>,
        statistic: SurfaceStatistic,
        mut realizations: Vec<i32>,
    ) -> Result<Self> {
        realizations.sort_unstable();
        realizations.dedup();
        let address = SurfaceAddress::Statistical(StatisticalSurfaceAddress {
            attribute: attribute.into(),
            name: name.into(),
            date,
            statistic,
            realizations,
        });
        address.validate()?;
        Ok(address)
    }

    /// Attribute component of the address
    pub fn attribute(&self) -> &str {
        match self {
            SurfaceAddress::Observed(a) => &a.attribute,
            SurfaceAddress::Simulated(a) => &a.attribute,
            SurfaceAddress::Statistical(a) => &a.attribute,
        }
    }

    /// Name component of the address
    pub fn name(&self) -> &str {
        match self {
            SurfaceAddress::Observed(a) => &a.name,
            SurfaceAddress::Simulated(a) => &a.name,
            SurfaceAddress::Statistical(a) => &a.name,
        }
    }

    /// Date component of the address
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            SurfaceAddress::Observed(a) => a.date,
            SurfaceAddress::Simulated(a) => a.date,
            SurfaceAddress::Statistical(a) => a.date,
        }
    }

    /// Validate the address invariants
    pub fn validate(&self) -> Result<()> {
        if self.attribute().trim().is_empty() {
            return Err(Error::data_validation(
                "Surface address attribute cannot be empty".to_string(),
            ));
        }
        if self.name().trim().is_empty() {
            return Err(Error::data_validation(
                "Surface address name cannot be empty".to_string(),
            ));
        }
        if let SurfaceAddress::Statistical(a) = self {
            if a.realizations.is_empty() {
                return Err(Error::data_validation(
                    "Statistical surface address requires at least one realization".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Vector Metadata
// =============================================================================

/// Typed physical semantics of one summary-vector column
///
/// Derived once per column from the raw field metadata and treated as
/// read-only after construction. See
/// [`field_meta`](crate::app::services::field_meta) for the decoding rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorMetadata {
    /// Physical unit (e.g. "SM3", "SM3/DAY")
    pub unit: String,

    /// Whether the vector is a cumulative total
    pub is_total: bool,

    /// Whether the vector is a rate
    pub is_rate: bool,

    /// Whether the vector is a historical reference vector
    pub is_historical: bool,

    /// Source summary keyword (e.g. "FOPT")
    pub keyword: String,

    /// Well or group name, when the vector is scoped to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wgname: Option<String>,

    /// Numeric region/segment qualifier, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_num: Option<i32>,
}

// =============================================================================
// Surface Grid
// =============================================================================

/// Geometry of a regular 2D surface grid
///
/// Two grids are aggregation-compatible exactly when their geometries are
/// equal; comparing across realizations uses exact field equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Number of columns (fastest-varying, x direction)
    pub ncol: usize,

    /// Number of rows (y direction)
    pub nrow: usize,

    /// X coordinate of the grid origin
    pub xori: f64,

    /// Y coordinate of the grid origin
    pub yori: f64,

    /// Cell size in the x direction
    pub xinc: f64,

    /// Cell size in the y direction
    pub yinc: f64,

    /// Grid rotation in degrees, counter-clockwise around the origin
    pub rotation: f64,
}

impl GridGeometry {
    /// Create a validated grid geometry
    pub fn new(
        ncol: usize,
        nrow: usize,
        xori: f64,
        yori: f64,
        xinc: f64,
        yinc: f64,
        rotation: f64,
    ) -> Result<Self> {
        let geometry = Self {
            ncol,
            nrow,
            xori,
            yori,
            xinc,
            yinc,
            rotation,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Validate geometry consistency
    pub fn validate(&self) -> Result<()> {
        if self.ncol == 0 || self.nrow == 0 {
            return Err(Error::data_validation(format!(
                "Grid dimensions must be positive, got {}x{}",
                self.ncol, self.nrow
            )));
        }
        if self.xinc <= 0.0 || self.yinc <= 0.0 {
            return Err(Error::data_validation(format!(
                "Grid increments must be positive, got xinc={} yinc={}",
                self.xinc, self.yinc
            )));
        }
        Ok(())
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.ncol * self.nrow
    }
}

impl fmt::Display for GridGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ ({}, {}) inc ({}, {}) rot {}",
            self.ncol, self.nrow, self.xori, self.yori, self.xinc, self.yinc, self.rotation
        )
    }
}

/// A regular 2D surface grid with per-cell values
///
/// Values are stored row-major as `(nrow, ncol)`; undefined cells are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    /// Grid geometry
    pub geometry: GridGeometry,

    /// Cell values, shape `(nrow, ncol)`, NaN where undefined
    pub values: Array2<f64>,
}

impl SurfaceGrid {
    /// Create a surface grid, validating that the value array matches the
    /// declared geometry
    pub fn new(geometry: GridGeometry, values: Array2<f64>) -> Result<Self> {
        geometry.validate()?;
        if values.dim() != (geometry.nrow, geometry.ncol) {
            return Err(Error::data_validation(format!(
                "Surface value array shape {:?} does not match geometry {}x{}",
                values.dim(),
                geometry.nrow,
                geometry.ncol
            )));
        }
        Ok(Self { geometry, values })
    }

    /// Number of defined (non-NaN) cells
    pub fn defined_cell_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()
    }

    mod frequency_tests {
        use super::*;

        #[test]
        fn test_coarseness_ordering() {
            assert!(Frequency::Yearly.is_coarser_or_equal(Frequency::Daily));
            assert!(Frequency::Yearly.is_coarser_or_equal(Frequency::Monthly));
            assert!(Frequency::Monthly.is_coarser_or_equal(Frequency::Monthly));
            assert!(!Frequency::Daily.is_coarser_or_equal(Frequency::Monthly));
            assert!(!Frequency::Monthly.is_coarser_or_equal(Frequency::Yearly));
        }

        #[test]
        fn test_from_str_round_trip() {
            for freq in [Frequency::Daily, Frequency::Monthly, Frequency::Yearly] {
                assert_eq!(freq.to_string().parse::<Frequency>().unwrap(), freq);
            }
            assert!("weekly".parse::<Frequency>().is_err());
        }
    }

    mod statistic_tests {
        use super::*;

        #[test]
        fn test_from_str() {
            assert_eq!(
                "MEAN".parse::<SurfaceStatistic>().unwrap(),
                SurfaceStatistic::Mean
            );
            assert_eq!(
                "p10".parse::<SurfaceStatistic>().unwrap(),
                SurfaceStatistic::P10
            );
            assert!("P50".parse::<SurfaceStatistic>().is_err());
        }
    }

    mod address_tests {
        use super::*;

        #[test]
        fn test_observed_address_valid() {
            let address =
                SurfaceAddress::observed("amplitude", "TopVolantis", Some(test_date())).unwrap();
            assert_eq!(address.attribute(), "amplitude");
            assert_eq!(address.name(), "TopVolantis");
            assert_eq!(address.date(), Some(test_date()));
        }

        #[test]
        fn test_empty_attribute_rejected() {
            assert!(SurfaceAddress::observed("", "TopVolantis", None).is_err());
            assert!(SurfaceAddress::simulated("depth", "  ", None, 0).is_err());
        }

        #[test]
        fn test_statistical_requires_realizations() {
            let result = SurfaceAddress::statistical(
                "depth",
                "TopVolantis",
                None,
                SurfaceStatistic::Mean,
                vec![],
            );
            assert!(result.is_err());
        }

        #[test]
        fn test_statistical_realizations_canonicalized() {
            let a = SurfaceAddress::statistical(
                "depth",
                "TopVolantis",
                None,
                SurfaceStatistic::P10,
                vec![3, 1, 2, 1],
            )
            .unwrap();
            let b = SurfaceAddress::statistical(
                "depth",
                "TopVolantis",
                None,
                SurfaceStatistic::P10,
                vec![1, 2, 3],
            )
            .unwrap();
            assert_eq!(a, b);
            if let SurfaceAddress::Statistical(inner) = &a {
                assert_eq!(inner.realizations, vec![1, 2, 3]);
            } else {
                panic!("expected statistical address");
            }
        }
    }

    mod grid_tests {
        use super::*;

        #[test]
        fn test_geometry_validation() {
            assert!(GridGeometry::new(10, 5, 0.0, 0.0, 50.0, 50.0, 0.0).is_ok());
            assert!(GridGeometry::new(0, 5, 0.0, 0.0, 50.0, 50.0, 0.0).is_err());
            assert!(GridGeometry::new(10, 5, 0.0, 0.0, -1.0, 50.0, 0.0).is_err());
        }

        #[test]
        fn test_surface_shape_must_match_geometry() {
            let geometry = GridGeometry::new(3, 2, 0.0, 0.0, 100.0, 100.0, 0.0).unwrap();
            let values = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
            assert!(SurfaceGrid::new(geometry, values).is_ok());

            let wrong = array![[1.0, 2.0], [3.0, 4.0]];
            assert!(SurfaceGrid::new(geometry, wrong).is_err());
        }

        #[test]
        fn test_defined_cell_count() {
            let geometry = GridGeometry::new(2, 2, 0.0, 0.0, 1.0, 1.0, 0.0).unwrap();
            let values = array![[1.0, f64::NAN], [3.0, 4.0]];
            let surface = SurfaceGrid::new(geometry, values).unwrap();
            assert_eq!(surface.defined_cell_count(), 3);
        }
    }

    #[test]
    fn test_address_serde_round_trip() {
        let address = SurfaceAddress::statistical(
            "depth",
            "TopVolantis",
            Some(test_date()),
            SurfaceStatistic::P90,
            vec![0, 1, 2],
        )
        .unwrap();
        let json = serde_json::to_string(&address).unwrap();
        let back: SurfaceAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(address, back);
    }
}
