//! Application constants for the ensemble provider
//!
//! This module contains the column names, metadata key literals, file
//! patterns, and format constants used throughout the library.

// =============================================================================
// Ensemble Table Columns
// =============================================================================

/// Name of the ensemble identifier column
pub const ENSEMBLE_COLUMN: &str = "ENSEMBLE";

/// Name of the realization index column
pub const REAL_COLUMN: &str = "REAL";

/// Name of the date column (date-only, no time-of-day component)
pub const DATE_COLUMN: &str = "DATE";

/// The three mandatory key columns of an ensemble summary table
pub const KEY_COLUMNS: &[&str] = &[ENSEMBLE_COLUMN, REAL_COLUMN, DATE_COLUMN];

// =============================================================================
// Derived Vector Naming
// =============================================================================

/// Prefix for average-daily-rate columns derived from cumulative vectors
pub const AVG_RATE_PREFIX: &str = "AVG_";

/// Prefix for interval-delta columns derived from cumulative vectors
pub const INTERVAL_PREFIX: &str = "INTVL_";

// =============================================================================
// Field Metadata Keys
// =============================================================================

/// Byte-string keys and literals of the per-column field metadata encoding
/// used by the backing columnar store
pub mod meta_keys {
    /// Physical unit of the vector (required)
    pub const UNIT: &[u8] = b"unit";

    /// Whether the vector is a cumulative total (required)
    pub const IS_TOTAL: &[u8] = b"is_total";

    /// Whether the vector is a rate (required)
    pub const IS_RATE: &[u8] = b"is_rate";

    /// Whether the vector is a historical reference vector (required)
    pub const IS_HISTORICAL: &[u8] = b"is_historical";

    /// Source summary keyword the vector was derived from (required)
    pub const KEYWORD: &[u8] = b"keyword";

    /// Well or group name the vector belongs to (optional)
    pub const WGNAME: &[u8] = b"wgname";

    /// Numeric region/segment qualifier (optional)
    pub const GET_NUM: &[u8] = b"get_num";

    /// Literal encoding of boolean true; anything else decodes to false
    pub const TRUE_LITERAL: &[u8] = b"True";

    /// Literal encoding of boolean false
    pub const FALSE_LITERAL: &[u8] = b"False";

    /// Literal encoding of an absent optional value
    pub const NONE_LITERAL: &[u8] = b"None";

    /// The five keys that must all be present for metadata to be usable
    pub const REQUIRED_KEYS: &[&[u8]] = &[UNIT, IS_TOTAL, IS_RATE, IS_HISTORICAL, KEYWORD];
}

// =============================================================================
// Ensemble Directory Layout
// =============================================================================

/// Pattern matched against immediate subdirectories of an ensemble root to
/// discover realizations; the single capture group is the realization index
pub const REALIZATION_DIR_PATTERN: &str = r"^realization-(\d+)$";

/// Simulated surface directory, relative to a realization directory
pub const SURFACE_DIR_REL: &str = "share/results/maps";

/// Observed surface directory, relative to the ensemble root
pub const OBSERVED_SURFACE_DIR_REL: &str = "share/observations/maps";

/// Summary table file, relative to a realization directory
pub const SUMMARY_TABLE_REL: &str = "share/results/tables/summary.csv";

/// File extension of stored surface grids
pub const SURFACE_EXTENSION: &str = "irap";

/// Date format used in surface file stems (`<name>--<attribute>--<date>`)
pub const SURFACE_DATE_FORMAT: &str = "%Y%m%d";

/// Separator between the stem parts of a surface file name
pub const SURFACE_STEM_SEPARATOR: &str = "--";

// =============================================================================
// Parquet Cache
// =============================================================================

/// File name prefix of cached ensemble summary tables
pub const CACHE_FILE_PREFIX: &str = "summary_";

/// File name of the cache manifest written next to each cached table
pub const CACHE_MANIFEST_SUFFIX: &str = ".manifest.json";

// =============================================================================
// Irap ASCII Surface Format
// =============================================================================

/// Format constants of the Irap ASCII regular-grid surface format
pub mod irap {
    /// Magic id in the first header field
    pub const HEADER_ID: i32 = -996;

    /// Marker value for undefined cells; mapped to NaN in memory
    pub const UNDEFINED: f64 = 9_999_900.0;

    /// Number of values written per line in the data section
    pub const VALUES_PER_LINE: usize = 6;
}
