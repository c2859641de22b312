//! Derived-vector naming for cumulative conversions
//!
//! Converted columns are prefixed `AVG_` (average daily rate) or `INTVL_`
//! (interval delta). The rate form additionally rewrites the cumulative
//! keyword into its rate counterpart following the Eclipse summary naming
//! convention (FOPT -> FOPR, WWIT -> WWIR, ...).

use crate::constants::{AVG_RATE_PREFIX, INTERVAL_PREFIX};

/// Derive the output column name for a converted cumulative vector
///
/// For rates, the first occurrence of the letter `T` at or after the 4th
/// character of the vector name is replaced by `R`. This is a naive keyword
/// heuristic: it assumes a cumulative vector named in the Eclipse standard
/// and is not guaranteed to be correct for every vector name. A name with no
/// such `T` is kept unchanged under the prefix.
pub fn rename_vec_from_cum(vector: &str, as_rate: bool) -> String {
    if as_rate {
        format!("{}{}", AVG_RATE_PREFIX, cumulative_to_rate_keyword(vector))
    } else {
        format!("{}{}", INTERVAL_PREFIX, vector)
    }
}

fn cumulative_to_rate_keyword(vector: &str) -> String {
    let mut bytes = vector.as_bytes().to_vec();
    if let Some(pos) = bytes.iter().skip(3).position(|&b| b == b'T') {
        bytes[pos + 3] = b'R';
    }
    // Vector names are ASCII; the byte substitution cannot break UTF-8
    String::from_utf8(bytes).unwrap_or_else(|_| vector.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_names_keep_vector_unchanged() {
        assert_eq!(rename_vec_from_cum("FOPT", false), "INTVL_FOPT");
        assert_eq!(rename_vec_from_cum("GWIT", false), "INTVL_GWIT");
    }

    #[test]
    fn test_rate_names_rewrite_first_trailing_t() {
        assert_eq!(rename_vec_from_cum("FOPT", true), "AVG_FOPR");
        assert_eq!(rename_vec_from_cum("FWIT", true), "AVG_FWIR");
        assert_eq!(rename_vec_from_cum("GGPT", true), "AVG_GGPR");
    }

    #[test]
    fn test_rate_rewrite_ignores_leading_characters() {
        // The T in position 0..3 must not be touched
        assert_eq!(rename_vec_from_cum("TOPT", true), "AVG_TOPR");
    }

    #[test]
    fn test_rate_rewrite_applies_to_well_vectors() {
        assert_eq!(rename_vec_from_cum("WOPT:OP_1", true), "AVG_WOPR:OP_1");
    }

    #[test]
    fn test_rate_without_candidate_t_keeps_name() {
        assert_eq!(rename_vec_from_cum("ROIP", true), "AVG_ROIP");
    }
}
