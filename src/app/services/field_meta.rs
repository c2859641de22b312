//! Field-metadata decoding for summary-vector columns
//!
//! The backing columnar store attaches a side-channel mapping of byte-string
//! keys to byte-string values to each vector column. This module translates
//! that raw encoding into the typed [`VectorMetadata`] record and back.
//!
//! Decoding is strict: a mapping missing any required key yields `None`
//! ("insufficient metadata") rather than a partially populated record, and
//! booleans are decoded by exact byte equality to the literal `True`, with
//! anything else reading as `false`. This is a deliberate policy matching
//! the upstream encoding, not a general boolean parse.

use crate::app::models::{FieldMeta, VectorMetadata};
use crate::constants::meta_keys;
use crate::{Error, Result};

/// Decode a column's raw field metadata into a typed record
///
/// Returns `None` when the mapping is empty (no metadata present) or when
/// any of the five required keys (`unit`, `is_total`, `is_rate`,
/// `is_historical`, `keyword`) is missing or undecodable. The optional
/// `wgname` and `get_num` entries decode to `None` when absent or equal to
/// the literal `None`; an unparsable `get_num` counts as insufficient
/// metadata.
pub fn vector_metadata_from_field_meta(meta: &FieldMeta) -> Option<VectorMetadata> {
    if meta.is_empty() {
        return None;
    }

    let unit = decode_text(meta, meta_keys::UNIT)?;
    let is_total = decode_bool(meta, meta_keys::IS_TOTAL)?;
    let is_rate = decode_bool(meta, meta_keys::IS_RATE)?;
    let is_historical = decode_bool(meta, meta_keys::IS_HISTORICAL)?;
    let keyword = decode_text(meta, meta_keys::KEYWORD)?;

    let wgname = match meta.get(meta_keys::WGNAME) {
        None => None,
        Some(raw) if raw.as_slice() == meta_keys::NONE_LITERAL => None,
        Some(raw) => Some(String::from_utf8(raw.clone()).ok()?),
    };

    let get_num = match meta.get(meta_keys::GET_NUM) {
        None => None,
        Some(raw) if raw.as_slice() == meta_keys::NONE_LITERAL => None,
        Some(raw) => {
            let text = std::str::from_utf8(raw).ok()?;
            Some(text.trim().parse::<i32>().ok()?)
        }
    };

    Some(VectorMetadata {
        unit,
        is_total,
        is_rate,
        is_historical,
        keyword,
        wgname,
        get_num,
    })
}

/// Answer only the rate question for a column
///
/// Returns `false` when no metadata exists at all, but raises a descriptive
/// error when metadata exists yet the `is_rate` key specifically is missing.
/// This distinguishes "no metadata" from "malformed metadata" (an
/// inconsistent upstream encoding that must not be silently defaulted).
pub fn is_rate_from_field_meta(vector_name: &str, meta: &FieldMeta) -> Result<bool> {
    if meta.is_empty() {
        return Ok(false);
    }
    match meta.get(meta_keys::IS_RATE) {
        Some(raw) => Ok(raw.as_slice() == meta_keys::TRUE_LITERAL),
        None => Err(Error::malformed_metadata(
            vector_name,
            "metadata is present but has no is_rate key",
        )),
    }
}

/// Encode a typed metadata record back into the raw field-metadata mapping
///
/// Inverse of [`vector_metadata_from_field_meta`]: booleans become the
/// literals `True`/`False`, absent optionals the literal `None`, so a decode
/// of the result reproduces the input exactly.
pub fn field_meta_from_vector_metadata(metadata: &VectorMetadata) -> FieldMeta {
    let mut meta = FieldMeta::new();
    meta.insert(
        meta_keys::UNIT.to_vec(),
        metadata.unit.as_bytes().to_vec(),
    );
    meta.insert(meta_keys::IS_TOTAL.to_vec(), encode_bool(metadata.is_total));
    meta.insert(meta_keys::IS_RATE.to_vec(), encode_bool(metadata.is_rate));
    meta.insert(
        meta_keys::IS_HISTORICAL.to_vec(),
        encode_bool(metadata.is_historical),
    );
    meta.insert(
        meta_keys::KEYWORD.to_vec(),
        metadata.keyword.as_bytes().to_vec(),
    );
    meta.insert(
        meta_keys::WGNAME.to_vec(),
        match &metadata.wgname {
            Some(name) => name.as_bytes().to_vec(),
            None => meta_keys::NONE_LITERAL.to_vec(),
        },
    );
    meta.insert(
        meta_keys::GET_NUM.to_vec(),
        match metadata.get_num {
            Some(num) => num.to_string().into_bytes(),
            None => meta_keys::NONE_LITERAL.to_vec(),
        },
    );
    meta
}

/// Decode a required text entry; `None` when absent or not valid UTF-8
fn decode_text(meta: &FieldMeta, key: &[u8]) -> Option<String> {
    meta.get(key)
        .and_then(|raw| String::from_utf8(raw.clone()).ok())
}

/// Decode a required boolean entry by strict equality to the `True` literal;
/// `None` when the key is absent
fn decode_bool(meta: &FieldMeta, key: &[u8]) -> Option<bool> {
    meta.get(key)
        .map(|raw| raw.as_slice() == meta_keys::TRUE_LITERAL)
}

fn encode_bool(value: bool) -> Vec<u8> {
    if value {
        meta_keys::TRUE_LITERAL.to_vec()
    } else {
        meta_keys::FALSE_LITERAL.to_vec()
    }
}
