//! Two-part flowchart fingerprints using blake3.
//!
//! A flow hash has the form `metaHash.contentHash`:
//!
//! - **metaHash** covers identity and metadata: name, owner, program list,
//!   start year and notes.
//! - **contentHash** covers `termData` only.
//!
//! Each half is the first 128 bits of a blake3 digest, rendered as 32
//! lowercase hex characters. Comparing halves tells a caller whether only
//! metadata changed, only content changed, or both, without diffing.
//!
//! # Determinism
//!
//! Values are serialized through `serde_json::Value` and every object's keys
//! are sorted before hashing, so the digest does not depend on field or map
//! iteration order.

use serde::Serialize;
use serde_json::{Map, Value};

use flowplan_core::{Flowchart, Term};

use crate::error::StorageError;

/// Hex length of each hash half.
const HALF_HEX_LEN: usize = 32;

/// The metadata fields covered by the first hash half.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlowMetadata<'a> {
    name: &'a str,
    owner_id: &'a str,
    program_id: &'a [Option<String>],
    start_year: &'a str,
    notes: &'a str,
}

/// Which halves differ between two flow hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashChange {
    Unchanged,
    MetadataOnly,
    ContentOnly,
    Both,
}

/// Recursively rebuilds every object with its keys in sorted order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Hashes the canonical JSON form of `value`.
fn hash_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    let canonical = sort_keys(serde_json::to_value(value)?);
    let bytes = serde_json::to_vec(&canonical)?;
    let hex = blake3::hash(&bytes).to_hex();
    Ok(hex.as_str()[..HALF_HEX_LEN].to_string())
}

/// Hashes the metadata fields of a flowchart.
pub fn hash_metadata(flowchart: &Flowchart) -> Result<String, StorageError> {
    hash_canonical(&FlowMetadata {
        name: &flowchart.name,
        owner_id: &flowchart.owner_id,
        program_id: &flowchart.program_id,
        start_year: &flowchart.start_year,
        notes: &flowchart.notes,
    })
}

/// Hashes a flowchart's term data.
pub fn hash_content(term_data: &[Term]) -> Result<String, StorageError> {
    hash_canonical(term_data)
}

/// Generates the `metaHash.contentHash` fingerprint of a flowchart.
pub fn generate_flow_hash(flowchart: &Flowchart) -> Result<String, StorageError> {
    Ok(format!(
        "{}.{}",
        hash_metadata(flowchart)?,
        hash_content(&flowchart.term_data)?
    ))
}

/// Splits a flow hash into its halves if it is well formed.
pub fn split_flow_hash(hash: &str) -> Option<(&str, &str)> {
    let (meta, content) = hash.split_once('.')?;
    let is_half =
        |half: &str| half.len() == HALF_HEX_LEN && half.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    (is_half(meta) && is_half(content)).then_some((meta, content))
}

/// Whether `hash` matches `^[a-f0-9]{32}\.[a-f0-9]{32}$`.
pub fn is_valid_flow_hash(hash: &str) -> bool {
    split_flow_hash(hash).is_some()
}

/// Compares two flow hashes half by half.
///
/// A malformed hash on either side compares as [`HashChange::Both`].
pub fn compare_flow_hashes(previous: &str, current: &str) -> HashChange {
    match (split_flow_hash(previous), split_flow_hash(current)) {
        (Some((pm, pc)), Some((cm, cc))) => match (pm == cm, pc == cc) {
            (true, true) => HashChange::Unchanged,
            (false, true) => HashChange::MetadataOnly,
            (true, false) => HashChange::ContentOnly,
            (false, false) => HashChange::Both,
        },
        _ => HashChange::Both,
    }
}
