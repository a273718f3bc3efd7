//! Update chunk wire types.
//!
//! Clients describe edits to their flowchart collection as a list of update
//! chunks, each an adjacently tagged JSON object:
//!
//! ```json
//! { "type": "FLOW_DELETE", "data": { "id": "flow-1" } }
//! ```
//!
//! [`UpdateChunk`] is the closed set of chunk kinds. Clients may be newer
//! than the engine, so incoming chunks are decoded through [`IncomingChunk`],
//! which captures unknown `type` values and payloads that do not match their
//! `type` instead of failing the whole request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use flowplan_core::{Course, Flowchart};

/// A new position for one flowchart in the owner's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPosition {
    pub id: String,
    pub pos: usize,
}

/// One entry of a rebuilt term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseDiff {
    /// A course taken from the flowchart's state before the chunk, used for
    /// reordering or moving a course between terms.
    #[serde(rename_all = "camelCase")]
    Existing { t_index: i32, c_index: usize },
    /// An inline course payload, used for inserted or edited courses.
    New(Course),
}

/// A structured edit to a user's flowchart collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateChunk {
    /// Reassign list positions.
    FlowListChange { order: Vec<FlowPosition> },
    /// Replace a flowchart by id, or append it.
    FlowUpsertAll { flowchart: Box<Flowchart>, pos: usize },
    /// Remove a flowchart.
    FlowDelete { id: String },
    /// Rebuild one term of one flowchart.
    #[serde(rename_all = "camelCase")]
    FlowTermMod {
        id: String,
        t_index: i32,
        term_data: Vec<CourseDiff>,
    },
    /// Insert empty terms.
    #[serde(rename_all = "camelCase")]
    FlowTermsAdd { id: String, t_indexes: Vec<i32> },
    /// Remove terms.
    #[serde(rename_all = "camelCase")]
    FlowTermsDelete { id: String, t_indexes: Vec<i32> },
}

impl UpdateChunk {
    /// Every `type` tag this engine understands.
    pub const KINDS: [&'static str; 6] = [
        "FLOW_LIST_CHANGE",
        "FLOW_UPSERT_ALL",
        "FLOW_DELETE",
        "FLOW_TERM_MOD",
        "FLOW_TERMS_ADD",
        "FLOW_TERMS_DELETE",
    ];

    /// The wire `type` tag of this chunk.
    pub fn kind(&self) -> &'static str {
        match self {
            UpdateChunk::FlowListChange { .. } => "FLOW_LIST_CHANGE",
            UpdateChunk::FlowUpsertAll { .. } => "FLOW_UPSERT_ALL",
            UpdateChunk::FlowDelete { .. } => "FLOW_DELETE",
            UpdateChunk::FlowTermMod { .. } => "FLOW_TERM_MOD",
            UpdateChunk::FlowTermsAdd { .. } => "FLOW_TERMS_ADD",
            UpdateChunk::FlowTermsDelete { .. } => "FLOW_TERMS_DELETE",
        }
    }
}

/// A decoded chunk, or the reason it could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingChunk {
    Chunk(UpdateChunk),
    /// The `type` tag is not one of [`UpdateChunk::KINDS`].
    Unrecognized { kind: String },
    /// The chunk has no `type`, or its `data` does not fit the `type`.
    Malformed { kind: String, reason: String },
}

impl IncomingChunk {
    /// Classifies a raw JSON chunk.
    pub fn from_value(value: Value) -> Self {
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return IncomingChunk::Malformed {
                kind: String::new(),
                reason: "missing string field `type`".to_string(),
            };
        };
        let kind = kind.to_string();
        if !UpdateChunk::KINDS.contains(&kind.as_str()) {
            return IncomingChunk::Unrecognized { kind };
        }
        match serde_json::from_value(value) {
            Ok(chunk) => IncomingChunk::Chunk(chunk),
            Err(e) => IncomingChunk::Malformed {
                kind,
                reason: e.to_string(),
            },
        }
    }
}

impl From<UpdateChunk> for IncomingChunk {
    fn from(chunk: UpdateChunk) -> Self {
        IncomingChunk::Chunk(chunk)
    }
}

impl<'de> Deserialize<'de> for IncomingChunk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(IncomingChunk::from_value)
    }
}
