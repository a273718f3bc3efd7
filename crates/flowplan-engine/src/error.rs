//! Engine error types for flowplan-engine.
//!
//! [`ChunkError`] describes why a single update chunk was rejected. Chunk
//! errors are collected across a batch and reported together; they never
//! abort the batch. [`EngineError`] covers flowchart generation and the
//! derived-field refresh helpers.

use flowplan_core::{CoreError, ValidationError};
use flowplan_storage::StorageError;
use thiserror::Error;

/// Why an update chunk could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The chunk names a flowchart that is not in the collection.
    #[error("flowchart '{id}' not found")]
    FlowchartNotFound { id: String },

    /// The target term of a term edit does not exist.
    #[error("term {t_index} not found in flowchart '{id}'")]
    TermNotFound { id: String, t_index: i32 },

    /// An `EXISTING` course reference does not point at a course.
    #[error("no course at term {t_index}, index {c_index} in flowchart '{id}'")]
    CourseRefNotFound {
        id: String,
        t_index: i32,
        c_index: usize,
    },

    /// A `NEW` course payload breaks a course invariant.
    #[error("invalid course at position {position} of term {t_index} in flowchart '{id}': {source}")]
    InvalidCourse {
        id: String,
        t_index: i32,
        position: usize,
        #[source]
        source: ValidationError,
    },

    /// The term manager refused a term insertion or removal.
    #[error("term change rejected for flowchart '{id}': {reason}")]
    TermsRejected { id: String, reason: String },

    /// The chunk `type` is not one this engine knows.
    #[error("unrecognized update chunk type '{kind}'")]
    UnrecognizedChunk { kind: String },

    /// The chunk `type` is known but its payload does not match.
    #[error("malformed '{kind}' update chunk: {reason}")]
    MalformedChunk { kind: String, reason: String },
}

/// Errors produced while generating or refreshing flowcharts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unit computation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Hash generation failed.
    #[error(transparent)]
    Hash(#[from] StorageError),

    /// The resulting flowchart breaks a data-model invariant.
    #[error("invalid flowchart: {0}")]
    Invalid(#[from] ValidationError),

    /// Templates were not supplied for exactly the selected programs.
    #[error("expected {expected} template(s), one per program, got {found}")]
    TemplateCount { expected: usize, found: usize },
}
