//! Storage error types for flowplan-storage.
//!
//! [`StorageError`] covers hashing of stored documents. [`MigrationError`]
//! covers every way a stored flowchart can fail to reach the current data
//! model version; all of them are surfaced to the caller, since dropping a
//! program reference or a course would corrupt the user's data.

use flowplan_core::{CoreError, ValidationError};
use thiserror::Error;

/// Errors produced while fingerprinting flowcharts.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors produced while upgrading a stored flowchart.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The record does not match the shape of its declared version.
    #[error("malformed flowchart record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Neither `version` nor `dataModelVersion` is present.
    #[error("flowchart record has no version field")]
    MissingVersion,

    /// The declared version has no upgrade path.
    #[error("unsupported flowchart version {version}")]
    UnsupportedVersion { version: u64 },

    /// A flow code is not of the form `catalog|majorName|concName`.
    #[error("malformed flow code '{code}'")]
    MalformedFlowCode { code: String },

    /// A flow code does not match any program in the program cache.
    #[error("flow code '{code}' does not match any program")]
    UnknownFlowCode { code: String },

    /// A legacy color is neither hex nor `rgb(r,g,b)`.
    #[error("unrecognized legacy color '{value}'")]
    InvalidColor { value: String },

    /// Unit recomputation failed.
    #[error(transparent)]
    Units(#[from] CoreError),

    /// Hash regeneration failed.
    #[error(transparent)]
    Hash(#[from] StorageError),

    /// The upgraded record breaks a data-model invariant.
    #[error("migrated flowchart is invalid: {0}")]
    Invalid(#[from] ValidationError),
}
