//! Core error types for flowplan-core.
//!
//! [`CoreError`] covers the invariant violations that abort a unit
//! computation: malformed unit strings, catalogs that cannot be resolved and
//! course metadata missing from the cache. These indicate corrupted cache or
//! stored data and are never silently defaulted.
//!
//! [`ValidationError`] covers data-model invariants on user-supplied
//! flowcharts and courses.

use thiserror::Error;

/// Errors produced by unit arithmetic and unit counting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A unit string is not a number or a `lo-hi` range with `hi > lo`.
    #[error("invalid unit string: '{value}'")]
    InvalidUnits { value: String },

    /// The program slot referenced by a course does not resolve to a catalog.
    #[error("no catalog for program index {index} (program: {program})", program = program.as_deref().unwrap_or("<none>"))]
    CatalogNotFound {
        index: usize,
        program: Option<String>,
    },

    /// A catalog course has no metadata record in the course cache.
    #[error("course '{id}' not found in catalog '{catalog}'")]
    CourseNotFound { catalog: String, id: String },
}

/// Data-model invariant violations on flowcharts and courses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A custom course (`id = null`) is missing its title.
    #[error("custom course requires a non-empty customId")]
    MissingCustomId,

    /// A catalog course carries an empty identifier.
    #[error("catalog course id must not be empty")]
    EmptyCourseId,

    /// Custom-only fields were set on a catalog course.
    #[error("field '{field}' is only allowed on custom courses")]
    CustomFieldOnCatalogCourse { field: &'static str },

    /// A bounded text field is too long (or too short).
    #[error("field '{field}' must be between {min} and {max} characters (got {len})")]
    FieldLength {
        field: &'static str,
        min: usize,
        max: usize,
        len: usize,
    },

    /// A course color is not a `#rgb` / `#rrggbb` hex string.
    #[error("invalid color '{value}'")]
    InvalidColor { value: String },

    /// The program list is empty, too long, starts with null or has a gap.
    #[error("invalid program list: {reason}")]
    InvalidProgramList { reason: String },

    /// A course references a program slot outside the list or a null slot.
    #[error("programIdIndex {index} does not reference a program")]
    ProgramIndexOutOfRange { index: usize },

    /// Two terms share the same `tIndex`.
    #[error("duplicate term index {t_index}")]
    DuplicateTerm { t_index: i32 },

    /// A term index below -1.
    #[error("invalid term index {t_index}")]
    InvalidTermIndex { t_index: i32 },

    /// The credit bin (`tIndex = -1`) is missing.
    #[error("flowchart has no credit bin term")]
    MissingCreditBin,

    /// A stored unit string is malformed.
    #[error("invalid unit string '{value}' in {field}")]
    InvalidUnits { field: &'static str, value: String },

    /// The version number is zero.
    #[error("flowchart version must be positive")]
    InvalidVersion,
}
