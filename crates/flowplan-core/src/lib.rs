//! Flowchart data model and unit computations.
//!
//! # Modules
//!
//! - [`model`]: courses, terms, flowcharts and their wire shape
//! - [`cache`]: read-only course and program lookup tables
//! - [`units`]: exact ranged-unit arithmetic
//! - [`catalog`]: program index to catalog resolution
//! - [`counter`]: per-term and whole-flowchart unit totals
//! - [`merge`]: multi-program template merging
//! - [`validate`]: data-model invariants
//! - [`error`]: CoreError and ValidationError

pub mod cache;
pub mod catalog;
pub mod counter;
pub mod error;
pub mod merge;
pub mod model;
pub mod units;
pub mod validate;

// Re-export commonly used types
pub use cache::{CourseCache, CourseCacheEntry, CourseMetadata, Program, ProgramCache};
pub use catalog::resolve_catalog;
pub use counter::{compute_term_units, compute_total_units, recompute_flowchart_units, ComputeMode};
pub use error::{CoreError, ValidationError};
pub use merge::merge_flowcharts_course_data;
pub use model::{
    Course, CourseKind, Flowchart, PositionedFlowchart, Term, CREDIT_BIN_INDEX,
    CURRENT_FLOWCHART_VERSION,
};
pub use units::{add_units, Units};
