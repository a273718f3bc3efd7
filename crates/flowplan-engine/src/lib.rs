//! Flowchart mutation engine.
//!
//! Applies client update chunks to a user's flowchart collection and
//! creates new flowcharts from program templates.
//!
//! # Modules
//!
//! - [`chunk`]: update chunk wire types
//! - [`engine`]: MutationEngine and its outcome types
//! - [`terms`]: the TermManager delegate and its default implementation
//! - [`generate`]: generation, duplicate/import and derived-field refresh
//! - [`error`]: ChunkError and EngineError

pub mod chunk;
pub mod engine;
pub mod error;
pub mod generate;
pub mod terms;

pub use chunk::{CourseDiff, FlowPosition, IncomingChunk, UpdateChunk};
pub use engine::{MutationEngine, MutationOutcome, MutationResponse};
pub use error::{ChunkError, EngineError};
pub use generate::{
    duplicate_flowchart, generate_flowchart, import_flowchart, refresh_derived, GenerateRequest,
};
pub use terms::{StandardTermManager, TermManager};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, TimeZone, Utc};
    use flowplan_core::{
        Course, CourseCache, CourseCacheEntry, CourseMetadata, Flowchart, PositionedFlowchart,
        Program, ProgramCache, Term, CREDIT_BIN_INDEX, CURRENT_FLOWCHART_VERSION,
    };

    fn metadata(catalog: &str, id: &str, units: &str) -> CourseMetadata {
        CourseMetadata {
            id: id.to_string(),
            catalog: catalog.to_string(),
            display_name: id.to_string(),
            units: units.to_string(),
            desc: None,
            addl: None,
        }
    }

    fn program(id: &str, catalog: &str) -> Program {
        Program {
            id: id.to_string(),
            catalog: catalog.to_string(),
            major_name: format!("Major {id}"),
            conc_name: "General".to_string(),
        }
    }

    pub(crate) fn caches() -> (CourseCache, ProgramCache) {
        let courses = CourseCache::from(vec![CourseCacheEntry {
            catalog: "2019-2020".to_string(),
            courses: vec![
                metadata("2019-2020", "AGC301", "4"),
                metadata("2019-2020", "BIO161", "4-6"),
                metadata("2019-2020", "MATH141", "4"),
            ],
        }]);
        let programs = ProgramCache::from(vec![
            program("prog-a", "2019-2020"),
            program("prog-c", "2019-2020"),
        ]);
        (courses, programs)
    }

    pub(crate) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    /// `flow-1`: AGC301 in term 1, BIO161 in term 2.
    pub(crate) fn flowchart() -> Flowchart {
        let term = |t_index: i32, id: &str, units: &str| Term {
            t_index,
            t_units: units.to_string(),
            courses: vec![Course::catalog(id, "#fff")],
        };
        Flowchart {
            id: "flow-1".to_string(),
            owner_id: "owner-1".to_string(),
            name: "Plan".to_string(),
            program_id: vec![Some("prog-a".to_string()), None],
            start_year: "2020".to_string(),
            unit_total: "8-10".to_string(),
            notes: String::new(),
            term_data: vec![
                Term::empty(CREDIT_BIN_INDEX),
                term(1, "AGC301", "4"),
                term(2, "BIO161", "4-6"),
            ],
            version: CURRENT_FLOWCHART_VERSION,
            hash: String::new(),
            published_id: None,
            imported_id: None,
            last_updated_utc: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Three copies of [`flowchart`] as `flow-1..=3` at positions 0..=2.
    pub(crate) fn collection() -> Vec<PositionedFlowchart> {
        (0..3)
            .map(|pos| {
                let mut flowchart = flowchart();
                flowchart.id = format!("flow-{}", pos + 1);
                PositionedFlowchart { flowchart, pos }
            })
            .collect()
    }
}
