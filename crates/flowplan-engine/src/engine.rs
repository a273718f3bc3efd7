//! Applying update chunks to a flowchart collection.
//!
//! [`MutationEngine::apply`] takes a user's collection and a batch of
//! [`IncomingChunk`]s, and returns either the edited collection or every
//! reason the batch was refused.
//!
//! # Semantics
//!
//! - The caller's collection is never touched; chunks run against an owned
//!   copy.
//! - Chunks run in order. A failing chunk leaves the copy as it was before
//!   that chunk and the engine moves on to the next one, so a single call
//!   reports every bad chunk in the batch.
//! - Any chunk error makes the outcome [`MutationOutcome::Rejected`]; nothing
//!   is returned for the caller to persist in that case.
//! - A failure of the unit counter is not a chunk error: it means the caches
//!   or the stored data are inconsistent, and is returned as `Err`.
//!
//! The engine stamps `lastUpdatedUTC` on every flowchart it edits but leaves
//! `unitTotal` and `hash` alone; see [`crate::generate::refresh_derived`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use flowplan_core::validate::validate_course;
use flowplan_core::{
    compute_term_units, CoreError, Course, CourseCache, Flowchart, PositionedFlowchart,
    ProgramCache, ValidationError,
};

use crate::chunk::{CourseDiff, FlowPosition, IncomingChunk, UpdateChunk};
use crate::error::ChunkError;
use crate::terms::{StandardTermManager, TermManager};

/// Result of applying a batch of chunks.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Every chunk applied; the new collection, ordered by position.
    Applied(Vec<PositionedFlowchart>),
    /// At least one chunk failed.
    Rejected(Vec<ChunkError>),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }
}

/// Wire form of a [`MutationOutcome`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowcharts_data: Option<Vec<PositionedFlowchart>>,
    pub errors: Vec<String>,
}

impl From<MutationOutcome> for MutationResponse {
    fn from(outcome: MutationOutcome) -> Self {
        match outcome {
            MutationOutcome::Applied(flowcharts) => MutationResponse {
                success: true,
                flowcharts_data: Some(flowcharts),
                errors: Vec::new(),
            },
            MutationOutcome::Rejected(errors) => MutationResponse {
                success: false,
                flowcharts_data: None,
                errors: errors.iter().map(ToString::to_string).collect(),
            },
        }
    }
}

/// How a single chunk failed.
enum ApplyError {
    Chunk(ChunkError),
    Core(CoreError),
}

impl From<ChunkError> for ApplyError {
    fn from(e: ChunkError) -> Self {
        ApplyError::Chunk(e)
    }
}

impl From<CoreError> for ApplyError {
    fn from(e: CoreError) -> Self {
        ApplyError::Core(e)
    }
}

/// Applies update chunks against read-only course and program caches.
#[derive(Debug, Clone)]
pub struct MutationEngine<'a, T = StandardTermManager> {
    courses: &'a CourseCache,
    programs: &'a ProgramCache,
    terms: T,
    now: Option<DateTime<Utc>>,
}

impl<'a> MutationEngine<'a, StandardTermManager> {
    /// Creates an engine using the [`StandardTermManager`]. Edits are
    /// stamped with the time each [`apply`](MutationEngine::apply) starts.
    pub fn new(courses: &'a CourseCache, programs: &'a ProgramCache) -> Self {
        MutationEngine {
            courses,
            programs,
            terms: StandardTermManager,
            now: None,
        }
    }
}

impl<'a, T: TermManager> MutationEngine<'a, T> {
    /// Replaces the term manager.
    pub fn with_term_manager<U: TermManager>(self, terms: U) -> MutationEngine<'a, U> {
        MutationEngine {
            courses: self.courses,
            programs: self.programs,
            terms,
            now: self.now,
        }
    }

    /// Pins the timestamp stamped on every edited flowchart.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Applies `chunks` in order to a copy of `flowcharts`.
    pub fn apply(
        &self,
        flowcharts: &[PositionedFlowchart],
        chunks: &[IncomingChunk],
    ) -> Result<MutationOutcome, CoreError> {
        let now = self.now.unwrap_or_else(Utc::now);
        let mut working = flowcharts.to_vec();
        working.sort_by_key(|f| f.pos);
        let mut errors = Vec::new();

        for (index, incoming) in chunks.iter().enumerate() {
            let result = match incoming {
                IncomingChunk::Chunk(chunk) => {
                    debug!(index, kind = chunk.kind(), "applying update chunk");
                    self.apply_chunk(&mut working, chunk, now)
                }
                IncomingChunk::Unrecognized { kind } => {
                    Err(ChunkError::UnrecognizedChunk { kind: kind.clone() }.into())
                }
                IncomingChunk::Malformed { kind, reason } => Err(ChunkError::MalformedChunk {
                    kind: kind.clone(),
                    reason: reason.clone(),
                }
                .into()),
            };

            match result {
                Ok(()) => {}
                Err(ApplyError::Chunk(e)) => {
                    warn!(index, error = %e, "update chunk rejected");
                    errors.push(e);
                }
                Err(ApplyError::Core(e)) => return Err(e),
            }
        }

        if errors.is_empty() {
            Ok(MutationOutcome::Applied(working))
        } else {
            Ok(MutationOutcome::Rejected(errors))
        }
    }

    fn apply_chunk(
        &self,
        working: &mut Vec<PositionedFlowchart>,
        chunk: &UpdateChunk,
        now: DateTime<Utc>,
    ) -> Result<(), ApplyError> {
        match chunk {
            UpdateChunk::FlowListChange { order } => self.reorder(working, order, now),
            UpdateChunk::FlowUpsertAll { flowchart, pos } => {
                upsert(working, flowchart, *pos);
                Ok(())
            }
            UpdateChunk::FlowDelete { id } => delete(working, id),
            UpdateChunk::FlowTermMod {
                id,
                t_index,
                term_data,
            } => self.modify_term(working, id, *t_index, term_data, now),
            UpdateChunk::FlowTermsAdd { id, t_indexes } => {
                self.edit_terms(working, id, now, |flow| self.terms.add_terms(flow, t_indexes))
            }
            UpdateChunk::FlowTermsDelete { id, t_indexes } => {
                self.edit_terms(working, id, now, |flow| {
                    self.terms.delete_terms(flow, t_indexes)
                })
            }
        }
    }

    fn reorder(
        &self,
        working: &mut [PositionedFlowchart],
        order: &[FlowPosition],
        now: DateTime<Utc>,
    ) -> Result<(), ApplyError> {
        if let Some(missing) = order
            .iter()
            .find(|p| !working.iter().any(|f| f.flowchart.id == p.id))
        {
            return Err(not_found(&missing.id).into());
        }

        for position in order {
            if let Some(entry) = working.iter_mut().find(|f| f.flowchart.id == position.id) {
                entry.pos = position.pos;
                entry.flowchart.last_updated_utc = now;
            }
        }
        working.sort_by_key(|f| f.pos);
        Ok(())
    }

    fn modify_term(
        &self,
        working: &mut [PositionedFlowchart],
        id: &str,
        t_index: i32,
        diffs: &[CourseDiff],
        now: DateTime<Utc>,
    ) -> Result<(), ApplyError> {
        let flowchart = &mut find_mut(working, id)?.flowchart;
        if flowchart.term(t_index).is_none() {
            return Err(ChunkError::TermNotFound {
                id: id.to_string(),
                t_index,
            }
            .into());
        }

        let courses = diffs
            .iter()
            .enumerate()
            .map(|(position, diff)| resolve_diff(flowchart, t_index, position, diff))
            .collect::<Result<Vec<Course>, ChunkError>>()?;
        let t_units =
            compute_term_units(&courses, &flowchart.program_id, self.courses, self.programs)?;

        if let Some(term) = flowchart.term_mut(t_index) {
            term.courses = courses;
            term.t_units = t_units;
        }
        flowchart.last_updated_utc = now;
        Ok(())
    }

    fn edit_terms<F>(
        &self,
        working: &mut [PositionedFlowchart],
        id: &str,
        now: DateTime<Utc>,
        edit: F,
    ) -> Result<(), ApplyError>
    where
        F: FnOnce(&mut Flowchart) -> Result<(), String>,
    {
        let entry = find_mut(working, id)?;
        let mut edited = entry.flowchart.clone();
        edit(&mut edited).map_err(|reason| ChunkError::TermsRejected {
            id: id.to_string(),
            reason,
        })?;
        edited.last_updated_utc = now;
        entry.flowchart = edited;
        Ok(())
    }
}

/// Resolves one course diff against the flowchart's pre-chunk state.
fn resolve_diff(
    flowchart: &Flowchart,
    target: i32,
    position: usize,
    diff: &CourseDiff,
) -> Result<Course, ChunkError> {
    match diff {
        CourseDiff::Existing { t_index, c_index } => flowchart
            .course(*t_index, *c_index)
            .cloned()
            .ok_or_else(|| ChunkError::CourseRefNotFound {
                id: flowchart.id.clone(),
                t_index: *t_index,
                c_index: *c_index,
            }),
        CourseDiff::New(course) => {
            let invalid = |source: ValidationError| ChunkError::InvalidCourse {
                id: flowchart.id.clone(),
                t_index: target,
                position,
                source,
            };
            validate_course(course).map_err(invalid)?;
            let index = course.program_index();
            if index >= flowchart.programs().count() {
                return Err(invalid(ValidationError::ProgramIndexOutOfRange { index }));
            }
            Ok(course.clone())
        }
    }
}

fn not_found(id: &str) -> ChunkError {
    ChunkError::FlowchartNotFound { id: id.to_string() }
}

fn find_mut<'w>(
    working: &'w mut [PositionedFlowchart],
    id: &str,
) -> Result<&'w mut PositionedFlowchart, ChunkError> {
    working
        .iter_mut()
        .find(|f| f.flowchart.id == id)
        .ok_or_else(|| not_found(id))
}

fn upsert(working: &mut Vec<PositionedFlowchart>, flowchart: &Flowchart, pos: usize) {
    match working.iter_mut().find(|f| f.flowchart.id == flowchart.id) {
        Some(entry) => entry.flowchart = flowchart.clone(),
        None => {
            working.push(PositionedFlowchart {
                flowchart: flowchart.clone(),
                pos,
            });
            working.sort_by_key(|f| f.pos);
        }
    }
}

fn delete(working: &mut Vec<PositionedFlowchart>, id: &str) -> Result<(), ApplyError> {
    let index = working
        .iter()
        .position(|f| f.flowchart.id == id)
        .ok_or_else(|| not_found(id))?;
    working.remove(index);
    for (pos, entry) in working.iter_mut().enumerate() {
        entry.pos = pos;
    }
    Ok(())
}
