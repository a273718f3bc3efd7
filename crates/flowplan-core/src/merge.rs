//! Merging of template term data across several degree programs.
//!
//! When a flowchart is created for more than one program, each program
//! contributes its own template term list. The primary program's courses
//! are taken as-is; courses from program `i >= 1` are appended tagged with
//! `programIdIndex = i`, except that a catalog course already present (same
//! catalog and id, contributed by an earlier program) is dropped when course
//! merging is enabled. Term totals are recomputed over the merged lists
//! because deduplication changes them.

use indexmap::IndexMap;

use crate::cache::{CourseCache, ProgramCache};
use crate::catalog::{course_catalog, resolve_catalog};
use crate::counter::compute_term_units;
use crate::error::CoreError;
use crate::model::{Course, CourseKind, Term};

/// Merges per-program template term lists into one term list.
///
/// `templates[i]` is the template of `program_ids[i]`. Output terms appear in
/// first-seen `tIndex` order across the templates; a `tIndex` present in no
/// template does not appear at all.
pub fn merge_flowcharts_course_data(
    templates: &[Vec<Term>],
    program_ids: &[Option<String>],
    courses: &CourseCache,
    programs: &ProgramCache,
    course_merge: bool,
) -> Result<Vec<Term>, CoreError> {
    let mut slots: IndexMap<i32, Vec<(usize, &Term)>> = IndexMap::new();
    for (program_index, terms) in templates.iter().enumerate() {
        for term in terms {
            slots
                .entry(term.t_index)
                .or_default()
                .push((program_index, term));
        }
    }

    let mut merged = Vec::with_capacity(slots.len());
    for (t_index, sources) in slots {
        let mut merged_courses: Vec<Course> = Vec::new();

        for (program_index, term) in sources {
            if program_index == 0 {
                merged_courses.extend(term.courses.iter().cloned());
                continue;
            }

            // Only courses from earlier programs take part in deduplication.
            let earlier = merged_courses.len();
            for course in &term.courses {
                let tagged = course.clone().with_program_index(program_index);
                if course_merge
                    && is_already_required(&tagged, &merged_courses[..earlier], program_ids, programs)?
                {
                    continue;
                }
                merged_courses.push(tagged);
            }
        }

        let t_units = compute_term_units(&merged_courses, program_ids, courses, programs)?;
        merged.push(Term {
            t_index,
            t_units,
            courses: merged_courses,
        });
    }

    Ok(merged)
}

/// Whether a catalog course with the same `(catalog, id)` is in `existing`.
fn is_already_required(
    candidate: &Course,
    existing: &[Course],
    program_ids: &[Option<String>],
    programs: &ProgramCache,
) -> Result<bool, CoreError> {
    let CourseKind::Catalog { id } = candidate.kind() else {
        return Ok(false);
    };
    let catalog = course_catalog(candidate, program_ids, programs)?;

    Ok(existing.iter().any(|course| {
        course.id.as_deref() == Some(id)
            && resolve_catalog(course.program_index(), program_ids, programs) == Some(catalog)
    }))
}
