//! Catalog resolution for courses.
//!
//! A catalog course is identified by `(catalog, id)`, but a course only
//! stores its `id` and the index of the program that introduced it. The
//! catalog is found through the flowchart's program list and the program
//! cache.

use crate::cache::ProgramCache;
use crate::error::CoreError;
use crate::model::Course;

/// Returns the catalog of the program at `program_index`.
///
/// `None` when the slot is out of range, null, or names a program missing
/// from the cache.
pub fn resolve_catalog<'a>(
    program_index: usize,
    program_ids: &[Option<String>],
    programs: &'a ProgramCache,
) -> Option<&'a str> {
    let program_id = program_ids.get(program_index)?.as_deref()?;
    programs.get(program_id).map(|p| p.catalog.as_str())
}

/// Returns the catalog governing `course`, failing when it cannot be found.
pub fn course_catalog<'a>(
    course: &Course,
    program_ids: &[Option<String>],
    programs: &'a ProgramCache,
) -> Result<&'a str, CoreError> {
    let index = course.program_index();
    resolve_catalog(index, program_ids, programs).ok_or_else(|| CoreError::CatalogNotFound {
        index,
        program: program_ids.get(index).cloned().flatten(),
    })
}
