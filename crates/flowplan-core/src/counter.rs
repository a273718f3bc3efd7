//! Per-term and whole-flowchart unit totals.
//!
//! # Compute modes
//!
//! [`compute_total_units`] either trusts each term's stored `t_units`
//! ([`ComputeMode::Stored`]) or recomputes every term from its courses
//! ([`ComputeMode::Full`]). The stored path is for call sites that already
//! keep term totals consistent; the full path is for freshly built or
//! migrated data, and needs the program list to resolve catalogs.
//!
//! A catalog course whose catalog or metadata cannot be found is an error,
//! never a silent zero.

use crate::cache::{CourseCache, ProgramCache};
use crate::catalog::course_catalog;
use crate::error::CoreError;
use crate::model::{Course, CourseKind, Flowchart, Term};
use crate::units::Units;

/// How [`compute_total_units`] obtains per-term totals.
#[derive(Debug, Clone, Copy)]
pub enum ComputeMode<'a> {
    /// Sum the terms' stored `t_units`.
    Stored,
    /// Recompute every term against the given program list.
    Full { program_ids: &'a [Option<String>] },
}

/// Units contributed by a single course.
pub fn course_units(
    course: &Course,
    program_ids: &[Option<String>],
    courses: &CourseCache,
    programs: &ProgramCache,
) -> Result<Units, CoreError> {
    match course.kind() {
        CourseKind::Catalog { id } => {
            let catalog = course_catalog(course, program_ids, programs)?;
            let record = courses
                .get(catalog, id)
                .ok_or_else(|| CoreError::CourseNotFound {
                    catalog: catalog.to_string(),
                    id: id.to_string(),
                })?;
            record.units.parse()
        }
        CourseKind::Custom { units, .. } => units.unwrap_or("0").parse(),
    }
}

/// Sums the units of every course in a term.
pub fn compute_term_units(
    term_courses: &[Course],
    program_ids: &[Option<String>],
    courses: &CourseCache,
    programs: &ProgramCache,
) -> Result<String, CoreError> {
    let mut total = Units::ZERO;
    for course in term_courses {
        total = total + course_units(course, program_ids, courses, programs)?;
    }
    Ok(total.to_string())
}

/// Sums unit totals across all terms.
pub fn compute_total_units(
    terms: &[Term],
    courses: &CourseCache,
    programs: &ProgramCache,
    mode: ComputeMode<'_>,
) -> Result<String, CoreError> {
    let mut total = Units::ZERO;
    for term in terms {
        let term_units = match mode {
            ComputeMode::Stored => term.t_units.parse::<Units>()?,
            ComputeMode::Full { program_ids } => {
                compute_term_units(&term.courses, program_ids, courses, programs)?.parse()?
            }
        };
        total = total + term_units;
    }
    Ok(total.to_string())
}

/// Recomputes every term's `t_units` and the flowchart's `unit_total`.
pub fn recompute_flowchart_units(
    flowchart: &mut Flowchart,
    courses: &CourseCache,
    programs: &ProgramCache,
) -> Result<(), CoreError> {
    for term in &mut flowchart.term_data {
        term.t_units = compute_term_units(&term.courses, &flowchart.program_id, courses, programs)?;
    }
    flowchart.unit_total =
        compute_total_units(&flowchart.term_data, courses, programs, ComputeMode::Stored)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fixtures::caches;
    use crate::model::fixtures::flowchart;
    use crate::model::CREDIT_BIN_INDEX;

    fn primary() -> Vec<Option<String>> {
        vec![Some("prog-a".to_string())]
    }

    #[test]
    fn single_catalog_course() {
        let (courses, programs) = caches();
        let term = vec![Course::catalog("AGC301", "#fff")];
        assert_eq!(compute_term_units(&term, &primary(), &courses, &programs).unwrap(), "4");
    }

    #[test]
    fn ranged_catalog_course() {
        let (courses, programs) = caches();
        let term = vec![Course::catalog("AGC301", "#fff"), Course::catalog("BIO161", "#fff")];
        assert_eq!(compute_term_units(&term, &primary(), &courses, &programs).unwrap(), "8-10");
    }

    #[test]
    fn custom_courses_use_inline_units() {
        let (courses, programs) = caches();
        let mut no_units = Course::custom("Nothing", "0", "#fff");
        no_units.custom_units = None;
        let term = vec![Course::custom("Elective", "1.5-3", "#fff"), no_units];
        assert_eq!(compute_term_units(&term, &primary(), &courses, &programs).unwrap(), "1.5-3");
    }

    #[test]
    fn empty_term_is_zero() {
        let (courses, programs) = caches();
        assert_eq!(compute_term_units(&[], &primary(), &courses, &programs).unwrap(), "0");
    }

    #[test]
    fn secondary_program_course_uses_its_catalog() {
        let (courses, programs) = caches();
        let program_ids = vec![Some("prog-a".to_string()), Some("prog-b".to_string())];
        // CSC101 only exists in the second program's catalog.
        let term = vec![Course::catalog("CSC101", "#fff").with_program_index(1)];
        assert_eq!(compute_term_units(&term, &program_ids, &courses, &programs).unwrap(), "4");

        let untagged = vec![Course::catalog("CSC101", "#fff")];
        assert!(matches!(
            compute_term_units(&untagged, &program_ids, &courses, &programs),
            Err(CoreError::CourseNotFound { .. })
        ));
    }

    #[test]
    fn unresolvable_catalog_fails() {
        let (courses, programs) = caches();
        let term = vec![Course::catalog("AGC301", "#fff").with_program_index(3)];
        assert!(matches!(
            compute_term_units(&term, &primary(), &courses, &programs),
            Err(CoreError::CatalogNotFound { index: 3, .. })
        ));
    }

    #[test]
    fn malformed_custom_units_fail() {
        let (courses, programs) = caches();
        let term = vec![Course::custom("Bad", "lots", "#fff")];
        assert!(matches!(
            compute_term_units(&term, &primary(), &courses, &programs),
            Err(CoreError::InvalidUnits { .. })
        ));
    }

    #[test]
    fn stored_mode_trusts_term_totals() {
        let (courses, programs) = caches();
        let mut stale = Term::empty(1);
        stale.t_units = "12".to_string();
        stale.courses.push(Course::catalog("AGC301", "#fff"));
        let terms = vec![Term::empty(CREDIT_BIN_INDEX), stale];

        let stored = compute_total_units(&terms, &courses, &programs, ComputeMode::Stored).unwrap();
        assert_eq!(stored, "12");

        let program_ids = primary();
        let full = compute_total_units(
            &terms,
            &courses,
            &programs,
            ComputeMode::Full { program_ids: &program_ids },
        )
        .unwrap();
        assert_eq!(full, "4");
    }

    #[test]
    fn recompute_fixes_terms_and_total() {
        let (courses, programs) = caches();
        let mut term = Term::empty(1);
        term.t_units = "99".to_string();
        term.courses.push(Course::catalog("BIO161", "#fff"));
        term.courses.push(Course::custom("Lab", "1", "#fff"));
        let mut flow = flowchart(vec![Term::empty(CREDIT_BIN_INDEX), term]);

        recompute_flowchart_units(&mut flow, &courses, &programs).unwrap();
        assert_eq!(flow.term(1).unwrap().t_units, "5-7");
        assert_eq!(flow.unit_total, "5-7");
    }
}
