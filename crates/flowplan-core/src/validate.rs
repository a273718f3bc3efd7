//! Data-model invariants for flowcharts and courses.
//!
//! Each validator returns the first violation found. Lengths are counted in
//! characters, not bytes.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::{Course, Flowchart, Term, CREDIT_BIN_INDEX};
use crate::units::Units;

/// Maximum flowchart name length.
pub const MAX_NAME_LEN: usize = 80;
/// Maximum flowchart notes length.
pub const MAX_NOTES_LEN: usize = 1000;
/// Maximum custom course title length.
pub const MAX_CUSTOM_ID_LEN: usize = 80;
/// Maximum custom course display name length.
pub const MAX_CUSTOM_DISPLAY_NAME_LEN: usize = 80;
/// Maximum custom course description length.
pub const MAX_CUSTOM_DESC_LEN: usize = 500;
/// Maximum number of program slots on a flowchart.
pub const MAX_PROGRAMS: usize = 5;

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::FieldLength {
            field,
            min,
            max,
            len,
        });
    }
    Ok(())
}

/// Checks a `#rgb` or `#rrggbb` color.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor {
            value: color.to_string(),
        })
    }
}

/// Checks the catalog/custom shape rules of a single course.
pub fn validate_course(course: &Course) -> Result<(), ValidationError> {
    validate_color(&course.color)?;

    match &course.id {
        Some(id) => {
            if id.is_empty() {
                return Err(ValidationError::EmptyCourseId);
            }
            let custom_fields = [
                ("customId", course.custom_id.is_some()),
                ("customDisplayName", course.custom_display_name.is_some()),
                ("customUnits", course.custom_units.is_some()),
                ("customDesc", course.custom_desc.is_some()),
            ];
            if let Some((field, _)) = custom_fields.into_iter().find(|(_, set)| *set) {
                return Err(ValidationError::CustomFieldOnCatalogCourse { field });
            }
        }
        None => {
            let title = course
                .custom_id
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or(ValidationError::MissingCustomId)?;
            check_length("customId", title, 1, MAX_CUSTOM_ID_LEN)?;
            if let Some(name) = &course.custom_display_name {
                check_length("customDisplayName", name, 0, MAX_CUSTOM_DISPLAY_NAME_LEN)?;
            }
            if let Some(desc) = &course.custom_desc {
                check_length("customDesc", desc, 0, MAX_CUSTOM_DESC_LEN)?;
            }
            if let Some(units) = &course.custom_units {
                units
                    .parse::<Units>()
                    .map_err(|_| ValidationError::InvalidUnits {
                        field: "customUnits",
                        value: units.clone(),
                    })?;
            }
        }
    }

    Ok(())
}

/// Checks that the program list has 1..=[`MAX_PROGRAMS`] slots, a non-null
/// primary program, and nulls only as a contiguous suffix.
pub fn validate_program_ids(program_ids: &[Option<String>]) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidProgramList {
        reason: reason.to_string(),
    };
    if program_ids.is_empty() || program_ids.len() > MAX_PROGRAMS {
        return Err(invalid("must contain between 1 and 5 slots"));
    }
    if program_ids[0].is_none() {
        return Err(invalid("primary program must not be null"));
    }
    let first_null = program_ids
        .iter()
        .position(Option::is_none)
        .unwrap_or(program_ids.len());
    if program_ids[first_null..].iter().any(Option::is_some) {
        return Err(invalid("null slots must form a trailing suffix"));
    }
    if program_ids[..first_null]
        .iter()
        .any(|p| p.as_deref().is_some_and(str::is_empty))
    {
        return Err(invalid("program ids must not be empty"));
    }
    Ok(())
}

/// Checks term indexes, the credit bin, stored totals and every course.
///
/// `program_count` is the number of non-null program slots; course program
/// indexes must fall below it.
pub fn validate_term_data(terms: &[Term], program_count: usize) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for term in terms {
        if term.t_index < CREDIT_BIN_INDEX {
            return Err(ValidationError::InvalidTermIndex {
                t_index: term.t_index,
            });
        }
        if !seen.insert(term.t_index) {
            return Err(ValidationError::DuplicateTerm {
                t_index: term.t_index,
            });
        }
        term.t_units
            .parse::<Units>()
            .map_err(|_| ValidationError::InvalidUnits {
                field: "tUnits",
                value: term.t_units.clone(),
            })?;
        for course in &term.courses {
            validate_course(course)?;
            if course.program_index() >= program_count {
                return Err(ValidationError::ProgramIndexOutOfRange {
                    index: course.program_index(),
                });
            }
        }
    }
    if !seen.contains(&CREDIT_BIN_INDEX) {
        return Err(ValidationError::MissingCreditBin);
    }
    Ok(())
}

/// Checks every structural invariant of a flowchart.
pub fn validate_flowchart(flowchart: &Flowchart) -> Result<(), ValidationError> {
    check_length("name", &flowchart.name, 1, MAX_NAME_LEN)?;
    check_length("notes", &flowchart.notes, 0, MAX_NOTES_LEN)?;
    validate_program_ids(&flowchart.program_id)?;
    if flowchart.version == 0 {
        return Err(ValidationError::InvalidVersion);
    }
    flowchart
        .unit_total
        .parse::<Units>()
        .map_err(|_| ValidationError::InvalidUnits {
            field: "unitTotal",
            value: flowchart.unit_total.clone(),
        })?;
    validate_term_data(&flowchart.term_data, flowchart.programs().count())
}
