//! Creating flowcharts and refreshing their derived fields.
//!
//! New flowcharts come from three places: program templates (one template
//! term list per selected program, merged into one), duplicating one of the
//! user's own flowcharts, or importing a published flowchart. Every path ends
//! with a fresh id, a fresh timestamp and a regenerated hash.

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use flowplan_core::validate::{validate_flowchart, validate_program_ids};
use flowplan_core::{
    compute_total_units, merge_flowcharts_course_data, ComputeMode, CourseCache, Flowchart,
    ProgramCache, Term, CREDIT_BIN_INDEX, CURRENT_FLOWCHART_VERSION,
};
use flowplan_storage::generate_flow_hash;

use crate::error::EngineError;

fn default_course_merge() -> bool {
    true
}

/// Parameters of a flowchart generated from program templates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub owner_id: String,
    pub name: String,
    pub program_ids: Vec<Option<String>>,
    pub start_year: String,
    #[serde(default)]
    pub notes: String,
    /// Drop catalog courses a later program shares with an earlier one.
    #[serde(default = "default_course_merge")]
    pub course_merge: bool,
}

/// Builds a new flowchart from one template term list per program.
///
/// `templates[i]` belongs to `request.program_ids[i]`; a template is required
/// for every non-null program slot.
pub fn generate_flowchart(
    request: &GenerateRequest,
    templates: &[Vec<Term>],
    courses: &CourseCache,
    programs: &ProgramCache,
) -> Result<Flowchart, EngineError> {
    validate_program_ids(&request.program_ids)?;
    let expected = request.program_ids.iter().flatten().count();
    if templates.len() != expected {
        return Err(EngineError::TemplateCount {
            expected,
            found: templates.len(),
        });
    }

    let mut term_data = merge_flowcharts_course_data(
        templates,
        &request.program_ids,
        courses,
        programs,
        request.course_merge,
    )?;
    if !term_data.iter().any(Term::is_credit_bin) {
        term_data.insert(0, Term::empty(CREDIT_BIN_INDEX));
    }

    let unit_total = compute_total_units(
        &term_data,
        courses,
        programs,
        ComputeMode::Full {
            program_ids: &request.program_ids,
        },
    )?;

    let mut flowchart = Flowchart {
        id: Uuid::new_v4().to_string(),
        owner_id: request.owner_id.clone(),
        name: request.name.clone(),
        program_id: request.program_ids.clone(),
        start_year: request.start_year.clone(),
        unit_total,
        notes: request.notes.clone(),
        term_data,
        version: CURRENT_FLOWCHART_VERSION,
        hash: String::new(),
        published_id: None,
        imported_id: None,
        last_updated_utc: Utc::now(),
    };
    flowchart.hash = generate_flow_hash(&flowchart)?;
    validate_flowchart(&flowchart)?;

    debug!(id = %flowchart.id, terms = flowchart.term_data.len(), "generated flowchart");
    Ok(flowchart)
}

/// Copies one of the owner's flowcharts under a new name.
pub fn duplicate_flowchart(
    source: &Flowchart,
    owner_id: &str,
    name: &str,
) -> Result<Flowchart, EngineError> {
    let mut copy = source.clone();
    copy.id = Uuid::new_v4().to_string();
    copy.owner_id = owner_id.to_string();
    copy.name = name.to_string();
    copy.published_id = None;
    copy.imported_id = None;
    copy.last_updated_utc = Utc::now();
    copy.hash = generate_flow_hash(&copy)?;
    validate_flowchart(&copy)?;
    Ok(copy)
}

/// Copies a published flowchart into `owner_id`'s collection, remembering
/// where it came from.
pub fn import_flowchart(source: &Flowchart, owner_id: &str) -> Result<Flowchart, EngineError> {
    let mut copy = source.clone();
    copy.imported_id = Some(
        source
            .published_id
            .clone()
            .unwrap_or_else(|| source.id.clone()),
    );
    copy.id = Uuid::new_v4().to_string();
    copy.owner_id = owner_id.to_string();
    copy.published_id = None;
    copy.last_updated_utc = Utc::now();
    copy.hash = generate_flow_hash(&copy)?;
    Ok(copy)
}

/// Recomputes `unitTotal` from the stored term totals and regenerates the
/// hash, after the mutation engine has edited a flowchart.
pub fn refresh_derived(
    flowchart: &mut Flowchart,
    courses: &CourseCache,
    programs: &ProgramCache,
) -> Result<(), EngineError> {
    flowchart.unit_total =
        compute_total_units(&flowchart.term_data, courses, programs, ComputeMode::Stored)?;
    flowchart.hash = generate_flow_hash(flowchart)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{caches, flowchart};
    use flowplan_core::{Course, ValidationError};
    use flowplan_storage::is_valid_flow_hash;

    fn request(program_ids: &[&str]) -> GenerateRequest {
        GenerateRequest {
            owner_id: "owner-1".to_string(),
            name: "Generated".to_string(),
            program_ids: program_ids.iter().map(|p| Some(p.to_string())).collect(),
            start_year: "2020".to_string(),
            notes: String::new(),
            course_merge: true,
        }
    }

    fn template(t_index: i32, courses: Vec<Course>) -> Term {
        Term {
            t_index,
            t_units: "0".to_string(),
            courses,
        }
    }

    #[test]
    fn generates_merged_flowchart_with_credit_bin() {
        let (courses, programs) = caches();
        let templates = vec![
            vec![template(1, vec![Course::catalog("AGC301", "#fff")])],
            vec![template(
                1,
                vec![Course::catalog("AGC301", "#fff"), Course::catalog("BIO161", "#fff")],
            )],
        ];

        let flow =
            generate_flowchart(&request(&["prog-a", "prog-c"]), &templates, &courses, &programs)
                .unwrap();

        assert_eq!(flow.version, CURRENT_FLOWCHART_VERSION);
        assert!(flow.term_data[0].is_credit_bin());
        let term = flow.term(1).unwrap();
        assert_eq!(term.courses.len(), 2);
        assert_eq!(term.courses[1].program_id_index, Some(1));
        assert_eq!(term.t_units, "8-10");
        assert_eq!(flow.unit_total, "8-10");
        assert!(is_valid_flow_hash(&flow.hash));
        assert_eq!(flow.hash, generate_flow_hash(&flow).unwrap());
    }

    #[test]
    fn template_count_must_match_programs() {
        let (courses, programs) = caches();
        let err = generate_flowchart(&request(&["prog-a", "prog-c"]), &[vec![]], &courses, &programs)
            .unwrap_err();
        assert!(matches!(err, EngineError::TemplateCount { expected: 2, found: 1 }));
    }

    #[test]
    fn invalid_request_is_rejected() {
        let (courses, programs) = caches();
        let mut req = request(&["prog-a"]);
        req.name = String::new();
        let err = generate_flowchart(&req, &[vec![]], &courses, &programs).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Invalid(ValidationError::FieldLength { field: "name", .. })
        ));

        let err = generate_flowchart(&request(&[]), &[], &courses, &programs).unwrap_err();
        assert!(matches!(err, EngineError::Invalid(ValidationError::InvalidProgramList { .. })));
    }

    #[test]
    fn duplicate_gets_new_identity() {
        let mut source = flowchart();
        source.published_id = Some("pub-1".to_string());
        source.imported_id = Some("orig".to_string());

        let copy = duplicate_flowchart(&source, "owner-1", "Copy").unwrap();
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.name, "Copy");
        assert_eq!(copy.published_id, None);
        assert_eq!(copy.imported_id, None);
        assert_eq!(copy.term_data, source.term_data);
        assert!(is_valid_flow_hash(&copy.hash));
    }

    #[test]
    fn import_records_origin() {
        let mut source = flowchart();
        let imported = import_flowchart(&source, "owner-2").unwrap();
        assert_eq!(imported.imported_id.as_deref(), Some("flow-1"));
        assert_eq!(imported.owner_id, "owner-2");

        source.published_id = Some("pub-7".to_string());
        let imported = import_flowchart(&source, "owner-2").unwrap();
        assert_eq!(imported.imported_id.as_deref(), Some("pub-7"));
        assert_eq!(imported.published_id, None);
    }

    #[test]
    fn refresh_derived_sums_stored_terms() {
        let (courses, programs) = caches();
        let mut flow = flowchart();
        flow.term_mut(2).unwrap().t_units = "1".to_string();
        refresh_derived(&mut flow, &courses, &programs).unwrap();
        assert_eq!(flow.unit_total, "5");
        assert_eq!(flow.hash, generate_flow_hash(&flow).unwrap());
    }
}
