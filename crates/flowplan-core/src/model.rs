//! Flowchart data model: courses, terms and flowcharts.
//!
//! All types serialize with the camelCase field names used by stored
//! flowchart documents, so a round trip through serde preserves the exact
//! wire shape (`tIndex`, `programIdIndex`, `lastUpdatedUTC`, ...).
//!
//! Derived fields (`Term::t_units`, `Flowchart::unit_total`,
//! `Flowchart::hash`) are plain strings here; they are kept consistent by the
//! unit counter and the hash generator, never edited directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// `tIndex` of the credit bin, the term holding courses not yet placed.
pub const CREDIT_BIN_INDEX: i32 = -1;

/// The data-model version produced by this crate.
pub const CURRENT_FLOWCHART_VERSION: u32 = 7;

/// A course slot inside a term.
///
/// A course is either a catalog course (`id` set) or a custom course
/// (`id = None`, `custom_id` set). Use [`Course::kind`] to branch on the two
/// shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Catalog course identifier, or `None` for a custom course.
    pub id: Option<String>,
    /// Display color as a hex string.
    pub color: String,
    /// Index into the flowchart's program list; absent means 0, and an
    /// explicit 0 is read as absent.
    #[serde(
        default,
        deserialize_with = "primary_index_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub program_id_index: Option<usize>,
    /// Custom course title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Custom course display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_display_name: Option<String>,
    /// Custom course units as a ranged-unit string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_units: Option<String>,
    /// Custom course description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_desc: Option<String>,
}

fn primary_index_as_none<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<usize>::deserialize(deserializer)?.filter(|&index| index != 0))
}

/// Borrowed view of the two course shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseKind<'a> {
    /// A course from the catalog, identified by `id`.
    Catalog { id: &'a str },
    /// A user-authored course with inline units.
    Custom {
        title: &'a str,
        units: Option<&'a str>,
    },
}

impl Course {
    /// Creates a catalog course owned by the primary program.
    pub fn catalog(id: impl Into<String>, color: impl Into<String>) -> Self {
        Course {
            id: Some(id.into()),
            color: color.into(),
            program_id_index: None,
            custom_id: None,
            custom_display_name: None,
            custom_units: None,
            custom_desc: None,
        }
    }

    /// Creates a custom course with the given title and units.
    pub fn custom(
        title: impl Into<String>,
        units: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Course {
            id: None,
            color: color.into(),
            program_id_index: None,
            custom_id: Some(title.into()),
            custom_display_name: None,
            custom_units: Some(units.into()),
            custom_desc: None,
        }
    }

    /// Returns the shape of this course.
    pub fn kind(&self) -> CourseKind<'_> {
        match &self.id {
            Some(id) => CourseKind::Catalog { id },
            None => CourseKind::Custom {
                title: self.custom_id.as_deref().unwrap_or_default(),
                units: self.custom_units.as_deref(),
            },
        }
    }

    /// The program slot this course belongs to (0 when unset).
    pub fn program_index(&self) -> usize {
        self.program_id_index.unwrap_or(0)
    }

    /// Returns the course tagged with `index`; index 0 is stored as absent.
    pub fn with_program_index(mut self, index: usize) -> Self {
        self.program_id_index = (index != 0).then_some(index);
        self
    }
}

/// One term of a flowchart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    /// Term slot; [`CREDIT_BIN_INDEX`] is the credit bin.
    pub t_index: i32,
    /// Derived unit total of `courses`.
    pub t_units: String,
    /// Ordered courses.
    pub courses: Vec<Course>,
}

impl Term {
    /// An empty term at `t_index`.
    pub fn empty(t_index: i32) -> Self {
        Term {
            t_index,
            t_units: "0".to_string(),
            courses: Vec::new(),
        }
    }

    /// Whether this term is the credit bin.
    pub fn is_credit_bin(&self) -> bool {
        self.t_index == CREDIT_BIN_INDEX
    }
}

/// A user's degree plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flowchart {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    /// Ordered program ids; nulls only as a trailing suffix.
    pub program_id: Vec<Option<String>>,
    pub start_year: String,
    /// Derived sum of all term totals.
    pub unit_total: String,
    pub notes: String,
    pub term_data: Vec<Term>,
    pub version: u32,
    /// Two-part `meta.content` fingerprint.
    pub hash: String,
    pub published_id: Option<String>,
    pub imported_id: Option<String>,
    #[serde(rename = "lastUpdatedUTC")]
    pub last_updated_utc: DateTime<Utc>,
}

impl Flowchart {
    /// Returns the term with the given index.
    pub fn term(&self, t_index: i32) -> Option<&Term> {
        self.term_data.iter().find(|t| t.t_index == t_index)
    }

    /// Returns the term with the given index, mutably.
    pub fn term_mut(&mut self, t_index: i32) -> Option<&mut Term> {
        self.term_data.iter_mut().find(|t| t.t_index == t_index)
    }

    /// Returns the course at `(t_index, c_index)`.
    pub fn course(&self, t_index: i32, c_index: usize) -> Option<&Course> {
        self.term(t_index)?.courses.get(c_index)
    }

    /// The non-null program ids, in order.
    pub fn programs(&self) -> impl Iterator<Item = &str> {
        self.program_id.iter().map_while(|p| p.as_deref())
    }
}

/// A flowchart together with its position in the owner's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedFlowchart {
    pub flowchart: Flowchart,
    pub pos: usize,
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_course_wire_shape() {
        let course = Course::catalog("CSC101", "#fff").with_program_index(1);
        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(
            value,
            json!({ "id": "CSC101", "color": "#fff", "programIdIndex": 1 })
        );
    }

    #[test]
    fn primary_program_index_is_omitted() {
        let course = Course::catalog("CSC101", "#fff").with_program_index(0);
        assert_eq!(course.program_id_index, None);
        let value = serde_json::to_value(&course).unwrap();
        assert!(value.get("programIdIndex").is_none());
    }

    #[test]
    fn explicit_primary_program_index_reads_as_absent() {
        let course: Course =
            serde_json::from_value(json!({ "id": "CSC101", "color": "#fff", "programIdIndex": 0 }))
                .unwrap();
        assert_eq!(course, Course::catalog("CSC101", "#fff"));
        assert!(serde_json::to_value(&course).unwrap().get("programIdIndex").is_none());

        let course: Course =
            serde_json::from_value(json!({ "id": "CSC101", "color": "#fff", "programIdIndex": 2 }))
                .unwrap();
        assert_eq!(course.program_id_index, Some(2));
    }

    #[test]
    fn custom_course_serializes_null_id() {
        let course = Course::custom("Elective", "4-6", "#abcdef");
        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(value["id"], serde_json::Value::Null);
        assert_eq!(value["customId"], "Elective");
        assert_eq!(value["customUnits"], "4-6");
        assert_eq!(
            course.kind(),
            CourseKind::Custom {
                title: "Elective",
                units: Some("4-6")
            }
        );
    }

    #[test]
    fn flowchart_uses_stored_field_names() {
        let flow = fixtures::flowchart(vec![Term::empty(CREDIT_BIN_INDEX)]);
        let value = serde_json::to_value(&flow).unwrap();
        assert!(value.get("lastUpdatedUTC").is_some());
        assert!(value.get("termData").is_some());
        assert_eq!(value["termData"][0]["tIndex"], -1);
        assert_eq!(value["programId"], json!(["prog-a", null]));

        let back: Flowchart = serde_json::from_value(value).unwrap();
        assert_eq!(back, flow);
    }

    #[test]
    fn lookup_helpers() {
        let mut term = Term::empty(1);
        term.courses.push(Course::catalog("MATH141", "#000"));
        let flow = fixtures::flowchart(vec![Term::empty(CREDIT_BIN_INDEX), term]);

        assert!(flow.term(CREDIT_BIN_INDEX).unwrap().is_credit_bin());
        assert_eq!(flow.course(1, 0).unwrap().id.as_deref(), Some("MATH141"));
        assert!(flow.course(1, 1).is_none());
        assert!(flow.term(2).is_none());
        assert_eq!(flow.programs().collect::<Vec<_>>(), vec!["prog-a"]);
    }
}
