//! Historical flowchart record shapes.
//!
//! - **Pre-v6** (`dataModelVersion` 1..=5): a single flow code, `quarters`
//!   of `classes`, per-quarter `qUnits`/`qUnitsMax` bounds, and colors that
//!   may be stored as `rgb(r,g,b)`.
//! - **v6** (`version: 6`): the current term/course layout, but programs are
//!   still referenced by composite flow codes rather than program ids.
//!
//! These types are only read by the migrator; nothing writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flowplan_core::Term;

/// A pre-v6 flowchart record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFlowchart {
    pub data_model_version: u32,
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub start_year: String,
    /// Composite `catalog|majorName|concName` code of the only program.
    pub flow_code: String,
    pub quarters: Vec<LegacyQuarter>,
    #[serde(default)]
    pub published_id: Option<String>,
    #[serde(default)]
    pub imported_id: Option<String>,
    #[serde(default, rename = "lastUpdatedUTC")]
    pub last_updated_utc: Option<DateTime<Utc>>,
}

/// A pre-v6 term.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyQuarter {
    pub q_index: i32,
    /// Minimum (or exact) units of the quarter.
    #[serde(default)]
    pub q_units: Option<String>,
    /// Maximum units of the quarter when it differs from `q_units`.
    #[serde(default)]
    pub q_units_max: Option<String>,
    #[serde(default)]
    pub classes: Vec<LegacyClass>,
}

/// A pre-v6 course.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyClass {
    #[serde(default, rename = "cID")]
    pub c_id: Option<String>,
    pub color: String,
    #[serde(default)]
    pub custom_title: Option<String>,
    #[serde(default)]
    pub custom_display_name: Option<String>,
    #[serde(default)]
    pub custom_units: Option<String>,
    #[serde(default)]
    pub custom_desc: Option<String>,
}

/// A v6 flowchart record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V6Flowchart {
    pub id: String,
    #[serde(default)]
    pub owner_id: String,
    pub name: String,
    /// Composite flow codes, one per program slot.
    pub flow_codes: Vec<Option<String>>,
    pub start_year: String,
    #[serde(default)]
    pub unit_total: String,
    #[serde(default)]
    pub notes: String,
    pub term_data: Vec<Term>,
    pub version: u32,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub published_id: Option<String>,
    #[serde(default)]
    pub imported_id: Option<String>,
    #[serde(rename = "lastUpdatedUTC")]
    pub last_updated_utc: DateTime<Utc>,
}
