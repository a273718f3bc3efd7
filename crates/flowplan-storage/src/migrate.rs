//! Upgrading stored flowcharts to the current data model version.
//!
//! Migration is a small state machine over version numbers:
//!
//! ```text
//! pre-v6 (dataModelVersion 1..=5) --> v6 --> v7 (current)
//! ```
//!
//! - **pre-v6 -> v6**: renames `quarters/qIndex/classes/cID/customTitle` to
//!   the term/course layout, folds `qUnits`/`qUnitsMax` into one ranged
//!   string, converts `rgb(r,g,b)` colors to hex, repairs inverted unit
//!   ranges and injects an empty credit bin when missing.
//! - **v6 -> v7**: resolves each composite flow code to a program id through
//!   the program cache, then recomputes every term total and the flowchart
//!   total from scratch, since stored historical totals are not trusted.
//!
//! Every successful upgrade ends by regenerating the hash and checking the
//! result against the data-model invariants, so a legacy record that cannot
//! be represented (a custom class without a title, an overlong name) is an
//! error rather than a silently invalid flowchart. Versions outside the
//! chain are rejected.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use flowplan_core::validate::validate_flowchart;
use flowplan_core::{
    recompute_flowchart_units, Course, CourseCache, Flowchart, ProgramCache, Term, Units,
    CREDIT_BIN_INDEX, CURRENT_FLOWCHART_VERSION,
};

use crate::error::MigrationError;
use crate::hash::generate_flow_hash;
use crate::legacy::{LegacyClass, LegacyFlowchart, LegacyQuarter, V6Flowchart};

/// Version produced by the pre-v6 upgrade step.
const V6: u32 = 6;

/// A record at one point of the upgrade chain.
enum Stage {
    PreV6(LegacyFlowchart),
    V6(V6Flowchart),
    Current(Flowchart),
}

/// Reads the declared version of a raw record.
///
/// v6 and later records carry `version`; older ones carry
/// `dataModelVersion`.
pub fn detect_version(raw: &Value) -> Result<u64, MigrationError> {
    raw.get("version")
        .and_then(Value::as_u64)
        .or_else(|| raw.get("dataModelVersion").and_then(Value::as_u64))
        .ok_or(MigrationError::MissingVersion)
}

/// Whether a raw record needs to go through [`upgrade`] before use.
pub fn needs_upgrade(raw: &Value) -> Result<bool, MigrationError> {
    Ok(detect_version(raw)? != u64::from(CURRENT_FLOWCHART_VERSION))
}

/// Upgrades a raw stored flowchart owned by `owner_id` to the current
/// version, regenerating its hash.
pub fn upgrade(
    owner_id: &str,
    raw: Value,
    courses: &CourseCache,
    programs: &ProgramCache,
) -> Result<Flowchart, MigrationError> {
    let version = detect_version(&raw)?;
    let mut stage = match version {
        1..=5 => Stage::PreV6(serde_json::from_value(raw)?),
        v if v == u64::from(V6) => Stage::V6(serde_json::from_value(raw)?),
        v if v == u64::from(CURRENT_FLOWCHART_VERSION) => {
            Stage::Current(serde_json::from_value(raw)?)
        }
        other => return Err(MigrationError::UnsupportedVersion { version: other }),
    };

    loop {
        stage = match stage {
            Stage::PreV6(legacy) => {
                debug!(from = legacy.data_model_version, to = V6, "upgrading flowchart");
                Stage::V6(upgrade_pre_v6(owner_id, legacy)?)
            }
            Stage::V6(v6) => {
                debug!(id = %v6.id, from = V6, to = CURRENT_FLOWCHART_VERSION, "upgrading flowchart");
                Stage::Current(upgrade_v6(v6, courses, programs)?)
            }
            Stage::Current(mut flowchart) => {
                flowchart.owner_id = owner_id.to_string();
                flowchart.hash = generate_flow_hash(&flowchart)?;
                validate_flowchart(&flowchart)?;
                return Ok(flowchart);
            }
        };
    }
}

// ---------------------------------------------------------------------------
// pre-v6 -> v6
// ---------------------------------------------------------------------------

fn upgrade_pre_v6(owner_id: &str, legacy: LegacyFlowchart) -> Result<V6Flowchart, MigrationError> {
    let mut term_data = legacy
        .quarters
        .iter()
        .map(upgrade_quarter)
        .collect::<Result<Vec<Term>, _>>()?;

    if !term_data.iter().any(Term::is_credit_bin) {
        term_data.insert(0, Term::empty(CREDIT_BIN_INDEX));
    }

    Ok(V6Flowchart {
        id: legacy.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        owner_id: owner_id.to_string(),
        name: legacy.name,
        flow_codes: vec![Some(legacy.flow_code)],
        start_year: legacy.start_year,
        unit_total: "0".to_string(),
        notes: legacy.notes,
        term_data,
        version: V6,
        hash: String::new(),
        published_id: legacy.published_id,
        imported_id: legacy.imported_id,
        last_updated_utc: legacy.last_updated_utc.unwrap_or_else(Utc::now),
    })
}

fn upgrade_quarter(quarter: &LegacyQuarter) -> Result<Term, MigrationError> {
    let min = quarter.q_units.as_deref().unwrap_or("0");
    let units = match quarter.q_units_max.as_deref() {
        Some(max) => Units::parse_lenient(&format!("{min}-{max}"))?,
        None => Units::parse_lenient(min)?,
    };

    Ok(Term {
        t_index: quarter.q_index,
        t_units: units.to_string(),
        courses: quarter
            .classes
            .iter()
            .map(upgrade_class)
            .collect::<Result<_, _>>()?,
    })
}

fn upgrade_class(class: &LegacyClass) -> Result<Course, MigrationError> {
    let color = normalize_color(&class.color)?;

    if let Some(id) = class.c_id.as_deref().filter(|id| !id.is_empty()) {
        return Ok(Course::catalog(id, color));
    }

    let custom_units = class
        .custom_units
        .as_deref()
        .map(|units| Units::parse_lenient(units).map(|u| u.to_string()))
        .transpose()?;

    Ok(Course {
        id: None,
        color,
        program_id_index: None,
        custom_id: class.custom_title.clone(),
        custom_display_name: class.custom_display_name.clone(),
        custom_units,
        custom_desc: class.custom_desc.clone(),
    })
}

/// Converts `rgb(r, g, b)` to `#rrggbb`; hex colors pass through.
fn normalize_color(color: &str) -> Result<String, MigrationError> {
    let invalid = || MigrationError::InvalidColor {
        value: color.to_string(),
    };
    let trimmed = color.trim();
    if trimmed.starts_with('#') {
        return Ok(trimmed.to_string());
    }

    let inner = trimmed
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let channels = inner
        .split(',')
        .map(|c| c.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| invalid())?;
    let &[r, g, b] = channels.as_slice() else {
        return Err(invalid());
    };
    Ok(format!("#{r:02x}{g:02x}{b:02x}"))
}

// ---------------------------------------------------------------------------
// v6 -> v7
// ---------------------------------------------------------------------------

fn upgrade_v6(
    v6: V6Flowchart,
    courses: &CourseCache,
    programs: &ProgramCache,
) -> Result<Flowchart, MigrationError> {
    let program_id = v6
        .flow_codes
        .iter()
        .map(|code| {
            code.as_deref()
                .map(|code| resolve_flow_code(code, programs))
                .transpose()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut flowchart = Flowchart {
        id: v6.id,
        owner_id: v6.owner_id,
        name: v6.name,
        program_id,
        start_year: v6.start_year,
        unit_total: v6.unit_total,
        notes: v6.notes,
        term_data: v6.term_data,
        version: CURRENT_FLOWCHART_VERSION,
        hash: v6.hash,
        published_id: v6.published_id,
        imported_id: v6.imported_id,
        last_updated_utc: v6.last_updated_utc,
    };
    recompute_flowchart_units(&mut flowchart, courses, programs)?;
    Ok(flowchart)
}

/// Maps a `catalog|majorName|concName` flow code to a program id.
fn resolve_flow_code(code: &str, programs: &ProgramCache) -> Result<String, MigrationError> {
    let parts: Vec<&str> = code.split('|').collect();
    let &[catalog, major_name, conc_name] = parts.as_slice() else {
        return Err(MigrationError::MalformedFlowCode {
            code: code.to_string(),
        });
    };
    programs
        .find_by_names(catalog, major_name, conc_name)
        .map(|program| program.id.clone())
        .ok_or_else(|| MigrationError::UnknownFlowCode {
            code: code.to_string(),
        })
}
