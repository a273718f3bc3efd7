//! Term insertion and removal.
//!
//! The mutation engine does not decide how whole terms are added to or
//! removed from a flowchart; it hands `FLOW_TERMS_ADD` / `FLOW_TERMS_DELETE`
//! chunks to a [`TermManager`]. A manager either applies the whole request or
//! returns a reason and leaves the flowchart as it was.

use flowplan_core::{Flowchart, Term, Units};

/// Adds and removes whole terms on behalf of the mutation engine.
pub trait TermManager {
    /// Inserts an empty term at each of `t_indexes`.
    fn add_terms(&self, flowchart: &mut Flowchart, t_indexes: &[i32]) -> Result<(), String>;

    /// Removes the term at each of `t_indexes`, with its courses.
    fn delete_terms(&self, flowchart: &mut Flowchart, t_indexes: &[i32]) -> Result<(), String>;
}

/// The default term manager.
///
/// This manager does not shift `tIndex` numbering. Adding or deleting a term
/// leaves every other term at its index, because an index names a calendar
/// slot rather than a list position. A delegate that renumbers the following
/// terms on insert or delete has to be supplied as a separate
/// [`TermManager`].
///
/// New terms are inserted empty, `termData` is kept sorted by `tIndex`, and
/// `unitTotal` is refreshed from the stored term totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTermManager;

impl StandardTermManager {
    fn refresh_total(flowchart: &mut Flowchart) -> Result<(), String> {
        let total = flowchart
            .term_data
            .iter()
            .map(|t| t.t_units.parse::<Units>())
            .sum::<Result<Units, _>>()
            .map_err(|e| e.to_string())?;
        flowchart.unit_total = total.to_string();
        Ok(())
    }
}

impl TermManager for StandardTermManager {
    fn add_terms(&self, flowchart: &mut Flowchart, t_indexes: &[i32]) -> Result<(), String> {
        for (i, &t_index) in t_indexes.iter().enumerate() {
            if t_index < 0 {
                return Err(format!("cannot add term {t_index}: indexes start at 0"));
            }
            if flowchart.term(t_index).is_some() || t_indexes[..i].contains(&t_index) {
                return Err(format!("term {t_index} already exists"));
            }
        }

        flowchart
            .term_data
            .extend(t_indexes.iter().map(|&t| Term::empty(t)));
        flowchart.term_data.sort_by_key(|t| t.t_index);
        Self::refresh_total(flowchart)
    }

    fn delete_terms(&self, flowchart: &mut Flowchart, t_indexes: &[i32]) -> Result<(), String> {
        for &t_index in t_indexes {
            match flowchart.term(t_index) {
                None => return Err(format!("term {t_index} does not exist")),
                Some(term) if term.is_credit_bin() => {
                    return Err("the credit bin cannot be deleted".to_string())
                }
                Some(_) => {}
            }
        }

        flowchart
            .term_data
            .retain(|t| !t_indexes.contains(&t.t_index));
        Self::refresh_total(flowchart)
    }
}
