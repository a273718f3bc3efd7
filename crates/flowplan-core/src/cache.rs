//! Read-only course and program lookup tables.
//!
//! Both caches are populated by the caller before any computation runs and
//! are only ever read by this crate. They deserialize from the JSON arrays
//! the catalog exporters produce: a list of `{ catalog, courses }` entries for
//! courses and a flat list of programs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata for one catalog course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadata {
    pub id: String,
    pub catalog: String,
    #[serde(default)]
    pub display_name: String,
    /// Ranged-unit string.
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addl: Option<String>,
}

/// All course records of one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCacheEntry {
    pub catalog: String,
    pub courses: Vec<CourseMetadata>,
}

/// Course metadata keyed by `(catalog, id)`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Vec<CourseCacheEntry>")]
pub struct CourseCache {
    by_catalog: HashMap<String, HashMap<String, CourseMetadata>>,
}

impl CourseCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every course of `entry` under `entry.catalog`.
    pub fn insert_entry(&mut self, entry: CourseCacheEntry) {
        let courses = self.by_catalog.entry(entry.catalog).or_default();
        for course in entry.courses {
            courses.insert(course.id.clone(), course);
        }
    }

    /// Looks up a course record.
    pub fn get(&self, catalog: &str, id: &str) -> Option<&CourseMetadata> {
        self.by_catalog.get(catalog)?.get(id)
    }

    /// Number of course records across all catalogs.
    pub fn len(&self) -> usize {
        self.by_catalog.values().map(HashMap::len).sum()
    }

    /// Whether the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<CourseCacheEntry> for CourseCache {
    fn from_iter<I: IntoIterator<Item = CourseCacheEntry>>(iter: I) -> Self {
        let mut cache = CourseCache::new();
        for entry in iter {
            cache.insert_entry(entry);
        }
        cache
    }
}

impl From<Vec<CourseCacheEntry>> for CourseCache {
    fn from(entries: Vec<CourseCacheEntry>) -> Self {
        entries.into_iter().collect()
    }
}

/// A degree program (major plus concentration) within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub catalog: String,
    pub major_name: String,
    pub conc_name: String,
}

/// Programs keyed by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Vec<Program>")]
pub struct ProgramCache {
    by_id: HashMap<String, Program>,
}

impl ProgramCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a program.
    pub fn insert(&mut self, program: Program) {
        self.by_id.insert(program.id.clone(), program);
    }

    /// Looks up a program by id.
    pub fn get(&self, id: &str) -> Option<&Program> {
        self.by_id.get(id)
    }

    /// Finds the program matching a catalog, major and concentration.
    pub fn find_by_names(&self, catalog: &str, major_name: &str, conc_name: &str) -> Option<&Program> {
        self.by_id.values().find(|p| {
            p.catalog == catalog && p.major_name == major_name && p.conc_name == conc_name
        })
    }

    /// Number of programs.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the cache holds no programs.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Program> for ProgramCache {
    fn from_iter<I: IntoIterator<Item = Program>>(iter: I) -> Self {
        let mut cache = ProgramCache::new();
        for program in iter {
            cache.insert(program);
        }
        cache
    }
}

impl From<Vec<Program>> for ProgramCache {
    fn from(programs: Vec<Program>) -> Self {
        programs.into_iter().collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn course_cache_deserializes_entries() {
        let cache: CourseCache = serde_json::from_value(json!([
            {
                "catalog": "2019-2020",
                "courses": [
                    { "id": "AGC301", "catalog": "2019-2020", "displayName": "Ag", "units": "4" }
                ]
            }
        ]))
        .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("2019-2020", "AGC301").unwrap().units, "4");
        assert!(cache.get("2020-2021", "AGC301").is_none());
    }

    #[test]
    fn program_lookup_by_names() {
        let (_, programs) = fixtures::caches();
        let found = programs
            .find_by_names("2020-2021", "Major prog-b", "General")
            .unwrap();
        assert_eq!(found.id, "prog-b");
        assert!(programs.find_by_names("2020-2021", "Major prog-a", "General").is_none());
    }
}
