//! Cache locations and JSON file input.
//!
//! The course and program caches are JSON files exported from the catalog.
//! Their paths come from `--courses` / `--programs`, falling back to the
//! `FLOWPLAN_COURSE_CACHE` / `FLOWPLAN_PROGRAM_CACHE` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::de::DeserializeOwned;
use tracing::debug;

use flowplan_core::{CourseCache, ProgramCache};

use crate::error::CliError;

/// Course and program cache locations.
#[derive(Debug, Clone, Default, Args)]
pub struct CacheArgs {
    /// Path to the course cache JSON file.
    #[arg(long, env = "FLOWPLAN_COURSE_CACHE", global = true)]
    pub courses: Option<PathBuf>,

    /// Path to the program cache JSON file.
    #[arg(long, env = "FLOWPLAN_PROGRAM_CACHE", global = true)]
    pub programs: Option<PathBuf>,
}

impl CacheArgs {
    /// Loads both caches, failing if either location is missing.
    pub fn load(&self) -> Result<(CourseCache, ProgramCache), CliError> {
        let courses_path = self.courses.as_deref().ok_or(CliError::MissingCache {
            what: "course",
            flag: "courses",
            env: "FLOWPLAN_COURSE_CACHE",
        })?;
        let programs_path = self.programs.as_deref().ok_or(CliError::MissingCache {
            what: "program",
            flag: "programs",
            env: "FLOWPLAN_PROGRAM_CACHE",
        })?;

        let courses: CourseCache = read_json(courses_path)?;
        let programs: ProgramCache = read_json(programs_path)?;
        debug!(courses = courses.len(), programs = programs.len(), "loaded caches");
        Ok((courses, programs))
    }
}

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
