//! CLI error type and its exit-code mapping.
//!
//! Exit codes: 0 success, 1 rejected or invalid data, 2 computation error
//! (inconsistent caches or stored units), 3 I/O or parse error.

use std::io;
use std::path::PathBuf;

use flowplan_core::{CoreError, ValidationError};
use flowplan_engine::EngineError;
use flowplan_storage::{MigrationError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no {what} cache given (use --{flag} or set {env})")]
    MissingCache {
        what: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CliError {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. }
            | CliError::Parse { .. }
            | CliError::MissingCache { .. }
            | CliError::Output(_) => 3,
            CliError::Migration(MigrationError::Malformed(_)) => 3,
            CliError::Core(_)
            | CliError::Storage(_)
            | CliError::Migration(MigrationError::Units(_) | MigrationError::Hash(_))
            | CliError::Engine(EngineError::Core(_) | EngineError::Hash(_)) => 2,
            CliError::Invalid(_) | CliError::Migration(_) | CliError::Engine(_) => 1,
        }
    }
}
