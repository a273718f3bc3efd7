//! Stored-data concerns for flowplan flowcharts.
//!
//! Flowcharts are persisted by the caller as JSON documents. This crate owns
//! the two things that depend on that stored form: the two-part change
//! detection hash, and upgrading documents written under older data model
//! versions.
//!
//! # Modules
//!
//! - [`error`]: StorageError and MigrationError
//! - [`hash`]: `metaHash.contentHash` fingerprints
//! - [`legacy`]: pre-v6 and v6 record shapes
//! - [`migrate`]: the version upgrade chain

pub mod error;
pub mod hash;
pub mod legacy;
pub mod migrate;

// Re-export key types for ergonomic use.
pub use error::{MigrationError, StorageError};
pub use hash::{compare_flow_hashes, generate_flow_hash, is_valid_flow_hash, HashChange};
pub use hash::{hash_content, hash_metadata, split_flow_hash};
pub use migrate::{detect_version, needs_upgrade, upgrade};
