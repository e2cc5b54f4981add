//! Error types for the member store, member service, tree builder and import.

use std::path::PathBuf;

use silsilah_ingest::IngestError;
use silsilah_model::{MemberId, ModelError};
use thiserror::Error;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("failed to replace {target_path} with {temp_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize member data")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read member data from {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot written by a newer version.
    #[error("member file version {found} is not supported (maximum: {max_supported}): {path}")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("duplicate member id: {0}")]
    DuplicateId(MemberId),

    /// A member would reference itself as parent or spouse.
    #[error("member {id} cannot be its own {relation}")]
    SelfReference { id: MemberId, relation: &'static str },

    /// The backing store rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Rejected single-member create, update or delete.
#[derive(Debug, Error)]
pub enum MemberError {
    #[error(transparent)]
    Invalid(#[from] ModelError),

    #[error("member not found: {0}")]
    NotFound(MemberId),

    #[error("parent not found: {0}")]
    ParentNotFound(MemberId),

    #[error("spouse not found: {0}")]
    SpouseNotFound(MemberId),

    #[error("member {id} cannot be its own {relation}")]
    SelfReference { id: MemberId, relation: &'static str },

    /// Parents must sit in a strictly lower generation.
    #[error(
        "parent {parent} is in generation {parent_generation}, which is not below generation {generation}"
    )]
    ParentGeneration {
        parent: MemberId,
        parent_generation: u32,
        generation: u32,
    },

    /// Changing a generation would put a child at or above its parent.
    #[error("child {child} in generation {child_generation} would not be below generation {generation}")]
    ChildGeneration {
        child: MemberId,
        child_generation: u32,
        generation: u32,
    },

    #[error("setting {parent} as parent of {id} would create a cycle")]
    ParentCycle { id: MemberId, parent: MemberId },

    #[error("{spouse} is already married to {partner}")]
    SpouseTaken { spouse: MemberId, partner: MemberId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Integrity failure while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The parent chain below a root is deeper than the generations allow,
    /// or revisits a member.
    #[error("tree depth limit {limit} exceeded at member {id}")]
    DepthExceeded { id: MemberId, limit: usize },
}

/// Failure that stops an import batch.
///
/// Per-row failures do not abort the batch; they are listed in the report.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file")]
    Ingest(#[from] IngestError),

    #[error("failed to clear existing members")]
    Clear(#[source] StoreError),

    #[error("failed to load existing members")]
    Load(#[source] StoreError),
}

/// Failure while loading members for, or building, the forest.
#[derive(Debug, Error)]
pub enum ForestError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
