#![deny(unsafe_code)]

//! Family records: member persistence, the member service, relationship
//! inference for spreadsheet imports and the couple-aware family forest.

pub mod backup;
pub mod error;
pub mod import;
pub mod integrity;
pub mod members;
pub mod resolver;
pub mod stats;
pub mod store;
pub mod tree;

pub use backup::{backup_snapshot, restore_backup, write_backup};
pub use error::{ForestError, ImportError, MemberError, StoreError, TreeError};
pub use import::{FailedRow, ImportReport, import_file, run_import};
pub use integrity::{IntegrityIssue, IssueKind, check_integrity};
pub use members::{create_member, delete_member, update_member};
pub use resolver::{BoundRow, FuzzyMatch, LinkField, RelationshipResolver};
pub use stats::{FamilyStats, GenerationCount, family_stats};
pub use store::{JsonStore, MemberFilter, MemberOrder, MemberStore, MemoryStore, Snapshot};
pub use tree::{build_forest, load_forest, render_text};
