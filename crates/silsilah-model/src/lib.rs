//! Data model for the family genealogy system.
//!
//! Members, transient import rows, rendered tree nodes, import options and
//! the diagnostics produced while resolving relationships.

pub mod diagnostic;
pub mod error;
pub mod ids;
pub mod import;
pub mod member;
pub mod options;
pub mod tree;

pub use diagnostic::{Diagnostic, DiagnosticCounts, DiagnosticKind, Severity};
pub use error::{ModelError, Result};
pub use ids::MemberId;
pub use import::{ImportRow, PARENT_SEPARATOR, split_parent_field};
pub use member::{
    Gender, Member, MemberDetails, MemberPatch, NewMember, validate_generation, validate_name,
};
pub use options::{CoupleTieBreak, ImportMode, ImportOptions, MatchPolicy};
pub use tree::TreeNode;
