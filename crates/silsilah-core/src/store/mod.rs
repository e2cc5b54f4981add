//! Member persistence.
//!
//! [`MemberStore`] is the persistence collaborator used by the member service,
//! the tree loader and the import. [`MemoryStore`] keeps members in memory
//! and [`JsonStore`] persists a [`MemoryStore`] as a JSON snapshot after every
//! write.

mod json;
mod memory;

pub use json::{
    JsonStore, SNAPSHOT_VERSION, Snapshot, read_snapshot, write_atomic, write_snapshot,
};
pub use memory::{DEFAULT_NAMESPACE, MemoryStore};

use silsilah_model::{Member, MemberId, MemberPatch, NewMember};

use crate::error::Result;

/// Sort order for [`MemberStore::list_members`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberOrder {
    /// Generation ascending, then name, then id.
    #[default]
    Listing,
    /// Creation order.
    Insertion,
}

/// Conjunctive filter for [`MemberStore::list_members`]. The default matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    pub generation: Option<u32>,
    pub parent_id: Option<MemberId>,
    pub spouse_id: Option<MemberId>,
    /// Case-insensitive substring of the display name.
    pub name_contains: Option<String>,
}

impl MemberFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn children_of(parent_id: &MemberId) -> Self {
        Self {
            parent_id: Some(parent_id.clone()),
            ..Self::default()
        }
    }

    pub fn spouses_of(spouse_id: &MemberId) -> Self {
        Self {
            spouse_id: Some(spouse_id.clone()),
            ..Self::default()
        }
    }

    pub fn matches(&self, member: &Member) -> bool {
        if self.generation.is_some_and(|generation| member.generation != generation) {
            return false;
        }
        if self
            .parent_id
            .as_ref()
            .is_some_and(|parent| member.parent_id.as_ref() != Some(parent))
        {
            return false;
        }
        if self
            .spouse_id
            .as_ref()
            .is_some_and(|spouse| member.spouse_id.as_ref() != Some(spouse))
        {
            return false;
        }
        if let Some(needle) = &self.name_contains {
            return member.name.to_lowercase().contains(&needle.to_lowercase());
        }
        true
    }
}

/// Persistence collaborator.
///
/// Every method is one unit of atomicity: either its whole effect is
/// stored or none of it is.
pub trait MemberStore {
    /// Stores a new member under a freshly assigned id.
    fn create_member(&mut self, fields: NewMember) -> Result<Member>;

    /// Applies `patch` verbatim and returns the updated member.
    fn update_member(&mut self, id: &MemberId, patch: MemberPatch) -> Result<Member>;

    /// Removes a member. References held by other members are left alone.
    fn delete_member(&mut self, id: &MemberId) -> Result<()>;

    fn list_members(&self, filter: &MemberFilter, order: MemberOrder) -> Result<Vec<Member>>;

    fn get_member(&self, id: &MemberId) -> Result<Option<Member>>;

    /// Removes every member and restarts id assignment.
    fn clear(&mut self) -> Result<()>;

    /// Links two members as spouses on both sides. A previous partner of
    /// either side loses its back-reference.
    fn link_spouses(&mut self, left: &MemberId, right: &MemberId) -> Result<()>;

    /// Clears the spouse of `id` and the partner's back-reference.
    fn unlink_spouse(&mut self, id: &MemberId) -> Result<()>;

    /// Replaces the whole member set, keeping the given order as creation order.
    fn replace_all(&mut self, members: Vec<Member>) -> Result<()>;
}
