use std::collections::HashSet;

use sha2::{Digest, Sha256};
use silsilah_model::{Member, MemberId, MemberPatch, NewMember};

use super::{MemberFilter, MemberOrder, MemberStore};
use crate::error::{Result, StoreError};

/// Default id namespace.
pub const DEFAULT_NAMESPACE: &str = "silsilah";

/// In-memory member store with deterministic ids.
///
/// The n-th member created after a [`clear`](MemberStore::clear) always gets
/// the same id for a given namespace, so replaying an import into a cleared
/// store reproduces its ids.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    namespace: String,
    next_sequence: u64,
    members: Vec<Member>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

fn derive_member_id(namespace: &str, sequence: u64) -> MemberId {
    // sha256("<namespace>\0<sequence>"), first 16 bytes.
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(sequence.to_string().as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    MemberId::from_digest(&digest)
}

impl MemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            next_sequence: 0,
            members: Vec::new(),
        }
    }

    pub(crate) fn from_parts(namespace: String, next_sequence: u64, members: Vec<Member>) -> Self {
        Self {
            namespace,
            next_sequence,
            members,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub(crate) fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Members in creation order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn position(&self, id: &MemberId) -> Result<usize> {
        self.members
            .iter()
            .position(|member| &member.id == id)
            .ok_or_else(|| StoreError::MemberNotFound(id.clone()))
    }

    fn next_id(&mut self) -> MemberId {
        loop {
            let id = derive_member_id(&self.namespace, self.next_sequence);
            self.next_sequence += 1;
            if !self.members.iter().any(|member| member.id == id) {
                return id;
            }
        }
    }

    /// Clears `partner`'s spouse link if it points at `id`.
    fn drop_back_reference(&mut self, partner: &MemberId, id: &MemberId) {
        if let Some(member) = self.members.iter_mut().find(|member| &member.id == partner)
            && member.spouse_id.as_ref() == Some(id)
        {
            member.spouse_id = None;
        }
    }
}

fn check_self_reference(id: &MemberId, target: Option<&MemberId>, relation: &'static str) -> Result<()> {
    if target == Some(id) {
        return Err(StoreError::SelfReference {
            id: id.clone(),
            relation,
        });
    }
    Ok(())
}

impl MemberStore for MemoryStore {
    fn create_member(&mut self, fields: NewMember) -> Result<Member> {
        let id = self.next_id();
        let member = Member::from_new(id, fields);
        self.members.push(member.clone());
        Ok(member)
    }

    fn update_member(&mut self, id: &MemberId, patch: MemberPatch) -> Result<Member> {
        let position = self.position(id)?;
        if let Some(parent_id) = &patch.parent_id {
            check_self_reference(id, parent_id.as_ref(), "parent")?;
        }
        if let Some(spouse_id) = &patch.spouse_id {
            check_self_reference(id, spouse_id.as_ref(), "spouse")?;
        }
        let member = &mut self.members[position];
        member.apply(patch);
        Ok(member.clone())
    }

    fn delete_member(&mut self, id: &MemberId) -> Result<()> {
        let position = self.position(id)?;
        self.members.remove(position);
        Ok(())
    }

    fn list_members(&self, filter: &MemberFilter, order: MemberOrder) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .members
            .iter()
            .filter(|member| filter.matches(member))
            .cloned()
            .collect();
        if order == MemberOrder::Listing {
            members.sort_by(|a, b| a.listing_key().cmp(&b.listing_key()));
        }
        Ok(members)
    }

    fn get_member(&self, id: &MemberId) -> Result<Option<Member>> {
        Ok(self.members.iter().find(|member| &member.id == id).cloned())
    }

    fn clear(&mut self) -> Result<()> {
        self.members.clear();
        self.next_sequence = 0;
        Ok(())
    }

    fn link_spouses(&mut self, left: &MemberId, right: &MemberId) -> Result<()> {
        check_self_reference(left, Some(right), "spouse")?;
        let left_position = self.position(left)?;
        let right_position = self.position(right)?;

        let previous_left = self.members[left_position].spouse_id.clone();
        let previous_right = self.members[right_position].spouse_id.clone();
        if let Some(previous) = previous_left.filter(|previous| previous != right) {
            self.drop_back_reference(&previous, left);
        }
        if let Some(previous) = previous_right.filter(|previous| previous != left) {
            self.drop_back_reference(&previous, right);
        }

        self.members[left_position].spouse_id = Some(right.clone());
        self.members[right_position].spouse_id = Some(left.clone());
        Ok(())
    }

    fn unlink_spouse(&mut self, id: &MemberId) -> Result<()> {
        let position = self.position(id)?;
        if let Some(partner) = self.members[position].spouse_id.take() {
            self.drop_back_reference(&partner, id);
        }
        Ok(())
    }

    fn replace_all(&mut self, members: Vec<Member>) -> Result<()> {
        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(&member.id) {
                return Err(StoreError::DuplicateId(member.id.clone()));
            }
        }
        self.members = members;
        Ok(())
    }
}
