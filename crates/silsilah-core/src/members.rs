//! Single-member create, update and delete with relationship validation.
//!
//! Every check runs before the first write, so a rejected request leaves the
//! store untouched.

use std::collections::HashSet;

use silsilah_model::{Member, MemberId, MemberPatch, NewMember, validate_generation, validate_name};
use tracing::info;

use crate::error::MemberError;
use crate::store::{MemberFilter, MemberOrder, MemberStore};

type Result<T> = std::result::Result<T, MemberError>;

fn require_generation(generation: u32) -> Result<u32> {
    Ok(validate_generation(i64::from(generation))?)
}

fn load<S: MemberStore + ?Sized>(store: &S, id: &MemberId) -> Result<Member> {
    store
        .get_member(id)?
        .ok_or_else(|| MemberError::NotFound(id.clone()))
}

fn check_parent<S: MemberStore + ?Sized>(
    store: &S,
    parent_id: &MemberId,
    generation: u32,
) -> Result<Member> {
    let parent = store
        .get_member(parent_id)?
        .ok_or_else(|| MemberError::ParentNotFound(parent_id.clone()))?;
    if parent.generation >= generation {
        return Err(MemberError::ParentGeneration {
            parent: parent.id,
            parent_generation: parent.generation,
            generation,
        });
    }
    Ok(parent)
}

/// The spouse must exist and be unmarried or already married to `member`.
fn check_spouse<S: MemberStore + ?Sized>(
    store: &S,
    spouse_id: &MemberId,
    member: Option<&MemberId>,
) -> Result<Member> {
    let spouse = store
        .get_member(spouse_id)?
        .ok_or_else(|| MemberError::SpouseNotFound(spouse_id.clone()))?;
    if let Some(partner) = &spouse.spouse_id
        && Some(partner) != member
    {
        return Err(MemberError::SpouseTaken {
            spouse: spouse.id,
            partner: partner.clone(),
        });
    }
    Ok(spouse)
}

/// Creates a member and, when a spouse is given, links both sides.
pub fn create_member<S: MemberStore + ?Sized>(store: &mut S, fields: NewMember) -> Result<Member> {
    let name = validate_name(&fields.name)?;
    let generation = require_generation(fields.generation)?;
    if let Some(parent_id) = &fields.parent_id {
        check_parent(store, parent_id, generation)?;
    }
    if let Some(spouse_id) = &fields.spouse_id {
        check_spouse(store, spouse_id, None)?;
    }

    let spouse_id = fields.spouse_id.clone();
    let created = store.create_member(NewMember {
        name,
        generation,
        spouse_id: None,
        ..fields
    })?;
    if let Some(spouse_id) = spouse_id {
        store.link_spouses(&created.id, &spouse_id)?;
    }
    info!(generation = created.generation, "created member");
    load(store, &created.id)
}

/// Applies a partial update, keeping spouse links symmetric.
///
/// Setting a new spouse releases the previous one; clearing the spouse clears
/// both sides.
pub fn update_member<S: MemberStore + ?Sized>(
    store: &mut S,
    id: &MemberId,
    mut patch: MemberPatch,
) -> Result<Member> {
    let current = load(store, id)?;
    if let Some(name) = &patch.name {
        patch.name = Some(validate_name(name)?);
    }
    let generation = match patch.generation {
        Some(generation) => require_generation(generation)?,
        None => current.generation,
    };

    let parent_id = patch
        .parent_id
        .clone()
        .unwrap_or_else(|| current.parent_id.clone());
    if let Some(parent_id) = &parent_id {
        if parent_id == id {
            return Err(MemberError::SelfReference {
                id: id.clone(),
                relation: "parent",
            });
        }
        check_parent(store, parent_id, generation)?;
        if is_ancestor(store, id, parent_id)? {
            return Err(MemberError::ParentCycle {
                id: id.clone(),
                parent: parent_id.clone(),
            });
        }
    }

    if generation != current.generation {
        let children = store.list_members(&MemberFilter::children_of(id), MemberOrder::Listing)?;
        if let Some(child) = children.iter().find(|child| child.generation <= generation) {
            return Err(MemberError::ChildGeneration {
                child: child.id.clone(),
                child_generation: child.generation,
                generation,
            });
        }
    }

    let spouse_change = patch.spouse_id.take();
    if let Some(Some(spouse_id)) = &spouse_change {
        if spouse_id == id {
            return Err(MemberError::SelfReference {
                id: id.clone(),
                relation: "spouse",
            });
        }
        check_spouse(store, spouse_id, Some(id))?;
    }

    if !patch.is_empty() {
        store.update_member(id, patch)?;
    }
    match spouse_change {
        Some(Some(spouse_id)) => store.link_spouses(id, &spouse_id)?,
        Some(None) => store.unlink_spouse(id)?,
        None => {}
    }
    load(store, id)
}

/// True when `candidate`'s parent chain passes through `id`.
fn is_ancestor<S: MemberStore + ?Sized>(
    store: &S,
    id: &MemberId,
    candidate: &MemberId,
) -> Result<bool> {
    let mut seen = HashSet::new();
    let mut cursor = Some(candidate.clone());
    while let Some(current) = cursor {
        if &current == id {
            return Ok(true);
        }
        if !seen.insert(current.clone()) {
            return Ok(false);
        }
        cursor = store
            .get_member(&current)?
            .and_then(|member| member.parent_id);
    }
    Ok(false)
}

/// Deletes a member after detaching its spouse and re-orphaning its children.
///
/// Children are kept; only their parent link is cleared.
pub fn delete_member<S: MemberStore + ?Sized>(store: &mut S, id: &MemberId) -> Result<()> {
    let member = load(store, id)?;
    if member.spouse_id.is_some() {
        store.unlink_spouse(id)?;
    }
    // Stray one-sided references.
    for partner in store.list_members(&MemberFilter::spouses_of(id), MemberOrder::Insertion)? {
        store.update_member(&partner.id, MemberPatch::spouse(None))?;
    }
    let children = store.list_members(&MemberFilter::children_of(id), MemberOrder::Insertion)?;
    for child in &children {
        store.update_member(&child.id, MemberPatch::parent(None))?;
    }
    store.delete_member(id)?;
    info!(orphaned = children.len(), "deleted member");
    Ok(())
}
