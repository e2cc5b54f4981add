//! Couple-aware forest construction.
//!
//! Each couple is drawn once, from its *anchor*: the partner that owns the
//! node. The other partner (the hidden side) appears only as the node's
//! `spouse`. Anchors are elected as follows:
//!
//! 1. a one-sided link `A.spouse_id = B` anchors `A`;
//! 2. for a mutual pair, the partner whose parent exists, if only one has one;
//! 3. otherwise the partner that sorts first by (generation, name, id).
//!
//! A couple's children are the children of both partners. Roots are members
//! with no parent link that are not hidden; members whose parent link points
//! at an unknown id are left out.

use std::collections::{HashMap, HashSet};

use silsilah_model::{Member, MemberId, TreeNode};
use tracing::debug;

use crate::error::{ForestError, TreeError};
use crate::store::{MemberFilter, MemberOrder, MemberStore};

/// Lists the store and builds its forest.
pub fn load_forest<S: MemberStore + ?Sized>(store: &S) -> Result<Vec<TreeNode>, ForestError> {
    let members = store.list_members(&MemberFilter::all(), MemberOrder::Listing)?;
    Ok(build_forest(&members)?)
}

/// Builds the couple forest of `members`.
///
/// Roots and children are ordered by generation, then name, then id. The
/// walk stops with [`TreeError::DepthExceeded`] when a path gets deeper than
/// the highest generation plus two, or reaches a member twice.
pub fn build_forest(members: &[Member]) -> Result<Vec<TreeNode>, TreeError> {
    let mut ordered: Vec<&Member> = members.iter().collect();
    ordered.sort_by(|a, b| a.listing_key().cmp(&b.listing_key()));
    let by_id: HashMap<&MemberId, &Member> = ordered.iter().map(|m| (&m.id, *m)).collect();

    let couples = Couples::elect(&ordered, &by_id);

    let mut children: HashMap<&MemberId, Vec<&Member>> = HashMap::new();
    for member in &ordered {
        if couples.is_hidden(&member.id) {
            continue;
        }
        if let Some(parent_id) = &member.parent_id {
            children.entry(parent_id).or_default().push(member);
        }
    }

    let max_generation = ordered.iter().map(|m| m.generation).max().unwrap_or(0);
    let mut builder = Builder {
        by_id: &by_id,
        couples: &couples,
        children: &children,
        limit: max_generation as usize + 2,
        visited: HashSet::new(),
    };

    let mut forest = Vec::new();
    for member in &ordered {
        if member.parent_id.is_none() && !couples.is_hidden(&member.id) {
            forest.push(builder.node(member, 1)?);
        }
    }
    debug!(
        members = members.len(),
        roots = forest.len(),
        hidden = couples.hosts.len(),
        "built forest"
    );
    Ok(forest)
}

/// Hidden partner → anchor that draws them.
struct Couples<'a> {
    hosts: HashMap<&'a MemberId, &'a MemberId>,
}

impl<'a> Couples<'a> {
    fn elect(ordered: &[&'a Member], by_id: &HashMap<&'a MemberId, &'a Member>) -> Self {
        let mut hosts: HashMap<&'a MemberId, &'a MemberId> = HashMap::new();
        let mut one_sided = Vec::new();
        for member in ordered {
            let Some(partner) = member
                .spouse_id
                .as_ref()
                .and_then(|spouse_id| by_id.get(spouse_id).copied())
                .filter(|partner| partner.id != member.id)
            else {
                continue;
            };
            if partner.spouse_id.as_ref() != Some(&member.id) {
                one_sided.push((*member, partner));
                continue;
            }
            if anchors_before(member, partner, by_id) {
                hosts.insert(&partner.id, &member.id);
            }
        }

        // One-sided links only hide a partner that is not already paired.
        let mut anchors: HashSet<&'a MemberId> = hosts.values().copied().collect();
        for (member, partner) in one_sided {
            if hosts.contains_key(&member.id)
                || hosts.contains_key(&partner.id)
                || anchors.contains(&partner.id)
            {
                continue;
            }
            hosts.insert(&partner.id, &member.id);
            anchors.insert(&member.id);
        }
        Self { hosts }
    }

    fn is_hidden(&self, id: &MemberId) -> bool {
        self.hosts.contains_key(id)
    }

    /// The hidden partner drawn inside `anchor`'s node, if any.
    fn hidden_partner_of(&self, anchor: &Member) -> Option<&'a MemberId> {
        let partner = anchor.spouse_id.as_ref()?;
        self.hosts
            .get_key_value(partner)
            .filter(|(_, host)| **host == &anchor.id)
            .map(|(hidden, _)| *hidden)
    }
}

/// Whether `left` anchors the mutual couple it forms with `right`.
fn anchors_before(left: &Member, right: &Member, by_id: &HashMap<&MemberId, &Member>) -> bool {
    let has_parent = |member: &Member| {
        member
            .parent_id
            .as_ref()
            .is_some_and(|parent| by_id.contains_key(parent))
    };
    match (has_parent(left), has_parent(right)) {
        (true, false) => true,
        (false, true) => false,
        _ => left.listing_key() <= right.listing_key(),
    }
}

struct Builder<'a, 'm> {
    by_id: &'a HashMap<&'m MemberId, &'m Member>,
    couples: &'a Couples<'m>,
    children: &'a HashMap<&'m MemberId, Vec<&'m Member>>,
    limit: usize,
    visited: HashSet<&'m MemberId>,
}

impl<'m> Builder<'_, 'm> {
    fn node(&mut self, member: &'m Member, depth: usize) -> Result<TreeNode, TreeError> {
        if depth > self.limit || !self.visited.insert(&member.id) {
            return Err(TreeError::DepthExceeded {
                id: member.id.clone(),
                limit: self.limit,
            });
        }

        let spouse = member
            .spouse_id
            .as_ref()
            .and_then(|spouse_id| self.by_id.get(spouse_id))
            .filter(|spouse| spouse.id != member.id)
            .map(|spouse| (*spouse).clone());

        let mut kids: Vec<&'m Member> = self
            .children
            .get(&member.id)
            .cloned()
            .unwrap_or_default();
        if let Some(hidden) = self.couples.hidden_partner_of(member)
            && let Some(extra) = self.children.get(hidden)
        {
            kids.extend(extra.iter().copied());
            kids.sort_by(|a, b| a.listing_key().cmp(&b.listing_key()));
        }

        let mut nodes = Vec::with_capacity(kids.len());
        for child in kids {
            nodes.push(self.node(child, depth + 1)?);
        }
        Ok(TreeNode {
            member: member.clone(),
            spouse,
            children: nodes,
        })
    }
}

/// Renders a forest as indented text, one couple per line.
///
/// ```text
/// Mucksin (L, gen 1) & Supiyah (P)
/// └── Ahmad Susanto (L, gen 2) & Dewi Rahayu (P)
/// ```
pub fn render_text(forest: &[TreeNode]) -> String {
    let mut out = String::new();
    for root in forest {
        out.push_str(&couple_label(root));
        out.push('\n');
        render_children(&root.children, "", &mut out);
    }
    out
}

fn render_children(children: &[TreeNode], prefix: &str, out: &mut String) {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&couple_label(child));
        out.push('\n');
        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(&child.children, &nested, out);
    }
}

fn couple_label(node: &TreeNode) -> String {
    let member = &node.member;
    let mut label = format!(
        "{} ({}, gen {})",
        member.name,
        member.gender.code(),
        member.generation
    );
    if let Some(spouse) = &node.spouse {
        label.push_str(&format!(" & {} ({})", spouse.name, spouse.gender.code()));
    }
    label
}
