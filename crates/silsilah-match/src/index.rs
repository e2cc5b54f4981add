//! Tiered name-to-member resolution.

use std::collections::HashMap;

use serde::Serialize;
use silsilah_model::{MatchPolicy, Member, MemberId};

use crate::normalize::{clean, normalize, similarity};

/// Which tier produced a match, in the order the tiers are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The reference equals a stored name byte for byte.
    Exact,
    /// Equal after stripping honorifics, case preserved.
    Cleaned,
    /// Equal after stripping honorifics and lower-casing.
    Normalized,
    /// One normalized name contains the other.
    Containment,
}

impl MatchKind {
    pub fn is_fuzzy(self) -> bool {
        self == Self::Containment
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameMatch {
    pub id: MemberId,
    pub kind: MatchKind,
    /// Jaro-Winkler similarity of the normalized forms.
    pub similarity: f64,
}

/// The keys kept for one indexed member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedMember {
    pub id: MemberId,
    pub name: String,
    pub cleaned: String,
    pub normalized: String,
    pub generation: u32,
}

/// Lookup from free-text name references to member ids for one import batch.
///
/// Members must be inserted as soon as they are created so later rows can
/// reference earlier ones. When two members share a key the first inserted
/// keeps it, and containment scans run in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemberIndex {
    entries: Vec<IndexedMember>,
    by_id: HashMap<MemberId, usize>,
    by_name: HashMap<String, usize>,
    by_cleaned: HashMap<String, usize>,
    by_normalized: HashMap<String, usize>,
    policy: MatchPolicy,
}

impl MemberIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MatchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Builds an index over existing members, in the given order.
    pub fn from_members<'a>(
        members: impl IntoIterator<Item = &'a Member>,
        policy: MatchPolicy,
    ) -> Self {
        let mut index = Self::with_policy(policy);
        for member in members {
            index.insert(member);
        }
        index
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a member. Returns `false` if its id was already indexed.
    pub fn insert(&mut self, member: &Member) -> bool {
        self.insert_name(member.id.clone(), &member.name, member.generation)
    }

    pub fn insert_name(&mut self, id: MemberId, name: &str, generation: u32) -> bool {
        if self.by_id.contains_key(&id) {
            return false;
        }
        let position = self.entries.len();
        let entry = IndexedMember {
            id: id.clone(),
            name: name.to_string(),
            cleaned: clean(name),
            normalized: normalize(name),
            generation,
        };
        self.by_name.entry(entry.name.clone()).or_insert(position);
        if !entry.cleaned.is_empty() {
            self.by_cleaned.entry(entry.cleaned.clone()).or_insert(position);
        }
        if !entry.normalized.is_empty() {
            self.by_normalized
                .entry(entry.normalized.clone())
                .or_insert(position);
        }
        self.by_id.insert(id, position);
        self.entries.push(entry);
        true
    }

    pub fn get(&self, id: &MemberId) -> Option<&IndexedMember> {
        self.by_id.get(id).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, id: &MemberId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Indexed members in insertion order.
    pub fn entries(&self) -> &[IndexedMember] {
        &self.entries
    }

    /// First inserted member of the given generation.
    pub fn first_in_generation(&self, generation: u32) -> Option<&IndexedMember> {
        self.entries
            .iter()
            .find(|entry| entry.generation == generation)
    }

    /// Resolves a free-text reference to a member id.
    pub fn resolve(&self, raw: &str) -> Option<MemberId> {
        self.resolve_match(raw).map(|found| found.id)
    }

    /// Resolves a reference through all four tiers, reporting which one matched.
    pub fn resolve_match(&self, raw: &str) -> Option<NameMatch> {
        if raw.trim().is_empty() {
            return None;
        }
        self.resolve_exact(raw)
            .or_else(|| self.resolve_containment(raw))
    }

    /// Resolves through the exact, cleaned and normalized tiers only.
    pub fn resolve_exact(&self, raw: &str) -> Option<NameMatch> {
        if raw.trim().is_empty() {
            return None;
        }
        if let Some(&position) = self.by_name.get(raw) {
            return Some(self.found(position, MatchKind::Exact, raw));
        }
        if let Some(&position) = self.by_cleaned.get(&clean(raw)) {
            return Some(self.found(position, MatchKind::Cleaned, raw));
        }
        if let Some(&position) = self.by_normalized.get(&normalize(raw)) {
            return Some(self.found(position, MatchKind::Normalized, raw));
        }
        None
    }

    fn resolve_containment(&self, raw: &str) -> Option<NameMatch> {
        let candidate = normalize(raw);
        if candidate.is_empty() {
            return None;
        }
        let min_ratio = self.policy.min_containment_ratio;
        self.entries
            .iter()
            .position(|entry| {
                !entry.normalized.is_empty()
                    && (entry.normalized.contains(&candidate)
                        || candidate.contains(&entry.normalized))
                    && length_ratio(&entry.normalized, &candidate) >= min_ratio
            })
            .map(|position| self.found(position, MatchKind::Containment, raw))
    }

    fn found(&self, position: usize, kind: MatchKind, raw: &str) -> NameMatch {
        let entry = &self.entries[position];
        NameMatch {
            id: entry.id.clone(),
            kind,
            similarity: similarity(raw, &entry.name),
        }
    }
}

/// Shorter over longer length, in characters.
fn length_ratio(left: &str, right: &str) -> f64 {
    let left = left.chars().count();
    let right = right.chars().count();
    let longer = left.max(right);
    if longer == 0 {
        return 0.0;
    }
    left.min(right) as f64 / longer as f64
}
