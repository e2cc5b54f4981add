//! Spouse and parent inference for an import batch.
//!
//! The resolver only plans links; the import applies them to the store. Name
//! misses never fail: they leave the link unset and add a [`Diagnostic`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use silsilah_match::{MemberIndex, NameMatch, normalize};
use silsilah_model::{
    CoupleTieBreak, Diagnostic, DiagnosticKind, ImportOptions, ImportRow, Member, MemberId,
};
use tracing::{debug, warn};

/// Generation whose parent link is inferred from couple pairing.
const PAIRED_GENERATION: u32 = 2;
const ROOT_GENERATION: u32 = 1;

/// An import row bound to the member that represents it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundRow {
    pub row: ImportRow,
    pub member_id: MemberId,
    /// False when a merge import reused an existing member for this row.
    pub inserted: bool,
}

/// Relationship column a name reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkField {
    Spouse,
    Parent,
}

impl fmt::Display for LinkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spouse => "spouse",
            Self::Parent => "parent",
        })
    }
}

/// A link that was resolved by substring containment and should be reviewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyMatch {
    pub row: usize,
    pub field: LinkField,
    pub raw: String,
    pub member_id: MemberId,
    pub matched_name: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpouseLink {
    pub row: usize,
    pub member_id: MemberId,
    pub spouse_id: MemberId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub row: usize,
    pub member_id: MemberId,
    pub parent_id: MemberId,
}

/// Planned links plus everything noticed while planning them.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<L> {
    pub links: Vec<L>,
    pub diagnostics: Vec<Diagnostic>,
    pub fuzzy_matches: Vec<FuzzyMatch>,
}

impl<L> Default for Resolution<L> {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            diagnostics: Vec::new(),
            fuzzy_matches: Vec::new(),
        }
    }
}

/// Blood-descendant decision for a generation-2 member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lineage {
    Descendant,
    InLaw,
    Undecided,
}

pub struct RelationshipResolver<'a> {
    index: &'a MemberIndex,
    options: &'a ImportOptions,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(index: &'a MemberIndex, options: &'a ImportOptions) -> Self {
        Self { index, options }
    }

    /// Plans spouse links in row order.
    ///
    /// `current` is the store state before linking. Members that already have
    /// a spouse count as claimed, so existing links are never replaced and a
    /// row whose member was linked by an earlier row is skipped.
    pub fn resolve_spouses(
        &self,
        rows: &[BoundRow],
        current: &HashMap<MemberId, Member>,
    ) -> Resolution<SpouseLink> {
        let mut resolution = Resolution::default();
        let mut claimed: HashSet<MemberId> = current
            .values()
            .filter(|member| member.spouse_id.is_some())
            .map(|member| member.id.clone())
            .collect();

        for bound in rows {
            let row = &bound.row;
            if !row.has_spouse_field() || claimed.contains(&bound.member_id) {
                continue;
            }
            let raw = row.spouse_raw.trim();
            let Some(found) = self.index.resolve_match(raw) else {
                resolution.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::SpouseNotFound,
                        format!("spouse {raw:?} for {:?} not found", row.name),
                    )
                    .at_row(row.row_number()),
                );
                continue;
            };
            if found.id == bound.member_id {
                resolution.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::SpouseNotFound,
                        format!("spouse {raw:?} for {:?} resolves to the member itself", row.name),
                    )
                    .at_row(row.row_number()),
                );
                continue;
            }
            if claimed.contains(&found.id) {
                resolution.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::SpouseAlreadyLinked,
                        format!(
                            "spouse {:?} for {:?} is already linked to another member",
                            self.display_name(&found.id),
                            row.name
                        ),
                    )
                    .at_row(row.row_number()),
                );
                continue;
            }

            self.note_fuzzy(&mut resolution, row, LinkField::Spouse, raw, &found);
            claimed.insert(bound.member_id.clone());
            claimed.insert(found.id.clone());
            resolution.links.push(SpouseLink {
                row: row.row_number(),
                member_id: bound.member_id.clone(),
                spouse_id: found.id,
            });
        }

        debug!(links = resolution.links.len(), "planned spouse links");
        resolution
    }

    /// Plans parent links.
    ///
    /// `current` is the store state after spouse linking. Members that
    /// already have a parent are left alone.
    pub fn resolve_parents(
        &self,
        rows: &[BoundRow],
        current: &HashMap<MemberId, Member>,
    ) -> Resolution<ParentLink> {
        let mut resolution = Resolution::default();
        let positions: HashMap<&MemberId, usize> = rows
            .iter()
            .map(|bound| (&bound.member_id, bound.row.position))
            .collect();
        let references = ParentReferences::collect(rows, self.index);
        let needs_root = rows.iter().any(|bound| {
            bound.row.generation == PAIRED_GENERATION && !bound.row.has_parent_field()
        });
        let root = if needs_root {
            self.lineage_root(&mut resolution)
        } else {
            None
        };
        // Generation-2 members whose own parent field resolves in this batch.
        let named_parents: HashSet<MemberId> = rows
            .iter()
            .filter(|bound| {
                bound.row.generation == PAIRED_GENERATION && bound.row.has_parent_field()
            })
            .filter(|bound| self.named_parent(bound).is_some())
            .map(|bound| bound.member_id.clone())
            .collect();
        let mut reported_couples: HashSet<(MemberId, MemberId)> = HashSet::new();

        for bound in rows {
            let row = &bound.row;
            if row.generation <= ROOT_GENERATION {
                continue;
            }
            if current
                .get(&bound.member_id)
                .is_some_and(|member| member.parent_id.is_some())
            {
                continue;
            }

            if row.has_parent_field() {
                self.resolve_named_parent(&mut resolution, bound);
                continue;
            }
            if row.generation != PAIRED_GENERATION {
                continue;
            }
            let Some(root) = &root else {
                continue;
            };

            match self.lineage(bound, current, &positions, &references, &named_parents) {
                Lineage::Descendant => {
                    if root != &bound.member_id {
                        resolution.links.push(ParentLink {
                            row: row.row_number(),
                            member_id: bound.member_id.clone(),
                            parent_id: root.clone(),
                        });
                    }
                }
                Lineage::InLaw => {}
                Lineage::Undecided => {
                    let partner = current
                        .get(&bound.member_id)
                        .and_then(|member| member.spouse_id.clone());
                    let Some(partner) = partner else {
                        continue;
                    };
                    let partner_name = self.display_name(&partner);
                    let key = if bound.member_id <= partner {
                        (bound.member_id.clone(), partner)
                    } else {
                        (partner, bound.member_id.clone())
                    };
                    if reported_couples.insert(key) {
                        resolution.diagnostics.push(
                            Diagnostic::warning(
                                DiagnosticKind::CoupleUnresolved,
                                format!(
                                    "cannot tell whether {:?} or {partner_name:?} descends from the root; neither was linked",
                                    row.name
                                ),
                            )
                            .at_row(row.row_number()),
                        );
                    }
                }
            }
        }

        debug!(links = resolution.links.len(), "planned parent links");
        resolution
    }

    /// Takes the first part of the parent field that resolves to a member
    /// in a lower generation.
    fn named_parent<'r>(&self, bound: &'r BoundRow) -> Option<(&'r str, NameMatch)> {
        let row = &bound.row;
        row.parent_parts().find_map(|part| {
            let found = self.index.resolve_match(part)?;
            let lower_generation = self
                .index
                .get(&found.id)
                .is_some_and(|entry| entry.generation < row.generation);
            (found.id != bound.member_id && lower_generation).then_some((part, found))
        })
    }

    fn resolve_named_parent(&self, resolution: &mut Resolution<ParentLink>, bound: &BoundRow) {
        let row = &bound.row;
        if let Some((part, found)) = self.named_parent(bound) {
            self.note_fuzzy(resolution, row, LinkField::Parent, part, &found);
            resolution.links.push(ParentLink {
                row: row.row_number(),
                member_id: bound.member_id.clone(),
                parent_id: found.id,
            });
            return;
        }
        resolution.diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::ParentNotFound,
                format!(
                    "parent {:?} for {:?} not found",
                    row.parent_raw.trim(),
                    row.name
                ),
            )
            .at_row(row.row_number()),
        );
    }

    fn lineage(
        &self,
        bound: &BoundRow,
        current: &HashMap<MemberId, Member>,
        positions: &HashMap<&MemberId, usize>,
        references: &ParentReferences,
        named_parents: &HashSet<MemberId>,
    ) -> Lineage {
        let partner = current
            .get(&bound.member_id)
            .and_then(|member| member.spouse_id.as_ref())
            .and_then(|spouse| current.get(spouse))
            .filter(|spouse| spouse.generation == PAIRED_GENERATION);
        let Some(partner) = partner else {
            return Lineage::Descendant;
        };
        if partner.parent_id.is_some() || named_parents.contains(&partner.id) {
            return Lineage::InLaw;
        }

        let own_reference = references.mentions(&bound.member_id);
        let partner_reference = references.mentions(&partner.id);
        match (own_reference, partner_reference) {
            (true, false) => return Lineage::Descendant,
            (false, true) => return Lineage::InLaw,
            _ => {}
        }

        match self.options.couple_tie_break {
            CoupleTieBreak::Unresolved => Lineage::Undecided,
            CoupleTieBreak::EarlierRow => {
                // A partner without a row in this batch was there first.
                let earlier = positions
                    .get(&partner.id)
                    .is_none_or(|&position| position < bound.row.position);
                if earlier {
                    Lineage::InLaw
                } else {
                    Lineage::Descendant
                }
            }
        }
    }

    /// The member generation-2 descendants hang from: the configured root
    /// name if set, otherwise the first generation-1 member indexed.
    fn lineage_root<L>(&self, resolution: &mut Resolution<L>) -> Option<MemberId> {
        let root = match &self.options.root_name {
            Some(name) => self
                .index
                .resolve_exact(name)
                .filter(|found| {
                    self.index
                        .get(&found.id)
                        .is_some_and(|entry| entry.generation == ROOT_GENERATION)
                })
                .map(|found| found.id),
            None => self
                .index
                .first_in_generation(ROOT_GENERATION)
                .map(|entry| entry.id.clone()),
        };
        if root.is_none() {
            let message = match &self.options.root_name {
                Some(name) => format!("root {name:?} is not a generation-1 member"),
                None => "no generation-1 member to act as root".to_string(),
            };
            resolution
                .diagnostics
                .push(Diagnostic::warning(DiagnosticKind::RootMissing, message));
        }
        root
    }

    fn note_fuzzy<L>(
        &self,
        resolution: &mut Resolution<L>,
        row: &ImportRow,
        field: LinkField,
        raw: &str,
        found: &NameMatch,
    ) {
        if !found.kind.is_fuzzy() {
            return;
        }
        let matched_name = self.display_name(&found.id);
        warn!(
            row = row.row_number(),
            %field,
            member_id = %found.id,
            similarity = found.similarity,
            "name resolved by containment"
        );
        resolution.diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::FuzzyMatch,
                format!(
                    "{field} {raw:?} for {:?} matched {matched_name:?} by containment (similarity {:.2})",
                    row.name, found.similarity
                ),
            )
            .at_row(row.row_number()),
        );
        resolution.fuzzy_matches.push(FuzzyMatch {
            row: row.row_number(),
            field,
            raw: raw.to_string(),
            member_id: found.id.clone(),
            matched_name,
            similarity: found.similarity,
        });
    }

    fn display_name(&self, id: &MemberId) -> String {
        self.index
            .get(id)
            .map_or_else(|| id.to_string(), |entry| entry.name.clone())
    }
}

/// Members named in the parent field of any row above generation 2.
struct ParentReferences {
    normalized: HashSet<String>,
    resolved: HashSet<MemberId>,
    names: HashMap<MemberId, String>,
}

impl ParentReferences {
    fn collect(rows: &[BoundRow], index: &MemberIndex) -> Self {
        let mut normalized = HashSet::new();
        let mut resolved = HashSet::new();
        for bound in rows {
            if bound.row.generation <= PAIRED_GENERATION {
                continue;
            }
            for part in bound.row.parent_parts() {
                let key = normalize(part);
                if key.is_empty() {
                    continue;
                }
                if let Some(found) = index.resolve_exact(part) {
                    resolved.insert(found.id);
                }
                normalized.insert(key);
            }
        }
        let names = index
            .entries()
            .iter()
            .map(|entry| (entry.id.clone(), entry.normalized.clone()))
            .collect();
        Self {
            normalized,
            resolved,
            names,
        }
    }

    fn mentions(&self, id: &MemberId) -> bool {
        self.resolved.contains(id)
            || self
                .names
                .get(id)
                .is_some_and(|name| self.normalized.contains(name))
    }
}
