//! Relationship consistency checks over a member set.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use silsilah_model::{Member, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    SelfParent,
    SelfSpouse,
    DanglingParent,
    DanglingSpouse,
    /// `A.spouse_id = B` but `B.spouse_id != A`.
    AsymmetricSpouse,
    /// The parent is not in a strictly lower generation.
    ParentGeneration,
    ParentCycle,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SelfParent => "self parent",
            Self::SelfSpouse => "self spouse",
            Self::DanglingParent => "dangling parent",
            Self::DanglingSpouse => "dangling spouse",
            Self::AsymmetricSpouse => "asymmetric spouse",
            Self::ParentGeneration => "parent generation",
            Self::ParentCycle => "parent cycle",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityIssue {
    pub kind: IssueKind,
    pub member_id: MemberId,
    /// The other end of the offending link.
    pub related: Option<MemberId>,
    pub message: String,
}

impl IntegrityIssue {
    fn new(
        kind: IssueKind,
        member_id: &MemberId,
        related: Option<&MemberId>,
        message: String,
    ) -> Self {
        Self {
            kind,
            member_id: member_id.clone(),
            related: related.cloned(),
            message,
        }
    }
}

/// Lists every inconsistency in `members`, in member order.
///
/// Each parent cycle is reported once, on its smallest member id.
pub fn check_integrity(members: &[Member]) -> Vec<IntegrityIssue> {
    let by_id: HashMap<&MemberId, &Member> = members.iter().map(|m| (&m.id, m)).collect();
    let mut issues = Vec::new();

    for member in members {
        if let Some(parent_id) = &member.parent_id {
            match by_id.get(parent_id) {
                _ if parent_id == &member.id => issues.push(IntegrityIssue::new(
                    IssueKind::SelfParent,
                    &member.id,
                    None,
                    format!("{} is its own parent", member.id),
                )),
                None => issues.push(IntegrityIssue::new(
                    IssueKind::DanglingParent,
                    &member.id,
                    Some(parent_id),
                    format!("{} points at missing parent {parent_id}", member.id),
                )),
                Some(parent) if parent.generation >= member.generation => {
                    issues.push(IntegrityIssue::new(
                        IssueKind::ParentGeneration,
                        &member.id,
                        Some(parent_id),
                        format!(
                            "{} (generation {}) has parent {parent_id} in generation {}",
                            member.id, member.generation, parent.generation
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        if let Some(spouse_id) = &member.spouse_id {
            match by_id.get(spouse_id) {
                _ if spouse_id == &member.id => issues.push(IntegrityIssue::new(
                    IssueKind::SelfSpouse,
                    &member.id,
                    None,
                    format!("{} is its own spouse", member.id),
                )),
                None => issues.push(IntegrityIssue::new(
                    IssueKind::DanglingSpouse,
                    &member.id,
                    Some(spouse_id),
                    format!("{} points at missing spouse {spouse_id}", member.id),
                )),
                Some(spouse) if spouse.spouse_id.as_ref() != Some(&member.id) => {
                    issues.push(IntegrityIssue::new(
                        IssueKind::AsymmetricSpouse,
                        &member.id,
                        Some(spouse_id),
                        format!("{} names {spouse_id} as spouse, but not the reverse", member.id),
                    ));
                }
                Some(_) => {}
            }
        }
    }

    issues.extend(parent_cycles(members, &by_id));
    issues
}

fn parent_cycles(members: &[Member], by_id: &HashMap<&MemberId, &Member>) -> Vec<IntegrityIssue> {
    let mut done: HashSet<&MemberId> = HashSet::new();
    let mut issues = Vec::new();

    for member in members {
        let mut path: Vec<&MemberId> = Vec::new();
        let mut cursor = Some(member);
        while let Some(current) = cursor {
            if done.contains(&current.id) {
                break;
            }
            if let Some(start) = path.iter().position(|id| *id == &current.id) {
                let cycle = &path[start..];
                // Self-parents are already reported on their own.
                if cycle.len() > 1
                    && let Some(first) = cycle.iter().min()
                {
                    let chain: Vec<String> = cycle.iter().map(ToString::to_string).collect();
                    issues.push(IntegrityIssue::new(
                        IssueKind::ParentCycle,
                        first,
                        None,
                        format!("parent links form a cycle: {}", chain.join(" -> ")),
                    ));
                }
                break;
            }
            path.push(&current.id);
            cursor = current
                .parent_id
                .as_ref()
                .and_then(|parent| by_id.get(parent).copied());
        }
        done.extend(path);
    }
    issues
}

#[cfg(test)]
mod tests {
    use silsilah_model::{Gender, NewMember};

    use super::*;

    fn id(value: &str) -> MemberId {
        MemberId::new(value).unwrap()
    }

    fn member(value: &str, generation: u32) -> Member {
        Member::from_new(id(value), NewMember::bare(value, Gender::Male, generation))
    }

    fn kinds(members: &[Member]) -> Vec<IssueKind> {
        check_integrity(members).into_iter().map(|issue| issue.kind).collect()
    }

    #[test]
    fn consistent_family_has_no_issues() {
        let mut a = member("a", 1);
        let mut b = member("b", 1);
        let mut c = member("c", 2);
        a.spouse_id = Some(id("b"));
        b.spouse_id = Some(id("a"));
        c.parent_id = Some(id("a"));
        assert!(check_integrity(&[a, b, c]).is_empty());
    }

    #[test]
    fn link_problems_are_reported() {
        let mut a = member("a", 2);
        a.parent_id = Some(id("a"));
        a.spouse_id = Some(id("ghost"));
        let mut b = member("b", 1);
        b.parent_id = Some(id("c"));
        b.spouse_id = Some(id("c"));
        let c = member("c", 1);

        assert_eq!(
            kinds(&[a, b, c]),
            vec![
                IssueKind::SelfParent,
                IssueKind::DanglingSpouse,
                IssueKind::ParentGeneration,
                IssueKind::AsymmetricSpouse,
            ]
        );
    }

    #[test]
    fn cycles_are_reported_once() {
        let mut a = member("a", 1);
        let mut b = member("b", 2);
        let mut c = member("c", 3);
        a.parent_id = Some(id("c"));
        b.parent_id = Some(id("a"));
        c.parent_id = Some(id("b"));

        let issues = check_integrity(&[b, c, a]);
        let cycles: Vec<&IntegrityIssue> = issues
            .iter()
            .filter(|issue| issue.kind == IssueKind::ParentCycle)
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].member_id, id("a"));
    }
}
