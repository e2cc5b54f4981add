use serde::Serialize;

use crate::{Member, MemberId};

/// A couple node: a member, its resolved spouse and its ordered children.
///
/// Built fresh for every tree request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(flatten)]
    pub member: Member,
    pub spouse: Option<Member>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn id(&self) -> &MemberId {
        &self.member.id
    }

    /// Depth-first pre-order walk; `depth` is 0 for `self`.
    pub fn visit<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a TreeNode, usize),
    {
        self.visit_at(0, f);
    }

    fn visit_at<'a, F>(&'a self, depth: usize, f: &mut F)
    where
        F: FnMut(&'a TreeNode, usize),
    {
        f(self, depth);
        for child in &self.children {
            child.visit_at(depth + 1, f);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_, _| count += 1);
        count
    }
}
