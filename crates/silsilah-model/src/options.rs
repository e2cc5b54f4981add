//! Configuration options for the bulk import.

use serde::{Deserialize, Serialize};

/// How an import treats members already in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Remove every existing member, then import. Deterministic for identical input.
    Replace,
    /// Keep existing members; rows whose name already exists are bound to
    /// the existing record and only unset links are filled in.
    Merge,
}

/// Policy for splitting a generation-2 couple into blood descendant and in-law
/// when parent references do not decide it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoupleTieBreak {
    /// The partner listed first in the sheet is the descendant.
    #[default]
    EarlierRow,
    /// Link neither partner and record a diagnostic for manual review.
    Unresolved,
}

/// Tuning for the fuzzy containment tier of name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Minimum `shorter / longer` length ratio (in characters) of the two
    /// normalized names for a containment match to count. `0.0` accepts any
    /// non-empty containment.
    pub min_containment_ratio: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            min_containment_ratio: 0.0,
        }
    }
}

impl MatchPolicy {
    pub fn with_min_containment_ratio(mut self, ratio: f64) -> Self {
        self.min_containment_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}

/// Options controlling one import batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub couple_tie_break: CoupleTieBreak,
    pub match_policy: MatchPolicy,
    /// Canonical name of the lineage root. When unset, the first generation-1
    /// member inserted is the root.
    pub root_name: Option<String>,
    /// Provenance label for the batch (usually the source file name). Reported,
    /// never part of member ids.
    pub source_id: String,
}

impl ImportOptions {
    pub fn new(mode: ImportMode) -> Self {
        Self {
            mode,
            couple_tie_break: CoupleTieBreak::default(),
            match_policy: MatchPolicy::default(),
            root_name: None,
            source_id: String::new(),
        }
    }

    pub fn with_couple_tie_break(mut self, tie_break: CoupleTieBreak) -> Self {
        self.couple_tie_break = tie_break;
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = Some(root_name.into());
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }
}
