//! Typed spreadsheet rows used by the bulk import.

use serde::{Deserialize, Serialize};

use crate::{Gender, MemberDetails, NewMember};

/// Separator between the two names of a dual-parent field ("Name1 - Name2").
pub const PARENT_SEPARATOR: &str = " - ";

/// One parsed and validated spreadsheet record. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Zero-based position in the source sheet, used for tie-breaking.
    pub position: usize,
    pub name: String,
    pub gender: Gender,
    pub generation: u32,
    /// Free-text parent field, possibly "NameA - NameB". Empty when absent.
    pub parent_raw: String,
    /// Free-text spouse field, possibly honorific-prefixed. Empty when absent.
    pub spouse_raw: String,
    pub details: MemberDetails,
}

impl ImportRow {
    pub fn new(position: usize, name: impl Into<String>, gender: Gender, generation: u32) -> Self {
        Self {
            position,
            name: name.into(),
            gender,
            generation,
            parent_raw: String::new(),
            spouse_raw: String::new(),
            details: MemberDetails::default(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_raw: impl Into<String>) -> Self {
        self.parent_raw = parent_raw.into();
        self
    }

    #[must_use]
    pub fn with_spouse(mut self, spouse_raw: impl Into<String>) -> Self {
        self.spouse_raw = spouse_raw.into();
        self
    }

    /// Spreadsheet line number: one header line and one-based counting.
    pub fn row_number(&self) -> usize {
        self.position + 2
    }

    pub fn has_parent_field(&self) -> bool {
        !self.parent_raw.trim().is_empty()
    }

    pub fn has_spouse_field(&self) -> bool {
        !self.spouse_raw.trim().is_empty()
    }

    /// Parent field split on [`PARENT_SEPARATOR`], trimmed, empty parts dropped.
    pub fn parent_parts(&self) -> impl Iterator<Item = &str> {
        split_parent_field(&self.parent_raw)
    }

    /// Creation fields for the bare member (no relationships).
    pub fn to_new_member(&self) -> NewMember {
        NewMember::bare(self.name.clone(), self.gender, self.generation)
            .with_details(self.details.clone())
    }
}

pub fn split_parent_field(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(PARENT_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
}
