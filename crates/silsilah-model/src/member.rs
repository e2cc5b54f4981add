//! Family member records.
//!
//! A [`Member`] carries two relationship references: `parent_id` (the blood
//! relative one generation up) and `spouse_id` (kept symmetric by the store
//! and the member service). Descriptive attributes live in [`MemberDetails`]
//! and are carried through the relationship algorithms untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MemberId, ModelError};

/// Gender of a member, stored as the single-letter code used by the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "L")]
    Male,
    #[serde(rename = "P")]
    Female,
}

impl Gender {
    /// Parses the stored single-letter code (`L` or `P`).
    pub fn from_code(code: &str) -> Result<Self, ModelError> {
        match code.trim() {
            "L" | "l" => Ok(Self::Male),
            "P" | "p" => Ok(Self::Female),
            other => Err(ModelError::UnknownGenderCode(other.to_string())),
        }
    }

    /// Maps free-text spreadsheet input onto a gender.
    ///
    /// Recognizes `laki-laki`/`l`/`pria` and `perempuan`/`p`/`wanita`,
    /// case-insensitively. Returns `None` for anything else.
    pub fn from_label(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "laki-laki" | "l" | "pria" => Some(Self::Male),
            "perempuan" | "p" | "wanita" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "L",
            Self::Female => "P",
        }
    }

    /// Display label used in exported spreadsheets.
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Laki-laki",
            Self::Female => "Perempuan",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive attributes that the core algorithms never inspect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// A person in the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub gender: Gender,
    pub generation: u32,
    #[serde(default)]
    pub parent_id: Option<MemberId>,
    #[serde(default)]
    pub spouse_id: Option<MemberId>,
    #[serde(flatten)]
    pub details: MemberDetails,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Member {
    /// Builds a stored member from creation fields and an assigned id.
    pub fn from_new(id: MemberId, fields: NewMember) -> Self {
        Self {
            id,
            name: fields.name,
            gender: fields.gender,
            generation: fields.generation,
            parent_id: fields.parent_id,
            spouse_id: fields.spouse_id,
            details: fields.details,
            is_active: true,
        }
    }

    /// Applies a partial update in place. Relationship fields are applied verbatim;
    /// validation is the caller's responsibility.
    pub fn apply(&mut self, patch: MemberPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(generation) = patch.generation {
            self.generation = generation;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(spouse_id) = patch.spouse_id {
            self.spouse_id = spouse_id;
        }
        if let Some(details) = patch.details {
            self.details = details;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }

    /// Stable listing key: generation ascending, then name, then id.
    pub fn listing_key(&self) -> (u32, &str, &MemberId) {
        (self.generation, self.name.as_str(), &self.id)
    }
}

/// Fields required to create a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub gender: Gender,
    pub generation: u32,
    #[serde(default)]
    pub parent_id: Option<MemberId>,
    #[serde(default)]
    pub spouse_id: Option<MemberId>,
    #[serde(flatten)]
    pub details: MemberDetails,
}

impl NewMember {
    /// A member with no relationships and no descriptive details.
    pub fn bare(name: impl Into<String>, gender: Gender, generation: u32) -> Self {
        Self {
            name: name.into(),
            gender,
            generation,
            parent_id: None,
            spouse_id: None,
            details: MemberDetails::default(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: MemberId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn with_spouse(mut self, spouse_id: MemberId) -> Self {
        self.spouse_id = Some(spouse_id);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: MemberDetails) -> Self {
        self.details = details;
        self
    }
}

/// A partial update. `None` leaves a field untouched; for the relationship
/// fields `Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub generation: Option<u32>,
    pub parent_id: Option<Option<MemberId>>,
    pub spouse_id: Option<Option<MemberId>>,
    pub details: Option<MemberDetails>,
    pub is_active: Option<bool>,
}

impl MemberPatch {
    pub fn parent(parent_id: Option<MemberId>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn spouse(spouse_id: Option<MemberId>) -> Self {
        Self {
            spouse_id: Some(spouse_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn touches_relationships(&self) -> bool {
        self.parent_id.is_some() || self.spouse_id.is_some() || self.generation.is_some()
    }
}

/// Validates a display name, returning the trimmed form.
pub fn validate_name(name: &str) -> Result<String, ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyName);
    }
    Ok(trimmed.to_string())
}

pub fn validate_generation(generation: i64) -> Result<u32, ModelError> {
    match u32::try_from(generation) {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(ModelError::InvalidGeneration(generation)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_labels_map_to_codes() {
        assert_eq!(Gender::from_label("Laki-laki"), Some(Gender::Male));
        assert_eq!(Gender::from_label(" PRIA "), Some(Gender::Male));
        assert_eq!(Gender::from_label("l"), Some(Gender::Male));
        assert_eq!(Gender::from_label("Perempuan"), Some(Gender::Female));
        assert_eq!(Gender::from_label("wanita"), Some(Gender::Female));
        assert_eq!(Gender::from_label("P"), Some(Gender::Female));
        assert_eq!(Gender::from_label("x"), None);
        assert_eq!(Gender::from_label(""), None);
    }

    #[test]
    fn patch_clears_links() {
        let id = MemberId::new("m1").unwrap();
        let mut member = Member::from_new(
            id.clone(),
            NewMember::bare("Ahmad", Gender::Male, 2).with_spouse(MemberId::new("m2").unwrap()),
        );
        member.apply(MemberPatch::spouse(None));
        assert_eq!(member.spouse_id, None);
        assert_eq!(member.id, id);
    }

    #[test]
    fn generation_must_be_positive() {
        assert_eq!(validate_generation(0), Err(ModelError::InvalidGeneration(0)));
        assert_eq!(validate_generation(3), Ok(3));
    }
}
