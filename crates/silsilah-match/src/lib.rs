#![deny(unsafe_code)]

//! Name normalization and member lookup for free-text name references.
//!
//! [`normalize`] and [`clean`] strip honorifics and deceased markers from
//! names; [`MemberIndex`] resolves a free-text reference to a member id by
//! trying exact, cleaned, normalized and finally containment matches.

pub mod index;
pub mod normalize;

pub use index::{IndexedMember, MatchKind, MemberIndex, NameMatch};
pub use normalize::{clean, normalize, similarity};
