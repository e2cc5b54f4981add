//! Integration tests for name normalization and member lookup.

use proptest::prelude::*;
use silsilah_match::{MatchKind, MemberIndex, clean, normalize};
use silsilah_model::{Gender, MatchPolicy, Member, MemberId, NewMember};

fn member(id: &str, name: &str, generation: u32) -> Member {
    Member::from_new(
        MemberId::new(id).unwrap(),
        NewMember::bare(name, Gender::Male, generation),
    )
}

/// Names assembled from honorific fragments, markers and plain words.
fn noisy_name() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("Bpk. ".to_string()),
        Just("Bpk.".to_string()),
        Just("Bu ".to_string()),
        Just("Hj.".to_string()),
        Just("H. ".to_string()),
        Just("(alm)".to_string()),
        Just("(Alm.)".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("  ".to_string()),
        Just("\t".to_string()),
        "[A-Za-z]{1,7}",
    ];
    prop::collection::vec(fragment, 0..10).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in noisy_name()) {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn clean_is_idempotent(raw in noisy_name()) {
        let once = clean(&raw);
        prop_assert_eq!(clean(&once), once);
    }

    #[test]
    fn normalize_is_lowercased_clean(raw in noisy_name()) {
        prop_assert_eq!(normalize(&raw), clean(&raw).to_lowercase());
    }

    #[test]
    fn indexed_names_resolve_to_themselves(names in prop::collection::vec("[A-Z][a-z]{2,8}", 1..8)) {
        let mut index = MemberIndex::new();
        let mut first_id = std::collections::HashMap::new();
        for (position, name) in names.iter().enumerate() {
            let id = MemberId::new(format!("m{position}")).unwrap();
            index.insert_name(id.clone(), name, 1);
            first_id.entry(name.clone()).or_insert(id);
        }
        for name in &names {
            let resolved = index.resolve(name);
            prop_assert_eq!(resolved.as_ref(), first_id.get(name));
        }
    }
}

#[test]
fn honorific_spouse_reference_resolves_to_plain_name() {
    let ahmad = member("a1", "Ahmad", 2);
    let index = MemberIndex::from_members([&ahmad], MatchPolicy::default());

    let found = index.resolve_match("Bpk. Ahmad (alm)").unwrap();
    assert_eq!(found.id, ahmad.id);
    assert_eq!(found.kind, MatchKind::Cleaned);
    assert!(!found.kind.is_fuzzy());
}

#[test]
fn index_built_from_existing_members_keeps_order() {
    let members = [
        member("m1", "Mucksin", 1),
        member("s1", "Supiyah", 1),
        member("a1", "Ahmad Susanto", 2),
    ];
    let index = MemberIndex::from_members(&members, MatchPolicy::default());
    assert_eq!(index.len(), 3);
    assert_eq!(
        index.entries().iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        vec!["Mucksin", "Supiyah", "Ahmad Susanto"]
    );
    assert_eq!(index.get(&members[2].id).map(|e| e.normalized.as_str()), Some("ahmad susanto"));
    assert_eq!(index.resolve("susanto"), Some(members[2].id.clone()));
}
