use std::collections::HashMap;

use silsilah_core::error::Result as StoreResult;
use silsilah_core::{
    ImportReport, MemberFilter, MemberOrder, MemberStore, MemoryStore, StoreError, build_forest,
    render_text, run_import,
};
use silsilah_ingest::ParsedRows;
use silsilah_model::{
    CoupleTieBreak, DiagnosticKind, Gender, ImportMode, ImportOptions, ImportRow, MatchPolicy,
    Member, MemberId, MemberPatch, NewMember,
};

fn parsed(rows: Vec<ImportRow>) -> ParsedRows {
    ParsedRows {
        rows,
        rejected: 0,
        diagnostics: Vec::new(),
    }
}

fn family_rows() -> Vec<ImportRow> {
    vec![
        ImportRow::new(0, "Mucksin", Gender::Male, 1).with_spouse("Supiyah"),
        ImportRow::new(1, "Supiyah", Gender::Female, 1),
        ImportRow::new(2, "Ahmad Susanto", Gender::Male, 2).with_spouse("Dewi Rahayu"),
        ImportRow::new(3, "Dewi Rahayu", Gender::Female, 2),
        ImportRow::new(4, "Budi Santoso", Gender::Male, 3).with_parent("Ahmad Susanto - Dewi Rahayu"),
        ImportRow::new(5, "Orphan", Gender::Male, 3).with_parent("Unknown Name - AlsoUnknown"),
    ]
}

fn replace() -> ImportOptions {
    ImportOptions::new(ImportMode::Replace).with_source_id("family.csv")
}

fn by_name(store: &MemoryStore) -> HashMap<String, Member> {
    store
        .members()
        .iter()
        .map(|member| (member.name.clone(), member.clone()))
        .collect()
}

fn kinds(report: &ImportReport) -> Vec<DiagnosticKind> {
    report.diagnostics.iter().map(|d| d.kind).collect()
}

#[test]
fn full_family_import() {
    let mut store = MemoryStore::default();
    let report = run_import(&mut store, parsed(family_rows()), &replace()).unwrap();

    assert_eq!(report.total_rows, 6);
    assert_eq!(report.inserted, 6);
    assert_eq!(report.spouse_linked, 4);
    assert_eq!(report.parent_linked, 2);
    assert!(!report.has_failures());
    assert_eq!(kinds(&report), vec![DiagnosticKind::ParentNotFound]);
    assert_eq!(report.diagnostics[0].row, Some(7));

    let members = by_name(&store);
    let id = |name: &str| members[name].id.clone();
    assert_eq!(members["Mucksin"].spouse_id, Some(id("Supiyah")));
    assert_eq!(members["Supiyah"].spouse_id, Some(id("Mucksin")));
    assert_eq!(members["Ahmad Susanto"].parent_id, Some(id("Mucksin")));
    assert_eq!(members["Dewi Rahayu"].parent_id, None);
    assert_eq!(members["Budi Santoso"].parent_id, Some(id("Ahmad Susanto")));
    assert_eq!(members["Orphan"].parent_id, None);

    let forest = build_forest(store.members()).unwrap();
    insta::assert_snapshot!(render_text(&forest).trim_end(), @r"
    Mucksin (L, gen 1) & Supiyah (P)
    └── Ahmad Susanto (L, gen 2) & Dewi Rahayu (P)
        └── Budi Santoso (L, gen 3)
    Orphan (L, gen 3)
    ");
}

#[test]
fn replace_import_is_deterministic() {
    let mut store = MemoryStore::default();
    run_import(&mut store, parsed(family_rows()), &replace()).unwrap();
    let first = store.members().to_vec();

    run_import(&mut store, parsed(family_rows()), &replace()).unwrap();
    assert_eq!(store.members(), first.as_slice());

    // The source label is reported but does not change ids.
    let renamed = replace().with_source_id("renamed.csv");
    let report = run_import(&mut store, parsed(family_rows()), &renamed).unwrap();
    assert_eq!(report.source_id, "renamed.csv");
    assert_eq!(store.members(), first.as_slice());
}

#[test]
fn generation_two_descendant_is_the_referenced_partner() {
    // Dewi comes first, but only Ahmad is named as a parent.
    let rows = vec![
        ImportRow::new(0, "Mucksin", Gender::Male, 1),
        ImportRow::new(1, "Dewi Rahayu", Gender::Female, 2).with_spouse("Ahmad Susanto"),
        ImportRow::new(2, "Ahmad Susanto", Gender::Male, 2),
        ImportRow::new(3, "Budi", Gender::Male, 3).with_parent("Ahmad Susanto"),
    ];
    let mut store = MemoryStore::default();
    run_import(&mut store, parsed(rows), &replace()).unwrap();

    let members = by_name(&store);
    assert_eq!(members["Ahmad Susanto"].parent_id, Some(members["Mucksin"].id.clone()));
    assert_eq!(members["Dewi Rahayu"].parent_id, None);
}

#[test]
fn partner_with_a_named_parent_makes_the_other_the_in_law() {
    // Dewi's row is earlier, but Ahmad's own parent field places him in the line.
    let rows = vec![
        ImportRow::new(0, "Mucksin", Gender::Male, 1),
        ImportRow::new(1, "Dewi", Gender::Female, 2).with_spouse("Ahmad"),
        ImportRow::new(2, "Ahmad", Gender::Male, 2).with_parent("Mucksin"),
    ];
    let mut store = MemoryStore::default();
    let report = run_import(&mut store, parsed(rows), &replace()).unwrap();

    let members = by_name(&store);
    assert_eq!(members["Ahmad"].parent_id, Some(members["Mucksin"].id.clone()));
    assert_eq!(members["Ahmad"].spouse_id, Some(members["Dewi"].id.clone()));
    assert_eq!(members["Dewi"].parent_id, None);
    assert_eq!(report.parent_linked, 1);
}

#[test]
fn unresolved_tie_break_links_neither_partner() {
    let rows = vec![
        ImportRow::new(0, "Mucksin", Gender::Male, 1),
        ImportRow::new(1, "Ahmad", Gender::Male, 2).with_spouse("Dewi"),
        ImportRow::new(2, "Dewi", Gender::Female, 2),
        ImportRow::new(3, "Rina", Gender::Female, 2),
    ];
    let options = replace().with_couple_tie_break(CoupleTieBreak::Unresolved);
    let mut store = MemoryStore::default();
    let report = run_import(&mut store, parsed(rows), &options).unwrap();

    assert_eq!(kinds(&report), vec![DiagnosticKind::CoupleUnresolved]);
    let members = by_name(&store);
    assert_eq!(members["Ahmad"].parent_id, None);
    assert_eq!(members["Dewi"].parent_id, None);
    // Unpaired generation-2 members are descendants.
    assert_eq!(members["Rina"].parent_id, Some(members["Mucksin"].id.clone()));
    assert_eq!(report.parent_linked, 1);
}

#[test]
fn root_name_selects_the_lineage_root() {
    let rows = vec![
        ImportRow::new(0, "Mucksin", Gender::Male, 1).with_spouse("Supiyah"),
        ImportRow::new(1, "Supiyah", Gender::Female, 1),
        ImportRow::new(2, "Rina", Gender::Female, 2),
    ];
    let options = replace().with_root_name("Supiyah");
    let mut store = MemoryStore::default();
    run_import(&mut store, parsed(rows), &options).unwrap();

    let members = by_name(&store);
    assert_eq!(members["Rina"].parent_id, Some(members["Supiyah"].id.clone()));
}

#[test]
fn spouse_with_honorifics_resolves_by_cleaned_name() {
    let rows = vec![
        ImportRow::new(0, "Ahmad", Gender::Male, 2),
        ImportRow::new(1, "Siti", Gender::Female, 2).with_spouse("Bpk. Ahmad (alm)"),
    ];
    let mut store = MemoryStore::default();
    let report = run_import(&mut store, parsed(rows), &replace()).unwrap();

    let members = by_name(&store);
    assert_eq!(members["Siti"].spouse_id, Some(members["Ahmad"].id.clone()));
    assert!(report.fuzzy_matches.is_empty());
}

#[test]
fn containment_matches_are_reported_and_can_be_tightened() {
    let rows = || {
        vec![
            ImportRow::new(0, "Anisa Putri", Gender::Female, 2),
            ImportRow::new(1, "Eko", Gender::Male, 2).with_spouse("Anisa"),
        ]
    };

    let mut store = MemoryStore::default();
    let report = run_import(&mut store, parsed(rows()), &replace()).unwrap();
    assert_eq!(report.spouse_linked, 2);
    assert_eq!(report.fuzzy_matches.len(), 1);
    assert_eq!(report.fuzzy_matches[0].matched_name, "Anisa Putri");
    assert_eq!(report.fuzzy_matches[0].row, 3);
    assert!(kinds(&report).contains(&DiagnosticKind::FuzzyMatch));

    let strict = replace().with_match_policy(MatchPolicy::default().with_min_containment_ratio(0.9));
    let report = run_import(&mut store, parsed(rows()), &strict).unwrap();
    assert_eq!(report.spouse_linked, 0);
    assert!(report.fuzzy_matches.is_empty());
    assert!(kinds(&report).contains(&DiagnosticKind::SpouseNotFound));
}

#[test]
fn claimed_spouse_is_not_linked_twice() {
    let rows = vec![
        ImportRow::new(0, "Ahmad", Gender::Male, 2).with_spouse("Dewi"),
        ImportRow::new(1, "Dewi", Gender::Female, 2).with_spouse("Ahmad"),
        ImportRow::new(2, "Joko", Gender::Male, 2).with_spouse("Dewi"),
    ];
    let mut store = MemoryStore::default();
    let report = run_import(&mut store, parsed(rows), &replace()).unwrap();

    assert_eq!(report.spouse_linked, 2);
    assert!(kinds(&report).contains(&DiagnosticKind::SpouseAlreadyLinked));
    let members = by_name(&store);
    assert_eq!(members["Dewi"].spouse_id, Some(members["Ahmad"].id.clone()));
    assert_eq!(members["Joko"].spouse_id, None);
}

#[test]
fn parent_must_be_in_a_lower_generation() {
    let rows = vec![
        ImportRow::new(0, "Sari", Gender::Female, 3),
        ImportRow::new(1, "Ahmad", Gender::Male, 2),
        ImportRow::new(2, "Budi", Gender::Male, 3).with_parent("Sari - Ahmad"),
    ];
    let mut store = MemoryStore::default();
    run_import(&mut store, parsed(rows), &replace()).unwrap();

    let members = by_name(&store);
    assert_eq!(members["Budi"].parent_id, Some(members["Ahmad"].id.clone()));
}

#[test]
fn merge_binds_existing_members_and_keeps_their_links() {
    let mut store = MemoryStore::default();
    run_import(&mut store, parsed(family_rows()), &replace()).unwrap();
    let before = by_name(&store);

    let rows = vec![
        ImportRow::new(0, "Bpk. Mucksin", Gender::Male, 1).with_spouse("Rina"),
        ImportRow::new(1, "Rina", Gender::Female, 1),
        ImportRow::new(2, "Citra", Gender::Female, 4).with_parent("Budi Santoso"),
    ];
    let options = ImportOptions::new(ImportMode::Merge).with_source_id("extra.csv");
    let report = run_import(&mut store, parsed(rows), &options).unwrap();

    assert_eq!(report.existing, 1);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.processed(), 3);
    assert!(kinds(&report).contains(&DiagnosticKind::ExistingMember));
    assert_eq!(report.spouse_linked, 0);

    let after = by_name(&store);
    assert_eq!(after.len(), 8);
    assert_eq!(after["Mucksin"].id, before["Mucksin"].id);
    assert_eq!(after["Mucksin"].spouse_id, before["Mucksin"].spouse_id);
    assert_eq!(after["Rina"].spouse_id, None);
    assert_eq!(after["Citra"].parent_id, Some(after["Budi Santoso"].id.clone()));
}

/// Delegates to a [`MemoryStore`] but refuses to create members with
/// certain names.
struct RejectingStore {
    inner: MemoryStore,
    rejected: Vec<&'static str>,
}

impl MemberStore for RejectingStore {
    fn create_member(&mut self, fields: NewMember) -> StoreResult<Member> {
        if self.rejected.contains(&fields.name.as_str()) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        self.inner.create_member(fields)
    }

    fn update_member(&mut self, id: &MemberId, patch: MemberPatch) -> StoreResult<Member> {
        self.inner.update_member(id, patch)
    }

    fn delete_member(&mut self, id: &MemberId) -> StoreResult<()> {
        self.inner.delete_member(id)
    }

    fn list_members(&self, filter: &MemberFilter, order: MemberOrder) -> StoreResult<Vec<Member>> {
        self.inner.list_members(filter, order)
    }

    fn get_member(&self, id: &MemberId) -> StoreResult<Option<Member>> {
        self.inner.get_member(id)
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.inner.clear()
    }

    fn link_spouses(&mut self, left: &MemberId, right: &MemberId) -> StoreResult<()> {
        self.inner.link_spouses(left, right)
    }

    fn unlink_spouse(&mut self, id: &MemberId) -> StoreResult<()> {
        self.inner.unlink_spouse(id)
    }

    fn replace_all(&mut self, members: Vec<Member>) -> StoreResult<()> {
        self.inner.replace_all(members)
    }
}

#[test]
fn rejected_writes_are_reported_as_failed_rows() {
    let mut store = RejectingStore {
        inner: MemoryStore::default(),
        rejected: vec!["Dewi Rahayu"],
    };
    let report = run_import(&mut store, parsed(family_rows()), &replace()).unwrap();

    assert!(report.has_failures());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].row, 5);
    assert_eq!(report.failed[0].name, "Dewi Rahayu");
    assert_eq!(report.inserted, 5);
    assert_eq!(report.diagnostic_counts().errors, 1);

    // The batch carried on without the failed row.
    let members = store.inner.members();
    let budi = members.iter().find(|m| m.name == "Budi Santoso").unwrap();
    let ahmad = members.iter().find(|m| m.name == "Ahmad Susanto").unwrap();
    assert_eq!(budi.parent_id, Some(ahmad.id.clone()));
    assert_eq!(ahmad.spouse_id, None);
}
