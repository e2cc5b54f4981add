//! Tests for silsilah-model types.

use silsilah_model::{
    Diagnostic, DiagnosticCounts, DiagnosticKind, Gender, Member, MemberDetails, MemberId,
    NewMember, Severity, TreeNode,
};

fn member(id: &str, name: &str, generation: u32) -> Member {
    Member::from_new(
        MemberId::new(id).unwrap(),
        NewMember::bare(name, Gender::Male, generation),
    )
}

#[test]
fn diagnostic_counts_by_severity() {
    let diagnostics = vec![
        Diagnostic::error(DiagnosticKind::RowRejected, "Baris 3: Nama wajib diisi").at_row(3),
        Diagnostic::warning(DiagnosticKind::SpouseNotFound, "Pasangan tidak ditemukan"),
        Diagnostic::warning(DiagnosticKind::FuzzyMatch, "Ahmad ~ Ahmad Susanto"),
        Diagnostic::info(DiagnosticKind::ExistingMember, "Mucksin sudah ada"),
    ];
    let counts = DiagnosticCounts::from_diagnostics(&diagnostics);
    assert_eq!(counts.errors, 1);
    assert_eq!(counts.warnings, 2);
    assert_eq!(counts.infos, 1);
    assert_eq!(diagnostics[0].row, Some(3));
    assert_eq!(diagnostics[0].severity, Severity::Error);
}

#[test]
fn member_serializes_with_camel_case_and_gender_code() {
    let mut record = Member::from_new(
        MemberId::new("m1").unwrap(),
        NewMember::bare("Supiyah", Gender::Female, 1).with_details(MemberDetails {
            birth_place: Some("Surabaya".to_string()),
            ..MemberDetails::default()
        }),
    );
    record.spouse_id = Some(MemberId::new("m0").unwrap());

    let json = serde_json::to_value(&record).expect("serialize member");
    assert_eq!(json["gender"], "P");
    assert_eq!(json["spouseId"], "m0");
    assert_eq!(json["birthPlace"], "Surabaya");
    assert_eq!(json["isActive"], true);

    let round: Member = serde_json::from_value(json).expect("deserialize member");
    assert_eq!(round, record);
}

#[test]
fn tree_node_visits_in_preorder() {
    let tree = TreeNode {
        member: member("a", "Mucksin", 1),
        spouse: None,
        children: vec![
            TreeNode {
                member: member("b", "Ahmad", 2),
                spouse: None,
                children: vec![TreeNode {
                    member: member("d", "Budi", 3),
                    spouse: None,
                    children: vec![],
                }],
            },
            TreeNode {
                member: member("c", "Citra", 2),
                spouse: None,
                children: vec![],
            },
        ],
    };

    let mut seen = Vec::new();
    tree.visit(&mut |node, depth| seen.push((node.member.name.clone(), depth)));
    assert_eq!(
        seen,
        vec![
            ("Mucksin".to_string(), 0),
            ("Ahmad".to_string(), 1),
            ("Budi".to_string(), 2),
            ("Citra".to_string(), 1),
        ]
    );
    assert_eq!(tree.node_count(), 4);
}
