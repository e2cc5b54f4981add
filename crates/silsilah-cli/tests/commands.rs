use std::path::Path;

use clap::Parser;
use silsilah_cli::cli::{Cli, Command, TreeFormatArg};
use silsilah_cli::commands::{
    run_add, run_backup, run_check, run_delete, run_export, run_import, run_members, run_restore,
    run_stats, run_template, run_tree, run_update,
};
use silsilah_model::ImportMode;
use tempfile::tempdir;

fn parse(store: &Path, args: &[&str]) -> Command {
    let store = store.to_string_lossy().into_owned();
    let mut argv = vec!["silsilah".to_string(), "--store".to_string(), store];
    argv.extend(args.iter().map(ToString::to_string));
    Cli::try_parse_from(argv).unwrap().command
}

fn import(store: &Path, file: &Path, mode: &str) -> silsilah_core::ImportReport {
    let file = file.to_string_lossy().into_owned();
    let Command::Import(args) = parse(store, &["import", &file, "--mode", mode]) else {
        panic!("expected import command");
    };
    run_import(store, &args).unwrap()
}

#[test]
fn template_imports_into_a_tree() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("family.json");
    let template = dir.path().join("template.csv");

    assert_eq!(run_template(&template).unwrap(), 3);
    let report = import(&store, &template, "replace");
    assert_eq!(report.mode, ImportMode::Replace);
    assert_eq!(report.source_id, "template.csv");
    assert_eq!(report.inserted, 3);
    assert_eq!(report.spouse_linked, 2);
    assert_eq!(report.parent_linked, 1);
    assert!(!report.has_failures());

    let tree = run_tree(&store, TreeFormatArg::Text).unwrap();
    insta::assert_snapshot!(tree.trim_end(), @r"
    Mucksin (L, gen 1) & Supiyah (P)
    └── Ahmad Susanto (L, gen 2)
    ");

    let json = run_tree(&store, TreeFormatArg::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);

    let stats = run_stats(&store).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.generations, 2);
    assert_eq!(stats.male, 2);
    assert_eq!(stats.female, 1);
    assert!(run_check(&store).unwrap().is_empty());
}

#[test]
fn export_merges_back_without_duplicates() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("family.json");
    let template = dir.path().join("template.csv");
    let export = dir.path().join("export.csv");

    run_template(&template).unwrap();
    import(&store, &template, "replace");
    assert_eq!(run_export(&store, &export).unwrap(), 3);

    let report = import(&store, &export, "merge");
    assert_eq!(report.existing, 3);
    assert_eq!(report.inserted, 0);
    assert_eq!(run_stats(&store).unwrap().total, 3);
}

#[test]
fn member_edits_go_through_the_store() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("family.json");

    let Command::Add(args) = parse(
        &store,
        &["add", "--name", "Mucksin", "--gender", "L", "--generation", "1"],
    ) else {
        panic!("expected add command");
    };
    let root = run_add(&store, &args).unwrap();

    let root_id = root.id.to_string();
    let Command::Add(args) = parse(
        &store,
        &[
            "add",
            "--name",
            "Ahmad Susanto",
            "--gender",
            "Laki-laki",
            "--generation",
            "2",
            "--parent",
            &root_id,
            "--job",
            "Guru",
        ],
    ) else {
        panic!("expected add command");
    };
    let child = run_add(&store, &args).unwrap();
    assert_eq!(child.parent_id.as_ref(), Some(&root.id));
    assert_eq!(child.details.job.as_deref(), Some("Guru"));

    let child_id = child.id.to_string();
    let Command::Update(args) = parse(&store, &["update", &child_id, "--address", "Bandung"])
    else {
        panic!("expected update command");
    };
    let updated = run_update(&store, &args).unwrap();
    assert_eq!(updated.details.job.as_deref(), Some("Guru"));
    assert_eq!(updated.details.address.as_deref(), Some("Bandung"));

    let Command::Members(args) = parse(&store, &["members", "--generation", "2"]) else {
        panic!("expected members command");
    };
    let listing = run_members(&store, &args).unwrap();
    assert_eq!(listing.members.len(), 1);
    assert_eq!(
        listing.name_of(listing.members[0].parent_id.as_ref()),
        Some("Mucksin")
    );

    run_delete(&store, &root.id).unwrap();
    let Command::Members(args) = parse(&store, &["members"]) else {
        panic!("expected members command");
    };
    let listing = run_members(&store, &args).unwrap();
    assert_eq!(listing.members.len(), 1);
    assert_eq!(listing.members[0].parent_id, None);
}

#[test]
fn restore_replaces_the_store() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("family.json");
    let other = dir.path().join("other.json");
    let template = dir.path().join("template.csv");
    let backup = dir.path().join("backup.json");

    run_template(&template).unwrap();
    import(&store, &template, "replace");
    assert_eq!(run_backup(&store, &backup).unwrap(), 3);

    let (restored, issues) = run_restore(&other, &backup).unwrap();
    assert_eq!(restored, 3);
    assert!(issues.is_empty());
    assert_eq!(
        run_tree(&other, TreeFormatArg::Text).unwrap(),
        run_tree(&store, TreeFormatArg::Text).unwrap()
    );
}

#[test]
fn missing_member_update_fails() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("family.json");
    let Command::Update(args) = parse(&store, &["update", "m-404", "--name", "Nobody"]) else {
        panic!("expected update command");
    };
    assert!(run_update(&store, &args).is_err());
}
