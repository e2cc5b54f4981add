//! Subcommand implementations. Each returns data; printing is left to the caller.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use silsilah_core::{
    FamilyStats, ImportReport, IntegrityIssue, JsonStore, MemberFilter, MemberOrder, MemberStore,
    check_integrity, create_member, delete_member, family_stats, import_file, load_forest,
    render_text, restore_backup, update_member, write_backup,
};
use silsilah_ingest::{export_rows, template_rows, write_rows_to_path};
use silsilah_model::{
    ImportOptions, MatchPolicy, Member, MemberDetails, MemberId, MemberPatch, NewMember,
};
use tracing::{debug, info, info_span};

use crate::cli::{AddArgs, DetailArgs, ImportArgs, MembersArgs, TreeFormatArg, UpdateArgs};
use crate::logging::redact_value;

/// Members plus the display names of everyone they reference.
pub struct MemberListing {
    pub members: Vec<Member>,
    pub names: HashMap<MemberId, String>,
}

impl MemberListing {
    pub fn name_of(&self, id: Option<&MemberId>) -> Option<&str> {
        id.and_then(|id| self.names.get(id)).map(String::as_str)
    }
}

fn open_store(path: &Path) -> Result<JsonStore> {
    JsonStore::open(path).with_context(|| format!("open member store {}", path.display()))
}

fn all_members(store: &JsonStore) -> Result<Vec<Member>> {
    store
        .list_members(&MemberFilter::all(), MemberOrder::Listing)
        .context("list members")
}

pub fn run_import(store_path: &Path, args: &ImportArgs) -> Result<ImportReport> {
    let source_id = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut options = ImportOptions::new(args.mode.into())
        .with_couple_tie_break(args.couple_tie_break.into())
        .with_match_policy(
            MatchPolicy::default().with_min_containment_ratio(args.min_containment_ratio),
        )
        .with_source_id(source_id);
    if let Some(root_name) = &args.root_name {
        options = options.with_root_name(root_name.clone());
    }

    let mut store = open_store(store_path)?;
    import_file(&mut store, &args.file, &options)
        .with_context(|| format!("import {}", args.file.display()))
}

pub fn run_tree(store_path: &Path, format: TreeFormatArg) -> Result<String> {
    let store = open_store(store_path)?;
    let forest = info_span!("tree").in_scope(|| load_forest(&store)).context("build family tree")?;
    debug!(roots = forest.len(), "tree loaded");
    match format {
        TreeFormatArg::Text => Ok(render_text(&forest)),
        TreeFormatArg::Json => serde_json::to_string_pretty(&forest).context("serialize tree"),
    }
}

pub fn run_members(store_path: &Path, args: &MembersArgs) -> Result<MemberListing> {
    let store = open_store(store_path)?;
    let filter = MemberFilter {
        generation: args.generation,
        parent_id: args.parent.clone(),
        spouse_id: None,
        name_contains: args.name.clone(),
    };
    let members = store
        .list_members(&filter, MemberOrder::Listing)
        .context("list members")?;
    let names = all_members(&store)?
        .into_iter()
        .map(|member| (member.id, member.name))
        .collect();
    Ok(MemberListing { members, names })
}

pub fn run_stats(store_path: &Path) -> Result<FamilyStats> {
    let store = open_store(store_path)?;
    Ok(family_stats(&all_members(&store)?))
}

pub fn run_check(store_path: &Path) -> Result<Vec<IntegrityIssue>> {
    let store = open_store(store_path)?;
    let issues = check_integrity(store.snapshot().members.as_slice());
    info!(issues = issues.len(), "integrity check complete");
    Ok(issues)
}

fn details_from(args: &DetailArgs, base: MemberDetails) -> MemberDetails {
    MemberDetails {
        birth_date: args.birth_date.clone().or(base.birth_date),
        birth_place: args.birth_place.clone().or(base.birth_place),
        job: args.job.clone().or(base.job),
        address: args.address.clone().or(base.address),
        phone: args.phone.clone().or(base.phone),
        education: args.education.clone().or(base.education),
        notes: args.notes.clone().or(base.notes),
        photo: args.photo.clone().or(base.photo),
    }
}

pub fn run_add(store_path: &Path, args: &AddArgs) -> Result<Member> {
    let mut store = open_store(store_path)?;
    let fields = NewMember {
        parent_id: args.parent.clone(),
        spouse_id: args.spouse.clone(),
        ..NewMember::bare(args.name.clone(), args.gender, args.generation)
    }
    .with_details(details_from(&args.details, MemberDetails::default()));
    let member = create_member(&mut store, fields).context("add member")?;
    info!(id = %member.id, name = redact_value(&member.name), "member added");
    Ok(member)
}

pub fn run_update(store_path: &Path, args: &UpdateArgs) -> Result<Member> {
    let mut store = open_store(store_path)?;
    let current = store
        .get_member(&args.id)
        .context("load member")?
        .with_context(|| format!("member not found: {}", args.id))?;

    let parent_id = if args.clear_parent {
        Some(None)
    } else {
        args.parent.clone().map(Some)
    };
    let spouse_id = if args.clear_spouse {
        Some(None)
    } else {
        args.spouse.clone().map(Some)
    };
    let is_active = match (args.active, args.inactive) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let details =
        (!args.details.is_empty()).then(|| details_from(&args.details, current.details.clone()));
    let patch = MemberPatch {
        name: args.name.clone(),
        gender: args.gender,
        generation: args.generation,
        parent_id,
        spouse_id,
        details,
        is_active,
    };

    let member = update_member(&mut store, &args.id, patch)
        .with_context(|| format!("update member {}", args.id))?;
    info!(id = %member.id, name = redact_value(&member.name), "member updated");
    Ok(member)
}

pub fn run_delete(store_path: &Path, id: &MemberId) -> Result<()> {
    let mut store = open_store(store_path)?;
    delete_member(&mut store, id).with_context(|| format!("delete member {id}"))
}

pub fn run_export(store_path: &Path, output: &Path) -> Result<usize> {
    let store = open_store(store_path)?;
    let rows = export_rows(&all_members(&store)?);
    write_rows_to_path(output, &rows)
        .with_context(|| format!("write export {}", output.display()))?;
    info!(rows = rows.len(), path = %output.display(), "export written");
    Ok(rows.len())
}

pub fn run_template(output: &Path) -> Result<usize> {
    let rows = template_rows();
    write_rows_to_path(output, &rows)
        .with_context(|| format!("write template {}", output.display()))?;
    Ok(rows.len())
}

pub fn run_backup(store_path: &Path, output: &Path) -> Result<usize> {
    let store = open_store(store_path)?;
    write_backup(&store, output).with_context(|| format!("write backup {}", output.display()))
}

/// Restores a backup and checks the restored links.
pub fn run_restore(store_path: &Path, input: &Path) -> Result<(usize, Vec<IntegrityIssue>)> {
    let mut store = open_store(store_path)?;
    let restored = restore_backup(&mut store, input)
        .with_context(|| format!("restore backup {}", input.display()))?;
    let issues = check_integrity(store.snapshot().members.as_slice());
    Ok((restored, issues))
}
