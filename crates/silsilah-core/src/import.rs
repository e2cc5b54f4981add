//! Bulk import of a member spreadsheet.
//!
//! The import runs in phases. Each phase finishes all of its store writes
//! before the next one reads:
//!
//! 1. **prepare**: clear the store (replace) or index existing members (merge)
//! 2. **insert**: create one bare member per row and index it
//! 3. **link_spouses**: resolve spouse names and link both sides
//! 4. **link_parents**: resolve parent names and infer generation-2 lineage
//!
//! A store failure on one row is recorded in the report and the batch goes on.
//! Rows already written are not rolled back.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use silsilah_ingest::{ParsedRows, read_import_rows};
use silsilah_match::MemberIndex;
use silsilah_model::{
    Diagnostic, DiagnosticCounts, DiagnosticKind, ImportMode, ImportOptions, Member, MemberId,
    MemberPatch,
};
use tracing::{debug, info, info_span, warn};

use crate::error::{ImportError, StoreError};
use crate::resolver::{BoundRow, FuzzyMatch, RelationshipResolver};
use crate::store::{MemberFilter, MemberOrder, MemberStore};

/// A row the store refused to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    /// Spreadsheet line number.
    pub row: usize,
    pub name: String,
    pub error: String,
}

/// Outcome of one import batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub mode: ImportMode,
    pub source_id: String,
    /// Data rows in the sheet, including rejected ones.
    pub total_rows: usize,
    pub inserted: usize,
    /// Rows bound to an existing member by a merge import.
    pub existing: usize,
    /// Rows rejected by validation before the import started.
    pub rejected: usize,
    pub failed: Vec<FailedRow>,
    /// Members that received a spouse (two per linked couple).
    pub spouse_linked: usize,
    pub parent_linked: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub fuzzy_matches: Vec<FuzzyMatch>,
}

impl ImportReport {
    fn new(options: &ImportOptions, parsed: &ParsedRows) -> Self {
        Self {
            mode: options.mode,
            source_id: options.source_id.clone(),
            total_rows: parsed.total(),
            inserted: 0,
            existing: 0,
            rejected: parsed.rejected,
            failed: Vec::new(),
            spouse_linked: 0,
            parent_linked: 0,
            diagnostics: parsed.diagnostics.clone(),
            fuzzy_matches: Vec::new(),
        }
    }

    /// Rows that made it into the store, inserted or bound.
    pub fn processed(&self) -> usize {
        self.inserted + self.existing
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn diagnostic_counts(&self) -> DiagnosticCounts {
        DiagnosticCounts::from_diagnostics(&self.diagnostics)
    }

    fn record_failure(&mut self, row: usize, name: &str, error: &StoreError) {
        warn!(row, error = %error, "store rejected import row");
        self.diagnostics.push(
            Diagnostic::error(
                DiagnosticKind::PersistenceFailure,
                format!("{name:?} could not be saved: {error}"),
            )
            .at_row(row),
        );
        if !self.failed.iter().any(|failed| failed.row == row) {
            self.failed.push(FailedRow {
                row,
                name: name.to_string(),
                error: error.to_string(),
            });
        }
    }
}

/// Reads `path` and imports it into `store`.
pub fn import_file<S: MemberStore + ?Sized>(
    store: &mut S,
    path: &Path,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let parsed = read_import_rows(path)?;
    run_import(store, parsed, options)
}

/// Imports already-parsed rows into `store`.
///
/// Replace mode clears the store first, so importing the same sheet into the
/// same store twice yields identical members, ids and links. Merge mode keeps
/// existing members and only fills links that are still unset.
pub fn run_import<S: MemberStore + ?Sized>(
    store: &mut S,
    parsed: ParsedRows,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let import_span = info_span!(
        "import",
        mode = ?options.mode,
        source_id = %options.source_id
    );
    let _import_guard = import_span.enter();
    let start = Instant::now();
    let mut report = ImportReport::new(options, &parsed);

    let (mut index, existing_ids) = info_span!("prepare").in_scope(|| prepare(store, options))?;

    let bound = info_span!("insert").in_scope(|| {
        insert_rows(store, parsed, &mut index, &existing_ids, &mut report)
    });

    let resolver = RelationshipResolver::new(&index, options);

    info_span!("link_spouses").in_scope(|| -> Result<(), ImportError> {
        let current = snapshot(store)?;
        let resolution = resolver.resolve_spouses(&bound, &current);
        report.diagnostics.extend(resolution.diagnostics);
        report.fuzzy_matches.extend(resolution.fuzzy_matches);
        for link in resolution.links {
            match store.link_spouses(&link.member_id, &link.spouse_id) {
                Ok(()) => report.spouse_linked += 2,
                Err(error) => {
                    let name = row_name(&bound, &link.member_id);
                    report.record_failure(link.row, &name, &error);
                }
            }
        }
        debug!(spouse_linked = report.spouse_linked, "spouses linked");
        Ok(())
    })?;

    info_span!("link_parents").in_scope(|| -> Result<(), ImportError> {
        let current = snapshot(store)?;
        let resolution = resolver.resolve_parents(&bound, &current);
        report.diagnostics.extend(resolution.diagnostics);
        report.fuzzy_matches.extend(resolution.fuzzy_matches);
        for link in resolution.links {
            match store.update_member(&link.member_id, MemberPatch::parent(Some(link.parent_id))) {
                Ok(_) => report.parent_linked += 1,
                Err(error) => {
                    let name = row_name(&bound, &link.member_id);
                    report.record_failure(link.row, &name, &error);
                }
            }
        }
        debug!(parent_linked = report.parent_linked, "parents linked");
        Ok(())
    })?;

    let counts = report.diagnostic_counts();
    info!(
        total_rows = report.total_rows,
        inserted = report.inserted,
        existing = report.existing,
        rejected = report.rejected,
        failed = report.failed.len(),
        spouse_linked = report.spouse_linked,
        parent_linked = report.parent_linked,
        warnings = counts.warnings,
        errors = counts.errors,
        duration_ms = start.elapsed().as_millis(),
        "import complete"
    );
    Ok(report)
}

/// Clears the store or indexes what it holds, depending on the mode.
fn prepare<S: MemberStore + ?Sized>(
    store: &mut S,
    options: &ImportOptions,
) -> Result<(MemberIndex, HashSet<MemberId>), ImportError> {
    match options.mode {
        ImportMode::Replace => {
            store.clear().map_err(ImportError::Clear)?;
            Ok((MemberIndex::with_policy(options.match_policy), HashSet::new()))
        }
        ImportMode::Merge => {
            let existing = store
                .list_members(&MemberFilter::all(), MemberOrder::Insertion)
                .map_err(ImportError::Load)?;
            let index = MemberIndex::from_members(&existing, options.match_policy);
            let ids = existing.into_iter().map(|member| member.id).collect();
            debug!(existing = index.len(), "indexed existing members");
            Ok((index, ids))
        }
    }
}

/// Creates or binds a member for every row, in row order.
fn insert_rows<S: MemberStore + ?Sized>(
    store: &mut S,
    parsed: ParsedRows,
    index: &mut MemberIndex,
    existing_ids: &HashSet<MemberId>,
    report: &mut ImportReport,
) -> Vec<BoundRow> {
    let mut bound = Vec::with_capacity(parsed.rows.len());
    for row in parsed.rows {
        let existing = if existing_ids.is_empty() {
            None
        } else {
            index
                .resolve_exact(&row.name)
                .map(|found| found.id)
                .filter(|id| existing_ids.contains(id))
        };
        if let Some(member_id) = existing {
            report.diagnostics.push(
                Diagnostic::info(
                    DiagnosticKind::ExistingMember,
                    format!("{:?} already exists; existing record kept", row.name),
                )
                .at_row(row.row_number()),
            );
            report.existing += 1;
            bound.push(BoundRow {
                row,
                member_id,
                inserted: false,
            });
            continue;
        }

        match store.create_member(row.to_new_member()) {
            Ok(member) => {
                index.insert(&member);
                report.inserted += 1;
                bound.push(BoundRow {
                    row,
                    member_id: member.id,
                    inserted: true,
                });
            }
            Err(error) => report.record_failure(row.row_number(), &row.name, &error),
        }
    }
    debug!(
        inserted = report.inserted,
        existing = report.existing,
        failed = report.failed.len(),
        "rows inserted"
    );
    bound
}

fn snapshot<S: MemberStore + ?Sized>(store: &S) -> Result<HashMap<MemberId, Member>, ImportError> {
    let members = store
        .list_members(&MemberFilter::all(), MemberOrder::Insertion)
        .map_err(ImportError::Load)?;
    Ok(members
        .into_iter()
        .map(|member| (member.id.clone(), member))
        .collect())
}

fn row_name(bound: &[BoundRow], id: &MemberId) -> String {
    bound
        .iter()
        .find(|bound| &bound.member_id == id)
        .map(|bound| bound.row.name.clone())
        .unwrap_or_default()
}
