//! Full member-set backups as JSON snapshots.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::store::{
    DEFAULT_NAMESPACE, MemberFilter, MemberOrder, MemberStore, SNAPSHOT_VERSION, Snapshot,
    read_snapshot, write_snapshot,
};

/// Snapshot of every member in creation order.
pub fn backup_snapshot<S: MemberStore + ?Sized>(store: &S) -> Result<Snapshot> {
    let members = store.list_members(&MemberFilter::all(), MemberOrder::Insertion)?;
    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        namespace: DEFAULT_NAMESPACE.to_string(),
        next_sequence: 0,
        members,
    })
}

/// Writes a backup of `store` to `path`. Returns the number of members saved.
pub fn write_backup<S: MemberStore + ?Sized>(store: &S, path: &Path) -> Result<usize> {
    let snapshot = backup_snapshot(store)?;
    write_snapshot(path, &snapshot)?;
    info!(members = snapshot.members.len(), "backup written");
    Ok(snapshot.members.len())
}

/// Replaces the store's members with the backup at `path`.
///
/// Nothing is changed if the file is unreadable, from a newer version, or
/// holds duplicate ids.
pub fn restore_backup<S: MemberStore + ?Sized>(store: &mut S, path: &Path) -> Result<usize> {
    let snapshot = read_snapshot(path)?;
    let count = snapshot.members.len();
    store.replace_all(snapshot.members)?;
    info!(members = count, "backup restored");
    Ok(count)
}
