use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use silsilah_model::{Member, MemberId, MemberPatch, NewMember};
use tracing::debug;

use super::memory::DEFAULT_NAMESPACE;
use super::{MemberFilter, MemberOrder, MemberStore, MemoryStore};
use crate::error::{Result, StoreError};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized member set. Used for the store file and for backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub namespace: String,
    #[serde(default)]
    pub next_sequence: u64,
    pub members: Vec<Member>,
}

impl Snapshot {
    pub fn of(store: &MemoryStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            namespace: store.namespace().to_string(),
            next_sequence: store.next_sequence(),
            members: store.members().to_vec(),
        }
    }
}

/// Writes `bytes` to a temp file next to `path`, then renames it into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path).map_err(|source| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(bytes).map_err(|source| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source,
    })?;
    file.sync_all().map_err(|source| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let bytes =
        serde_json::to_vec_pretty(snapshot).map_err(|source| StoreError::Serialization { source })?;
    write_atomic(path, &bytes)
}

/// Reads and version-checks a snapshot file.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = fs::read(path).map_err(|source| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Deserialization {
            path: path.to_path_buf(),
            source,
        })?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: snapshot.version,
            max_supported: SNAPSHOT_VERSION,
            path: path.to_path_buf(),
        });
    }
    Ok(snapshot)
}

/// A [`MemoryStore`] saved to a JSON file after every successful write.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Opens the store at `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let snapshot = read_snapshot(&path)?;
            debug!(
                path = %path.display(),
                members = snapshot.members.len(),
                "opened member store"
            );
            let mut store =
                MemoryStore::from_parts(snapshot.namespace, snapshot.next_sequence, Vec::new());
            store.replace_all(snapshot.members)?;
            store
        } else {
            MemoryStore::new(DEFAULT_NAMESPACE)
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.inner)
    }

    /// Applies `write` to a copy of the members and keeps the copy only once it is on disk.
    fn commit<T>(&mut self, write: impl FnOnce(&mut MemoryStore) -> Result<T>) -> Result<T> {
        let mut staged = self.inner.clone();
        let value = write(&mut staged)?;
        write_snapshot(&self.path, &Snapshot::of(&staged))?;
        self.inner = staged;
        Ok(value)
    }
}

impl MemberStore for JsonStore {
    fn create_member(&mut self, fields: NewMember) -> Result<Member> {
        self.commit(|store| store.create_member(fields))
    }

    fn update_member(&mut self, id: &MemberId, patch: MemberPatch) -> Result<Member> {
        self.commit(|store| store.update_member(id, patch))
    }

    fn delete_member(&mut self, id: &MemberId) -> Result<()> {
        self.commit(|store| store.delete_member(id))
    }

    fn list_members(&self, filter: &MemberFilter, order: MemberOrder) -> Result<Vec<Member>> {
        self.inner.list_members(filter, order)
    }

    fn get_member(&self, id: &MemberId) -> Result<Option<Member>> {
        self.inner.get_member(id)
    }

    fn clear(&mut self) -> Result<()> {
        self.commit(MemoryStore::clear)
    }

    fn link_spouses(&mut self, left: &MemberId, right: &MemberId) -> Result<()> {
        self.commit(|store| store.link_spouses(left, right))
    }

    fn unlink_spouse(&mut self, id: &MemberId) -> Result<()> {
        self.commit(|store| store.unlink_spouse(id))
    }

    fn replace_all(&mut self, members: Vec<Member>) -> Result<()> {
        self.commit(|store| store.replace_all(members))
    }
}

#[cfg(test)]
mod tests {
    use silsilah_model::Gender;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("members.json");

        let (mucksin, supiyah) = {
            let mut store = JsonStore::open(&path).unwrap();
            let mucksin = store
                .create_member(NewMember::bare("Mucksin", Gender::Male, 1))
                .unwrap()
                .id;
            let supiyah = store
                .create_member(NewMember::bare("Supiyah", Gender::Female, 1))
                .unwrap()
                .id;
            store.link_spouses(&mucksin, &supiyah).unwrap();
            (mucksin, supiyah)
        };

        let mut reopened = JsonStore::open(&path).unwrap();
        let loaded = reopened.get_member(&supiyah).unwrap().unwrap();
        assert_eq!(loaded.spouse_id, Some(mucksin.clone()));

        // Id assignment continues after the stored sequence.
        let next = reopened
            .create_member(NewMember::bare("Ahmad", Gender::Male, 2))
            .unwrap()
            .id;
        assert_ne!(next, mucksin);
        assert_ne!(next, supiyah);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn newer_snapshot_versions_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("members.json");
        fs::write(
            &path,
            r#"{"version": 99, "namespace": "silsilah", "members": []}"#,
        )
        .unwrap();
        assert!(matches!(
            JsonStore::open(&path),
            Err(StoreError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn failed_writes_are_not_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("members.json");
        let mut store = JsonStore::open(&path).unwrap();
        let missing = MemberId::new("missing").unwrap();
        assert!(store.delete_member(&missing).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn unsaved_writes_leave_the_store_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("members.json");
        let mut store = JsonStore::open(&path).unwrap();
        let mucksin = store
            .create_member(NewMember::bare("Mucksin", Gender::Male, 1))
            .unwrap()
            .id;

        // A non-empty directory in place of the file makes every save fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(
            store
                .create_member(NewMember::bare("Supiyah", Gender::Female, 1))
                .is_err()
        );
        assert!(store.delete_member(&mucksin).is_err());
        let names: Vec<String> = store
            .list_members(&MemberFilter::all(), MemberOrder::Insertion)
            .unwrap()
            .into_iter()
            .map(|member| member.name)
            .collect();
        assert_eq!(names, vec!["Mucksin"]);
        assert_eq!(store.snapshot().next_sequence, 1);
    }
}
