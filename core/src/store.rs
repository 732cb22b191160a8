//! The credential store the hashes are read from and the cracked passwords written to.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    credential::{CredentialHash, CredentialId},
    error::{AixcrackError, AixcrackResult},
    hash::HashType,
};

/// Trait that credential backends implement to be used during a run.
pub trait CredentialStore {
    /// Returns true if the store can be queried.
    fn is_active(&self) -> bool;

    /// Returns all the credentials of the given type in a workspace.
    fn query(&self, workspace: &str, hash_type: HashType) -> AixcrackResult<Vec<CredentialHash>>;

    /// Returns the credential with the given id, if it exists in the workspace.
    fn query_by_id(
        &self,
        workspace: &str,
        id: CredentialId,
    ) -> AixcrackResult<Option<CredentialHash>>;

    /// Returns all the credentials of a workspace.
    fn credentials(&self, workspace: &str) -> AixcrackResult<Vec<CredentialHash>>;

    /// Records the plaintext of a credential.
    fn insert_cracked(
        &mut self,
        username: Option<&str>,
        password: &str,
        id: CredentialId,
    ) -> AixcrackResult<()>;
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct Record {
    workspace: String,
    credential: CredentialHash,
}

/// A store keeping the credentials in memory.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MemoryStore {
    records: BTreeMap<CredentialId, Record>,
    next_id: u64,
    #[serde(skip, default = "active_by_default")]
    active: bool,
}

fn active_by_default() -> bool {
    true
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
            active: true,
        }
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hash to a workspace and returns its id.
    /// A hash already present for the same user in the workspace is not added twice.
    pub fn add(
        &mut self,
        workspace: &str,
        username: Option<&str>,
        hash_type: HashType,
        hash: &str,
    ) -> CredentialId {
        if let Some(record) = self.records.values().find(|record| {
            record.workspace == workspace
                && record.credential.hash == hash
                && record.credential.username.as_deref() == username
        }) {
            return record.credential.id;
        }

        let id = CredentialId(self.next_id);
        self.next_id += 1;

        self.records.insert(
            id,
            Record {
                workspace: workspace.to_owned(),
                credential: CredentialHash {
                    id,
                    hash_type,
                    hash: hash.to_owned(),
                    username: username.map(str::to_owned),
                    password: None,
                },
            },
        );

        id
    }

    /// Marks the store as reachable or not.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns the number of credentials stored, all workspaces included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn workspace<'a>(&'a self, workspace: &'a str) -> impl Iterator<Item = &'a CredentialHash> {
        self.records
            .values()
            .filter(move |record| record.workspace == workspace)
            .map(|record| &record.credential)
    }
}

impl CredentialStore for MemoryStore {
    fn is_active(&self) -> bool {
        self.active
    }

    fn query(&self, workspace: &str, hash_type: HashType) -> AixcrackResult<Vec<CredentialHash>> {
        Ok(self
            .workspace(workspace)
            .filter(|credential| credential.hash_type == hash_type)
            .cloned()
            .collect())
    }

    fn query_by_id(
        &self,
        workspace: &str,
        id: CredentialId,
    ) -> AixcrackResult<Option<CredentialHash>> {
        Ok(self
            .records
            .get(&id)
            .filter(|record| record.workspace == workspace)
            .map(|record| record.credential.clone()))
    }

    fn credentials(&self, workspace: &str) -> AixcrackResult<Vec<CredentialHash>> {
        Ok(self.workspace(workspace).cloned().collect())
    }

    fn insert_cracked(
        &mut self,
        username: Option<&str>,
        password: &str,
        id: CredentialId,
    ) -> AixcrackResult<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(AixcrackError::UnknownCredential(id))?;

        record.credential.password = Some(password.to_owned());
        if record.credential.username.is_none() {
            record.credential.username = username.map(str::to_owned);
        }

        Ok(())
    }
}

/// A store persisted on the disk. Every cracked password is written back immediately.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Opens the store at the given path, or starts an empty one if the file doesn't exist yet.
    pub fn open(path: &Path) -> AixcrackResult<Self> {
        let inner = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            bincode::deserialize_from(reader).map_err(|_| AixcrackError::Check)?
        } else {
            MemoryStore::new()
        };

        debug!(path = %path.display(), credentials = inner.len(), "opened credential store");

        Ok(Self {
            path: path.to_owned(),
            inner,
        })
    }

    /// Adds a hash to the store. Call `FileStore::save` to persist it.
    pub fn add(
        &mut self,
        workspace: &str,
        username: Option<&str>,
        hash_type: HashType,
        hash: &str,
    ) -> CredentialId {
        self.inner.add(workspace, username, hash_type, hash)
    }

    /// Writes the store to the disk.
    pub fn save(&self) -> AixcrackResult<()> {
        let file = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &self.inner).map_err(|_| AixcrackError::Serialize)?;
        writer.flush()?;

        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    fn query(&self, workspace: &str, hash_type: HashType) -> AixcrackResult<Vec<CredentialHash>> {
        self.inner.query(workspace, hash_type)
    }

    fn query_by_id(
        &self,
        workspace: &str,
        id: CredentialId,
    ) -> AixcrackResult<Option<CredentialHash>> {
        self.inner.query_by_id(workspace, id)
    }

    fn credentials(&self, workspace: &str) -> AixcrackResult<Vec<CredentialHash>> {
        self.inner.credentials(workspace)
    }

    fn insert_cracked(
        &mut self,
        username: Option<&str>,
        password: &str,
        id: CredentialId,
    ) -> AixcrackResult<()> {
        self.inner.insert_cracked(username, password, id)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{CredentialStore, FileStore, MemoryStore};
    use crate::{credential::CredentialId, error::AixcrackError, hash::HashType};

    #[test]
    fn test_query_filters_workspace_and_type() {
        let mut store = MemoryStore::new();
        let root = store.add("default", Some("root"), HashType::Descrypt, "7Qd7Jv/hrHcd.");
        store.add("other", Some("root"), HashType::Descrypt, "abJnggxhB/yWI");
        store.add("default", Some("admin"), HashType::Ssha256, "{ssha256}06$a$b");

        let found = store.query("default", HashType::Descrypt).unwrap();
        assert_eq!(1, found.len());
        assert_eq!(root, found[0].id);

        assert!(store.query_by_id("other", root).unwrap().is_none());
        assert_eq!(2, store.credentials("default").unwrap().len());
    }

    #[test]
    fn test_add_is_deduplicated() {
        let mut store = MemoryStore::new();
        let first = store.add("default", Some("root"), HashType::Descrypt, "7Qd7Jv/hrHcd.");
        let second = store.add("default", Some("root"), HashType::Descrypt, "7Qd7Jv/hrHcd.");

        assert_eq!(first, second);
        assert_eq!(1, store.len());
    }

    #[test]
    fn test_insert_cracked() {
        let mut store = MemoryStore::new();
        let id = store.add("default", None, HashType::Descrypt, "7Qd7Jv/hrHcd.");

        store.insert_cracked(Some("root"), "abc123", id).unwrap();

        let credential = store.query_by_id("default", id).unwrap().unwrap();
        assert_eq!(Some("abc123"), credential.password.as_deref());
        assert_eq!(Some("root"), credential.username.as_deref());
        assert!(credential.is_cracked());
    }

    #[test]
    fn test_insert_cracked_unknown_id() {
        let mut store = MemoryStore::new();

        assert!(matches!(
            store.insert_cracked(None, "abc123", CredentialId(9)),
            Err(AixcrackError::UnknownCredential(CredentialId(9)))
        ));
    }

    #[test]
    fn test_file_store_persists_commits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("creds.db");

        let mut store = FileStore::open(&path).unwrap();
        let id = store.add("default", Some("root"), HashType::Descrypt, "7Qd7Jv/hrHcd.");
        store.save().unwrap();
        store.insert_cracked(Some("root"), "abc123", id).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let credential = reopened.query_by_id("default", id).unwrap().unwrap();
        assert_eq!(Some("abc123"), credential.password.as_deref());
        assert!(reopened.is_active());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("creds.db");
        std::fs::write(&path, b"\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();

        assert!(matches!(FileStore::open(&path), Err(AixcrackError::Check)));
    }
}
