//! On-disk snapshot store: one JSON file per key.

use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::{PersistError, Snapshot, SnapshotStore, StoreKey};

/// A snapshot store that keeps one JSON file per key under a root
/// directory, laid out as `{root}/{scope}/{name}.json`.
///
/// The layout makes scope deletion a directory removal, so
/// [`SnapshotStore::delete_scope`] is atomic per scope as far as the
/// filesystem allows.
///
/// A file that exists but cannot be parsed is treated as absent on read:
/// corruption is a cache miss, never an error surfaced upward.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`.
    ///
    /// The root must exist, be a directory, and be writable.
    pub fn new(root: PathBuf) -> Result<Self, PersistError> {
        let attr = fs::metadata(&root).map_err(|error| PersistError::RootPathInvalid {
            path: root.clone(),
            source: error,
        })?;

        if !attr.is_dir() {
            return Err(PersistError::RootPathInvalid {
                path: root,
                source: io::Error::other("root path must be a directory"),
            });
        }

        if attr.permissions().readonly() {
            return Err(PersistError::RootPathInvalid {
                path: root,
                source: io::Error::other("root directory must be writable"),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(FileStore { root }),
            Err(error) => Err(PersistError::RootPathInvalid { path: root, source: error }),
        }
    }

    /// The canonicalized root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope_dir(&self, scope: &str) -> PathBuf {
        self.root.join(scope)
    }

    fn file_path(&self, key: &StoreKey) -> PathBuf {
        self.scope_dir(key.scope()).join(format!("{}.json", key.name()))
    }
}

impl SnapshotStore for FileStore {
    fn load(&mut self, key: &StoreKey) -> Result<Option<Snapshot>, PersistError> {
        let file_path = self.file_path(key);
        log::debug!("Reading {}...", file_path.display());

        let text = match fs::read_to_string(&file_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistError::Io(e)),
        };

        match serde_json::from_str::<Snapshot>(&text) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                log::debug!(
                    "Discarding unreadable snapshot {} ({})",
                    file_path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&mut self, key: &StoreKey, snapshot: &Snapshot) -> Result<(), PersistError> {
        let file_path = self.file_path(key);
        log::debug!("Writing {}...", file_path.display());

        fs::create_dir_all(self.scope_dir(key.scope()))?;
        let bytes =
            serde_json::to_vec_pretty(snapshot).map_err(|e| PersistError::Encode(e.to_string()))?;
        fs::write(&file_path, bytes)?;
        Ok(())
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), PersistError> {
        match fs::remove_file(self.file_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::Io(e)),
        }
    }

    fn delete_scope(&mut self, scope: &str) -> Result<(), PersistError> {
        match fs::remove_dir_all(self.scope_dir(scope)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::Io(e)),
        }
    }

    fn keys(&mut self) -> Result<Vec<StoreKey>, PersistError> {
        let mut keys = Vec::new();
        for scope_entry in fs::read_dir(&self.root)? {
            let scope_entry = scope_entry?;
            if !scope_entry.file_type()?.is_dir() {
                continue;
            }
            let scope = scope_entry.file_name();
            let Some(scope) = scope.to_str() else {
                continue;
            };
            for file_entry in fs::read_dir(scope_entry.path())? {
                let file_entry = file_entry?;
                let path = file_entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                // Files that do not form a valid key are foreign; skip them.
                if let Ok(key) = StoreKey::new(scope, name) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
