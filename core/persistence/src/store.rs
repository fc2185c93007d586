//! FILENAME: core/persistence/src/store.rs
//! Directory-backed attribute view store: `<root>/<av_id>.json`.

use crate::{load_attribute_view, save_attribute_view, PersistenceError, AV_FILE_EXTENSION};
use attrview::AttributeView;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Stores one JSON document per attribute view. Saves of the same ID are
/// serialized; the last writer wins.
#[derive(Debug)]
pub struct AvStore {
    root: PathBuf,
    save_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AvStore {
            root: root.into(),
            save_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, av_id: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !av_id.is_empty()
            && av_id != "."
            && av_id != ".."
            && !av_id.contains(|c| c == '/' || c == '\\');
        if !valid {
            return Err(PersistenceError::InvalidId(av_id.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", av_id, AV_FILE_EXTENSION)))
    }

    pub fn exists(&self, av_id: &str) -> bool {
        self.path_of(av_id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Loads a document with the compatibility pass applied. A repaired
    /// document is written back before returning.
    pub fn load(&self, av_id: &str) -> Result<AttributeView, PersistenceError> {
        let path = self.path_of(av_id)?;
        let (av, repaired) = load_attribute_view(&path).map_err(|e| match e {
            PersistenceError::NotFound(_) => PersistenceError::NotFound(av_id.to_string()),
            other => other,
        })?;
        if repaired {
            self.save(&av)?;
        }
        Ok(av)
    }

    pub fn save(&self, av: &AttributeView) -> Result<(), PersistenceError> {
        let path = self.path_of(&av.id)?;
        let lock = self.save_lock(&av.id);
        let result = {
            let _guard = relock(&lock);
            save_attribute_view(av, &path)
        };
        self.release_lock(&av.id, lock);
        result
    }

    fn save_lock(&self, av_id: &str) -> Arc<Mutex<()>> {
        let mut locks = relock(&self.save_locks);
        locks.entry(av_id.to_string()).or_default().clone()
    }

    /// Drops the per-ID lock once no other save holds or waits on it.
    fn release_lock(&self, av_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = relock(&self.save_locks);
        // The map and `lock` are the only owners.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(av_id);
        }
    }
}

/// Locks, recovering the guard from a poisoned mutex.
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
