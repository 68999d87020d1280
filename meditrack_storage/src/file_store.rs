use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use fs4::fs_std::FileExt;

use crate::{KeyValueStore, StorageError, StoreLock};

const LOCK_FILE: &str = "meditrack.lock";

/// Keeps every key in its own `<key>.json` file under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        log::info!("Opened data directory {}", dir.display());

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value).map_err(io_error(key))?;
        fs::rename(&staging, &path).map_err(io_error(key))
    }

    fn lock(&self) -> Result<StoreLock, StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))
            .map_err(io_error(LOCK_FILE))?;
        FileExt::lock_exclusive(&file).map_err(io_error(LOCK_FILE))?;

        log::debug!("Locked data directory {}", self.dir.display());
        Ok(StoreLock::file(file))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread,
        time::Duration,
    };

    use super::*;

    #[test]
    fn values_survive_reopening_the_directory() {
        let dir = tempfile::tempdir().unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        store.set("reminders", "[]").unwrap();

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("reminders").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("reminders.json").exists());
    }

    #[test]
    fn set_replaces_the_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        store.set("medicines", "[1]").unwrap();
        store.set("medicines", "[1,2]").unwrap();

        assert_eq!(store.get("medicines").unwrap().as_deref(), Some("[1,2]"));
        assert!(!dir.path().join("medicines.json.tmp").exists());
    }

    #[test]
    fn missing_keys_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("familyMembers").unwrap(), None);
    }

    #[test]
    fn lock_excludes_other_handles_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let other = JsonFileStore::open(dir.path()).unwrap();
        let acquired = Arc::new(AtomicBool::new(false));

        let held = store.lock().unwrap();
        let waiter = {
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                let _lock = other.lock().unwrap();
                acquired.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(!acquired.load(Ordering::SeqCst));

        drop(held);
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
        assert!(dir.path().join(LOCK_FILE).exists());
    }

    #[test]
    fn keys_cannot_escape_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let error = store.set("../outside", "{}").unwrap_err();

        assert!(matches!(error, StorageError::InvalidKey(_)));
    }
}
