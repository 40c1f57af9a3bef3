//! File-backed stores.
//!
//! Each store keeps one JSON object on disk. Writes go to a sibling temp
//! file that is renamed over the original, so readers see either the old
//! or the new contents and never a partial write.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::{CredentialKey, CredentialStore, PreferenceStore, StorageError};

const CREDENTIALS_FILE: &str = "credentials.json";
const PREFERENCES_FILE: &str = "preferences.json";

/// A JSON object persisted to a single file.
#[derive(Debug)]
struct JsonFile {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        self.read_unlocked()
    }

    fn read_unlocked(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, serde_json::Value>),
    {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_unlocked()?;
        mutate(&mut map);
        write_atomically(&self.path, &serde_json::to_vec_pretty(&map)?)
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    {
        let mut file = open_private(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    debug!(path = %path.display(), "Stored file replaced");
    Ok(())
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Credential store persisted as `credentials.json` in a data directory.
///
/// The file is created with owner-only permissions on Unix. Contents are
/// not encrypted.
#[derive(Debug)]
pub struct FileCredentialStore {
    file: JsonFile,
}

impl FileCredentialStore {
    /// Store rooted in `dir`. Nothing is touched on disk until the first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            file: JsonFile::new(dir.as_ref().join(CREDENTIALS_FILE)),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<SecretString>, StorageError> {
        let map = self.file.read()?;
        Ok(map
            .get(key.as_str())
            .and_then(serde_json::Value::as_str)
            .map(SecretString::from))
    }

    fn set(&self, key: CredentialKey, value: SecretString) -> Result<(), StorageError> {
        self.file.update(|map| {
            map.insert(
                key.as_str().to_owned(),
                serde_json::Value::from(value.expose_secret()),
            );
        })
    }

    fn delete(&self, key: CredentialKey) -> Result<(), StorageError> {
        self.file.update(|map| {
            map.remove(key.as_str());
        })
    }
}

/// Preference store persisted as `preferences.json` in a data directory.
#[derive(Debug)]
pub struct FilePreferenceStore {
    file: JsonFile,
}

impl FilePreferenceStore {
    /// Store rooted in `dir`. Nothing is touched on disk until the first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            file: JsonFile::new(dir.as_ref().join(PREFERENCES_FILE)),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.file.read()?.remove(key))
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.file.update(|map| {
            if value.is_null() {
                map.remove(key);
            } else {
                map.insert(key.to_owned(), value);
            }
        })
    }
}
