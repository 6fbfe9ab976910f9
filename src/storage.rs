//! Storage module for per-user progress records.
//!
//! All users live in a single JSON document under a fixed namespace key,
//! alongside a reserved key that remembers the last active user. Writes are
//! best-effort: a failed write is logged and the in-memory state stays
//! authoritative until the next successful write.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::UserRecord;

/// Key of the document holding every user record.
pub const NAMESPACE: &str = "vocabTrainer_users_v2";

/// Reserved document key holding the last active user name.
pub const LAST_USER_KEY: &str = "_lastUser";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user name must not be empty")]
    EmptyName,
    #[error("'{0}' is reserved and cannot be used as a user name")]
    ReservedName(String),
    #[error("no record for user '{0}'")]
    UnknownUser(String),
    #[error("failed to access store key '{key}'")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode store document")]
    Encode(#[from] serde_json::Error),
}

/// A local key-value store holding whole documents as strings.
pub trait StoreBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StoreBackend for FileBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some)
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.key_path(key), value)
    }
}

/// In-process backend. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Handles user record persistence.
pub struct UserStore {
    backend: Box<dyn StoreBackend>,
    users: BTreeMap<String, UserRecord>,
    last_user: Option<String>,
}

impl UserStore {
    /// Open the store, treating an absent or unreadable document as empty.
    pub fn open(backend: impl StoreBackend + 'static) -> Self {
        let mut store = Self {
            backend: Box::new(backend),
            users: BTreeMap::new(),
            last_user: None,
        };

        match store.backend.read(NAMESPACE) {
            Ok(Some(json)) => store.load_document(&json),
            Ok(None) => debug!("no user store yet, starting empty"),
            Err(e) => warn!(error = %e, "failed to read user store, starting empty"),
        }

        store
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab-trainer")
    }

    fn load_document(&mut self, json: &str) {
        let document = match serde_json::from_str::<Map<String, Value>>(json) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "user store is corrupted, starting empty");
                return;
            }
        };

        for (key, value) in document {
            if key == LAST_USER_KEY {
                self.last_user = value
                    .as_str()
                    .and_then(|name| Self::validate_name(name).ok())
                    .map(str::to_string);
                continue;
            }
            match serde_json::from_value::<UserRecord>(value) {
                Ok(record) => {
                    self.users.insert(key, record);
                }
                Err(e) => warn!(user = %key, error = %e, "skipping unreadable user record"),
            }
        }

        info!(users = self.users.len(), "loaded user store");
    }

    fn encode(&self) -> Result<String, StoreError> {
        let mut document = Map::new();
        for (name, record) in &self.users {
            document.insert(name.clone(), serde_json::to_value(record)?);
        }
        if let Some(ref last) = self.last_user {
            document.insert(LAST_USER_KEY.to_string(), Value::String(last.clone()));
        }
        Ok(serde_json::to_string(&document)?)
    }

    fn try_persist(&mut self) -> Result<(), StoreError> {
        let json = self.encode()?;
        self.backend
            .write(NAMESPACE, &json)
            .map_err(|source| StoreError::Io {
                key: NAMESPACE.to_string(),
                source,
            })
    }

    /// Write the whole document; failures are logged and ignored.
    fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            warn!(error = %e, "failed to save user store, keeping changes in memory");
        }
    }

    /// Trim a user name and reject names the store cannot hold.
    pub fn validate_name(name: &str) -> Result<&str, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if name == LAST_USER_KEY {
            return Err(StoreError::ReservedName(name.to_string()));
        }
        Ok(name)
    }

    /// Create a zeroed record for `name` unless one exists. Returns the trimmed name.
    pub fn ensure_user(&mut self, name: &str) -> Result<String, StoreError> {
        let name = Self::validate_name(name)?.to_string();
        if !self.users.contains_key(&name) {
            self.users.insert(name.clone(), UserRecord::default());
            info!(user = %name, "created user");
            self.persist();
        }
        Ok(name)
    }

    pub fn record(&self, name: &str) -> Result<&UserRecord, StoreError> {
        self.users
            .get(name)
            .ok_or_else(|| StoreError::UnknownUser(name.to_string()))
    }

    /// Mutate a user's record and persist the result.
    pub fn update<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut UserRecord) -> T,
    ) -> Result<T, StoreError> {
        let record = self
            .users
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownUser(name.to_string()))?;
        let out = f(record);
        self.persist();
        Ok(out)
    }

    pub fn set_last_active_user(&mut self, name: &str) -> Result<(), StoreError> {
        let name = Self::validate_name(name)?;
        self.last_user = Some(name.to_string());
        self.persist();
        Ok(())
    }

    pub fn last_active_user(&self) -> Option<&str> {
        self.last_user.as_deref()
    }

    pub fn clear_last_active_user(&mut self) {
        if self.last_user.take().is_some() {
            self.persist();
        }
    }

    /// Ensure the user exists and make it the last active one.
    pub fn select_user(&mut self, name: &str) -> Result<String, StoreError> {
        let name = self.ensure_user(name)?;
        self.set_last_active_user(&name)?;
        Ok(name)
    }

    /// Overwrite the user's record with zeroed defaults.
    pub fn reset_user(&mut self, name: &str) -> Result<(), StoreError> {
        let name = Self::validate_name(name)?.to_string();
        info!(user = %name, "resetting user record");
        self.users.insert(name, UserRecord::default());
        self.persist();
        Ok(())
    }

    pub fn user_names(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }
}
