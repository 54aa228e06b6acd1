//! Credential persistence and attachment.
//!
//! # Design
//! The store is an external collaborator: `ApiService` only calls
//! `read`/`write`/`remove` on it and keeps its own copy of the active token.
//! `MemoryStore` lives as long as the process, like a cookie jar.
//! `FileStore` keeps a small JSON object on disk, like browser local storage.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Cookie name the backend issues its session token under.
pub const DEFAULT_COOKIE_NAME: &str = "jwt";

/// How the credential travels on outbound requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CredentialMode {
    /// `Authorization: Bearer <token>`.
    #[default]
    Bearer,
    /// `Cookie: <name>=<token>`.
    Cookie { name: String },
}

impl CredentialMode {
    pub fn cookie() -> Self {
        CredentialMode::Cookie {
            name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }

    /// The header carrying `token` in this mode.
    pub fn header(&self, token: &str) -> (String, String) {
        match self {
            CredentialMode::Bearer => ("authorization".to_string(), format!("Bearer {token}")),
            CredentialMode::Cookie { name } => ("cookie".to_string(), format!("{name}={token}")),
        }
    }
}

/// Key/value storage the credential is persisted in.
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Process-scoped store. Never fails.
#[derive(Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

// Values are credentials; only the keys are printed.
impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object in a single file.
///
/// A missing file reads as empty. Every write rewrites the whole file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
