//! Persistence backends for the settings document.
//!
//! The store never touches storage directly; the embedding host supplies a
//! [`SettingsBackend`] that loads and saves the whole JSON document.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// Host-provided key-value persistence for the settings document.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Read the stored document. `Ok(None)` means nothing has been saved yet.
    async fn load_data(&self) -> Result<Option<Value>, PersistenceError>;

    /// Replace the stored document.
    async fn save_data(&self, data: &Value) -> Result<(), PersistenceError>;
}

/// A JSON document on disk.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A sibling of the settings file with `suffix` appended to its name.
    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "settings".into());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Move an unparseable settings file to `<name>.bak` so the next save
    /// does not destroy it.
    async fn set_aside(&self) -> Result<PathBuf, PersistenceError> {
        let backup = self.sibling_path(".bak");
        fs::rename(&self.path, &backup)
            .await
            .map_err(|source| PersistenceError::Backup {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(backup)
    }
}

#[async_trait]
impl SettingsBackend for JsonFileBackend {
    async fn load_data(&self) -> Result<Option<Value>, PersistenceError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let backup = self.set_aside().await?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "Settings file is not valid JSON; moved it aside and starting empty"
                );
                Ok(None)
            }
        }
    }

    async fn save_data(&self, data: &Value) -> Result<(), PersistenceError> {
        let body = serde_json::to_string_pretty(data)?;
        let write_err = |source: std::io::Error| PersistenceError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        // The rename is atomic; readers never see a half-written document.
        let tmp = self.sibling_path(".tmp");
        fs::write(&tmp, body).await.map_err(write_err)?;
        fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// In-process backend for embedding hosts that own persistence themselves,
/// and for tests.
#[derive(Default)]
pub struct MemoryBackend {
    data: RwLock<Option<Value>>,
    saves: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-persisted document.
    pub fn with_data(data: Value) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The most recently saved document.
    pub async fn snapshot(&self) -> Option<Value> {
        self.data.read().await.clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn load_data(&self) -> Result<Option<Value>, PersistenceError> {
        Ok(self.data.read().await.clone())
    }

    async fn save_data(&self, data: &Value) -> Result<(), PersistenceError> {
        *self.data.write().await = Some(data.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
