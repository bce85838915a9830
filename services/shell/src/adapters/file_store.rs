//! services/shell/src/adapters/file_store.rs
//!
//! A file-backed implementation of the `LocalStorage` port. The whole store is a
//! single JSON object of string values, rewritten on every change. Memory only
//! takes a change once it is on disk.

use async_trait::async_trait;
use growify_core::ports::{LocalStorage, PortError, PortResult};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; so is a file
    /// that no longer parses, which is logged and overwritten on the next write.
    pub async fn open(path: impl Into<PathBuf>) -> PortResult<Self> {
        let path = path.into();
        let items = match fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Storage file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(PortError::Storage(format!(
                    "Failed to read '{}': {}",
                    path.display(),
                    e
                )))
            }
        };

        info!(path = %path.display(), keys = items.len(), "Local storage opened");
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, items: &BTreeMap<String, String>) -> PortResult<()> {
        let raw = serde_json::to_string_pretty(items)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create directory for", &self.path, e))?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)
            .await
            .map_err(|e| storage_error("write", &tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error("replace", &self.path, e))?;

        debug!(path = %self.path.display(), keys = items.len(), "Local storage flushed");
        Ok(())
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> PortError {
    PortError::Storage(format!("Failed to {} '{}': {}", action, path.display(), e))
}

//=========================================================================================
// `LocalStorage` Trait Implementation
//=========================================================================================

#[async_trait]
impl LocalStorage for FileStore {
    async fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        let mut items = self.items.lock().await;
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next).await?;
        *items = next;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> PortResult<()> {
        let mut items = self.items.lock().await;
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.flush(&next).await?;
        *items = next;
        Ok(())
    }
}
