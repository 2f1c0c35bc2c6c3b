//! Session-scoped key/value storage.
//!
//! Holds the in-progress wizard record and the task handle being tracked so a
//! restart can pick up where the user left off. A session ends with
//! [`SessionStore::clear`]. Writers are not coordinated; the last write wins.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;

use crate::crisis::TaskHandle;
use crate::error::SessionError;

/// Well-known session keys.
pub mod keys {
    /// Serialized wizard record.
    pub const FORM_DATA: &str = "form_data";
    /// Handle of the job currently being tracked.
    pub const TASK_ID: &str = "task_id";
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError>;

    async fn set(&self, key: &str, value: &Value) -> Result<(), SessionError>;

    async fn remove(&self, key: &str) -> Result<(), SessionError>;

    /// Drop everything stored for this session.
    async fn clear(&self) -> Result<(), SessionError>;

    async fn task_handle(&self) -> Result<Option<TaskHandle>, SessionError> {
        match self.get(keys::TASK_ID).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set_task_handle(&self, handle: &TaskHandle) -> Result<(), SessionError> {
        self.set(keys::TASK_ID, &serde_json::to_value(handle)?).await
    }
}

/// One JSON document per key under a session directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        match fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(self.path(key), bytes).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and embedders without a filesystem.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), SessionError> {
        self.entries.write().await.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn file_store_roundtrip_and_clear() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path().join("session"));

        assert_eq!(store.get(keys::FORM_DATA).await.unwrap(), None);

        store.set(keys::FORM_DATA, &json!({"city": "Miami"})).await.unwrap();
        store.set(keys::FORM_DATA, &json!({"city": "Tampa"})).await.unwrap();
        assert_eq!(
            store.get(keys::FORM_DATA).await.unwrap(),
            Some(json!({"city": "Tampa"}))
        );

        store.clear().await.unwrap();
        assert_eq!(store.get(keys::FORM_DATA).await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn file_store_remove_missing_is_ok() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());
        store.remove("nothing-here").await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("form_data.json"), b"{not json").unwrap();
        let store = FileSessionStore::new(tmp.path());
        assert!(matches!(
            store.get(keys::FORM_DATA).await,
            Err(SessionError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn keys_are_sanitized_into_the_directory() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());
        store.set("../escape", &json!(1)).await.unwrap();
        assert!(tmp.path().join("___escape.json").exists());
    }

    #[tokio::test]
    async fn task_handle_helpers() {
        let store = MemorySessionStore::new();
        assert_eq!(store.task_handle().await.unwrap(), None);

        let handle = TaskHandle::new("abc");
        store.set_task_handle(&handle).await.unwrap();
        assert_eq!(store.get(keys::TASK_ID).await.unwrap(), Some(json!("abc")));
        assert_eq!(store.task_handle().await.unwrap(), Some(handle));

        store.remove(keys::TASK_ID).await.unwrap();
        assert_eq!(store.task_handle().await.unwrap(), None);
    }
}
