//! Ordered list storage for interview session logs.
//!
//! The engine consumes a minimal contract modeled on Redis list
//! operations: prepend a value to a keyed list, read the whole list in
//! storage order (newest first). `MemoryListStore` provides an
//! in-process implementation with optional JSON file persistence for
//! tests and single-process deployments; external stores satisfy the
//! same trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CatapultError, Result};

/// Ordered list store keyed by plain strings.
///
/// Implementations must make each per-key operation atomic; no
/// transactional guarantee is required between a read and a subsequent
/// append (callers serialize per session).
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Insert `value` at the head of the list under `key`, preserving the
    /// order of existing elements.
    async fn append_front(&self, key: &str, value: &str) -> Result<()>;

    /// Return all elements under `key` in storage order (head first,
    /// newest first). A missing key yields an empty list.
    async fn read_all(&self, key: &str) -> Result<Vec<String>>;
}

/// In-memory list store with optional file-based persistence.
///
/// Lists live in an `Arc<RwLock<HashMap>>`, so clones share state and the
/// store is safe to use across async tasks. When built with a storage
/// path, every mutation rewrites the key's JSON file; keys are
/// percent-encoded into filenames so distinct keys never collide.
///
/// # Example
/// ```rust
/// use catapult::store::{ListStore, MemoryListStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryListStore::new();
/// store.append_front("sess1", "older").await.unwrap();
/// store.append_front("sess1", "newer").await.unwrap();
/// assert_eq!(store.read_all("sess1").await.unwrap(), vec!["newer", "older"]);
/// # });
/// ```
pub struct MemoryListStore {
    lists: Arc<RwLock<HashMap<String, Vec<String>>>>,
    storage_path: Option<PathBuf>,
}

impl MemoryListStore {
    /// Create a store without persistence.
    pub fn new() -> Self {
        Self {
            lists: Arc::new(RwLock::new(HashMap::new())),
            storage_path: None,
        }
    }

    /// Create a store persisting each list under `path`.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        Ok(Self {
            lists: Arc::new(RwLock::new(HashMap::new())),
            storage_path: Some(path),
        })
    }

    async fn persist(&self, key: &str, list: &[String]) -> Result<()> {
        if let Some(ref storage_path) = self.storage_path {
            let file_path = storage_path.join(format!("{}.json", Self::sanitize_key(key)));
            let content = serde_json::to_string_pretty(list)?;
            tokio::fs::write(&file_path, content).await?;
        }
        Ok(())
    }

    async fn load_from_disk(&self, key: &str) -> Result<Option<Vec<String>>> {
        if let Some(ref storage_path) = self.storage_path {
            let file_path = storage_path.join(format!("{}.json", Self::sanitize_key(key)));
            if file_path.exists() {
                let content = tokio::fs::read_to_string(&file_path).await?;
                let list: Vec<String> = serde_json::from_str(&content).map_err(|e| {
                    CatapultError::Store(format!("corrupt list file for key '{}': {}", key, e))
                })?;
                return Ok(Some(list));
            }
        }
        Ok(None)
    }

    /// Sanitize a key for use as a filename.
    ///
    /// Percent-encodes filesystem-hostile characters so the mapping is
    /// bijective and distinct keys never share a file.
    fn sanitize_key(key: &str) -> String {
        let mut result = String::with_capacity(key.len() * 3);
        for c in key.chars() {
            match c {
                '/' => result.push_str("%2F"),
                '\\' => result.push_str("%5C"),
                ':' => result.push_str("%3A"),
                '*' => result.push_str("%2A"),
                '?' => result.push_str("%3F"),
                '"' => result.push_str("%22"),
                '<' => result.push_str("%3C"),
                '>' => result.push_str("%3E"),
                '|' => result.push_str("%7C"),
                '%' => result.push_str("%25"),
                c => result.push(c),
            }
        }
        result
    }
}

impl Default for MemoryListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryListStore {
    fn clone(&self) -> Self {
        Self {
            lists: Arc::clone(&self.lists),
            storage_path: self.storage_path.clone(),
        }
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn append_front(&self, key: &str, value: &str) -> Result<()> {
        let mut lists = self.lists.write().await;
        if !lists.contains_key(key) {
            if let Some(from_disk) = self.load_from_disk(key).await? {
                lists.insert(key.to_string(), from_disk);
            }
        }
        let list = lists.entry(key.to_string()).or_default();
        list.insert(0, value.to_string());
        let snapshot = list.clone();
        drop(lists);
        self.persist(key, &snapshot).await
    }

    async fn read_all(&self, key: &str) -> Result<Vec<String>> {
        {
            let lists = self.lists.read().await;
            if let Some(list) = lists.get(key) {
                return Ok(list.clone());
            }
        }

        if let Some(from_disk) = self.load_from_disk(key).await? {
            let mut lists = self.lists.write().await;
            let list = lists.entry(key.to_string()).or_insert(from_disk);
            return Ok(list.clone());
        }

        Ok(Vec::new())
    }
}
