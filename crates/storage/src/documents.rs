//! Document store over sled
//!
//! This module provides a small document database: JSON documents stored
//! in named sled trees, addressed by an opaque string primary key, with
//! predicate scans for the few queries that are not key lookups.

use serde::{de::DeserializeOwned, Serialize};
use sled::{Db, Tree};
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Document store error types
#[derive(Debug, Error)]
pub enum StorageError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document store operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Document store configuration
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Flush interval in milliseconds (None for immediate flush)
    pub flush_every_ms: Option<u64>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: "murmur.db".to_string(),
            cache_capacity: 64 * 1024 * 1024, // 64MB
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl DocumentConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Document store backed by a sled database
///
/// The store owns the database handle and hands out typed [`Collection`]
/// views over named trees. Collections are cheap to clone and share the
/// underlying handle.
pub struct DocumentStore {
    db: Arc<Db>,
}

impl DocumentStore {
    /// Open a document store with configuration
    pub fn open(config: DocumentConfig) -> Result<Self> {
        let mut db_config = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression);

        if let Some(ms) = config.flush_every_ms {
            db_config = db_config.flush_every_ms(Some(ms));
        }

        let db = db_config.open()?;
        tracing::debug!("Document store opened at {}", config.path);

        Ok(Self { db: Arc::new(db) })
    }

    /// Create an in-memory document store (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a typed collection by name, creating it if absent
    pub fn collection<T>(&self, name: &str) -> Result<Collection<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let tree = self.db.open_tree(name.as_bytes())?;

        Ok(Collection { tree, _marker: PhantomData })
    }
}

/// A typed view over one named tree of the store
///
/// Every document is serialized as JSON under its string primary key.
/// Key lookups are O(log n); `find_one`, `find_where`, and `find_all`
/// scan the whole tree.
pub struct Collection<T> {
    tree: Tree,
    _marker: PhantomData<T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self { tree: self.tree.clone(), _marker: PhantomData }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Insert a document under the given id, replacing any existing one
    pub fn insert(&self, id: &str, document: &T) -> Result<()> {
        let bytes = serde_json::to_vec(document)?;
        self.tree.insert(id.as_bytes(), bytes)?;
        Ok(())
    }

    /// Find a document by primary key
    pub fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        match self.tree.get(id.as_bytes())? {
            Some(bytes) => {
                let document: T = serde_json::from_slice(&bytes)?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Find the first document matching a predicate
    pub fn find_one(&self, predicate: impl Fn(&T) -> bool) -> Result<Option<T>> {
        for item in self.tree.iter() {
            let (_, bytes) = item?;
            let document: T = serde_json::from_slice(&bytes)?;
            if predicate(&document) {
                return Ok(Some(document));
            }
        }
        Ok(None)
    }

    /// Find all documents matching a predicate
    pub fn find_where(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        let mut documents = Vec::new();
        for item in self.tree.iter() {
            let (_, bytes) = item?;
            let document: T = serde_json::from_slice(&bytes)?;
            if predicate(&document) {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    /// Find all documents in the collection
    pub fn find_all(&self) -> Result<Vec<T>> {
        self.find_where(|_| true)
    }

    /// Apply a patch to the document under the given id
    ///
    /// Reads the document, applies the closure, and writes the result
    /// back. Returns the updated document, or `None` if the id is absent
    /// (the patch is not applied in that case). The read-modify-write is
    /// not atomic; callers are expected to serialize updates per request.
    pub fn update_by_id(&self, id: &str, patch: impl FnOnce(&mut T)) -> Result<Option<T>> {
        match self.find_by_id(id)? {
            Some(mut document) => {
                patch(&mut document);
                self.insert(id, &document)?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Delete a document by primary key, returning it if present
    pub fn delete_by_id(&self, id: &str) -> Result<Option<T>> {
        match self.tree.remove(id.as_bytes())? {
            Some(bytes) => {
                let document: T = serde_json::from_slice(&bytes)?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Check whether a document exists under the given id
    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.tree.contains_key(id.as_bytes())?)
    }

    /// Number of documents in the collection
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        id: String,
        label: String,
        count: u32,
    }

    fn doc(id: &str, label: &str, count: u32) -> Doc {
        Doc { id: id.to_string(), label: label.to_string(), count }
    }

    #[test]
    fn test_insert_and_find_by_id() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();

        docs.insert("a", &doc("a", "first", 1)).unwrap();

        let found = docs.find_by_id("a").unwrap().unwrap();
        assert_eq!(found.label, "first");
        assert!(docs.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_replaces_existing() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();

        docs.insert("a", &doc("a", "first", 1)).unwrap();
        docs.insert("a", &doc("a", "second", 2)).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs.find_by_id("a").unwrap().unwrap().label, "second");
    }

    #[test]
    fn test_find_one_matches_predicate() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();

        docs.insert("a", &doc("a", "first", 1)).unwrap();
        docs.insert("b", &doc("b", "second", 2)).unwrap();

        let found = docs.find_one(|d| d.count == 2).unwrap().unwrap();
        assert_eq!(found.id, "b");
        assert!(docs.find_one(|d| d.count == 9).unwrap().is_none());
    }

    #[test]
    fn test_find_where_and_find_all() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();

        docs.insert("a", &doc("a", "odd", 1)).unwrap();
        docs.insert("b", &doc("b", "even", 2)).unwrap();
        docs.insert("c", &doc("c", "odd", 3)).unwrap();

        let odd = docs.find_where(|d| d.count % 2 == 1).unwrap();
        assert_eq!(odd.len(), 2);
        assert_eq!(docs.find_all().unwrap().len(), 3);
    }

    #[test]
    fn test_update_by_id() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();

        docs.insert("a", &doc("a", "first", 1)).unwrap();

        let updated = docs.update_by_id("a", |d| d.count += 10).unwrap().unwrap();
        assert_eq!(updated.count, 11);
        assert_eq!(docs.find_by_id("a").unwrap().unwrap().count, 11);
    }

    #[test]
    fn test_update_by_id_missing_is_noop() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();

        let updated = docs.update_by_id("missing", |d| d.count += 1).unwrap();
        assert!(updated.is_none());
        assert!(docs.is_empty());
    }

    #[test]
    fn test_delete_by_id() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();

        docs.insert("a", &doc("a", "first", 1)).unwrap();

        let deleted = docs.delete_by_id("a").unwrap().unwrap();
        assert_eq!(deleted.label, "first");
        assert!(docs.delete_by_id("a").unwrap().is_none());
        assert!(!docs.contains("a").unwrap());
    }

    #[test]
    fn test_collections_are_isolated() {
        let store = DocumentStore::in_memory().unwrap();
        let left = store.collection::<Doc>("left").unwrap();
        let right = store.collection::<Doc>("right").unwrap();

        left.insert("a", &doc("a", "first", 1)).unwrap();

        assert!(right.find_by_id("a").unwrap().is_none());
        assert!(right.is_empty());
    }

    #[test]
    fn test_persistence_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs.db");
        let config = DocumentConfig::new(path.to_string_lossy().to_string());

        {
            let store = DocumentStore::open(config.clone()).unwrap();
            let docs = store.collection::<Doc>("docs").unwrap();
            docs.insert("a", &doc("a", "persisted", 7)).unwrap();
        }

        let store = DocumentStore::open(config).unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();
        assert_eq!(docs.find_by_id("a").unwrap().unwrap().count, 7);
    }

    #[test]
    fn test_cloned_collection_shares_tree() {
        let store = DocumentStore::in_memory().unwrap();
        let docs = store.collection::<Doc>("docs").unwrap();
        let alias = docs.clone();

        docs.insert("a", &doc("a", "shared", 1)).unwrap();

        assert_eq!(alias.find_by_id("a").unwrap().unwrap().label, "shared");
    }
}
