//! Cache of fetched schema documents.
//!
//! This module provides the [`DocumentCache`] mapping absolute URIs to
//! parsed schema documents. It is the only mutable state that outlives a
//! single validation call.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// A thread-safe URI → document mapping, populated lazily.
///
/// Entries live for the lifetime of the resolver instance; there is no
/// eviction. `get` is a pure lookup and `put` is last-writer-wins.
/// Within a single validation call the same URI always yields the same
/// `Arc`, which keeps reference-identity-based checks stable.
///
/// # Thread Safety
///
/// The cache uses `Arc<RwLock<...>>`: concurrent validations on a shared
/// resolver read without blocking each other, and fetch insertions are
/// serialized.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: Arc<RwLock<HashMap<String, Arc<Value>>>>,
}

impl DocumentCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a document by absolute URI.
    pub fn get(&self, uri: &str) -> Option<Arc<Value>> {
        self.documents.read().get(uri).cloned()
    }

    /// Inserts a document, returning the shared handle now stored.
    ///
    /// A later insert for the same URI wins.
    pub fn put(&self, uri: impl Into<String>, document: Value) -> Arc<Value> {
        let document = Arc::new(document);
        self.documents
            .write()
            .insert(uri.into(), Arc::clone(&document));
        document
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// True when nothing has been fetched yet.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl Clone for DocumentCache {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}
