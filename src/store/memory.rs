//! In-memory `ContentStore` with per-title failure injection.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::traits::{ContentStore, Page};

/// A wiki held in memory.
///
/// Titles registered with [`MemoryStore::fail_reads_for`] or
/// [`MemoryStore::fail_writes_for`] return errors instead of touching the map,
/// which lets callers exercise failure paths without a network.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<BTreeMap<String, String>>,
    failing_reads: RwLock<HashSet<String>>,
    failing_writes: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `(title, content)` pairs.
    pub fn with_pages<I, T, C>(pages: I) -> Self
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: Into<String>,
    {
        let pages = pages
            .into_iter()
            .map(|(t, c)| (t.into(), c.into()))
            .collect();
        Self {
            pages: RwLock::new(pages),
            ..Self::default()
        }
    }

    /// Make every read of `title` fail with `StoreError::Unavailable`.
    pub async fn fail_reads_for(&self, title: &str) {
        self.failing_reads.write().await.insert(title.to_string());
    }

    /// Make every write to `title` fail with `StoreError::WriteRejected`.
    pub async fn fail_writes_for(&self, title: &str) {
        self.failing_writes.write().await.insert(title.to_string());
    }

    /// Current content of `title`, bypassing failure injection.
    pub async fn get(&self, title: &str) -> Option<String> {
        self.pages.read().await.get(title).cloned()
    }

    /// All titles in byte order.
    pub async fn titles(&self) -> Vec<String> {
        self.pages.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read(&self, title: &str) -> Result<Page, StoreError> {
        if self.failing_reads.read().await.contains(title) {
            return Err(StoreError::Unavailable {
                title: title.to_string(),
                reason: "injected read failure".into(),
            });
        }
        Ok(match self.pages.read().await.get(title) {
            Some(content) => Page::Present(content.clone()),
            None => Page::Absent,
        })
    }

    async fn write(&self, title: &str, content: &str) -> Result<(), StoreError> {
        if self.failing_writes.read().await.contains(title) {
            return Err(StoreError::WriteRejected {
                title: title.to_string(),
                reason: "injected write failure".into(),
            });
        }
        self.pages
            .write()
            .await
            .insert(title.to_string(), content.to_string());
        Ok(())
    }
}
