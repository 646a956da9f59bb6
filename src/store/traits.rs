//! `ContentStore` trait — the single interface the edit pipeline uses to reach a wiki.

use async_trait::async_trait;

use crate::error::StoreError;

/// Outcome of reading a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// The page exists with this raw content.
    Present(String),
    /// No page with that title.
    Absent,
}

impl Page {
    /// Consume the page, returning its content if it exists.
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Present(content) => Some(content),
            Self::Absent => None,
        }
    }
}

/// Backend-agnostic page store addressed by title.
///
/// Both calls are all-or-nothing; callers decide whether to retry.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for logging.
    fn name(&self) -> &str;

    /// Fetch the current raw content of `title`.
    ///
    /// A missing page is `Ok(Page::Absent)`. Transport or auth failures are
    /// `StoreError::Unavailable`.
    async fn read(&self, title: &str) -> Result<Page, StoreError>;

    /// Store `content` as the new content of `title`, creating the page if needed.
    async fn write(&self, title: &str, content: &str) -> Result<(), StoreError>;
}
