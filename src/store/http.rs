//! HTTP client for the wiki — pages live at `/<title>` behind HTTP Basic auth.
//!
//! Reads are `GET /<title>?raw=true`, writes are `PUT /<title>` with a
//! form-encoded `contents` field, and `GET /?long=true` lists every page with
//! its size.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::traits::{ContentStore, Page};

static PAGE_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<ul\s+id="pages"\s*>(.*?)</ul>"#).unwrap());
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<li>(.*?)</li>").unwrap());
static ITEM_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<a[^>]*>(.*?)</a>").unwrap());
static ITEM_SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+) bytes").unwrap());

/// `ContentStore` backed by a wiki server over HTTP.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl HttpStore {
    /// Build a client for the wiki described by `config`.
    ///
    /// Fails only when the host/port do not form a usable URL; no request is
    /// made until the first read or write.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let endpoint = config.base_url();
        let base_url = Url::parse(&endpoint).map_err(|e| StoreError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() || base_url.host_str().is_none_or(str::is_empty) {
            return Err(StoreError::InvalidEndpoint {
                endpoint,
                reason: "no host".into(),
            });
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::InvalidEndpoint {
                endpoint,
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a page: each `/`-separated part of the title is percent-encoded,
    /// the slashes themselves are kept.
    ///
    /// Titles that would resolve to another path (empty, or with a `.` or `..`
    /// part) are rejected.
    pub fn page_url(&self, title: &str) -> Result<Url, StoreError> {
        validate_title(title)?;
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().extend(title.split('/'));
        }
        Ok(url)
    }

    /// Every page title mapped to its size in bytes.
    pub async fn page_sizes(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        debug!(url = %self.base_url, "GET page listing");
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("long", "true")])
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(|e| StoreError::ListingFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        debug!(%status, "page listing response");
        if !status.is_success() {
            return Err(StoreError::ListingFailed {
                reason: format!("HTTP {status}"),
            });
        }

        let html = response.text().await.map_err(|e| StoreError::ListingFailed {
            reason: e.to_string(),
        })?;
        Ok(parse_page_listing(&html))
    }

    /// Every page title, in byte order.
    pub async fn titles(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.page_sizes().await?.into_keys().collect())
    }

    /// Whether a page called `title` appears in the listing.
    pub async fn exists(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self.page_sizes().await?.contains_key(title))
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn read(&self, title: &str) -> Result<Page, StoreError> {
        let url = self.page_url(title)?;
        debug!(%url, "GET page");

        let response = self
            .client
            .get(url)
            .query(&[("raw", "true")])
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                title: title.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        debug!(title, %status, "GET page response");
        if status == StatusCode::NOT_FOUND {
            return Ok(Page::Absent);
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable {
                title: title.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| StoreError::Unavailable {
            title: title.to_string(),
            reason: e.to_string(),
        })?;
        let content = String::from_utf8(bytes.to_vec()).map_err(|_| {
            StoreError::UndecodableContent {
                title: title.to_string(),
            }
        })?;
        Ok(Page::Present(content))
    }

    async fn write(&self, title: &str, content: &str) -> Result<(), StoreError> {
        let url = self.page_url(title)?;
        debug!(%url, bytes = content.len(), "PUT page");

        let response = self
            .client
            .put(url)
            .form(&[("contents", content)])
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                title: title.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        debug!(title, %status, "PUT page response");
        if !status.is_success() {
            return Err(StoreError::WriteRejected {
                title: title.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    let reason = if title.is_empty() {
        "empty title"
    } else if title.split('/').any(|part| part == "." || part == "..") {
        "`.` and `..` are not allowed between slashes"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidTitle {
        title: title.to_string(),
        reason: reason.to_string(),
    })
}

/// Parse the `<ul id="pages">` listing into title → size.
///
/// Items without a `N bytes` note count as zero bytes.
pub fn parse_page_listing(html: &str) -> BTreeMap<String, u64> {
    let Some(list) = PAGE_LIST.captures(html).and_then(|c| c.get(1)) else {
        return BTreeMap::new();
    };

    LIST_ITEM
        .captures_iter(list.as_str())
        .filter_map(|item| {
            let inner = item.get(1)?.as_str();
            let title = ITEM_LINK.captures(inner)?.get(1)?.as_str();
            let size = ITEM_SIZE
                .captures(inner)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            Some((unescape_html(title), size))
        })
        .collect()
}

/// Undo the entity escaping the wiki applies to titles in its listing.
fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
