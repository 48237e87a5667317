//! Remote quote sources. The sync engine only relies on "returns a list of
//! title-bearing items"; everything else about the payload is best effort.

use crate::error::SyncError;
use crate::quote::{Quote, coerce_field};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Category given to remote items that carry none.
pub const REMOTE_CATEGORY: &str = "Server";

/// Raw item as returned by a remote source. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemoteItem {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
}

impl RemoteItem {
    /// Map into the local quote shape. `text` wins over `title`; items with
    /// no usable text are dropped.
    pub fn to_quote(&self) -> Option<Quote> {
        let mut text = coerce_field(self.text.as_ref());
        if text.is_empty() {
            text = coerce_field(self.title.as_ref());
        }
        let mut category = coerce_field(self.category.as_ref());
        if category.is_empty() {
            category = REMOTE_CATEGORY.to_string();
        }
        Quote::new(&text, &coerce_field(self.author.as_ref()), &category)
    }
}

/// Acknowledgement for a pushed quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostAck {
    pub id: Option<String>,
}

#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch up to `limit` recent items.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RemoteItem>, SyncError>;

    async fn post_new(&self, _quote: &Quote) -> Result<PostAck, SyncError> {
        Err(SyncError::Unsupported("posting new quotes"))
    }

    fn describe(&self) -> String;
}

/// JSON-over-HTTP source: GET returns an array of objects, POST echoes the
/// created object with an id.
pub struct HttpSource {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct PostRequest<'a> {
    title: &'a str,
    author: &'a str,
    category: &'a str,
}

#[derive(Deserialize)]
struct PostResponse {
    #[serde(default)]
    id: Option<Value>,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        Self { client: Client::new(), url: url.to_string() }
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RemoteItem>, SyncError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("_limit", limit)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::Remote(format!(
                "GET {} returned {}",
                self.url,
                response.status()
            )));
        }
        let mut items: Vec<RemoteItem> = response.json().await?;
        items.truncate(limit);
        debug!("event=remote_fetch source=http count={}", items.len());
        Ok(items)
    }

    async fn post_new(&self, quote: &Quote) -> Result<PostAck, SyncError> {
        let request = PostRequest {
            title: &quote.text,
            author: &quote.author,
            category: &quote.category,
        };
        let response = self.client.post(&self.url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Remote(format!(
                "POST {} returned {}",
                self.url,
                response.status()
            )));
        }
        let created: PostResponse = response.json().await?;
        Ok(PostAck { id: created.id.map(|v| coerce_field(Some(&v))) })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a JSON array from a local file. Useful offline and in tests.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RemoteSource for FileSource {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RemoteItem>, SyncError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::Remote(format!("{}: {e}", self.path.display()))
        })?;
        let mut items: Vec<RemoteItem> = serde_json::from_str(&raw)?;
        items.truncate(limit);
        debug!("event=remote_fetch source=file count={}", items.len());
        Ok(items)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// `http(s)://` selects the HTTP source; `file://` or a bare path selects a
/// file source.
pub fn source_for(location: &str) -> Box<dyn RemoteSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        let path = location.strip_prefix("file://").unwrap_or(location);
        Box::new(FileSource::new(path))
    }
}
