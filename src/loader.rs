//! Fetching raw definition documents.
//!
//! The editor state never talks to the network itself; it is handed a
//! [`DocumentLoader`] at construction. [`HttpDocumentLoader`] is the production
//! implementation, [`MemoryLoader`] serves documents from memory.

use crate::config::LoaderConfig;
use crate::error::{ConfigError, LoadError, LoadFailure};
use ahash::AHashMap;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Fetches a JSON document by URL.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, LoadError>;
}

/// Loads `http://`, `https://` and `file://` documents.
#[derive(Debug, Clone)]
pub struct HttpDocumentLoader {
    client: reqwest::Client,
}

impl HttpDocumentLoader {
    pub fn new(config: &LoaderConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: Url) -> Result<Vec<u8>, LoadFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadFailure::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadFailure::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| LoadFailure::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }

    async fn fetch_file(url: &Url) -> Result<Vec<u8>, LoadFailure> {
        let path = url
            .to_file_path()
            .map_err(|()| LoadFailure::InvalidUrl("not a local file path".to_string()))?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| LoadFailure::Io(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl DocumentLoader for HttpDocumentLoader {
    async fn fetch(&self, url: &str) -> Result<Value, LoadError> {
        let parsed =
            Url::parse(url).map_err(|e| LoadError::new(url, LoadFailure::InvalidUrl(e.to_string())))?;
        log::debug!("Fetching document from '{}'", url);
        let bytes = match parsed.scheme() {
            "http" | "https" => self.fetch_http(parsed).await,
            "file" => Self::fetch_file(&parsed).await,
            other => Err(LoadFailure::UnsupportedScheme(other.to_string())),
        }
        .map_err(|cause| LoadError::new(url, cause))?;
        log::debug!("Fetched {} bytes from '{}'", bytes.len(), url);
        parse_json(url, &bytes)
    }
}

fn parse_json(url: &str, bytes: &[u8]) -> Result<Value, LoadError> {
    serde_json::from_slice(bytes).map_err(|e| LoadError::new(url, LoadFailure::Parse(e.to_string())))
}

/// Serves registered documents from memory, keyed by URL.
///
/// Clones share the same documents, so a test can keep a handle and swap
/// documents while an editor state holds another.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: Arc<Mutex<AHashMap<String, Value>>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, url: &str, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    /// Registers or replaces the document served for `url`.
    pub fn insert(&self, url: &str, document: Value) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), document);
    }

    pub fn remove(&self, url: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
    }

    /// Number of `fetch` calls served so far, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentLoader for MemoryLoader {
    async fn fetch(&self, url: &str) -> Result<Value, LoadError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .ok_or_else(|| {
                LoadError::new(
                    url,
                    LoadFailure::Transport("no document registered for this URL".to_string()),
                )
            })
    }
}
