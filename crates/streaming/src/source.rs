//! Topology document sources and the fetch → validate → convert step.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use formats::{FeatureCollection, Topology};
use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;
use crate::land::LoadTicket;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can fetch the raw bytes of a topology document.
///
/// Implementations must be `Send + Sync` for use across async tasks.
pub trait TopologySource: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, LoadError>>;
}

/// Fetches documents over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpTopologySource {
    client: reqwest::Client,
}

impl HttpTopologySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl TopologySource for HttpTopologySource {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, LoadError>> {
        let url = url.to_string();
        Box::pin(async move {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| LoadError::network(format!("request to {url} failed: {e}")))?;

            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(LoadError::not_found(format!("{url} returned 404")));
            }
            if !resp.status().is_success() {
                return Err(LoadError::network(format!(
                    "{url} returned HTTP {}",
                    resp.status()
                )));
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| LoadError::network(format!("reading {url} failed: {e}")))?;
            Ok(bytes.to_vec())
        })
    }
}

/// Reads documents from the filesystem; the URL is a path, optionally
/// prefixed with `file://`, resolved against `root` when relative.
#[derive(Debug, Clone, Default)]
pub struct FileTopologySource {
    root: PathBuf,
}

impl FileTopologySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        self.root.join(url.strip_prefix("file://").unwrap_or(url))
    }
}

impl TopologySource for FileTopologySource {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, LoadError>> {
        let path = self.resolve(url);
        Box::pin(async move {
            tokio::fs::read(&path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LoadError::not_found(format!("{} does not exist", path.display()))
                } else {
                    LoadError::network(format!("reading {} failed: {e}", path.display()))
                }
            })
        })
    }
}

/// Serves fixed documents from memory. Unknown URLs are not found.
#[derive(Debug, Clone, Default)]
pub struct MemoryTopologySource {
    documents: HashMap<String, Vec<u8>>,
}

impl MemoryTopologySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.into(), bytes.into());
        self
    }
}

impl TopologySource for MemoryTopologySource {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, LoadError>> {
        let found = self
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::not_found(format!("{url} not found")));
        Box::pin(async move { found })
    }
}

/// Fetches the ticket's document and extracts its named collection.
pub async fn fetch_land<S: TopologySource + ?Sized>(
    source: &S,
    ticket: &LoadTicket,
) -> Result<FeatureCollection, LoadError> {
    let bytes = source.fetch(ticket.source.url()).await?;
    debug!(url = ticket.source.url(), bytes = bytes.len(), "land document fetched");
    decode_land(&bytes, ticket.source.collection())
}

/// Validates a fetched document and converts `collection` into features.
pub fn decode_land(bytes: &[u8], collection: &str) -> Result<FeatureCollection, LoadError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| LoadError::malformed(format!("invalid JSON: {e}")))?;

    if let Some(remote) = value.get("error") {
        let message = remote
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| remote.to_string());
        return Err(LoadError::malformed(format!("document reports an error: {message}")));
    }

    let topology = Topology::from_value(value).map_err(|e| LoadError::malformed(e.to_string()))?;
    if !topology.has_object(collection) {
        return Err(LoadError::not_found(format!(
            "collection '{collection}' not in document"
        )));
    }
    topology
        .feature_collection(collection)
        .map_err(|e| LoadError::malformed(e.to_string()))
}
