//! Collection API Source
//!
//! The two remote lookups the aggregator needs, behind a trait so cycles can
//! be tested without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use super::model::{ObjectId, ObjectRecord, SearchResponse};

/// Default collection API root.
pub const DEFAULT_BASE_URL: &str = "https://collectionapi.metmuseum.org/public/collection/v1";

/// Default search keywords, in merge order.
pub const DEFAULT_KEYWORDS: [&str; 3] = ["jester", "fool", "court jester"];

/// Default cap on merged ids.
pub const DEFAULT_MAX_ITEMS: usize = 15;

/// Gallery configuration.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Search keywords, in merge order.
    pub keywords: Vec<String>,
    /// Maximum ids kept after merging.
    pub max_items: usize,
    /// User-Agent header.
    pub user_agent: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_items: DEFAULT_MAX_ITEMS,
            user_agent: format!(
                "MegaRoki/{} (+https://collectionapi.metmuseum.org)",
                env!("CARGO_PKG_VERSION")
            ),
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl GalleryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ROKI_GALLERY_BASE_URL").unwrap_or(defaults.base_url),
            max_items: std::env::var("ROKI_GALLERY_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_items),
            ..defaults
        }
    }
}

/// Gallery errors.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Transport failure.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status other than a tolerated 404.
    #[error("Server responded with status {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// Body was not the expected JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured base URL does not parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Remote lookups used by a gallery cycle.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Candidate ids for `keyword`, in server order.
    async fn search(&self, keyword: &str) -> Result<Vec<ObjectId>, GalleryError>;

    /// Full record for `id`; `Ok(None)` when the server reports not found.
    async fn fetch_object(&self, id: ObjectId) -> Result<Option<ObjectRecord>, GalleryError>;
}

/// [`CollectionSource`] over HTTP.
pub struct HttpCollection {
    client: Client,
    base_url: String,
}

impl HttpCollection {
    /// Build a client from `config`.
    pub fn new(config: &GalleryConfig) -> Result<Self, GalleryError> {
        Url::parse(&config.base_url).map_err(|e| GalleryError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GalleryError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| GalleryError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl CollectionSource for HttpCollection {
    async fn search(&self, keyword: &str) -> Result<Vec<ObjectId>, GalleryError> {
        let url = self.endpoint("search")?;
        debug!("Searching {:?}", keyword);

        let response = self
            .client
            .get(url.clone())
            .query(&[("q", keyword), ("hasImages", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GalleryError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        debug!("Search {:?} matched {} objects", keyword, parsed.total);
        Ok(parsed.into_ids())
    }

    async fn fetch_object(&self, id: ObjectId) -> Result<Option<ObjectRecord>, GalleryError> {
        let url = self.endpoint(&format!("objects/{id}"))?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Object {} not found", id);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(GalleryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }
}
