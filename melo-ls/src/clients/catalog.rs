//! JioSaavn-compatible catalog client
//!
//! Endpoint: `GET {base}/api/search?query=<query>`.
//! Response shape: `{success, data:{songs:{results:[...]}}}`.

use super::{CatalogSource, SourceError};
use crate::models::CatalogCandidate;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const CATALOG_BASE_URL: &str = "https://saavn.dev";
const USER_AGENT: &str = concat!("melo-ls/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
pub struct CatalogSearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<CatalogSearchData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogSearchData {
    #[serde(default)]
    pub songs: Option<CatalogSongSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogSongSection {
    #[serde(default)]
    pub results: Vec<Value>,
}

impl CatalogSearchResponse {
    /// Song records in catalog order; a `success:false` payload is a failure
    pub fn into_candidates(self) -> Result<Vec<CatalogCandidate>, SourceError> {
        if !self.success {
            return Err(SourceError::Rejected("success=false".to_string()));
        }

        Ok(self
            .data
            .and_then(|data| data.songs)
            .map(|songs| songs.results)
            .unwrap_or_default()
            .into_iter()
            .filter_map(CatalogCandidate::from_value)
            .collect())
    }
}

/// Catalog search client
pub struct SaavnCatalogClient {
    http_client: Client,
    base_url: String,
}

impl SaavnCatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for SaavnCatalogClient {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<CatalogCandidate>, SourceError> {
        let url = format!("{}/api/search", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: CatalogSearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let candidates = body.into_candidates()?;
        tracing::debug!(query = %query, songs = candidates.len(), "Catalog search complete");

        Ok(candidates)
    }
}
