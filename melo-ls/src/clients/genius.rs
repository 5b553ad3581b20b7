//! Genius API client
//!
//! Endpoint: `GET {base}/search?q=<query>` with a bearer access token.
//! Response shape: `{response:{hits:[{result:{...}}]}}`.

use super::{MetadataSource, SourceError};
use crate::models::MetadataRecord;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;

pub const GENIUS_BASE_URL: &str = "https://api.genius.com";
const USER_AGENT: &str = concat!("melo-ls/", env!("CARGO_PKG_VERSION"));

/// Genius search response envelope
#[derive(Debug, Deserialize)]
pub struct GeniusSearchResponse {
    pub response: GeniusResponseBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeniusResponseBody {
    #[serde(default)]
    pub hits: Vec<GeniusHit>,
}

#[derive(Debug, Deserialize)]
pub struct GeniusHit {
    /// Hit type ("song" for search results)
    #[serde(rename = "type", default)]
    pub hit_type: Option<String>,
    pub result: GeniusSong,
}

#[derive(Debug, Deserialize)]
pub struct GeniusSong {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub primary_artist: Option<GeniusArtist>,
    #[serde(default)]
    pub artist_names: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub song_art_image_url: Option<String>,
    #[serde(default)]
    pub stats: Option<GeniusStats>,
}

#[derive(Debug, Deserialize)]
pub struct GeniusArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GeniusStats {
    #[serde(default)]
    pub pageviews: Option<u64>,
}

impl From<GeniusSong> for MetadataRecord {
    fn from(song: GeniusSong) -> Self {
        let artist = song
            .primary_artist
            .map(|a| a.name)
            .filter(|name| !name.trim().is_empty())
            .or(song.artist_names)
            .unwrap_or_default();

        MetadataRecord {
            id: song.id,
            title: song.title,
            artist,
            url: song.url,
            image: song.song_art_image_url,
            pageviews: song.stats.and_then(|s| s.pageviews),
        }
    }
}

impl GeniusSearchResponse {
    /// Song records in response order; non-song hits are skipped
    pub fn into_records(self) -> Vec<MetadataRecord> {
        self.response
            .hits
            .into_iter()
            .filter(|hit| hit.hit_type.as_deref().map_or(true, |t| t == "song"))
            .map(|hit| MetadataRecord::from(hit.result))
            .collect()
    }
}

/// Genius search client
pub struct GeniusClient {
    http_client: Client,
    base_url: String,
}

impl GeniusClient {
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self, SourceError> {
        let mut headers = header::HeaderMap::new();
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", access_token.trim()))
            .map_err(|e| SourceError::Rejected(format!("Invalid access token: {}", e)))?;
        headers.insert(header::AUTHORIZATION, bearer);

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MetadataSource for GeniusClient {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn search(&self, query: &str) -> Result<Vec<MetadataRecord>, SourceError> {
        let url = format!("{}/search", self.base_url);

        tracing::debug!(query = %query, "Querying Genius search");

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: GeniusSearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let records = body.into_records();
        tracing::debug!(query = %query, hits = records.len(), "Genius search complete");

        Ok(records)
    }
}
