//! In-memory metadata and catalog sources

use async_trait::async_trait;
use melo_ls::clients::{CatalogSource, MetadataSource, SourceError};
use melo_ls::models::{CatalogCandidate, MetadataRecord};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn record(id: u64, title: &str, artist: &str) -> MetadataRecord {
    MetadataRecord {
        id,
        title: title.to_string(),
        artist: artist.to_string(),
        url: Some(format!("https://genius.com/songs/{}", id)),
        image: None,
        pageviews: Some(1000),
    }
}

pub fn catalog_song(id: &str, title: &str, artist: &str) -> CatalogCandidate {
    CatalogCandidate::from_value(json!({
        "id": id,
        "title": title,
        "primaryArtists": artist,
        "language": "english",
    }))
    .expect("object literal")
}

/// Metadata source answering from a fixed query table; unknown queries return nothing
#[derive(Default)]
pub struct StaticMetadata {
    pub answers: HashMap<String, Vec<MetadataRecord>>,
    pub asked: Mutex<Vec<String>>,
}

impl StaticMetadata {
    pub fn with(mut self, query: &str, records: Vec<MetadataRecord>) -> Self {
        self.answers.insert(query.to_string(), records);
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSource for StaticMetadata {
    fn name(&self) -> &'static str {
        "static-metadata"
    }

    async fn search(&self, query: &str) -> Result<Vec<MetadataRecord>, SourceError> {
        self.asked.lock().unwrap().push(query.to_string());
        Ok(self.answers.get(query).cloned().unwrap_or_default())
    }
}

/// Metadata source whose every request fails
pub struct FailingMetadata;

#[async_trait]
impl MetadataSource for FailingMetadata {
    fn name(&self) -> &'static str {
        "failing-metadata"
    }

    async fn search(&self, _query: &str) -> Result<Vec<MetadataRecord>, SourceError> {
        Err(SourceError::Status(503))
    }
}

/// Catalog returning every song whose title appears in the query
#[derive(Default)]
pub struct StaticCatalog {
    pub songs: Vec<CatalogCandidate>,
    /// Artificial latency per request
    pub delay: Option<Duration>,
}

impl StaticCatalog {
    pub fn new(songs: Vec<CatalogCandidate>) -> Self {
        Self { songs, delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn name(&self) -> &'static str {
        "static-catalog"
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<CatalogCandidate>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let query = query.to_lowercase();
        Ok(self
            .songs
            .iter()
            .filter(|song| query.contains(&song.title().to_lowercase()))
            .cloned()
            .collect())
    }
}

/// Catalog that panics on every request, failing the task that called it
pub struct PanickingCatalog;

#[async_trait]
impl CatalogSource for PanickingCatalog {
    fn name(&self) -> &'static str {
        "panicking-catalog"
    }

    async fn search_songs(&self, _query: &str) -> Result<Vec<CatalogCandidate>, SourceError> {
        panic!("catalog exploded");
    }
}
