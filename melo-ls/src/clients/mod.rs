//! Outbound search sources
//!
//! Two collaborators feed the pipeline:
//! 1. **MetadataSource** - lyrics/metadata search (Genius)
//! 2. **CatalogSource** - music catalog search (JioSaavn-compatible API)
//!
//! Both are untrusted. Every call made by the pipeline goes through [`settle`] or
//! [`settle_within`], which turn any failure into a [`BranchOutcome`] so one failing
//! branch never fails its siblings.

pub mod catalog;
pub mod genius;

pub use catalog::SaavnCatalogClient;
pub use genius::GeniusClient;

use crate::models::{CatalogCandidate, MetadataRecord};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single outbound request
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Upstream answered but reported failure in its payload
    #[error("Upstream rejected request: {0}")]
    Rejected(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Lyrics/metadata search source
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Search songs matching free text; results in the source's relevance order
    async fn search(&self, query: &str) -> Result<Vec<MetadataRecord>, SourceError>;
}

/// Music catalog search source
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Search songs matching free text; results in the catalog's relevance order
    async fn search_songs(&self, query: &str) -> Result<Vec<CatalogCandidate>, SourceError>;
}

/// Result of one fan-out branch
#[derive(Debug)]
pub enum BranchOutcome<T> {
    /// Branch completed with data
    Settled(T),
    /// Branch failed; it contributes nothing
    Failed(SourceError),
}

impl<T: Default> BranchOutcome<T> {
    /// Data from a settled branch, or the empty value for a failed one
    pub fn into_contribution(self) -> T {
        match self {
            BranchOutcome::Settled(value) => value,
            BranchOutcome::Failed(_) => T::default(),
        }
    }
}

impl<T> BranchOutcome<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self, BranchOutcome::Settled(_))
    }
}

/// Await a branch and record its failure instead of propagating it
pub async fn settle<T, F>(source: &str, query: &str, request: F) -> BranchOutcome<T>
where
    F: Future<Output = Result<T, SourceError>>,
{
    match request.await {
        Ok(value) => BranchOutcome::Settled(value),
        Err(e) => {
            tracing::debug!(source, query, error = %e, "Branch failed, contributing no results");
            BranchOutcome::Failed(e)
        }
    }
}

/// Like [`settle`], but cancels the request once `limit` elapses
pub async fn settle_within<T, F>(source: &str, query: &str, limit: Duration, request: F) -> BranchOutcome<T>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let bounded = async {
        tokio::time::timeout(limit, request)
            .await
            .unwrap_or(Err(SourceError::Timeout(limit)))
    };
    settle(source, query, bounded).await
}
