//! Lyrics search pipeline
//!
//! ```text
//! query → QueryExpander → MetadataFanout (parallel) → [per hit] CatalogResolver (parallel)
//!       → MatchScorer → final sort
//! ```
//!
//! All state is request-scoped except the read-only [`Lexicon`] and tuning, which are
//! shared by every request.

pub mod expander;
pub mod fanout;
pub mod lexicon;
pub mod resolver;
pub mod scorer;
pub mod similarity;
pub mod tuning;

use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;

use crate::clients::{CatalogSource, MetadataSource};
use crate::models::ResolvedMatch;
use expander::{canonical_query, QueryExpander};
use fanout::MetadataFanout;
use lexicon::Lexicon;
use resolver::CatalogResolver;
use scorer::MatchScorer;
use tuning::{ScoringWeights, SearchTuning};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// End-to-end lyrics search over one metadata source and one catalog
pub struct LyricsSearch {
    expander: QueryExpander,
    fanout: MetadataFanout,
    resolver: Arc<CatalogResolver>,
}

impl LyricsSearch {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        catalog: Arc<dyn CatalogSource>,
        lexicon: Arc<Lexicon>,
        tuning: SearchTuning,
    ) -> Self {
        let scorer = MatchScorer::new(
            ScoringWeights::default(),
            Arc::clone(&lexicon),
            tuning.lyric_fragment_min_len,
        );

        Self {
            expander: QueryExpander::new(lexicon, tuning.max_expanded_queries),
            fanout: MetadataFanout::new(metadata, tuning.max_metadata_hits),
            resolver: Arc::new(CatalogResolver::new(catalog, Arc::new(scorer), tuning)),
        }
    }

    /// Replace the query expander, e.g. to plug in a phonetic encoder
    pub fn with_expander(mut self, expander: QueryExpander) -> Self {
        self.expander = expander;
        self
    }

    /// Run the full pipeline for `query`
    ///
    /// Upstream failures never fail the search; they only shrink the result. An empty
    /// `Ok` means nothing was found.
    pub async fn search_lyrics(&self, query: &str) -> Result<Vec<ResolvedMatch>, SearchError> {
        let original = canonical_query(query);
        if original.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let expanded = self.expander.expand(&original);
        let hits = self.fanout.search(&expanded, &original).await;
        if hits.is_empty() {
            tracing::info!(query = %original, "No metadata hits");
            return Ok(Vec::new());
        }

        let tasks: Vec<_> = hits
            .into_iter()
            .enumerate()
            .map(|(hit_rank, hit)| {
                let resolver = Arc::clone(&self.resolver);
                let original = original.clone();
                tokio::spawn(async move { resolver.resolve(hit, hit_rank, &original).await })
            })
            .collect();

        let mut results = Vec::with_capacity(tasks.len());
        for joined in futures::future::join_all(tasks).await {
            let resolved = joined.map_err(|e| SearchError::Internal(format!("Resolver task failed: {}", e)))?;
            results.push(resolved);
        }

        rank_results(&mut results);

        tracing::info!(
            query = %original,
            results = results.len(),
            matched = results.iter().filter(|r| r.is_matched()).count(),
            "Lyrics search complete"
        );

        Ok(results)
    }
}

/// Matched before unmatched; matched by descending final score, unmatched by hit rank
pub fn rank_results(results: &mut [ResolvedMatch]) {
    results.sort_by(|a, b| match (a.is_matched(), b.is_matched()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => b
            .final_score
            .total_cmp(&a.final_score)
            .then(a.hit_rank.cmp(&b.hit_rank)),
        (false, false) => a.hit_rank.cmp(&b.hit_rank),
    });
}
