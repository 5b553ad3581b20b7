//! Metadata search fan-out
//!
//! One lookup per expanded query, all in flight at once. Failed lookups contribute no
//! hits. Results are merged so every hit from the unmodified query comes before any hit
//! from a derived query, each tier in the order the source returned it, deduplicated by
//! provider id.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

use crate::clients::{settle, MetadataSource};
use crate::models::{MetadataHit, MetadataRecord};

pub struct MetadataFanout {
    source: Arc<dyn MetadataSource>,
    max_hits: usize,
}

impl MetadataFanout {
    pub fn new(source: Arc<dyn MetadataSource>, max_hits: usize) -> Self {
        Self { source, max_hits }
    }

    /// Query every expanded string concurrently and merge the hits
    pub async fn search(&self, expanded: &[String], original_query: &str) -> Vec<MetadataHit> {
        let source_name = self.source.name();

        let lookups = expanded.iter().map(|query| async move {
            let outcome = settle(source_name, query, self.source.search(query)).await;
            (query.clone(), outcome)
        });

        let outcomes = join_all(lookups).await;
        let failed = outcomes.iter().filter(|(_, outcome)| !outcome.is_settled()).count();

        let batches: Vec<(String, Vec<MetadataRecord>)> = outcomes
            .into_iter()
            .map(|(query, outcome)| (query, outcome.into_contribution()))
            .collect();

        let hits = merge_hits(batches, original_query, self.max_hits);

        tracing::info!(
            query = %original_query,
            lookups = expanded.len(),
            failed,
            hits = hits.len(),
            "Metadata fan-out complete"
        );

        hits
    }
}

/// Merge per-query results: original-query batches first, then the rest
pub fn merge_hits(
    batches: Vec<(String, Vec<MetadataRecord>)>,
    original_query: &str,
    max_hits: usize,
) -> Vec<MetadataHit> {
    let (original, derived): (Vec<_>, Vec<_>) = batches
        .into_iter()
        .partition(|(query, _)| query == original_query);

    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for (query, records) in original.into_iter().chain(derived) {
        for (page_rank, record) in records.into_iter().enumerate() {
            if seen.insert(record.id) {
                merged.push(MetadataHit::new(record, &query, original_query, page_rank));
            }
        }
    }

    merged.truncate(max_hits);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::SourceError;
    use async_trait::async_trait;

    fn record(id: u64) -> MetadataRecord {
        MetadataRecord {
            id,
            title: format!("Song {}", id),
            artist: "Artist".to_string(),
            url: None,
            image: None,
            pageviews: None,
        }
    }

    #[test]
    fn test_original_tier_first() {
        let batches = vec![
            ("variant".to_string(), vec![record(1), record(2)]),
            ("original".to_string(), vec![record(3), record(1)]),
        ];

        let merged = merge_hits(batches, "original", 10);
        let ids: Vec<u64> = merged.iter().map(|h| h.external_id()).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        assert!(merged[0].is_from_original_query);
        assert!(merged[1].is_from_original_query);
        assert!(!merged[2].is_from_original_query);
        assert_eq!(merged[2].page_rank, 1);
    }

    #[test]
    fn test_priority_and_dedup_invariants() {
        let batches = vec![
            ("a".to_string(), (0..6).map(record).collect()),
            ("q".to_string(), (4..9).map(record).collect()),
            ("b".to_string(), (2..12).map(record).collect()),
        ];

        let merged = merge_hits(batches, "q", 10);
        assert_eq!(merged.len(), 10);

        let mut ids = HashSet::new();
        for hit in &merged {
            assert!(ids.insert(hit.external_id()), "duplicate id {}", hit.external_id());
        }

        let first_derived = merged.iter().position(|h| !h.is_from_original_query).unwrap();
        assert!(merged[first_derived..].iter().all(|h| !h.is_from_original_query));
        assert!(merged[..first_derived].iter().all(|h| h.priority == 1));
    }

    #[test]
    fn test_empty_batches() {
        assert!(merge_hits(Vec::new(), "q", 10).is_empty());
    }

    struct FlakySource;

    #[async_trait]
    impl MetadataSource for FlakySource {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn search(&self, query: &str) -> Result<Vec<MetadataRecord>, SourceError> {
            match query {
                "broken" => Err(SourceError::Status(500)),
                "original" => Ok(vec![record(1)]),
                _ => Ok(vec![record(2), record(1)]),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_lookup_does_not_fail_batch() {
        let fanout = MetadataFanout::new(Arc::new(FlakySource), 10);
        let expanded = vec!["original".to_string(), "broken".to_string(), "variant".to_string()];

        let hits = fanout.search(&expanded, "original").await;
        let ids: Vec<u64> = hits.iter().map(|h| h.external_id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(hits[1].source_query, "variant");
    }
}
