//! Catalog resolution for one metadata hit
//!
//! Builds a handful of catalog search strings from the hit, sends them all at once with
//! a hard per-request timeout, then scans the responses in variant order keeping the best
//! scoring candidate. Scanning stops early once a candidate clears the high-confidence
//! threshold; the kept candidate is always the best one seen.

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use super::scorer::MatchScorer;
use super::similarity::{collapse_whitespace, query_variants, strip_bracketed};
use super::tuning::SearchTuning;
use crate::clients::{settle_within, CatalogSource};
use crate::models::{final_score, CatalogCandidate, MetadataHit, MetadataRecord, ResolvedMatch};

/// Artist name Genius uses for romanized transliteration pages
pub const ROMANIZATION_PLACEHOLDER_ARTIST: &str = "Genius Romanizations";

/// Original-query variants appended for lyric-fragment queries
const MAX_QUERY_VARIANTS: usize = 2;
const TITLE_PREFIX_WORDS: usize = 3;

static ROMANIZED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(\s*romanized\s*\)").expect("romanized pattern is valid"));

/// Title and artist used to search the catalog for a hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongIdentity {
    pub title: String,
    pub artist: String,
}

impl SongIdentity {
    /// Read title and artist from a hit, unwrapping romanization pages
    ///
    /// A romanization page titled `"Artist - Song (Romanized)"` is credited to the
    /// placeholder artist; the real artist is the part before the first `" - "`.
    pub fn from_record(record: &MetadataRecord) -> Self {
        if record.artist.trim() == ROMANIZATION_PLACEHOLDER_ARTIST {
            if let Some((artist, title)) = record.title.split_once(" - ") {
                let title = ROMANIZED_TAG.replace_all(title, "");
                return Self {
                    title: strip_bracketed(&title),
                    artist: collapse_whitespace(artist),
                };
            }
        }

        Self {
            title: strip_bracketed(&record.title),
            artist: collapse_whitespace(&record.artist),
        }
    }
}

/// Catalog search strings for one song, most specific first
pub fn catalog_variants(
    identity: &SongIdentity,
    original_query: &str,
    tuning: &SearchTuning,
) -> Vec<String> {
    let title = &identity.title;
    let artist = &identity.artist;
    let first_artist_word = artist.split_whitespace().next().unwrap_or("");
    let title_prefix = title
        .split_whitespace()
        .take(TITLE_PREFIX_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    let mut candidates = vec![
        format!("{} {}", title, artist),
        title.clone(),
        format!("{} {}", artist, title),
        format!("{} {}", first_artist_word, title),
        title_prefix,
    ];

    if original_query.trim().chars().count() > tuning.lyric_fragment_min_len {
        candidates.extend(query_variants(original_query).into_iter().take(MAX_QUERY_VARIANTS));
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|candidate| collapse_whitespace(&candidate))
        .filter(|candidate| candidate.chars().count() > 2)
        .filter(|candidate| seen.insert(candidate.to_lowercase()))
        .take(tuning.max_catalog_variants)
        .collect()
}

pub struct CatalogResolver {
    source: Arc<dyn CatalogSource>,
    scorer: Arc<MatchScorer>,
    tuning: SearchTuning,
}

impl CatalogResolver {
    pub fn new(source: Arc<dyn CatalogSource>, scorer: Arc<MatchScorer>, tuning: SearchTuning) -> Self {
        Self {
            source,
            scorer,
            tuning,
        }
    }

    /// Find the best catalog match for `hit`, ranked at `hit_rank` in the merged list
    pub async fn resolve(&self, hit: MetadataHit, hit_rank: usize, original_query: &str) -> ResolvedMatch {
        let identity = SongIdentity::from_record(&hit.record);
        let variants = catalog_variants(&identity, original_query, &self.tuning);

        let source_name = self.source.name();
        let limit = self.tuning.catalog_timeout();
        let lookups = variants.iter().map(|variant| async move {
            settle_within(source_name, variant, limit, self.source.search_songs(variant))
                .await
                .into_contribution()
        });
        let responses: Vec<Vec<CatalogCandidate>> = join_all(lookups).await;

        let high_confidence = self.tuning.high_confidence_score;
        let mut best: Option<(CatalogCandidate, &str)> = None;
        let mut best_score = 0.0;

        for (variant, songs) in variants.iter().zip(responses) {
            for candidate in songs.into_iter().take(self.tuning.songs_per_variant) {
                let score = self.scorer.score(
                    &identity.title,
                    &identity.artist,
                    Some(&candidate),
                    original_query,
                );
                if score > best_score {
                    best_score = score;
                    best = Some((candidate, variant.as_str()));
                }
                if score > high_confidence {
                    break;
                }
            }

            if best_score > high_confidence {
                break;
            }
        }

        let (candidate, source_variant) = match best {
            Some((candidate, variant)) => (Some(candidate), variant.to_string()),
            None => (None, String::new()),
        };

        tracing::debug!(
            title = %identity.title,
            artist = %identity.artist,
            hit_rank,
            variants = variants.len(),
            matched = candidate.is_some(),
            score = best_score,
            "Resolved hit"
        );

        ResolvedMatch {
            hit,
            hit_rank,
            candidate,
            match_score: best_score,
            source_variant,
            final_score: final_score(best_score, hit_rank),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::SourceError;
    use crate::search::lexicon::Lexicon;
    use crate::search::tuning::ScoringWeights;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    fn record(title: &str, artist: &str) -> MetadataRecord {
        MetadataRecord {
            id: 1,
            title: title.to_string(),
            artist: artist.to_string(),
            url: None,
            image: None,
            pageviews: None,
        }
    }

    fn song(title: &str, artist: &str) -> CatalogCandidate {
        CatalogCandidate::from_value(json!({
            "id": format!("{}-{}", title, artist),
            "title": title,
            "primaryArtists": artist,
        }))
        .unwrap()
    }

    /// Answers from a fixed table and remembers what it was asked
    #[derive(Default)]
    struct TableCatalog {
        answers: HashMap<String, Vec<CatalogCandidate>>,
        fallback: Vec<CatalogCandidate>,
        asked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CatalogSource for TableCatalog {
        fn name(&self) -> &'static str {
            "table"
        }

        async fn search_songs(&self, query: &str) -> Result<Vec<CatalogCandidate>, SourceError> {
            self.asked.lock().unwrap().push(query.to_string());
            Ok(self
                .answers
                .get(query)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()))
        }
    }

    struct StalledCatalog;

    #[async_trait]
    impl CatalogSource for StalledCatalog {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn search_songs(&self, _query: &str) -> Result<Vec<CatalogCandidate>, SourceError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(vec![song("Believer", "Imagine Dragons")])
        }
    }

    fn resolver(source: Arc<dyn CatalogSource>, tuning: SearchTuning) -> CatalogResolver {
        let scorer = MatchScorer::new(
            ScoringWeights::default(),
            Lexicon::builtin(),
            tuning.lyric_fragment_min_len,
        );
        CatalogResolver::new(source, Arc::new(scorer), tuning)
    }

    fn hit(title: &str, artist: &str, query: &str) -> MetadataHit {
        MetadataHit::new(record(title, artist), query, query, 0)
    }

    #[test]
    fn test_identity_strips_brackets() {
        let identity = SongIdentity::from_record(&record("Bohemian Rhapsody (Remastered 2011)", "Queen"));
        assert_eq!(identity.title, "Bohemian Rhapsody");
        assert_eq!(identity.artist, "Queen");
    }

    #[test]
    fn test_identity_unwraps_romanization_page() {
        let identity = SongIdentity::from_record(&record(
            "Kenshi Yonezu - Lemon (Romanized)",
            ROMANIZATION_PLACEHOLDER_ARTIST,
        ));
        assert_eq!(identity.artist, "Kenshi Yonezu");
        assert_eq!(identity.title, "Lemon");

        // Only the first separator splits
        let identity = SongIdentity::from_record(&record(
            "YOASOBI - Yoru ni Kakeru - Racing Into The Night (romanized)",
            ROMANIZATION_PLACEHOLDER_ARTIST,
        ));
        assert_eq!(identity.artist, "YOASOBI");
        assert_eq!(identity.title, "Yoru ni Kakeru - Racing Into The Night");
    }

    #[test]
    fn test_placeholder_without_separator_is_kept() {
        let identity = SongIdentity::from_record(&record("Lemon", ROMANIZATION_PLACEHOLDER_ARTIST));
        assert_eq!(identity.title, "Lemon");
        assert_eq!(identity.artist, ROMANIZATION_PLACEHOLDER_ARTIST);
    }

    #[test]
    fn test_variant_order_and_dedup() {
        let identity = SongIdentity {
            title: "Believer".to_string(),
            artist: "Imagine Dragons".to_string(),
        };
        let variants = catalog_variants(&identity, "believer", &SearchTuning::default());
        assert_eq!(
            variants,
            vec![
                "Believer Imagine Dragons".to_string(),
                "Believer".to_string(),
                "Imagine Dragons Believer".to_string(),
                "Imagine Believer".to_string(),
            ]
        );
    }

    #[test]
    fn test_variants_capped_and_include_query_for_fragments() {
        let identity = SongIdentity {
            title: "Never Gonna Give You Up".to_string(),
            artist: "Rick Astley".to_string(),
        };
        let tuning = SearchTuning {
            max_catalog_variants: 8,
            ..SearchTuning::default()
        };
        let variants = catalog_variants(&identity, "gonna give you up never", &tuning);
        assert!(variants.contains(&"Never Gonna Give".to_string()));
        assert!(variants.contains(&"gonna give you up never".to_string()));

        let capped = catalog_variants(&identity, "gonna give you up never", &SearchTuning::default());
        assert_eq!(capped.len(), 5);
    }

    #[tokio::test]
    async fn test_romanized_hit_resolves_against_real_artist() {
        let catalog = TableCatalog {
            fallback: vec![song("Lemon", "Kenshi Yonezu")],
            ..TableCatalog::default()
        };
        let catalog = Arc::new(catalog);
        let resolver = resolver(catalog.clone(), SearchTuning::default());

        let resolved = resolver
            .resolve(
                hit("Kenshi Yonezu - Lemon (Romanized)", ROMANIZATION_PLACEHOLDER_ARTIST, "lemon"),
                0,
                "lemon",
            )
            .await;

        assert!(resolved.is_matched());
        assert!(resolved.match_score >= 80.0);
        assert_eq!(resolved.source_variant, "Lemon Kenshi Yonezu");
        assert_eq!(catalog.asked.lock().unwrap()[0], "Lemon Kenshi Yonezu");
    }

    #[tokio::test]
    async fn test_best_candidate_wins_across_variants() {
        let mut answers = HashMap::new();
        answers.insert(
            "Believer Imagine Dragons".to_string(),
            vec![song("Thunder", "Imagine Dragons")],
        );
        answers.insert("Believer".to_string(), vec![song("Believer", "Imagine Dragons")]);
        let catalog = TableCatalog {
            answers,
            ..TableCatalog::default()
        };
        let resolver = resolver(Arc::new(catalog), SearchTuning::default());

        let resolved = resolver.resolve(hit("Believer", "Imagine Dragons", "believer"), 2, "believer").await;

        let candidate = resolved.candidate.expect("matched");
        assert_eq!(candidate.title(), "Believer");
        assert_eq!(resolved.source_variant, "Believer");
        assert_eq!(resolved.final_score, final_score(resolved.match_score, 2));
    }

    #[tokio::test]
    async fn test_early_exit_keeps_maximum() {
        let mut answers = HashMap::new();
        answers.insert(
            "Believer Imagine Dragons".to_string(),
            vec![song("Believer", "Imagine Dragons"), song("Believer", "Imagine Dragons")],
        );
        answers.insert("Believer".to_string(), vec![song("Thunder", "Imagine Dragons")]);
        let catalog = TableCatalog {
            answers,
            ..TableCatalog::default()
        };
        let resolver = resolver(Arc::new(catalog), SearchTuning::default());

        let resolved = resolver.resolve(hit("Believer", "Imagine Dragons", "believer"), 0, "believer").await;
        assert_eq!(resolved.source_variant, "Believer Imagine Dragons");
        assert!(resolved.match_score > 120.0);
    }

    #[tokio::test]
    async fn test_only_first_songs_per_variant_are_examined() {
        let catalog = TableCatalog {
            fallback: vec![
                song("Thunder", "Imagine Dragons"),
                song("Radioactive", "Imagine Dragons"),
                song("Believer", "Imagine Dragons"),
            ],
            ..TableCatalog::default()
        };
        let resolver = resolver(Arc::new(catalog), SearchTuning::default());

        let resolved = resolver.resolve(hit("Believer", "Imagine Dragons", "believer"), 0, "believer").await;

        // The exact title sits third in every response, so it is never scored
        let candidate = resolved.candidate.expect("same-artist song should match");
        assert!(
            ["Thunder", "Radioactive"].contains(&candidate.title()),
            "unexpected match {}",
            candidate.title()
        );
        assert!(resolved.match_score < 300.0);
    }

    #[tokio::test]
    async fn test_no_results_is_unmatched() {
        let resolver = resolver(Arc::new(TableCatalog::default()), SearchTuning::default());
        let resolved = resolver.resolve(hit("Believer", "Imagine Dragons", "believer"), 4, "believer").await;

        assert!(!resolved.is_matched());
        assert_eq!(resolved.match_score, 0.0);
        assert_eq!(resolved.source_variant, "");
        assert_eq!(resolved.final_score, final_score(0.0, 4));
    }

    #[tokio::test]
    async fn test_stalled_catalog_times_out_unmatched() {
        let tuning = SearchTuning {
            catalog_timeout_ms: 50,
            ..SearchTuning::default()
        };
        let resolver = resolver(Arc::new(StalledCatalog), tuning);

        let started = std::time::Instant::now();
        let resolved = resolver.resolve(hit("Believer", "Imagine Dragons", "believer"), 0, "believer").await;

        assert!(!resolved.is_matched());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
