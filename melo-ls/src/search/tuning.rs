//! Tunable limits and scoring weights
//!
//! Every threshold and point value used by the pipeline lives here so the heuristic can
//! be audited and tested one signal at a time.

use serde::Deserialize;
use std::time::Duration;

/// Pipeline limits, overridable from the `[search]` config section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchTuning {
    /// Maximum expanded queries per search
    pub max_expanded_queries: usize,
    /// Metadata hits kept after merge
    pub max_metadata_hits: usize,
    /// Catalog query variants per hit
    pub max_catalog_variants: usize,
    /// Songs examined from each catalog response
    pub songs_per_variant: usize,
    /// A match scoring above this stops further scanning
    pub high_confidence_score: f64,
    /// Per-request catalog timeout in milliseconds
    pub catalog_timeout_ms: u64,
    /// Original queries longer than this are treated as lyric fragments
    pub lyric_fragment_min_len: usize,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            max_expanded_queries: 8,
            max_metadata_hits: 10,
            max_catalog_variants: 5,
            songs_per_variant: 2,
            high_confidence_score: 120.0,
            catalog_timeout_ms: 2000,
            lyric_fragment_min_len: 10,
        }
    }
}

impl SearchTuning {
    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }
}

/// Points and gates for one three-tier field comparison (title or artist)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    /// Normalized strings identical
    pub exact_points: f64,
    /// Maximum points from whole-string fuzzy similarity
    pub fuzzy_points: f64,
    pub fuzzy_threshold: f64,
    /// Maximum points from per-word fuzzy overlap
    pub word_points: f64,
    pub word_threshold: f64,
    /// One normalized string contains the other
    pub substring_points: f64,
}

/// Weights for the match scorer
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    /// Share of the bigram coefficient in the fuzzy blend
    pub dice_weight: f64,
    /// Share of (1 - normalized edit distance) in the fuzzy blend
    pub edit_weight: f64,
    pub title: FieldWeights,
    pub artist: FieldWeights,
    pub query_points: f64,
    pub query_threshold: f64,
    /// Similarity credited when query and candidate text contain one another
    pub query_containment_similarity: f64,
    pub phonetic_title_points: f64,
    pub phonetic_artist_points: f64,
    pub phonetic_threshold: f64,
    pub lyrics_points: f64,
    pub lyrics_threshold: f64,
    /// Hard cap on the total
    pub max_score: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            dice_weight: 0.7,
            edit_weight: 0.3,
            title: FieldWeights {
                exact_points: 80.0,
                fuzzy_points: 70.0,
                fuzzy_threshold: 0.4,
                word_points: 50.0,
                word_threshold: 0.6,
                substring_points: 30.0,
            },
            artist: FieldWeights {
                exact_points: 50.0,
                fuzzy_points: 40.0,
                fuzzy_threshold: 0.5,
                word_points: 30.0,
                word_threshold: 0.7,
                substring_points: 20.0,
            },
            query_points: 35.0,
            query_threshold: 0.4,
            query_containment_similarity: 0.8,
            phonetic_title_points: 25.0,
            phonetic_artist_points: 15.0,
            phonetic_threshold: 0.6,
            lyrics_points: 60.0,
            lyrics_threshold: 0.7,
            max_score: 300.0,
        }
    }
}
