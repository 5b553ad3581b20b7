//! Match scoring between a metadata hit and a catalog candidate
//!
//! Pure and deterministic. Five independent signals are added up and capped:
//!
//! | Signal            | Max points | Source                                     |
//! |-------------------|-----------:|--------------------------------------------|
//! | Title             | 80/70+50+30 | exact or fuzzy, word overlap, substring   |
//! | Artist            | 50/40+30+20 | exact or fuzzy, word overlap, substring   |
//! | Query relevance   | 35         | query variants vs candidate title/artist   |
//! | Phonetic          | 25 + 15    | letter-substituted title and artist        |
//! | Lyrics overlap    | 60         | query words found in candidate words       |
//!
//! Point values and thresholds come from [`ScoringWeights`].

use std::sync::Arc;

use super::lexicon::Lexicon;
use super::similarity::{normalize, phonetic_form, query_variants, FuzzyMatcher};
use super::tuning::{FieldWeights, ScoringWeights};
use crate::models::CatalogCandidate;

/// Minimum length of a query word that counts toward lyrics overlap
const LYRIC_WORD_MIN_LEN: usize = 2;

/// Points earned per signal, before the cap
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub title: f64,
    pub artist: f64,
    pub query: f64,
    pub phonetic: f64,
    pub lyrics: f64,
}

impl ScoreBreakdown {
    pub fn total(&self, max_score: f64) -> f64 {
        (self.title + self.artist + self.query + self.phonetic + self.lyrics).clamp(0.0, max_score)
    }
}

pub struct MatchScorer {
    weights: ScoringWeights,
    fuzzy: FuzzyMatcher,
    lexicon: Arc<Lexicon>,
    lyric_fragment_min_len: usize,
}

impl MatchScorer {
    pub fn new(weights: ScoringWeights, lexicon: Arc<Lexicon>, lyric_fragment_min_len: usize) -> Self {
        Self {
            fuzzy: FuzzyMatcher::from_weights(&weights),
            weights,
            lexicon,
            lyric_fragment_min_len,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score in `[0, max_score]`; no candidate scores 0
    pub fn score(
        &self,
        hit_title: &str,
        hit_artist: &str,
        candidate: Option<&CatalogCandidate>,
        original_query: &str,
    ) -> f64 {
        candidate
            .map(|candidate| {
                self.breakdown(hit_title, hit_artist, candidate, original_query)
                    .total(self.weights.max_score)
            })
            .unwrap_or(0.0)
    }

    pub fn breakdown(
        &self,
        hit_title: &str,
        hit_artist: &str,
        candidate: &CatalogCandidate,
        original_query: &str,
    ) -> ScoreBreakdown {
        let hit_title = normalize(hit_title);
        let hit_artist = normalize(hit_artist);
        let cand_title = normalize(candidate.title());
        let cand_artist = normalize(&candidate.artist_line());

        if cand_title.is_empty() && cand_artist.is_empty() {
            return ScoreBreakdown::default();
        }

        let rules = self.lexicon.phonetic_rules();
        let phonetic_title = self.fuzzy.gated(
            &phonetic_form(&hit_title, rules),
            &phonetic_form(&cand_title, rules),
            self.weights.phonetic_threshold,
        ) * self.weights.phonetic_title_points;
        let phonetic_artist = self.fuzzy.gated(
            &phonetic_form(&hit_artist, rules),
            &phonetic_form(&cand_artist, rules),
            self.weights.phonetic_threshold,
        ) * self.weights.phonetic_artist_points;

        ScoreBreakdown {
            title: self.field_points(&hit_title, &cand_title, &self.weights.title),
            artist: self.field_points(&hit_artist, &cand_artist, &self.weights.artist),
            query: self.query_points(original_query, &cand_title, &cand_artist),
            phonetic: phonetic_title + phonetic_artist,
            lyrics: self.lyrics_points(original_query, &cand_title, &cand_artist),
        }
    }

    /// Exact-or-fuzzy, word overlap and substring tiers for one field
    fn field_points(&self, hit: &str, candidate: &str, weights: &FieldWeights) -> f64 {
        if hit.is_empty() || candidate.is_empty() {
            return 0.0;
        }

        let mut points = if hit == candidate {
            weights.exact_points
        } else {
            self.fuzzy.gated(hit, candidate, weights.fuzzy_threshold) * weights.fuzzy_points
        };

        points += self.word_overlap(hit, candidate, weights.word_threshold) * weights.word_points;

        if hit.contains(candidate) || candidate.contains(hit) {
            points += weights.substring_points;
        }

        points
    }

    /// Share of `hit` words with a fuzzy partner in `candidate`, times their mean score
    fn word_overlap(&self, hit: &str, candidate: &str, threshold: f64) -> f64 {
        let hit_words: Vec<&str> = hit.split_whitespace().collect();
        let cand_words: Vec<&str> = candidate.split_whitespace().collect();
        if hit_words.is_empty() || cand_words.is_empty() {
            return 0.0;
        }

        let (matched, total) = hit_words
            .iter()
            .map(|word| self.fuzzy.best_word_match(word, &cand_words, threshold))
            .filter(|score| *score > 0.0)
            .fold((0usize, 0.0), |(count, sum), score| (count + 1, sum + score));

        if matched == 0 {
            return 0.0;
        }

        let ratio = matched as f64 / hit_words.len() as f64;
        let average = total / matched as f64;
        ratio * average
    }

    /// Best agreement between any variant of the user query and the candidate
    fn query_points(&self, original_query: &str, cand_title: &str, cand_artist: &str) -> f64 {
        let combined = format!("{} {}", cand_title, cand_artist).trim().to_string();
        let threshold = self.weights.query_threshold;

        let best = query_variants(original_query)
            .iter()
            .map(|variant| {
                let fuzzy = self
                    .fuzzy
                    .gated(variant, cand_title, threshold)
                    .max(self.fuzzy.gated(variant, cand_artist, threshold));

                if combined.contains(variant.as_str()) || variant.contains(combined.as_str()) {
                    fuzzy.max(self.weights.query_containment_similarity)
                } else {
                    fuzzy
                }
            })
            .fold(0.0, f64::max);

        best * self.weights.query_points
    }

    /// For lyric-fragment queries: share of query words echoed in the candidate
    fn lyrics_points(&self, original_query: &str, cand_title: &str, cand_artist: &str) -> f64 {
        if original_query.trim().chars().count() <= self.lyric_fragment_min_len {
            return 0.0;
        }

        let query = normalize(original_query);
        let query_words: Vec<&str> = query
            .split_whitespace()
            .filter(|word| word.chars().count() > LYRIC_WORD_MIN_LEN)
            .collect();
        if query_words.is_empty() {
            return 0.0;
        }

        let cand_words: Vec<&str> = cand_title
            .split_whitespace()
            .chain(cand_artist.split_whitespace())
            .collect();

        let matched = query_words
            .iter()
            .filter(|word| {
                self.fuzzy
                    .best_word_match(word, &cand_words, self.weights.lyrics_threshold)
                    > 0.0
            })
            .count();

        matched as f64 / query_words.len() as f64 * self.weights.lyrics_points
    }
}
