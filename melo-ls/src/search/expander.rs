//! Query expansion
//!
//! Turns one user query into a short, ordered list of search strings:
//! 1. The query as typed (always first)
//! 2. One variant per matching correction rule (misspellings, contractions, slang)
//! 3. Per-word edit-distance correction against the lyric vocabulary
//! 4. Phonetic rewrite (pluggable, see [`PhoneticEncoder`])
//! 5. Segment variants for long queries: first half, last half, key words
//!
//! The result is deduplicated case-insensitively and capped.

use std::collections::HashSet;
use std::sync::Arc;

use super::lexicon::Lexicon;
use super::similarity::collapse_whitespace;

/// Queries longer than this (in characters) also get segment variants
const SEGMENT_MIN_QUERY_LEN: usize = 15;
/// Segment variants need more than this many significant words
const SEGMENT_MIN_WORDS: usize = 3;
/// Words longer than this count as key words
const KEY_WORD_MIN_LEN: usize = 4;
const MAX_KEY_WORDS: usize = 3;

/// Per-word phonetic rewriting hook
pub trait PhoneticEncoder: Send + Sync {
    /// Rewrite one lowercase word, or `None` to keep it
    fn encode(&self, word: &str) -> Option<String>;
}

/// Keeps every word unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityEncoder;

impl PhoneticEncoder for IdentityEncoder {
    fn encode(&self, _word: &str) -> Option<String> {
        None
    }
}

/// Canonical form of a raw user query: trimmed, inner whitespace collapsed
pub fn canonical_query(raw: &str) -> String {
    collapse_whitespace(raw)
}

pub struct QueryExpander {
    lexicon: Arc<Lexicon>,
    phonetic: Arc<dyn PhoneticEncoder>,
    max_queries: usize,
}

impl QueryExpander {
    pub fn new(lexicon: Arc<Lexicon>, max_queries: usize) -> Self {
        Self {
            lexicon,
            phonetic: Arc::new(IdentityEncoder),
            max_queries: max_queries.max(1),
        }
    }

    pub fn with_phonetic(mut self, encoder: Arc<dyn PhoneticEncoder>) -> Self {
        self.phonetic = encoder;
        self
    }

    /// Expand `query` into at most `max_queries` search strings, original first
    ///
    /// Returns an empty list only for a blank query.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let original = canonical_query(query);
        if original.is_empty() {
            return Vec::new();
        }
        let lowered = original.to_lowercase();

        let mut candidates = vec![original.clone()];
        candidates.extend(self.lexicon.substitution_variants(&lowered));
        candidates.extend(self.vocabulary_correction(&lowered));
        candidates.extend(self.phonetic_variant(&lowered));
        if original.chars().count() > SEGMENT_MIN_QUERY_LEN {
            candidates.extend(segment_variants(&lowered));
        }

        let expanded = self.finalize(candidates);
        tracing::debug!(query = %original, variants = ?expanded, "Expanded query");
        expanded
    }

    /// Replace each word with its closest vocabulary word when that word is 1-2 edits
    /// away and about the same length
    fn vocabulary_correction(&self, lowered: &str) -> Option<String> {
        let corrected: Vec<String> = lowered
            .split_whitespace()
            .map(|word| self.correct_word(word).unwrap_or_else(|| word.to_string()))
            .collect();
        let corrected = corrected.join(" ");

        (corrected != lowered).then_some(corrected)
    }

    fn correct_word(&self, word: &str) -> Option<String> {
        let word_len = word.chars().count();
        if word_len <= 2 || self.lexicon.contains_word(word) {
            return None;
        }

        // Closest word wins; ties keep vocabulary order
        let (closest, distance) = self
            .lexicon
            .vocabulary()
            .iter()
            .map(|candidate| (*candidate, strsim::levenshtein(word, candidate)))
            .fold(None, |best: Option<(&str, usize)>, (candidate, distance)| match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((candidate, distance)),
            })?;

        let length_gap = closest.chars().count().abs_diff(word_len);
        ((1..=2).contains(&distance) && length_gap <= 1).then(|| closest.to_string())
    }

    fn phonetic_variant(&self, lowered: &str) -> Option<String> {
        let mut changed = false;
        let words: Vec<String> = lowered
            .split_whitespace()
            .map(|word| match self.phonetic.encode(word) {
                Some(encoded) if !encoded.trim().is_empty() && encoded != word => {
                    changed = true;
                    encoded
                }
                _ => word.to_string(),
            })
            .collect();

        changed.then(|| words.join(" "))
    }

    /// Dedupe case-insensitively, drop short derived entries, cap the list
    fn finalize(&self, candidates: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut expanded = Vec::with_capacity(self.max_queries);

        for (index, candidate) in candidates.into_iter().enumerate() {
            let candidate = collapse_whitespace(&candidate);
            // The original is kept even when very short
            if index > 0 && candidate.chars().count() <= 2 {
                continue;
            }
            if seen.insert(candidate.to_lowercase()) {
                expanded.push(candidate);
            }
            if expanded.len() == self.max_queries {
                break;
            }
        }

        expanded
    }
}

/// First half, last half and key words of a long query
fn segment_variants(lowered: &str) -> Vec<String> {
    let words: Vec<&str> = lowered
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .collect();
    if words.len() <= SEGMENT_MIN_WORDS {
        return Vec::new();
    }

    let half = words.len().div_ceil(2);
    let mut variants = vec![
        words[..half].join(" "),
        words[words.len() - half..].join(" "),
    ];

    let key_words: Vec<&str> = words
        .iter()
        .copied()
        .filter(|word| word.chars().count() > KEY_WORD_MIN_LEN)
        .take(MAX_KEY_WORDS)
        .collect();
    if !key_words.is_empty() {
        variants.push(key_words.join(" "));
    }

    variants
}
