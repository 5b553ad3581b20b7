//! String normalization and fuzzy similarity primitives
//!
//! Every fuzzy comparison in the pipeline goes through [`FuzzyMatcher`]: a weighted
//! blend of the Sørensen–Dice bigram coefficient and normalized Levenshtein similarity,
//! gated per call site by a minimum threshold below which the result is zero.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tuning::ScoringWeights;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(\([^)]*\)|\[[^\]]*\])").expect("bracket pattern is valid"));

/// Threshold-gated fuzzy string similarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    dice_weight: f64,
    edit_weight: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::from_weights(&ScoringWeights::default())
    }
}

impl FuzzyMatcher {
    pub fn from_weights(weights: &ScoringWeights) -> Self {
        Self {
            dice_weight: weights.dice_weight,
            edit_weight: weights.edit_weight,
        }
    }

    /// Blended similarity in [0, 1]; empty input scores 0
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        let dice = strsim::sorensen_dice(a, b);
        let edit = strsim::normalized_levenshtein(a, b);
        (self.dice_weight * dice + self.edit_weight * edit).clamp(0.0, 1.0)
    }

    /// Similarity, or 0 when it falls below `threshold` (no partial credit)
    pub fn gated(&self, a: &str, b: &str, threshold: f64) -> f64 {
        let score = self.similarity(a, b);
        if score >= threshold {
            score
        } else {
            0.0
        }
    }

    /// Best gated similarity of `word` against any of `candidates`
    pub fn best_word_match(&self, word: &str, candidates: &[&str], threshold: f64) -> f64 {
        candidates
            .iter()
            .map(|candidate| self.gated(word, candidate, threshold))
            .fold(0.0, f64::max)
    }
}

/// Lowercase, decode common HTML entities, drop apostrophes, turn other punctuation
/// into spaces, collapse whitespace
pub fn normalize(text: &str) -> String {
    let decoded = decode_entities(text).to_lowercase();

    let mut cleaned = String::with_capacity(decoded.len());
    for ch in decoded.chars() {
        if ch.is_alphanumeric() || ch.is_whitespace() {
            cleaned.push(ch);
        } else if ch == '\'' || ch == '\u{2019}' {
            continue;
        } else {
            cleaned.push(' ');
        }
    }

    collapse_whitespace(&cleaned)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `( ... )` and `[ ... ]` segments, e.g. "Song (Remastered) [Live]" → "Song"
pub fn strip_bracketed(title: &str) -> String {
    collapse_whitespace(&BRACKETED.replace_all(title, ""))
}

/// Apply ordered letter-substitution rules to an already normalized string
pub fn phonetic_form(normalized: &str, rules: &[(&str, &str)]) -> String {
    rules
        .iter()
        .fold(normalized.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Fuzzy variants of a query: normalized, lowercased as typed, word-order reversed,
/// first half of the words, last half of the words (deduplicated, non-empty)
pub fn query_variants(query: &str) -> Vec<String> {
    let normalized = normalize(query);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let half = words.len().div_ceil(2);

    let reversed = words.iter().rev().copied().collect::<Vec<_>>().join(" ");
    let first_half = words[..half].join(" ");
    let last_half = words[words.len() - half..].join(" ");

    let mut variants: Vec<String> = Vec::with_capacity(5);
    for variant in [
        normalized.clone(),
        collapse_whitespace(&query.to_lowercase()),
        reversed,
        first_half,
        last_half,
    ] {
        if !variant.is_empty() && !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}
