//! Domain types flowing through the lyrics search pipeline
//!
//! All values here are request-scoped: created during one search and dropped with its
//! response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Priority tier for hits returned by the unmodified user query
pub const PRIORITY_ORIGINAL: u8 = 1;
/// Priority tier for hits returned by a derived query variant
pub const PRIORITY_DERIVED: u8 = 2;

/// Song record as returned by a lyrics metadata source (Genius)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Provider song id, used for deduplication
    pub id: u64,
    pub title: String,
    /// Primary artist display name
    pub artist: String,
    pub url: Option<String>,
    /// Song art image URL
    pub image: Option<String>,
    pub pageviews: Option<u64>,
}

/// A metadata record tagged with how it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHit {
    pub record: MetadataRecord,
    /// Expanded query that produced this hit
    pub source_query: String,
    pub is_from_original_query: bool,
    /// 1 for original-query hits, 2 otherwise
    pub priority: u8,
    /// Position within the source query's own result list
    pub page_rank: usize,
}

impl MetadataHit {
    pub fn new(record: MetadataRecord, source_query: &str, original_query: &str, page_rank: usize) -> Self {
        let is_from_original_query = source_query == original_query;
        Self {
            record,
            source_query: source_query.to_string(),
            is_from_original_query,
            priority: if is_from_original_query {
                PRIORITY_ORIGINAL
            } else {
                PRIORITY_DERIVED
            },
            page_rank,
        }
    }

    pub fn external_id(&self) -> u64 {
        self.record.id
    }
}

/// Song record returned verbatim by the music catalog
///
/// Catalog APIs in the JioSaavn family disagree on field names (`title` vs `name`,
/// `primaryArtists` string vs `artists.primary` objects), so the record is kept as a raw
/// JSON object and the few fields used for scoring are read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogCandidate {
    fields: Map<String, Value>,
}

impl CatalogCandidate {
    /// Accept only JSON objects; anything else is not a song record
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        ["title", "name"]
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .unwrap_or("")
    }

    /// Artist names in catalog order
    pub fn artist_names(&self) -> Vec<String> {
        if let Some(names) = self.fields.get("primaryArtists").map(names_from_value) {
            if !names.is_empty() {
                return names;
            }
        }

        if let Some(primary) = self
            .fields
            .get("artists")
            .and_then(|artists| artists.get("primary"))
        {
            let names = names_from_value(primary);
            if !names.is_empty() {
                return names;
            }
        }

        self.fields
            .get("singers")
            .map(names_from_value)
            .unwrap_or_default()
    }

    /// Artist names joined for display and scoring
    pub fn artist_line(&self) -> String {
        self.artist_names().join(", ")
    }
}

/// Names from either a comma-separated string or an array of strings/`{name}` objects
fn names_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(|s| s.trim().to_string()),
                _ => None,
            })
            .filter(|name| !name.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Final outcome for one metadata hit
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatch {
    pub hit: MetadataHit,
    /// 0-based position of the hit in the merged metadata list
    pub hit_rank: usize,
    pub candidate: Option<CatalogCandidate>,
    /// 0..=300
    pub match_score: f64,
    /// Catalog query that produced `candidate`; empty when unmatched
    pub source_variant: String,
    pub final_score: f64,
}

impl ResolvedMatch {
    pub fn is_matched(&self) -> bool {
        self.candidate.is_some()
    }
}

/// Bonus for hits near the top of the merged list: `max(0, 200 - 20*rank)`
pub fn rank_bonus(rank: usize) -> f64 {
    (200.0 - 20.0 * rank as f64).max(0.0)
}

/// Extra bonus for the first three hits: `50 - 15*rank`
pub fn top_position_bonus(rank: usize) -> f64 {
    if rank < 3 {
        50.0 - 15.0 * rank as f64
    } else {
        0.0
    }
}

pub fn final_score(match_score: f64, rank: usize) -> f64 {
    match_score + rank_bonus(rank) + top_position_bonus(rank)
}
