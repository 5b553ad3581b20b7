//! Lyrics search endpoint
//!
//! `GET /api/search-lyrics?q=<text>` runs the full pipeline and returns every resolved
//! hit, matched ones first.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{CatalogCandidate, ResolvedMatch};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Metadata hit as exposed to clients
#[derive(Debug, Serialize)]
pub struct GeniusHitDto {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub pageviews: Option<u64>,
    /// Position in the result page of the query that found it
    pub rank: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsMatchDto {
    pub genius: GeniusHitDto,
    /// Catalog song record passed through verbatim, or null
    pub jiosaavn: Option<CatalogCandidate>,
    pub search_query: String,
    pub match_score: f64,
    pub final_score: f64,
    /// Position in the merged metadata list
    pub genius_rank: usize,
}

impl From<ResolvedMatch> for LyricsMatchDto {
    fn from(resolved: ResolvedMatch) -> Self {
        let page_rank = resolved.hit.page_rank;
        let record = resolved.hit.record;

        Self {
            genius: GeniusHitDto {
                id: record.id,
                title: record.title,
                artist: record.artist,
                url: record.url,
                image: record.image,
                pageviews: record.pageviews,
                rank: page_rank,
            },
            jiosaavn: resolved.candidate,
            search_query: resolved.source_variant,
            match_score: resolved.match_score,
            final_score: resolved.final_score,
            genius_rank: resolved.hit_rank,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<LyricsMatchDto>,
}

/// GET /api/search-lyrics
pub async fn search_lyrics(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter is required".to_string()))?;

    let results = state.search.search_lyrics(&query).await?;

    Ok(Json(SearchResponse {
        success: true,
        data: results.into_iter().map(LyricsMatchDto::from).collect(),
    }))
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search-lyrics", get(search_lyrics))
}
