use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{FilterCriteria, MovieId, MovieProfile, Recommendation, TrendingEntry};
use crate::services::DEFAULT_K;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub title: String,
    pub k: Option<usize>,
    pub min_rating: Option<f64>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    /// Title the query resolved to; `null` means nothing cleared the
    /// similarity floor (as opposed to a match whose neighbors were all
    /// filtered out).
    pub matched_title: Option<String>,
    pub results: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct TitleMatch {
    pub id: MovieId,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub matched: Option<TitleMatch>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub page: Option<u32>,
}

impl RecommendationsQuery {
    /// Validates user-facing parameters and assembles the filter criteria.
    fn criteria(&self) -> AppResult<(usize, FilterCriteria)> {
        let k = self.k.unwrap_or(DEFAULT_K);
        if k < 1 {
            return Err(AppError::InvalidInput("k must be at least 1".to_string()));
        }

        let min_rating = self.min_rating.unwrap_or(0.0);
        if !(0.0..=10.0).contains(&min_rating) {
            return Err(AppError::InvalidInput(
                "min_rating must be between 0 and 10".to_string(),
            ));
        }

        let year_from = self.year_from.unwrap_or(0);
        let year_to = self.year_to.unwrap_or(9999);
        if year_from > year_to {
            return Err(AppError::InvalidInput(
                "year_from must not exceed year_to".to_string(),
            ));
        }

        Ok((
            k,
            FilterCriteria {
                min_rating,
                year_range: (year_from, year_to),
            },
        ))
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Recommend titles similar to a fuzzy query title
pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationsQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "title must not be empty".to_string(),
        ));
    }
    let (k, criteria) = params.criteria()?;

    let outcome = state.engine.recommend(&params.title, k, criteria).await?;

    Ok(Json(RecommendationsResponse {
        matched_title: outcome.matched.map(|entry| entry.title),
        results: outcome.results,
    }))
}

/// Resolve a fuzzy query to its best catalog match, if any
pub async fn resolve_title(
    State(state): State<AppState>,
    Query(params): Query<ResolveQuery>,
) -> AppResult<Json<ResolveResponse>> {
    let matched = state
        .engine
        .resolve_title(&params.q)
        .map(|(_, entry)| TitleMatch {
            id: entry.id,
            title: entry.title.clone(),
        });

    Ok(Json(ResolveResponse { matched }))
}

/// Enrichment bundle for a single movie id (used by trending entries, which
/// may reference movies outside the local catalog)
pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<MovieProfile>> {
    let profile = state.engine.enrich(MovieId(id)).await;
    Ok(Json(profile))
}

/// Current "popular this week" listing
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingQuery>,
) -> AppResult<Json<Vec<TrendingEntry>>> {
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::InvalidInput("page must be at least 1".to_string()));
    }

    let entries = state.engine.trending(page).await;
    Ok(Json(entries))
}
