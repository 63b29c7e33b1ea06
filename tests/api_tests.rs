use std::sync::Arc;

use axum_test::TestServer;
use serde_json::Value;

use marquee_api::api::{create_router, AppState};
use marquee_api::catalog::CatalogStore;
use marquee_api::error::{AppError, AppResult};
use marquee_api::index::SparseMatrix;
use marquee_api::models::{CatalogEntry, MovieDetails, MovieId, TrendingEntry};
use marquee_api::services::providers::MetadataProvider;
use marquee_api::services::RecommendationEngine;

/// Deterministic in-memory provider standing in for TMDB.
struct StubProvider;

#[async_trait::async_trait]
impl MetadataProvider for StubProvider {
    async fn fetch_poster(&self, id: MovieId) -> AppResult<String> {
        Ok(format!("https://posters.local/{}.jpg", id))
    }

    async fn fetch_details(&self, _id: MovieId) -> AppResult<MovieDetails> {
        Ok(MovieDetails {
            rating: 7.0,
            release_date: Some("2010-01-01".to_string()),
            ..MovieDetails::default()
        })
    }

    async fn fetch_trailer(&self, _id: MovieId) -> AppResult<Option<String>> {
        Ok(Some("https://www.youtube.com/watch?v=stub".to_string()))
    }

    async fn fetch_trending(&self, _page: u32) -> AppResult<Vec<TrendingEntry>> {
        Ok(vec![
            TrendingEntry {
                id: MovieId(900),
                title: "Trending One".to_string(),
                poster: "https://posters.local/900.jpg".to_string(),
            },
            TrendingEntry {
                id: MovieId(901),
                title: "Trending Two".to_string(),
                poster: "https://posters.local/901.jpg".to_string(),
            },
        ])
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Provider whose every call fails, for degradation tests.
struct DownProvider;

#[async_trait::async_trait]
impl MetadataProvider for DownProvider {
    async fn fetch_poster(&self, _id: MovieId) -> AppResult<String> {
        Err(AppError::ExternalApi("down".to_string()))
    }

    async fn fetch_details(&self, _id: MovieId) -> AppResult<MovieDetails> {
        Err(AppError::ExternalApi("down".to_string()))
    }

    async fn fetch_trailer(&self, _id: MovieId) -> AppResult<Option<String>> {
        Err(AppError::ExternalApi("down".to_string()))
    }

    async fn fetch_trending(&self, _page: u32) -> AppResult<Vec<TrendingEntry>> {
        Err(AppError::ExternalApi("down".to_string()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

/// Six-movie catalog whose row 0 ("Avengers") has nearest neighbors, in
/// ascending cosine distance, rows [2, 1, 4, 3, 5].
fn fixture_engine(provider: Arc<dyn MetadataProvider>) -> RecommendationEngine {
    let entries = ["Avengers", "Batman", "Coco", "Dune", "Encanto", "Frozen"]
        .iter()
        .enumerate()
        .map(|(i, title)| CatalogEntry {
            id: MovieId(100 + i as u64),
            title: title.to_string(),
        })
        .collect();
    let catalog = CatalogStore::from_entries(entries).unwrap();

    let matrix = SparseMatrix::from_dense(&[
        vec![1.0, 0.0, 0.0],
        vec![1.0, 0.5, 0.0],
        vec![1.0, 0.1, 0.0],
        vec![1.0, 2.0, 0.0],
        vec![1.0, 1.0, 0.0],
        vec![0.0, 1.0, 0.0],
    ])
    .unwrap();

    RecommendationEngine::new(catalog, matrix, provider).unwrap()
}

fn create_test_server() -> TestServer {
    let state = AppState::new(fixture_engine(Arc::new(StubProvider)));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_recommendations_happy_path() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avengers")
        .add_query_param("k", "4")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched_title"], "Avengers");

    let results = body["results"].as_array().unwrap();
    let titles: Vec<&str> = results
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Coco", "Batman", "Encanto", "Dune"]);

    assert_eq!(results[0]["rating"], 7.0);
    assert_eq!(results[0]["release_date"], "2010-01-01");
    assert_eq!(results[0]["poster"], "https://posters.local/102.jpg");
    assert_eq!(results[0]["trailer"], "https://www.youtube.com/watch?v=stub");
}

#[tokio::test]
async fn test_recommendations_resolve_misspelled_title() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "avngrs")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched_title"], "Avengers");
    assert_eq!(body["results"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_recommendations_no_match_is_empty_not_error() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "zzzzxyqq123")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched_title"], Value::Null);
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recommendations_filtered_to_zero_keeps_matched_title() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avengers")
        .add_query_param("min_rating", "10")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched_title"], "Avengers");
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recommendations_year_filter() {
    let server = create_test_server();

    // stub dates are all 2010; a range ending before that filters everything
    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avengers")
        .add_query_param("year_from", "1990")
        .add_query_param("year_to", "2005")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched_title"], "Avengers");
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recommendations_input_validation() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avengers")
        .add_query_param("k", "0")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avengers")
        .add_query_param("min_rating", "10.5")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avengers")
        .add_query_param("year_from", "2020")
        .add_query_param("year_to", "2000")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "   ")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_degrade_when_provider_is_down() {
    let state = AppState::new(fixture_engine(Arc::new(DownProvider)));
    let server = TestServer::new(create_router(state)).unwrap();

    // degraded candidates carry rating 0 and year 0, so the filters must be
    // wide open for them to appear
    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avengers")
        .add_query_param("k", "3")
        .add_query_param("year_from", "0")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0]["poster"],
        "https://via.placeholder.com/500x750?text=No+Image"
    );
    assert_eq!(results[0]["overview"], "No description available.");
    assert_eq!(results[0]["trailer"], Value::Null);
}

#[tokio::test]
async fn test_resolve_title() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/titles/resolve")
        .add_query_param("q", "avngrs")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched"]["title"], "Avengers");
    assert_eq!(body["matched"]["id"], 100);

    let response = server
        .get("/api/v1/titles/resolve")
        .add_query_param("q", "zzzzxyqq123")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["matched"], Value::Null);
}

#[tokio::test]
async fn test_movie_details() {
    let server = create_test_server();

    let response = server.get("/api/v1/titles/42/details").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["id"], 42);
    assert_eq!(body["poster"], "https://posters.local/42.jpg");
    assert_eq!(body["rating"], 7.0);
    assert_eq!(body["trailer"], "https://www.youtube.com/watch?v=stub");
}

#[tokio::test]
async fn test_trending() {
    let server = create_test_server();

    let response = server.get("/api/v1/trending").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["title"], "Trending One");
}

#[tokio::test]
async fn test_trending_degrades_to_empty_when_provider_is_down() {
    let state = AppState::new(fixture_engine(Arc::new(DownProvider)));
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server.get("/api/v1/trending").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_request_id_echoed_on_response() {
    let server = create_test_server();

    let response = server.get("/health").await;
    assert!(response.headers().get("x-request-id").is_some());
}
