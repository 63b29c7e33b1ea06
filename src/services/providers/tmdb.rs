/// TMDB metadata provider
///
/// Wraps themoviedb.org's v3 REST API. Three endpoints are consumed:
/// 1. Details + poster: /movie/{id}
/// 2. Trailers:         /movie/{id}/videos
/// 3. Popular listing:  /movie/popular
///
/// Every fetch goes through the injected `MetadataCache`, keyed by movie id
/// (page number for the popular listing), so repeated recommendations touch
/// the network once per item.
use std::sync::Arc;

use reqwest::Client as HttpClient;

use crate::{
    cache::{CacheKey, MetadataCache},
    cached,
    error::{AppError, AppResult},
    models::{
        MovieDetails, MovieId, TmdbMovieResponse, TmdbPopularResponse, TmdbVideosResponse,
        TrendingEntry,
    },
    services::providers::{MetadataProvider, PLACEHOLDER_POSTER},
};

const TRENDING_PAGE_SIZE: usize = 20;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
    cache: Arc<MetadataCache>,
}

impl TmdbProvider {
    pub fn new(cache: Arc<MetadataCache>, api_key: String, api_url: String, image_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            image_url,
            cache,
        }
    }

    /// Fetches the raw movie resource shared by the details and poster paths.
    async fn get_movie(&self, id: MovieId) -> AppResult<TmdbMovieResponse> {
        let url = format!("{}/movie/{}", self.api_url, id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Builds a full image URL from a TMDB poster path, falling back to the
    /// placeholder when the path is absent.
    fn poster_url(&self, poster_path: Option<&str>) -> String {
        match poster_path {
            Some(path) if !path.is_empty() => format!("{}{}", self.image_url, path),
            _ => PLACEHOLDER_POSTER.to_string(),
        }
    }

    /// First YouTube-hosted trailer of the response, as a watch URL.
    fn trailer_url(videos: &TmdbVideosResponse) -> Option<String> {
        videos
            .results
            .iter()
            .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
            .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
    }

    /// Maps a popular-listing response into trending entries, capped at the
    /// first 20 and with posters falling back to the placeholder.
    fn trending_entries(&self, popular: TmdbPopularResponse) -> Vec<TrendingEntry> {
        popular
            .results
            .into_iter()
            .take(TRENDING_PAGE_SIZE)
            .map(|m| TrendingEntry {
                id: MovieId(m.id),
                title: m.title,
                poster: self.poster_url(m.poster_path.as_deref()),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_poster(&self, id: MovieId) -> AppResult<String> {
        cached!(self.cache, CacheKey::Poster(id), async move {
            let movie = self.get_movie(id).await?;
            Ok::<_, AppError>(self.poster_url(movie.poster_path.as_deref()))
        })
    }

    async fn fetch_details(&self, id: MovieId) -> AppResult<MovieDetails> {
        cached!(self.cache, CacheKey::Details(id), async move {
            let movie = self.get_movie(id).await?;
            let details = MovieDetails::from(movie);

            tracing::info!(
                movie_id = %id,
                rating = details.rating,
                provider = "tmdb",
                "Details fetched"
            );

            Ok::<_, AppError>(details)
        })
    }

    async fn fetch_trailer(&self, id: MovieId) -> AppResult<Option<String>> {
        cached!(self.cache, CacheKey::Trailer(id), async move {
            let url = format!("{}/movie/{}/videos", self.api_url, id);

            let response = self
                .http_client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ExternalApi(format!(
                    "TMDB API returned status {}: {}",
                    status, body
                )));
            }

            let videos: TmdbVideosResponse = response.json().await?;
            Ok(Self::trailer_url(&videos))
        })
    }

    async fn fetch_trending(&self, page: u32) -> AppResult<Vec<TrendingEntry>> {
        cached!(self.cache, CacheKey::Trending(page), async move {
            let url = format!("{}/movie/popular", self.api_url);
            let page_param = page.to_string();

            let response = self
                .http_client
                .get(&url)
                .query(&[
                    ("api_key", self.api_key.as_str()),
                    ("language", "en-US"),
                    ("page", page_param.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ExternalApi(format!(
                    "TMDB API returned status {}: {}",
                    status, body
                )));
            }

            let popular: TmdbPopularResponse = response.json().await?;
            let trending = self.trending_entries(popular);

            tracing::info!(
                page = page,
                results = trending.len(),
                provider = "tmdb",
                "Trending listing fetched"
            );

            Ok(trending)
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
