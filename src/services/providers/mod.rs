/// Metadata provider abstraction
///
/// The enrichment gateway is a pluggable boundary: the recommendation core
/// only sees this trait, so providers can be swapped (or mocked in tests)
/// without touching the retrieval path. All four operations are idempotent
/// reads; callers degrade to defaults when a call fails rather than aborting
/// a whole recommendation batch.
use crate::{
    error::AppResult,
    models::{MovieDetails, MovieId, TrendingEntry},
};

pub mod tmdb;

/// Poster URL substituted when the provider has no image
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Image";

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the poster image URL for a movie, or a placeholder when the
    /// provider has none.
    async fn fetch_poster(&self, id: MovieId) -> AppResult<String>;

    /// Fetch display metadata for a movie. Fields the provider omits come
    /// back as defaults rather than errors.
    async fn fetch_details(&self, id: MovieId) -> AppResult<MovieDetails>;

    /// Fetch the first trailer hosted on a recognized video platform, if any.
    async fn fetch_trailer(&self, id: MovieId) -> AppResult<Option<String>>;

    /// Fetch one page of the "popular this week" listing, at most 20 entries.
    async fn fetch_trending(&self, page: u32) -> AppResult<Vec<TrendingEntry>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
