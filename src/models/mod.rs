use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Overview text substituted when the provider has none
pub const NO_OVERVIEW: &str = "No description available.";

/// External identifier of a catalog item (the metadata provider's id space)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the catalog artifact
///
/// The element's position in the catalog is the row index into the feature
/// matrix, so entries carry no explicit index field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: MovieId,
    pub title: String,
}

/// Metadata fetched from the enrichment provider for a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub overview: String,
    /// Partial ISO date as reported by the provider; may be absent or malformed
    pub release_date: Option<String>,
    pub rating: f64,
    pub genres: Vec<String>,
    pub runtime: Option<u32>,
    pub imdb_link: Option<String>,
}

impl Default for MovieDetails {
    fn default() -> Self {
        Self {
            overview: NO_OVERVIEW.to_string(),
            release_date: None,
            rating: 0.0,
            genres: Vec::new(),
            runtime: None,
            imdb_link: None,
        }
    }
}

/// A fully enriched recommendation candidate returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: MovieId,
    pub title: String,
    /// Cosine distance from the query movie, in [0, 2]
    pub distance: f32,
    pub poster: String,
    #[serde(flatten)]
    pub details: MovieDetails,
    pub trailer: Option<String>,
}

/// Enrichment bundle for a single movie, independent of any recommendation
/// (backs the per-item "details" action on trending entries)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieProfile {
    pub id: MovieId,
    pub poster: String,
    #[serde(flatten)]
    pub details: MovieDetails,
    pub trailer: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// One entry of the provider's "popular this week" listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingEntry {
    pub id: MovieId,
    pub title: String,
    pub poster: String,
}

/// Post-enrichment predicates applied to recommendation candidates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCriteria {
    pub min_rating: f64,
    /// Inclusive release-year bounds
    pub year_range: (i32, i32),
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie details response from TMDB (`/movie/{id}`)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieResponse {
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

impl From<TmdbMovieResponse> for MovieDetails {
    fn from(raw: TmdbMovieResponse) -> Self {
        let imdb_link = raw
            .imdb_id
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://www.imdb.com/title/{}/", id));

        MovieDetails {
            overview: raw
                .overview
                .filter(|o| !o.is_empty())
                .unwrap_or_else(|| NO_OVERVIEW.to_string()),
            release_date: raw.release_date.filter(|d| !d.is_empty()),
            rating: raw.vote_average.unwrap_or(0.0),
            genres: raw.genres.into_iter().map(|g| g.name).collect(),
            runtime: raw.runtime,
            imdb_link,
        }
    }
}

/// Raw videos response from TMDB (`/movie/{id}/videos`)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideosResponse {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

/// Raw popular listing response from TMDB (`/movie/popular`)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPopularResponse {
    #[serde(default)]
    pub results: Vec<TmdbPopularEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPopularEntry {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}
