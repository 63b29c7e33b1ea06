//! Recommendation orchestration.
//!
//! One engine instance owns the immutable retrieval core (catalog, feature
//! index, fuzzy resolver) plus the enrichment provider. Queries resolve a
//! fuzzy title to a catalog row, pull its nearest neighbors under cosine
//! distance, enrich each candidate, then apply the rating/year filter.
//!
//! Enrichment failures never abort a batch: each failed call is logged and
//! replaced with a default (placeholder poster, empty details, no trailer).

use std::sync::Arc;

use chrono::Utc;

use crate::{
    catalog::{CatalogStore, LoadError},
    config::Config,
    error::AppResult,
    index::{NeighborIndex, SparseMatrix},
    models::{
        CatalogEntry, FilterCriteria, MovieDetails, MovieId, MovieProfile, Recommendation,
        TrendingEntry,
    },
    resolver::FuzzyResolver,
    services::{
        filter,
        providers::{MetadataProvider, PLACEHOLDER_POSTER},
    },
};

/// Default neighbor count for a recommendation request
pub const DEFAULT_K: usize = 5;

/// Result of a recommend operation.
///
/// `matched` distinguishes "the query resolved to nothing" (`None`) from
/// "it resolved but every candidate was filtered out" (`Some` + empty
/// results), so clients can phrase the two outcomes differently.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOutcome {
    pub matched: Option<CatalogEntry>,
    pub results: Vec<Recommendation>,
}

pub struct RecommendationEngine {
    catalog: CatalogStore,
    index: NeighborIndex,
    resolver: FuzzyResolver,
    provider: Arc<dyn MetadataProvider>,
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("catalog", &self.catalog)
            .field("index", &self.index)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl RecommendationEngine {
    /// Assembles the engine, verifying catalog/matrix row alignment. The
    /// resolver and neighbor index are built here, once, and queried
    /// read-only for the process lifetime.
    pub fn new(
        catalog: CatalogStore,
        matrix: SparseMatrix,
        provider: Arc<dyn MetadataProvider>,
    ) -> Result<Self, LoadError> {
        if catalog.len() != matrix.rows() {
            return Err(LoadError::RowMismatch {
                catalog: catalog.len(),
                matrix: matrix.rows(),
            });
        }

        let resolver = FuzzyResolver::new(catalog.titles_lowercase());
        let index = NeighborIndex::new(matrix);

        Ok(Self {
            catalog,
            index,
            resolver,
            provider,
        })
    }

    /// Loads both startup artifacts and assembles the engine. Any failure
    /// here is fatal: the process must not serve queries without an aligned
    /// catalog and feature index.
    pub fn load(config: &Config, provider: Arc<dyn MetadataProvider>) -> Result<Self, LoadError> {
        let catalog = CatalogStore::load(&config.catalog_path)?;
        let matrix = SparseMatrix::load(&config.features_path)?;
        Self::new(catalog, matrix, provider)
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Fuzzy-resolves a query to its catalog entry, if anything clears the
    /// similarity floor.
    pub fn resolve_title(&self, query: &str) -> Option<(usize, &CatalogEntry)> {
        self.resolver
            .resolve(query)
            .map(|row| (row, self.catalog.entry(row)))
    }

    /// Recommends up to k titles similar to the query, enriched and filtered.
    pub async fn recommend(
        &self,
        query: &str,
        k: usize,
        criteria: FilterCriteria,
    ) -> AppResult<RecommendOutcome> {
        let Some((row, matched)) = self.resolve_title(query) else {
            tracing::info!(query = %query, "No catalog title cleared the similarity floor");
            return Ok(RecommendOutcome {
                matched: None,
                results: Vec::new(),
            });
        };
        let matched = matched.clone();

        let neighbors = self.index.k_nearest(row, k);
        let mut candidates = Vec::with_capacity(neighbors.len());
        for (neighbor_row, distance) in neighbors {
            let entry = self.catalog.entry(neighbor_row);
            let profile = self.enrich(entry.id).await;
            candidates.push(Recommendation {
                id: entry.id,
                title: entry.title.clone(),
                distance,
                poster: profile.poster,
                details: profile.details,
                trailer: profile.trailer,
            });
        }

        let results = filter::apply(candidates, &criteria);

        tracing::info!(
            query = %query,
            matched = %matched.title,
            results = results.len(),
            "Recommendation completed"
        );

        Ok(RecommendOutcome {
            matched: Some(matched),
            results,
        })
    }

    /// Fetches the enrichment bundle for one movie. Each of the three
    /// provider calls degrades independently on failure.
    pub async fn enrich(&self, id: MovieId) -> MovieProfile {
        let provider = self.provider.as_ref();

        let poster = match provider.fetch_poster(id).await {
            Ok(poster) => poster,
            Err(e) => {
                tracing::warn!(
                    movie_id = %id,
                    provider = provider.name(),
                    error = %e,
                    "Poster fetch failed, substituting placeholder"
                );
                PLACEHOLDER_POSTER.to_string()
            }
        };

        let details = match provider.fetch_details(id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    movie_id = %id,
                    provider = provider.name(),
                    error = %e,
                    "Details fetch failed, substituting defaults"
                );
                MovieDetails::default()
            }
        };

        let trailer = match provider.fetch_trailer(id).await {
            Ok(trailer) => trailer,
            Err(e) => {
                tracing::warn!(
                    movie_id = %id,
                    provider = provider.name(),
                    error = %e,
                    "Trailer fetch failed, omitting trailer"
                );
                None
            }
        };

        MovieProfile {
            id,
            poster,
            details,
            trailer,
            fetched_at: Utc::now(),
        }
    }

    /// Current "popular this week" page; degrades to an empty listing when
    /// the provider is unreachable.
    pub async fn trending(&self, page: u32) -> Vec<TrendingEntry> {
        match self.provider.fetch_trending(page).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    page = page,
                    provider = self.provider.name(),
                    error = %e,
                    "Trending fetch failed, returning empty listing"
                );
                Vec::new()
            }
        }
    }
}
