//! Movie recommendation service.
//!
//! Retrieval core: an immutable catalog plus a row-aligned sparse TF-IDF
//! feature matrix, queried for nearest neighbors under cosine distance after
//! fuzzy title resolution. Candidates are enriched through a pluggable
//! metadata provider (TMDB in production) behind a bounded in-process cache,
//! then filtered on rating and release year.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod index;
pub mod middleware;
pub mod models;
pub mod resolver;
pub mod services;
