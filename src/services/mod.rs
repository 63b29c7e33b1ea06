pub mod filter;
pub mod providers;
pub mod recommender;

pub use recommender::{RecommendOutcome, RecommendationEngine, DEFAULT_K};
