//! Recipe extraction with ordered strategy fallback.
//!
//! Given a URL (website, TikTok or YouTube), produces a normalized recipe
//! record and optionally translates it into a target language. Website
//! URLs go through a fail-fast escalation chain (recipe-card scrape,
//! embedded structured data, full-page model extraction); video URLs go
//! straight to a model that reasons about the video. Every strategy's
//! output is forced through one schema normalizer, so callers always see
//! the same record shape.

pub mod config;
pub mod error;
pub mod fetch;
pub mod images;
pub mod model;
pub mod normalize;
pub mod parsers;
pub mod pipeline;
pub mod platform;
pub mod prompts;
pub mod providers;
pub mod strategies;
pub mod translate;

pub use config::AppConfig;
pub use error::ExtractError;
pub use model::{ErrorResponse, Recipe, RecipeImage, ScrapeResponse};
pub use pipeline::{Extraction, Pipeline};
pub use platform::Platform;

/// Extract (and optionally translate) a recipe with a pipeline built from
/// configuration. Convenience wrapper over [`Pipeline`].
pub async fn extract_recipe(
    url: &str,
    target_language: &str,
) -> Result<Extraction, ExtractError> {
    let config = AppConfig::load()
        .map_err(|e| ExtractError::Configuration(e.to_string()))?;
    let pipeline = Pipeline::from_config(&config)?;
    pipeline.extract(url, target_language).await
}
