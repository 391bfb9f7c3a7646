//! Orchestrates the ordered fallback chain and the optional translation
//! step for a single request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::config::AppConfig;
use crate::error::ExtractError;
use crate::images::{uploader_from_config, ImageUploader};
use crate::model::Recipe;
use crate::platform::Platform;
use crate::providers::{GeminiGenerator, TextGenerator};
use crate::strategies::{
    FullPageStrategy, JsonLdStrategy, RecipeCardScraper, ScraperStrategy, Strategy, VideoStrategy,
};
use crate::translate::translate_recipe;

/// Result of one successful extraction.
#[derive(Debug)]
pub struct Extraction {
    pub recipe: Recipe,
    /// Which strategy produced the record, plus a `-translated-{lang}`
    /// suffix when translation ran
    pub source: String,
    /// End-to-end wall time, for observability only
    pub elapsed: Duration,
}

pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    uploader: Arc<dyn ImageUploader>,
    website_strategies: Vec<Box<dyn Strategy>>,
    video_strategy: Option<Box<dyn Strategy>>,
}

impl Pipeline {
    /// Build the production pipeline from configuration.
    ///
    /// Website strategies run in fixed order, cheapest and most reliable
    /// first: recipe-card scrape, structured data, full-page model
    /// extraction.
    pub fn from_config(config: &AppConfig) -> Result<Self, ExtractError> {
        let generator: Arc<dyn TextGenerator> = Arc::new(GeminiGenerator::new(&config.gemini)?);
        let uploader: Arc<dyn ImageUploader> = Arc::from(uploader_from_config(&config.images));

        let website_strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(ScraperStrategy::new(
                Arc::new(RecipeCardScraper::default()),
                Arc::clone(&uploader),
            )),
            Box::new(JsonLdStrategy::new(
                Arc::clone(&generator),
                Arc::clone(&uploader),
            )),
            Box::new(FullPageStrategy::new(
                Arc::clone(&generator),
                Arc::clone(&uploader),
            )),
        ];

        Ok(Pipeline {
            generator,
            uploader,
            website_strategies,
            video_strategy: None,
        })
    }

    /// Build a pipeline with injected collaborators and strategy order.
    /// Used by tests and by embedders with their own strategies.
    pub fn with_strategies(
        generator: Arc<dyn TextGenerator>,
        uploader: Arc<dyn ImageUploader>,
        website_strategies: Vec<Box<dyn Strategy>>,
    ) -> Self {
        Pipeline {
            generator,
            uploader,
            website_strategies,
            video_strategy: None,
        }
    }

    /// Replace the default video strategy (tests, custom oEmbed proxies).
    pub fn with_video_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.video_strategy = Some(strategy);
        self
    }

    /// Extract a recipe from `url`, translating into `target_language`
    /// when that is not English.
    pub async fn extract(
        &self,
        url: &str,
        target_language: &str,
    ) -> Result<Extraction, ExtractError> {
        let start = Instant::now();
        let platform = Platform::from_url(url);
        info!("Extracting {url} (platform: {})", platform.label());

        let (recipe, mut source) = if platform.is_video() {
            // No fallback for video: one shot, failure propagates.
            let default_strategy;
            let strategy: &dyn Strategy = match &self.video_strategy {
                Some(strategy) => strategy.as_ref(),
                None => {
                    default_strategy = VideoStrategy::new(
                        platform,
                        Arc::clone(&self.generator),
                        Arc::clone(&self.uploader),
                    );
                    &default_strategy
                }
            };
            let recipe = strategy.attempt(url).await?;
            (recipe, strategy.label().to_string())
        } else {
            self.run_website_chain(url).await?
        };

        info!(
            "SUCCESS via {source} ({:.2}s)",
            start.elapsed().as_secs_f64()
        );

        let recipe = if target_language.eq_ignore_ascii_case("english") {
            recipe
        } else {
            info!("Attempting translation to {target_language}...");
            let translated =
                translate_recipe(self.generator.as_ref(), recipe, target_language).await?;
            source = format!("{source}-translated-{}", target_language.to_lowercase());
            translated
        };

        Ok(Extraction {
            recipe,
            source,
            elapsed: start.elapsed(),
        })
    }

    /// Run the website strategies in order; each failure is swallowed and
    /// logged, only the last strategy's failure propagates.
    async fn run_website_chain(&self, url: &str) -> Result<(Recipe, String), ExtractError> {
        let total = self.website_strategies.len();
        let mut last_error = None;

        for (index, strategy) in self.website_strategies.iter().enumerate() {
            info!("Step {}/{total}: trying {}...", index + 1, strategy.label());
            match strategy.attempt(url).await {
                Ok(recipe) => return Ok((recipe, strategy.label().to_string())),
                Err(e) => {
                    warn!("{} failed: {e}", strategy.label());
                    last_error = Some(e);
                }
            }
        }

        let err = last_error
            .unwrap_or_else(|| ExtractError::Configuration("no strategies configured".into()));
        error!("ALL METHODS FAILED for {url}: {}", err.kind());
        Err(err)
    }
}
