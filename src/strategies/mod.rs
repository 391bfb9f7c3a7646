use async_trait::async_trait;

use crate::error::ExtractError;
use crate::model::Recipe;

mod full_page;
mod json_ld;
mod site_scraper;
mod video;

pub use full_page::FullPageStrategy;
pub use json_ld::JsonLdStrategy;
pub use site_scraper::{RecipeCardScraper, ScraperStrategy, SiteScraper};
pub use video::VideoStrategy;

/// One extraction method in the ordered fallback chain.
///
/// Every strategy returns a fully normalized canonical record or an error;
/// partially typed data never crosses this boundary.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Provenance label recorded as `source` when this strategy succeeds
    fn label(&self) -> &'static str;

    async fn attempt(&self, url: &str) -> Result<Recipe, ExtractError>;
}
