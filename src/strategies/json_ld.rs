//! Embedded-structured-data strategy: find a `Recipe`-typed block in the
//! page's `application/ld+json` scripts, then have the model coerce it
//! into the canonical schema.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::ExtractError;
use crate::fetch::PageFetcher;
use crate::images::ImageUploader;
use crate::model::Recipe;
use crate::prompts::format_with_model;
use crate::providers::TextGenerator;
use crate::strategies::Strategy;

pub struct JsonLdStrategy {
    fetcher: PageFetcher,
    generator: Arc<dyn TextGenerator>,
    uploader: Arc<dyn ImageUploader>,
}

impl JsonLdStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, uploader: Arc<dyn ImageUploader>) -> Self {
        JsonLdStrategy {
            fetcher: PageFetcher::new(),
            generator,
            uploader,
        }
    }
}

#[async_trait]
impl Strategy for JsonLdStrategy {
    fn label(&self) -> &'static str {
        "json-ld"
    }

    async fn attempt(&self, url: &str) -> Result<Recipe, ExtractError> {
        let body = self.fetcher.fetch(url).await?;
        let raw = find_recipe_block(&body).ok_or(ExtractError::NoStructuredData)?;
        debug!("structured data block: {raw}");

        let mut recipe = format_with_model(self.generator.as_ref(), &raw, "json-ld", url).await?;

        // The model is not trusted with upload side effects; re-upload
        // whatever image it reported.
        if !recipe.image.url.is_empty() {
            recipe.image = self.uploader.upload(&recipe.image.url).await;
        }

        Ok(recipe)
    }
}

/// Scan all ld+json scripts for the first recipe-typed block.
/// Malformed scripts are skipped, not fatal.
fn find_recipe_block(body: &str) -> Option<Value> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("script[type='application/ld+json']").expect("static selector");

    for script in document.select(&selector) {
        let Ok(data) = serde_json::from_str::<Value>(&script.inner_html()) else {
            continue;
        };

        let found = match &data {
            Value::Array(items) => items.iter().find(|item| is_recipe_data(item)).cloned(),
            Value::Object(map) => {
                if type_says_recipe(map.get("@type")) {
                    Some(data.clone())
                } else if let Some(Value::Array(graph)) = map.get("@graph") {
                    graph.iter().find(|item| is_recipe_data(item)).cloned()
                } else if is_recipe_data(&data) {
                    Some(data.clone())
                } else {
                    None
                }
            }
            _ => None,
        };

        if found.is_some() {
            return found;
        }
    }
    None
}

/// Recipe predicate: `@type` is Recipe-ish, or recipe fields are present.
fn is_recipe_data(data: &Value) -> bool {
    let Some(map) = data.as_object() else {
        return false;
    };
    if type_says_recipe(map.get("@type")) {
        return true;
    }
    ["recipeIngredient", "ingredients", "recipeInstructions"]
        .iter()
        .any(|field| map.contains_key(*field))
}

fn type_says_recipe(item_type: Option<&Value>) -> bool {
    let Some(item_type) = item_type else {
        return false;
    };
    match item_type {
        Value::String(s) => {
            s == "Recipe" || s == "FoodRecipe" || s.to_lowercase().contains("recipe")
        }
        // "@type": ["Recipe", "NewsArticle"] style unions
        Value::Array(types) => types.iter().any(|t| type_says_recipe(Some(t))),
        _ => false,
    }
}
