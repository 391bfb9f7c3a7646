//! Structured-scraper strategy: a site-scraping collaborator produces raw
//! recipe fields which are normalized locally, with no model call.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use scraper::{Html, Selector};
use serde_json::{json, Value};

use crate::error::ExtractError;
use crate::fetch::PageFetcher;
use crate::images::ImageUploader;
use crate::model::Recipe;
use crate::parsers::{parse_minutes, parse_servings};
use crate::strategies::Strategy;

/// Site-scraping collaborator keyed by URL.
///
/// Returns a raw JSON object with at least `{title, description,
/// prep_time, cook_time, total_time, yields|servings, image, url, host,
/// ingredients, instructions}` and fails on unsupported sites.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<Value, ExtractError>;
}

/// Tries a site scrape and coerces its raw output into the canonical record.
pub struct ScraperStrategy {
    scraper: Arc<dyn SiteScraper>,
    uploader: Arc<dyn ImageUploader>,
}

impl ScraperStrategy {
    pub fn new(scraper: Arc<dyn SiteScraper>, uploader: Arc<dyn ImageUploader>) -> Self {
        ScraperStrategy { scraper, uploader }
    }
}

#[async_trait]
impl Strategy for ScraperStrategy {
    fn label(&self) -> &'static str {
        "recipe-scraper"
    }

    async fn attempt(&self, url: &str) -> Result<Recipe, ExtractError> {
        let raw = self.scraper.scrape(url).await.map_err(|e| {
            warn!("site scraper failed: {e}");
            e
        })?;
        debug!("site scraper raw data: {raw}");

        let mut recipe = Recipe {
            title: string_field(&raw, "title"),
            description: string_field(&raw, "description"),
            prep_time: parse_minutes(&string_field(&raw, "prep_time")),
            cook_time: parse_minutes(&string_field(&raw, "cook_time")),
            total_time: parse_minutes(&string_field(&raw, "total_time")),
            url: string_field(&raw, "url"),
            host: string_field(&raw, "host"),
            ..Recipe::default()
        };

        let yields_text = {
            let yields = string_field(&raw, "yields");
            if yields.is_empty() {
                string_field(&raw, "servings")
            } else {
                yields
            }
        };
        recipe.yields = parse_servings(&yields_text);

        recipe.image = self.uploader.upload(&string_field(&raw, "image")).await;

        recipe.ingredients = list_field(raw.get("ingredients"));
        recipe.instructions = instructions_field(raw.get("instructions"));

        Ok(recipe)
    }
}

fn string_field(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn list_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Instructions may come back as one newline-joined string; split it into
/// per-step entries.
fn instructions_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        other => list_field(other),
    }
}

/// Scraper for sites using a known recipe-card plugin markup
/// (WordPress Recipe Maker, Tasty Recipes, Create by Mediavine).
///
/// Plays the role of the structured scraping library: cheap, reliable on
/// supported sites, and an error everywhere else.
pub struct RecipeCardScraper {
    fetcher: PageFetcher,
}

impl Default for RecipeCardScraper {
    fn default() -> Self {
        RecipeCardScraper {
            fetcher: PageFetcher::new(),
        }
    }
}

#[async_trait]
impl SiteScraper for RecipeCardScraper {
    async fn scrape(&self, url: &str) -> Result<Value, ExtractError> {
        let body = self.fetcher.fetch(url).await?;
        parse_recipe_card(&body, url)
    }
}

const TITLE_CLASSES: &[&str] = &["wprm-recipe-name", "tasty-recipes-title", "mv-create-title"];
const DESCRIPTION_CLASSES: &[&str] = &[
    "wprm-recipe-summary",
    "tasty-recipes-description",
    "mv-create-description",
];
const INGREDIENT_CLASSES: &[&str] = &[
    "wprm-recipe-ingredients-container",
    "tasty-recipes-ingredients",
    "mv-create-ingredients",
];
const INSTRUCTION_CLASSES: &[&str] = &[
    "wprm-recipe-instructions-container",
    "tasty-recipes-instructions",
    "mv-create-instructions",
];
const PREP_TIME_CLASSES: &[&str] = &[
    "wprm-recipe-prep-time",
    "tasty-recipes-prep-time",
    "mv-create-time-prep",
];
const COOK_TIME_CLASSES: &[&str] = &[
    "wprm-recipe-cook-time",
    "tasty-recipes-cook-time",
    "mv-create-time-active",
];
const TOTAL_TIME_CLASSES: &[&str] = &[
    "wprm-recipe-total-time",
    "tasty-recipes-total-time",
    "mv-create-time-total",
];
const SERVINGS_CLASSES: &[&str] = &[
    "wprm-recipe-servings",
    "tasty-recipes-yield",
    "mv-create-yield",
];

fn parse_recipe_card(body: &str, url: &str) -> Result<Value, ExtractError> {
    let document = Html::parse_document(body);

    let title = find_text(&document, TITLE_CLASSES)
        .ok_or_else(|| ExtractError::Scrape("no supported recipe card markup".to_string()))?;

    let ingredients = find_list_items(&document, INGREDIENT_CLASSES);
    let instructions = find_list_items(&document, INSTRUCTION_CLASSES);
    if ingredients.is_empty() && instructions.is_empty() {
        return Err(ExtractError::Scrape(
            "recipe card has no ingredients or instructions".to_string(),
        ));
    }

    Ok(json!({
        "title": title,
        "description": find_text(&document, DESCRIPTION_CLASSES).unwrap_or_default(),
        "prep_time": find_text(&document, PREP_TIME_CLASSES).unwrap_or_default(),
        "cook_time": find_text(&document, COOK_TIME_CLASSES).unwrap_or_default(),
        "total_time": find_text(&document, TOTAL_TIME_CLASSES).unwrap_or_default(),
        "yields": find_text(&document, SERVINGS_CLASSES).unwrap_or_default(),
        "image": find_card_image(&document).unwrap_or_default(),
        "url": url,
        "host": host_of(url),
        "ingredients": ingredients,
        "instructions": instructions,
    }))
}

fn find_text(document: &Html, classes: &[&str]) -> Option<String> {
    for class in classes {
        let Ok(selector) = Selector::parse(&format!(".{class}")) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text =
                html_escape::decode_html_entities(text.trim()).into_owned();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn find_list_items(document: &Html, classes: &[&str]) -> Vec<String> {
    let li_selector = Selector::parse("li").expect("static selector");
    for class in classes {
        let Ok(selector) = Selector::parse(&format!(".{class}")) else {
            continue;
        };
        let mut items = Vec::new();
        for container in document.select(&selector) {
            for li in container.select(&li_selector) {
                let text = li.text().collect::<Vec<_>>().join(" ");
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !text.is_empty() {
                    items.push(html_escape::decode_html_entities(&text).into_owned());
                }
            }
        }
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

fn find_card_image(document: &Html) -> Option<String> {
    let selector = Selector::parse(
        ".wprm-recipe-image img, .tasty-recipes-image img, .mv-create-image img",
    )
    .expect("static selector");
    document
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

/// Host portion of a URL, without scheme, port or path.
fn host_of(url: &str) -> String {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .trim_start_matches("www.")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::PassthroughUploader;

    const CARD_HTML: &str = r#"
        <html><body>
            <h2 class="wprm-recipe-name">Chocolate Chip Cookies</h2>
            <div class="wprm-recipe-summary">Soft and chewy</div>
            <div class="wprm-recipe-image"><img src="https://img.example/cookie.jpg"></div>
            <div class="wprm-recipe-ingredients-container">
                <ul>
                    <li>2 cups flour</li>
                    <li>1 cup butter</li>
                </ul>
            </div>
            <div class="wprm-recipe-instructions-container">
                <ul>
                    <li>Mix the dough</li>
                    <li>Bake for 12 minutes</li>
                </ul>
            </div>
            <span class="wprm-recipe-prep-time">15 minutes</span>
            <span class="wprm-recipe-cook-time">12 minutes</span>
            <span class="wprm-recipe-servings">24</span>
        </body></html>
    "#;

    #[test]
    fn parses_wprm_recipe_card() {
        let raw = parse_recipe_card(CARD_HTML, "https://example.com/cookies").unwrap();
        assert_eq!(raw["title"], "Chocolate Chip Cookies");
        assert_eq!(raw["prep_time"], "15 minutes");
        assert_eq!(raw["yields"], "24");
        assert_eq!(raw["host"], "example.com");
        assert_eq!(raw["ingredients"].as_array().unwrap().len(), 2);
        assert_eq!(raw["image"], "https://img.example/cookie.jpg");
    }

    #[test]
    fn rejects_pages_without_a_card() {
        let err =
            parse_recipe_card("<html><body><p>blog post</p></body></html>", "https://x.test")
                .unwrap_err();
        assert_eq!(err.kind(), "ScrapeError");
    }

    #[test]
    fn host_strips_scheme_port_and_path() {
        assert_eq!(host_of("https://www.example.com:8080/r/1"), "example.com");
        assert_eq!(host_of("example.org/r"), "example.org");
    }

    struct FixedScraper(Value);

    #[async_trait]
    impl SiteScraper for FixedScraper {
        async fn scrape(&self, _url: &str) -> Result<Value, ExtractError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn strategy_normalizes_raw_fields() {
        let raw = json!({
            "title": "Waffles",
            "description": "Breakfast",
            "prep_time": "10 min",
            "cook_time": "PT15M",
            "total_time": "25 minutes",
            "yields": "4-6 servings",
            "image": "https://img.example/w.jpg",
            "url": "https://example.com/waffles",
            "host": "example.com",
            "ingredients": ["2 eggs", "", "1 cup flour"],
            "instructions": "Whisk eggs\n\n  Bake in iron  ",
        });

        let strategy = ScraperStrategy::new(
            Arc::new(FixedScraper(raw)),
            Arc::new(PassthroughUploader),
        );
        let recipe = strategy.attempt("https://example.com/waffles").await.unwrap();

        assert_eq!(recipe.title, "Waffles");
        assert_eq!(recipe.prep_time, 10);
        assert_eq!(recipe.cook_time, 15);
        assert_eq!(recipe.total_time, 25);
        assert_eq!(recipe.yields, 4);
        assert_eq!(recipe.ingredients, vec!["2 eggs", "1 cup flour"]);
        assert_eq!(recipe.instructions, vec!["Whisk eggs", "Bake in iron"]);
        assert_eq!(recipe.image.url, "https://img.example/w.jpg");
    }

    #[tokio::test]
    async fn servings_fall_back_to_the_servings_field() {
        let raw = json!({ "title": "Soup", "servings": "Serves 8", "ingredients": ["x"] });
        let strategy = ScraperStrategy::new(
            Arc::new(FixedScraper(raw)),
            Arc::new(PassthroughUploader),
        );
        let recipe = strategy.attempt("https://example.com/soup").await.unwrap();
        assert_eq!(recipe.yields, 8);
    }
}
