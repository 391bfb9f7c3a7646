//! AI-full-page strategy: the unconditional last resort. Strips the page
//! down to visible text and asks the model to produce the canonical
//! record directly.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Node};

use crate::error::ExtractError;
use crate::fetch::PageFetcher;
use crate::images::ImageUploader;
use crate::model::Recipe;
use crate::normalize::normalize;
use crate::prompts::{full_page_prompt, parse_json_response};
use crate::providers::{GenerateOptions, TextGenerator};
use crate::strategies::Strategy;

/// Hard cap on prompt text, a token-budget guard against oversized pages.
const MAX_PAGE_CHARS: usize = 12_000;

pub struct FullPageStrategy {
    fetcher: PageFetcher,
    generator: Arc<dyn TextGenerator>,
    uploader: Arc<dyn ImageUploader>,
}

impl FullPageStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, uploader: Arc<dyn ImageUploader>) -> Self {
        FullPageStrategy {
            fetcher: PageFetcher::new(),
            generator,
            uploader,
        }
    }
}

#[async_trait]
impl Strategy for FullPageStrategy {
    fn label(&self) -> &'static str {
        "gemini"
    }

    async fn attempt(&self, url: &str) -> Result<Recipe, ExtractError> {
        let body = self.fetcher.fetch(url).await?;
        let text = visible_text(&body);

        let prompt = full_page_prompt(&text, url);
        let response = self
            .generator
            .generate(&prompt, &GenerateOptions::strict_json())
            .await?;
        let value = parse_json_response(&response)?;
        let mut recipe = normalize(&value);

        if !recipe.image.url.is_empty() {
            recipe.image = self.uploader.upload(&recipe.image.url).await;
        }

        Ok(recipe)
    }
}

const SKIPPED_TAGS: &[&str] = &["script", "style", "header", "footer", "nav", "aside"];

/// Visible page text: non-content tags dropped, whitespace collapsed,
/// truncated to the prompt budget on a char boundary.
fn visible_text(body: &str) -> String {
    let document = Html::parse_document(body);
    let mut parts = Vec::new();
    collect_text(&document.root_element(), &mut parts);

    let text = parts.join(" ");
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_PAGE_CHARS).collect()
}

fn collect_text(element: &ElementRef, parts: &mut Vec<String>) {
    if SKIPPED_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, parts);
                }
            }
            _ => {}
        }
    }
}
