use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Hosted copy of a recipe image.
///
/// `key` is the opaque storage reference returned by the image host,
/// `None` when no upload happened and the original URL is passed through.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipeImage {
    pub url: String,
    pub key: Option<String>,
}

/// The canonical recipe record produced by every extraction strategy.
///
/// Field names, types and zero-values are a compatibility contract:
/// downstream consumers depend on this exact JSON shape. Unknown values
/// are `""`, `0` or `[]`, never null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub description: String,
    pub prep_time: u32,
    pub cook_time: u32,
    pub total_time: u32,
    pub yields: u32,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub image: RecipeImage,
    pub url: String,
    pub host: String,
}

impl Recipe {
    /// Render the zero-value record as pretty JSON.
    ///
    /// Used as the schema scaffold inside model prompts, so the prompt and
    /// the serialized output can never drift apart.
    pub fn template_json() -> String {
        serde_json::to_string_pretty(&Recipe::default())
            .unwrap_or_else(|_| "{}".to_string())
    }
}

/// Success envelope returned to callers.
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub source: String,
    pub processing_time: f64,
    pub data: Recipe,
}

impl ScrapeResponse {
    pub fn new(recipe: Recipe, source: String, elapsed_secs: f64) -> Self {
        ScrapeResponse {
            success: true,
            source,
            processing_time: (elapsed_secs * 1000.0).round() / 1000.0,
            data: recipe,
        }
    }
}

/// Failure envelope. Carries a fixed user message and the error kind name;
/// never the underlying error detail.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_type: String,
}

impl ErrorResponse {
    pub fn from_error(err: &ExtractError) -> Self {
        ErrorResponse {
            success: false,
            message: "Cannot scrape recipe from this site".to_string(),
            error_type: err.kind().to_string(),
        }
    }
}
