//! Prompt construction and model-response plumbing shared by the
//! AI-backed strategies.

use log::error;
use serde_json::Value;

use crate::error::ExtractError;
use crate::model::Recipe;
use crate::normalize::normalize;
use crate::providers::{GenerateOptions, TextGenerator};

/// Extraction rules repeated verbatim in every structuring prompt.
const FIELD_RULES: &str = r#"INGREDIENTS RULES (VERY IMPORTANT):
- ONLY include actual ingredients with quantities
- DO NOT include section headers like "FOR THE SAUCE", "FOR THE TOPPING", "FOR THE SALAD", etc.
- DO NOT include blank lines or separators
- Each ingredient must have a quantity (e.g., "1 cup flour", "2 tablespoons sugar", "1/2 teaspoon salt")
- Format: ["quantity + unit + ingredient", "quantity + unit + ingredient", ...]
- Example: ["1 cup quinoa", "2 chicken breasts", "1/2 green bell pepper"]

INSTRUCTIONS RULES (VERY IMPORTANT):
- ONLY include actual cooking steps
- DO NOT include section headers like "FOR THE SAUCE", "FOR THE TOPPING", "FOR THE SALAD", etc.
- DO NOT include blank lines or separators
- Remove notes like "NOTE:", "TIP:", "CHEF'S NOTE:", etc.
- Each step should be a clear cooking action
- Combine steps from different sections into one continuous list
- Example: ["Add ingredients to pan and heat", "Bring to simmer for 2 minutes", "Assemble bowls with quinoa and toppings"]"#;

/// Prompt for structuring raw recipe data (structured markup, library
/// output) into the canonical schema.
pub fn format_prompt(raw: &Value, source: &str, url: &str) -> String {
    format!(
        r#"Convert this recipe data to EXACT JSON format.
Return ONLY valid JSON with proper syntax.

REQUIRED FORMAT:
{template}

SOURCE: {source}
URL: {url}

RAW DATA:
{raw}

CRITICAL RULES:
- Return ONLY the JSON object, no explanations
- Ensure all strings are properly quoted
- Times: INTEGER minutes (e.g., "1 hour 30 min" -> 90)
- Yields: INTEGER servings (e.g., "4-6 servings" -> 4)

{rules}

OTHER RULES:
- image: {{"url": "...", "key": null}} or extract from raw data
- Use 0 for missing integers, "" for strings, [] for lists

Return ONLY valid JSON:"#,
        template = Recipe::template_json(),
        raw = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()),
        rules = FIELD_RULES,
    )
}

/// Prompt for extracting a recipe from stripped page text.
pub fn full_page_prompt(page_text: &str, url: &str) -> String {
    format!(
        r#"Extract recipe information from this webpage content and return VALID JSON format.

CRITICAL: You MUST return ONLY valid JSON with proper syntax. No markdown, no explanations, no extra text.

REQUIRED FORMAT:
{template}

WEBPAGE CONTENT:
{page_text}

URL: {url}

RULES:
- Return ONLY the JSON object, nothing else
- Ensure all strings are properly quoted
- Ensure all arrays have proper commas between elements
- Times: INTEGER minutes (e.g., "1 hour 30 min" -> 90)
- Yields: INTEGER servings (e.g., "4-6 servings" -> 4)

{rules}

OTHER RULES:
- image: {{"url": "...", "key": null}}
- Use 0 for missing integers, "" for strings, [] for lists

Return ONLY valid JSON:"#,
        template = Recipe::template_json(),
        rules = FIELD_RULES,
    )
}

/// Prompt for extracting a recipe from a video the model must reason about.
pub fn video_prompt(
    platform_name: &str,
    url: &str,
    title_author: &str,
    image: &crate::model::RecipeImage,
) -> String {
    format!(
        r#"Extract a recipe from the {platform_name} video at: {url}
The video is {title_author}.

Return ONLY valid JSON in this EXACT format:
{template}

Instructions:
- title: Recipe name
- description: Short summary
- ingredients: List with quantities (e.g., ["1 onion", "2 cups flour"])
- instructions: Step-by-step list
- prep_time, cook_time, total_time: INTEGER minutes (use 0 if not mentioned)
- yields: INTEGER servings (use 0 if not mentioned)
- image: {{"url": "{image_url}", "key": {image_key}}}
- url: "{url}"
- host: "{platform_name}"

Return ONLY the JSON object."#,
        template = Recipe::template_json(),
        image_url = image.url,
        image_key = image
            .key
            .as_ref()
            .map(|k| format!("\"{k}\""))
            .unwrap_or_else(|| "null".to_string()),
    )
}

/// Prompt asking for the language name of a text sample.
pub fn detect_language_prompt(sample: &str) -> String {
    let sample: String = sample.chars().take(500).collect();
    format!(
        r#"Detect the language of the following text and return ONLY the language name in English (e.g., "english", "arabic", "spanish", "french").

Text: {sample}

Language:"#
    )
}

/// Prompt for translating the translatable field subset, values only.
pub fn translate_prompt(translatable: &Value, target_language: &str) -> String {
    format!(
        r#"Translate this JSON to {target_language}.

Rules:
- Keep JSON structure identical
- Do NOT translate field names (keys)
- Translate values only
- Return ONLY valid JSON

Original JSON:
{json}

Translated JSON:"#,
        json = serde_json::to_string_pretty(translatable)
            .unwrap_or_else(|_| translatable.to_string()),
    )
}

/// Strip an optional markdown code fence from a model response.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the fence line itself ("```json" or bare "```")
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim().trim_end_matches("```").trim()
}

/// Parse a model response as JSON, stripping fences first.
///
/// Invalid JSON is reported as [`ExtractError::MalformedAiOutput`] so it
/// stays distinguishable from a failed model call.
pub fn parse_json_response(text: &str) -> Result<Value, ExtractError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|e| {
        error!(
            "JSON parsing of model output failed: {e}; first 500 chars: {}",
            &cleaned.chars().take(500).collect::<String>()
        );
        ExtractError::MalformedAiOutput(e.to_string())
    })
}

/// Structure raw recipe data into a canonical record with one model call.
///
/// Shared by the structured-data strategy and any caller holding raw
/// heterogeneous data it wants coerced into the canonical schema.
pub async fn format_with_model(
    generator: &dyn TextGenerator,
    raw: &Value,
    source: &str,
    url: &str,
) -> Result<Recipe, ExtractError> {
    let prompt = format_prompt(raw, source, url);
    let response = generator
        .generate(&prompt, &GenerateOptions::strict_json())
        .await?;
    let value = parse_json_response(&response)?;
    Ok(normalize(&value))
}
