//! Language detection and all-or-nothing recipe translation.

use log::info;
use serde_json::json;

use crate::error::ExtractError;
use crate::model::Recipe;
use crate::prompts::{detect_language_prompt, parse_json_response, translate_prompt};
use crate::providers::{GenerateOptions, TextGenerator};

/// Detect the language of a text sample, as a lowercase English name
/// ("english", "spanish", ...).
pub async fn detect_language(
    generator: &dyn TextGenerator,
    text: &str,
) -> Result<String, ExtractError> {
    let prompt = detect_language_prompt(text);
    let response = generator
        .generate(&prompt, &GenerateOptions::default())
        .await?;
    Ok(response.trim().to_lowercase())
}

/// Translate a recipe into `target_language` if it is not already in it.
///
/// Only `title`, `description`, `ingredients` and `instructions` are
/// translated; timing, yields, image, url and host stay untouched. When
/// the detected language already matches the target this is a logged
/// no-op. Any failure maps to `TranslationFailed`: a caller who asked for
/// a translated recipe must not silently get the wrong language.
pub async fn translate_recipe(
    generator: &dyn TextGenerator,
    recipe: Recipe,
    target_language: &str,
) -> Result<Recipe, ExtractError> {
    translate_inner(generator, recipe, target_language)
        .await
        .map_err(|e| match e {
            ExtractError::TranslationFailed(_) => e,
            other => ExtractError::TranslationFailed(Box::new(other)),
        })
}

async fn translate_inner(
    generator: &dyn TextGenerator,
    mut recipe: Recipe,
    target_language: &str,
) -> Result<Recipe, ExtractError> {
    let sample = format!("{} {}", recipe.title, recipe.description);
    let current_language = detect_language(generator, &sample).await?;

    if current_language.eq_ignore_ascii_case(target_language) {
        info!("Recipe is already in {target_language}, skipping translation");
        return Ok(recipe);
    }

    let translatable = json!({
        "title": recipe.title,
        "description": recipe.description,
        "ingredients": recipe.ingredients,
        "instructions": recipe.instructions,
    });

    let prompt = translate_prompt(&translatable, target_language);
    let response = generator.generate(&prompt, &GenerateOptions::json()).await?;
    let translated = parse_json_response(&response)?;

    if let Some(title) = translated.get("title").and_then(|v| v.as_str()) {
        recipe.title = title.to_string();
    }
    if let Some(description) = translated.get("description").and_then(|v| v.as_str()) {
        recipe.description = description.to_string();
    }
    if let Some(ingredients) = translated.get("ingredients").and_then(|v| v.as_array()) {
        recipe.ingredients = ingredients
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect();
    }
    if let Some(instructions) = translated.get("instructions").and_then(|v| v.as_array()) {
        recipe.instructions = instructions
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect();
    }

    info!("Successfully translated recipe from {current_language} to {target_language}");
    Ok(recipe)
}
