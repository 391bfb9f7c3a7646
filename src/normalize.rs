//! The last line of defense between arbitrary raw data (library output,
//! structured markup, model JSON) and the canonical record.

use serde_json::Value;

use crate::model::{Recipe, RecipeImage};
use crate::parsers::{parse_minutes, parse_servings};

/// Coerce an arbitrary JSON value into a canonical [`Recipe`].
///
/// Total function: missing fields keep their zero-values and wrongly
/// typed fields are coerced or dropped, so this never fails. Applying it
/// to an already-canonical record is a no-op.
pub fn normalize(raw: &Value) -> Recipe {
    let mut recipe = Recipe::default();
    let Some(map) = raw.as_object() else {
        return recipe;
    };

    if let Some(value) = map.get("title") {
        recipe.title = coerce_string(value);
    }
    if let Some(value) = map.get("description") {
        recipe.description = coerce_string(value);
    }
    if let Some(value) = map.get("prep_time") {
        recipe.prep_time = coerce_minutes(value);
    }
    if let Some(value) = map.get("cook_time") {
        recipe.cook_time = coerce_minutes(value);
    }
    if let Some(value) = map.get("total_time") {
        recipe.total_time = coerce_minutes(value);
    }
    if let Some(value) = map.get("yields") {
        recipe.yields = coerce_servings(value);
    }
    if let Some(value) = map.get("ingredients") {
        recipe.ingredients = coerce_list(value);
    }
    if let Some(value) = map.get("instructions") {
        recipe.instructions = coerce_list(value);
    }
    if let Some(value) = map.get("image") {
        recipe.image = coerce_image(value);
    }
    if let Some(value) = map.get("url") {
        recipe.url = coerce_string(value);
    }
    if let Some(value) = map.get("host") {
        recipe.host = coerce_string(value);
    }

    recipe
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_minutes(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        Value::String(s) => parse_minutes(s),
        _ => 0,
    }
}

fn coerce_servings(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        Value::String(s) => parse_servings(s),
        _ => 0,
    }
}

/// Lists pass through with entries stringified; a truthy scalar becomes a
/// single-element list; falsy scalars become the empty list.
fn coerce_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(entry_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::Null => Vec::new(),
        Value::String(s) if s.is_empty() => Vec::new(),
        other => {
            let text = entry_to_string(other);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    }
}

fn entry_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Dicts pass through `{url, key}`; a bare string is the legacy image form
/// and is read as a URL with no storage key.
fn coerce_image(value: &Value) -> RecipeImage {
    match value {
        Value::Object(map) => RecipeImage {
            url: map.get("url").map(coerce_string).unwrap_or_default(),
            key: map
                .get("key")
                .and_then(|k| k.as_str())
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        },
        Value::String(s) => RecipeImage {
            url: s.clone(),
            key: None,
        },
        _ => RecipeImage::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizing_a_canonical_record_is_identity() {
        let recipe = Recipe {
            title: "Waffles".into(),
            description: "Crisp breakfast waffles".into(),
            prep_time: 10,
            cook_time: 15,
            total_time: 25,
            yields: 4,
            ingredients: vec!["2 eggs".into(), "1 cup flour".into()],
            instructions: vec!["Whisk eggs".into(), "Bake in waffle iron".into()],
            image: RecipeImage {
                url: "https://img.example/waffles.jpg".into(),
                key: Some("waffles-1".into()),
            },
            url: "https://example.com/waffles".into(),
            host: "example.com".into(),
        };

        let raw = serde_json::to_value(&recipe).unwrap();
        assert_eq!(normalize(&raw), recipe);
    }

    #[test]
    fn missing_fields_keep_zero_values() {
        let normalized = normalize(&json!({ "title": "Soup" }));
        assert_eq!(normalized.title, "Soup");
        assert_eq!(normalized.description, "");
        assert_eq!(normalized.total_time, 0);
        assert!(normalized.ingredients.is_empty());
        assert_eq!(normalized.image, RecipeImage::default());
    }

    #[test]
    fn string_times_and_yields_run_through_the_parsers() {
        let normalized = normalize(&json!({
            "prep_time": "15 minutes",
            "cook_time": "PT1H30M",
            "total_time": "not stated",
            "yields": "4-6 servings",
        }));
        assert_eq!(normalized.prep_time, 15);
        assert_eq!(normalized.cook_time, 90);
        assert_eq!(normalized.total_time, 0);
        assert_eq!(normalized.yields, 4);
    }

    #[test]
    fn scalar_list_fields_are_wrapped() {
        let normalized = normalize(&json!({
            "ingredients": "1 onion",
            "instructions": ["Chop", "", "  ", "Fry"],
        }));
        assert_eq!(normalized.ingredients, vec!["1 onion"]);
        assert_eq!(normalized.instructions, vec!["Chop", "Fry"]);
    }

    #[test]
    fn legacy_string_image_becomes_url_without_key() {
        let normalized = normalize(&json!({ "image": "https://img.example/a.jpg" }));
        assert_eq!(normalized.image.url, "https://img.example/a.jpg");
        assert!(normalized.image.key.is_none());
    }

    #[test]
    fn garbage_never_panics() {
        assert_eq!(normalize(&json!(null)), Recipe::default());
        assert_eq!(normalize(&json!([1, 2, 3])), Recipe::default());
        let normalized = normalize(&json!({
            "title": {"nested": true},
            "prep_time": [1],
            "image": 42,
            "yields": null,
        }));
        assert_eq!(normalized.title, "");
        assert_eq!(normalized.prep_time, 0);
        assert_eq!(normalized.image, RecipeImage::default());
    }

    #[test]
    fn out_of_range_numbers_clamp_to_zero() {
        let normalized = normalize(&json!({ "prep_time": -5, "yields": -1 }));
        assert_eq!(normalized.prep_time, 0);
        assert_eq!(normalized.yields, 0);

        let normalized = normalize(&json!({
            "prep_time": u64::from(u32::MAX) + 1,
            "yields": u64::MAX,
        }));
        assert_eq!(normalized.prep_time, 0);
        assert_eq!(normalized.yields, 0);
    }
}
