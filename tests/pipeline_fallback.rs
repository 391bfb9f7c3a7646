//! Fallback-chain ordering and translation gating, with instrumented
//! strategies instead of network calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use recipe_extract::error::ExtractError;
use recipe_extract::images::PassthroughUploader;
use recipe_extract::model::Recipe;
use recipe_extract::pipeline::Pipeline;
use recipe_extract::providers::{GenerateOptions, TextGenerator};
use recipe_extract::strategies::Strategy;

struct CountingStrategy {
    label: &'static str,
    calls: Arc<AtomicUsize>,
    outcome: Result<Recipe, &'static str>,
}

impl CountingStrategy {
    fn succeeding(label: &'static str, calls: Arc<AtomicUsize>, title: &str) -> Box<Self> {
        Box::new(CountingStrategy {
            label,
            calls,
            outcome: Ok(Recipe {
                title: title.to_string(),
                ..Recipe::default()
            }),
        })
    }

    fn failing(label: &'static str, calls: Arc<AtomicUsize>, message: &'static str) -> Box<Self> {
        Box::new(CountingStrategy {
            label,
            calls,
            outcome: Err(message),
        })
    }
}

#[async_trait]
impl Strategy for CountingStrategy {
    fn label(&self) -> &'static str {
        self.label
    }

    async fn attempt(&self, _url: &str) -> Result<Recipe, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(recipe) => Ok(recipe.clone()),
            Err(message) => Err(ExtractError::Scrape(message.to_string())),
        }
    }
}

/// Generator whose scripted responses drive detection/translation.
struct ScriptedGenerator {
    responses: std::sync::Mutex<Vec<String>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGenerator {
    fn new(responses: Vec<&str>, calls: Arc<AtomicUsize>) -> Arc<Self> {
        let mut responses: Vec<String> = responses.into_iter().map(String::from).collect();
        responses.reverse();
        Arc::new(ScriptedGenerator {
            responses: std::sync::Mutex::new(responses),
            calls,
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ExtractError::Provider("script exhausted".to_string()))
    }
}

fn pipeline_with(
    strategies: Vec<Box<dyn Strategy>>,
    generator: Arc<dyn TextGenerator>,
) -> Pipeline {
    Pipeline::with_strategies(generator, Arc::new(PassthroughUploader), strategies)
}

#[tokio::test]
async fn first_success_short_circuits_the_chain() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let third = Arc::new(AtomicUsize::new(0));
    let model_calls = Arc::new(AtomicUsize::new(0));

    let pipeline = pipeline_with(
        vec![
            CountingStrategy::succeeding("recipe-scraper", Arc::clone(&first), "Waffles"),
            CountingStrategy::failing("json-ld", Arc::clone(&second), "unused"),
            CountingStrategy::failing("gemini", Arc::clone(&third), "unused"),
        ],
        ScriptedGenerator::new(vec![], Arc::clone(&model_calls)),
    );

    let extraction = pipeline
        .extract("https://example.com/waffles", "english")
        .await
        .unwrap();

    assert_eq!(extraction.source, "recipe-scraper");
    assert_eq!(extraction.recipe.title, "Waffles");
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
    assert_eq!(third.load(Ordering::SeqCst), 0);
    // English target: no detection or translation calls either
    assert_eq!(model_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failures_escalate_in_order() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let third = Arc::new(AtomicUsize::new(0));

    let pipeline = pipeline_with(
        vec![
            CountingStrategy::failing("recipe-scraper", Arc::clone(&first), "no card"),
            CountingStrategy::failing("json-ld", Arc::clone(&second), "no block"),
            CountingStrategy::succeeding("gemini", Arc::clone(&third), "Stew"),
        ],
        ScriptedGenerator::new(vec![], Arc::new(AtomicUsize::new(0))),
    );

    let extraction = pipeline
        .extract("https://example.com/stew", "english")
        .await
        .unwrap();

    assert_eq!(extraction.source, "gemini");
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(third.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn last_failure_propagates_when_all_strategies_fail() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = pipeline_with(
        vec![
            CountingStrategy::failing("recipe-scraper", Arc::clone(&calls), "no card"),
            CountingStrategy::failing("json-ld", Arc::clone(&calls), "no block"),
            CountingStrategy::failing("gemini", Arc::clone(&calls), "model refused"),
        ],
        ScriptedGenerator::new(vec![], Arc::new(AtomicUsize::new(0))),
    );

    let err = pipeline
        .extract("https://example.com/nothing", "english")
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(err.to_string().contains("model refused"));
}

#[tokio::test]
async fn video_urls_bypass_the_website_chain() {
    let website_calls = Arc::new(AtomicUsize::new(0));
    let video_calls = Arc::new(AtomicUsize::new(0));

    let pipeline = pipeline_with(
        vec![CountingStrategy::succeeding(
            "recipe-scraper",
            Arc::clone(&website_calls),
            "unused",
        )],
        ScriptedGenerator::new(vec![], Arc::new(AtomicUsize::new(0))),
    )
    .with_video_strategy(CountingStrategy::succeeding(
        "tiktok-video",
        Arc::clone(&video_calls),
        "Pan-fried noodles",
    ));

    let extraction = pipeline
        .extract("https://www.tiktok.com/@cook/video/42", "english")
        .await
        .unwrap();

    assert_eq!(extraction.source, "tiktok-video");
    assert_eq!(extraction.recipe.title, "Pan-fried noodles");
    assert_eq!(video_calls.load(Ordering::SeqCst), 1);
    assert_eq!(website_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn video_failure_propagates_without_fallback() {
    let website_calls = Arc::new(AtomicUsize::new(0));
    let video_calls = Arc::new(AtomicUsize::new(0));

    let pipeline = pipeline_with(
        vec![CountingStrategy::succeeding(
            "recipe-scraper",
            Arc::clone(&website_calls),
            "unused",
        )],
        ScriptedGenerator::new(vec![], Arc::new(AtomicUsize::new(0))),
    )
    .with_video_strategy(CountingStrategy::failing(
        "youtube-video",
        Arc::clone(&video_calls),
        "no captions",
    ));

    let err = pipeline
        .extract("https://www.youtube.com/watch?v=abc", "english")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "ScrapeError");
    assert!(err.to_string().contains("no captions"));
    assert_eq!(video_calls.load(Ordering::SeqCst), 1);
    // The website chain is never a fallback for video URLs
    assert_eq!(website_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn translation_runs_for_non_english_targets() {
    let strategy_calls = Arc::new(AtomicUsize::new(0));
    let model_calls = Arc::new(AtomicUsize::new(0));

    let generator = ScriptedGenerator::new(
        vec![
            // language detection
            "english",
            // translation payload
            r#"{"title": "Gofres", "description": "", "ingredients": ["2 huevos"], "instructions": ["Batir"]}"#,
        ],
        Arc::clone(&model_calls),
    );

    let pipeline = pipeline_with(
        vec![CountingStrategy::succeeding(
            "recipe-scraper",
            Arc::clone(&strategy_calls),
            "Waffles",
        )],
        generator,
    );

    let extraction = pipeline
        .extract("https://example.com/waffles", "Spanish")
        .await
        .unwrap();

    assert_eq!(extraction.source, "recipe-scraper-translated-spanish");
    assert_eq!(extraction.recipe.title, "Gofres");
    assert_eq!(model_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn matching_detected_language_skips_translation_but_keeps_suffix() {
    let generator = ScriptedGenerator::new(vec!["spanish"], Arc::new(AtomicUsize::new(0)));

    let pipeline = pipeline_with(
        vec![CountingStrategy::succeeding(
            "recipe-scraper",
            Arc::new(AtomicUsize::new(0)),
            "Gofres",
        )],
        generator,
    );

    let extraction = pipeline
        .extract("https://example.com/gofres", "spanish")
        .await
        .unwrap();

    // Record unchanged, provenance still notes the requested language
    assert_eq!(extraction.recipe.title, "Gofres");
    assert_eq!(extraction.source, "recipe-scraper-translated-spanish");
}

#[tokio::test]
async fn translation_failure_fails_the_whole_request() {
    let generator = ScriptedGenerator::new(
        vec!["english", "not json"],
        Arc::new(AtomicUsize::new(0)),
    );

    let pipeline = pipeline_with(
        vec![CountingStrategy::succeeding(
            "recipe-scraper",
            Arc::new(AtomicUsize::new(0)),
            "Waffles",
        )],
        generator,
    );

    let err = pipeline
        .extract("https://example.com/waffles", "french")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "TranslationFailed");
}
