use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::GeminiConfig;
use crate::error::ExtractError;
use crate::providers::{GenerateOptions, TextGenerator};

/// Google Gemini text-generation backend.
#[derive(Debug)]
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiGenerator {
    /// Create a generator from configuration.
    ///
    /// A missing API key is a configuration error raised here, before any
    /// network call is attempted.
    pub fn new(config: &GeminiConfig) -> Result<Self, ExtractError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                ExtractError::Configuration(
                    "GEMINI_API_KEY not found in config or environment".to_string(),
                )
            })?;

        // reqwest has no default request timeout; model calls need one
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to create HTTP client");

        Ok(GeminiGenerator {
            client,
            api_key,
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ExtractError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let mut generation_config = serde_json::Map::new();
        if options.json_output {
            generation_config.insert(
                "responseMimeType".to_string(),
                json!("application/json"),
            );
        }
        if let Some(temperature) = options.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": Value::Object(generation_config),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExtractError::Provider(format!(
                "Gemini request failed with status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        debug!("Gemini response: {body:?}");

        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ExtractError::Provider(
                    "Failed to extract content from Gemini response".to_string(),
                )
            })
    }
}
