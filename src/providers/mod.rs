mod google;

pub use google::GeminiGenerator;

use async_trait::async_trait;

use crate::error::ExtractError;

/// Generation parameters for a single model call.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Request JSON-typed output from the model
    pub json_output: bool,
    /// Sampling temperature; None keeps the backend default
    pub temperature: Option<f64>,
}

impl GenerateOptions {
    /// JSON output at low temperature, used by the extraction prompts
    /// where determinism matters more than fluency.
    pub fn strict_json() -> Self {
        GenerateOptions {
            json_output: true,
            temperature: Some(0.1),
        }
    }

    /// JSON output at the backend's default temperature.
    pub fn json() -> Self {
        GenerateOptions {
            json_output: true,
            temperature: None,
        }
    }
}

/// Unified trait for text-generation backends.
///
/// Every model response is untrusted input: callers strip markdown fences
/// and run the result through the schema normalizer before use.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Generate a completion for the prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ExtractError>;
}
