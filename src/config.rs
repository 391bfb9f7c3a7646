use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Text-generation model settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Image hosting settings
    #[serde(default)]
    pub images: ImageConfig,
}

/// Settings for the Gemini text-generation backend.
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key (can also be set via RECIPE__GEMINI__API_KEY)
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the Generative Language API (override for tests/proxies)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds for model calls
    #[serde(default = "default_model_timeout")]
    pub timeout: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
            timeout: default_model_timeout(),
        }
    }
}

/// Settings for the image-hosting collaborator.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImageConfig {
    /// Upload endpoint; when unset, image URLs pass through unhosted
    pub upload_url: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model_timeout() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables with RECIPE__ prefix
    ///    (double underscore for nesting: RECIPE__GEMINI__API_KEY)
    /// 2. config.toml in the current directory
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("RECIPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
