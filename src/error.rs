use thiserror::Error;

/// Errors that can occur while extracting or translating a recipe
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Missing or invalid configuration (e.g. no API key for the model)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP request failed (network error, timeout or non-2xx status)
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The structured site scraper could not handle this page
    #[error("Site scraper failed: {0}")]
    Scrape(String),

    /// No recipe-typed structured data block was found in the page
    #[error("No valid structured recipe found")]
    NoStructuredData,

    /// The text-generation call itself failed
    #[error("Model call failed: {0}")]
    Provider(String),

    /// The model answered, but the answer was not valid JSON
    #[error("Model returned invalid JSON: {0}")]
    MalformedAiOutput(String),

    /// Translation failed after a recipe was already extracted
    #[error("Translation failed: {0}")]
    TranslationFailed(#[source] Box<ExtractError>),
}

impl ExtractError {
    /// Stable kind name, exposed as `error_type` in failure responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Configuration(_) => "ConfigurationError",
            ExtractError::Fetch(_) => "FetchError",
            ExtractError::Scrape(_) => "ScrapeError",
            ExtractError::NoStructuredData => "NoStructuredDataFound",
            ExtractError::Provider(_) => "ProviderError",
            ExtractError::MalformedAiOutput(_) => "MalformedAIOutput",
            ExtractError::TranslationFailed(_) => "TranslationFailed",
        }
    }
}
