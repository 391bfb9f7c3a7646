//! Video strategy: oEmbed metadata plus a model call that reasons about
//! the video itself. No fallback: video extraction either works or the
//! whole request fails.

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use serde::Deserialize;

use crate::error::ExtractError;
use crate::fetch::HTTP_TIMEOUT;
use crate::images::ImageUploader;
use crate::model::Recipe;
use crate::normalize::normalize;
use crate::platform::Platform;
use crate::prompts::{parse_json_response, video_prompt};
use crate::providers::{GenerateOptions, TextGenerator};
use crate::strategies::Strategy;

#[derive(Debug, Default, Deserialize)]
struct OembedMetadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    thumbnail_url: String,
}

pub struct VideoStrategy {
    platform: Platform,
    generator: Arc<dyn TextGenerator>,
    uploader: Arc<dyn ImageUploader>,
    client: reqwest::Client,
    oembed_base: Option<String>,
}

impl VideoStrategy {
    pub fn new(
        platform: Platform,
        generator: Arc<dyn TextGenerator>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        VideoStrategy {
            platform,
            generator,
            uploader,
            client,
            oembed_base: None,
        }
    }

    /// Override the oEmbed endpoint (tests, proxies).
    pub fn with_oembed_base(mut self, base: impl Into<String>) -> Self {
        self.oembed_base = Some(base.into());
        self
    }

    fn oembed_url(&self, video_url: &str) -> Option<String> {
        let base = match &self.oembed_base {
            Some(base) => base.clone(),
            None => match self.platform {
                Platform::TikTok => "https://www.tiktok.com/oembed".to_string(),
                Platform::YouTube => "https://www.youtube.com/oembed".to_string(),
                Platform::Website => return None,
            },
        };
        Some(format!("{base}?url={}", urlencode(video_url)))
    }

    /// Fetch oEmbed metadata; any failure degrades to empty metadata since
    /// it is enrichment only.
    async fn fetch_metadata(&self, video_url: &str) -> OembedMetadata {
        let Some(oembed_url) = self.oembed_url(video_url) else {
            return OembedMetadata::default();
        };

        let result = async {
            self.client
                .get(&oembed_url)
                .send()
                .await?
                .error_for_status()?
                .json::<OembedMetadata>()
                .await
        }
        .await;

        match result {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(
                    "Failed to fetch {} metadata: {e}",
                    self.platform.label()
                );
                OembedMetadata::default()
            }
        }
    }
}

#[async_trait]
impl Strategy for VideoStrategy {
    fn label(&self) -> &'static str {
        match self.platform {
            Platform::TikTok => "tiktok-video",
            Platform::YouTube => "youtube-video",
            Platform::Website => "video",
        }
    }

    async fn attempt(&self, url: &str) -> Result<Recipe, ExtractError> {
        let metadata = self.fetch_metadata(url).await;

        // Thumbnail goes up front; the model never controls the image.
        let image = self.uploader.upload(&metadata.thumbnail_url).await;

        let title_author = if !metadata.title.is_empty() && !metadata.author_name.is_empty() {
            let title = html_escape::decode_html_entities(&metadata.title);
            format!(r#"titled "{}" by author "{}""#, title, metadata.author_name)
        } else {
            String::new()
        };

        let prompt = video_prompt(self.platform.display_name(), url, &title_author, &image);
        let response = self
            .generator
            .generate(&prompt, &GenerateOptions::json())
            .await?;
        let value = parse_json_response(&response)?;
        let mut recipe = normalize(&value);

        // Ground truth always wins over whatever the model guessed.
        recipe.url = url.to_string();
        recipe.host = self.platform.display_name().to_string();
        recipe.image = image;

        Ok(recipe)
    }
}

/// Percent-encode a URL for use as a query parameter value.
fn urlencode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
