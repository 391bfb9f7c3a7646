use async_trait::async_trait;
use log::warn;
use serde::Deserialize;
use serde_json::json;

use crate::config::ImageConfig;
use crate::fetch::HTTP_TIMEOUT;
use crate::model::RecipeImage;

/// Side-uploads recipe images to a hosting service.
///
/// Uploads must never break an extraction: implementations degrade to
/// returning the original URL with no storage key instead of failing.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, source_url: &str) -> RecipeImage;
}

/// No-op uploader used when no image host is configured.
pub struct PassthroughUploader;

#[async_trait]
impl ImageUploader for PassthroughUploader {
    async fn upload(&self, source_url: &str) -> RecipeImage {
        RecipeImage {
            url: source_url.to_string(),
            key: None,
        }
    }
}

/// Uploader backed by an HTTP image host.
///
/// Posts `{"source_url": ...}` to the configured endpoint and expects
/// `{"url": ..., "key": ...}` back.
pub struct HostedUploader {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
    key: Option<String>,
}

impl HostedUploader {
    pub fn new(endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        HostedUploader { client, endpoint }
    }

    async fn try_upload(&self, source_url: &str) -> Result<RecipeImage, reqwest::Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "source_url": source_url }))
            .send()
            .await?
            .error_for_status()?;
        let uploaded: UploadResponse = response.json().await?;
        Ok(RecipeImage {
            url: uploaded.url,
            key: uploaded.key,
        })
    }
}

#[async_trait]
impl ImageUploader for HostedUploader {
    async fn upload(&self, source_url: &str) -> RecipeImage {
        if source_url.is_empty() {
            return RecipeImage::default();
        }
        match self.try_upload(source_url).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Image upload failed, keeping original URL: {e}");
                RecipeImage {
                    url: source_url.to_string(),
                    key: None,
                }
            }
        }
    }
}

/// Pick an uploader from configuration.
pub fn uploader_from_config(config: &ImageConfig) -> Box<dyn ImageUploader> {
    match &config.upload_url {
        Some(endpoint) => Box::new(HostedUploader::new(endpoint.clone())),
        None => Box::new(PassthroughUploader),
    }
}
