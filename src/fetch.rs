use std::time::Duration;

use log::info;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;

use crate::error::ExtractError;

/// Fixed timeout for page and oEmbed fetches.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches recipe pages with a realistic browser header set.
///
/// Several recipe sites serve structured data only to requests that look
/// like a browser, so the headers are part of the extraction contract.
pub struct PageFetcher {
    client: Client,
}

impl Default for PageFetcher {
    fn default() -> Self {
        PageFetcher::new()
    }
}

impl PageFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .default_headers(browser_headers())
            .build()
            .expect("Failed to create HTTP client");
        PageFetcher { client }
    }

    /// GET a page, failing on network errors and non-2xx statuses.
    pub async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status().map_err(|e| {
            info!("HTTP request failed: {e}");
            ExtractError::Fetch(e)
        })?;
        Ok(response.text().await?)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("User-Agent", HeaderValue::from_static(USER_AGENT));
    headers.insert(
        "Accept",
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
             image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
    );
    headers.insert(
        "Accept-Language",
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
    headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/recipe")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let fetcher = PageFetcher::new();
        let body = fetcher
            .fetch(&format!("{}/recipe", server.url()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_fails_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/recipe")
            .with_status(503)
            .create_async()
            .await;

        let fetcher = PageFetcher::new();
        let err = fetcher
            .fetch(&format!("{}/recipe", server.url()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "FetchError");
    }

    #[tokio::test]
    async fn sends_browser_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ua")
            .match_header("User-Agent", USER_AGENT)
            .with_body("ok")
            .create_async()
            .await;

        let fetcher = PageFetcher::new();
        fetcher.fetch(&format!("{}/ua", server.url())).await.unwrap();
        mock.assert_async().await;
    }
}
