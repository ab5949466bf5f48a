use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

/// Thin client for the Firecrawl scrape endpoint. JavaScript-heavy news
/// pages render server-side there, so we only ever ask for markdown.
pub struct FirecrawlClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ScrapeRequest {
    url: String,
    formats: Vec<String>,
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
    #[serde(rename = "waitFor")]
    wait_for: u32,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}

impl FirecrawlClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: FIRECRAWL_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Scrape a single page, returning its main content as markdown.
    pub async fn scrape_markdown(&self, url: &str) -> Result<String> {
        let request = ScrapeRequest {
            url: url.to_string(),
            formats: vec!["markdown".to_string()],
            only_main_content: true,
            wait_for: 2000,
        };

        let response = self
            .http
            .post(format!("{}/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Firecrawl API error ({}): {}", status, error_text));
        }

        let resp: ScrapeResponse = response.json().await?;
        if !resp.success {
            return Err(anyhow!("Firecrawl scrape of {} reported failure", url));
        }

        resp.data
            .and_then(|d| d.markdown)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| anyhow!("Firecrawl returned no markdown for {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scrape_markdown_unwraps_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/scrape")
            .with_status(200)
            .with_body(r##"{"success":true,"data":{"markdown":"# Markets\nStocks rally"}}"##)
            .create_async()
            .await;

        let client = FirecrawlClient::new("key").with_base_url(&server.url());
        let markdown = client
            .scrape_markdown("https://example.com/markets")
            .await
            .unwrap();

        assert!(markdown.contains("Stocks rally"));
    }

    #[tokio::test]
    async fn scrape_markdown_rejects_unsuccessful_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/scrape")
            .with_status(200)
            .with_body(r#"{"success":false}"#)
            .create_async()
            .await;

        let client = FirecrawlClient::new("key").with_base_url(&server.url());
        let err = client
            .scrape_markdown("https://example.com/markets")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("reported failure"));
    }
}
