//! Firecrawl scrape client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use runstory_core::upstream::{FetchError, FetchedPage, Fetcher};
use serde::{Deserialize, Serialize};

use crate::{Result, error::describe};

pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

/// Connection settings for the Firecrawl API.
#[derive(Debug, Clone)]
pub struct FirecrawlConfig {
  pub base_url: String,
  pub api_key:  String,
  pub timeout:  Duration,
}

#[derive(Clone)]
pub struct FirecrawlFetcher {
  client: Client,
  config: FirecrawlConfig,
}

impl FirecrawlFetcher {
  pub fn new(config: FirecrawlConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .connect_timeout(Duration::from_secs(10))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/v1/scrape", self.config.base_url.trim_end_matches('/'))
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ScrapeRequest<'a> {
  url:     &'a str,
  formats: [&'a str; 1],
}

#[derive(Deserialize)]
struct ScrapeResponse {
  #[serde(default)]
  data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
  #[serde(default)]
  markdown: Option<String>,
  #[serde(default)]
  metadata: Option<ScrapeMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeMetadata {
  status_code: Option<u16>,
}

// ─── Fetcher impl ────────────────────────────────────────────────────────────

impl Fetcher for FirecrawlFetcher {
  async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
    tracing::debug!(%url, "scraping via firecrawl");

    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&ScrapeRequest { url, formats: ["markdown"] })
      .send()
      .await
      .map_err(fetch_error)?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
      return Err(FetchError::NotFound);
    }
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(%status, %body, "firecrawl rejected scrape");
      return Err(FetchError::Transport(format!("firecrawl returned {status}")));
    }

    let body: ScrapeResponse = resp.json().await.map_err(fetch_error)?;
    let data = body
      .data
      .ok_or_else(|| FetchError::Transport("firecrawl response carried no data".into()))?;

    // The scrape itself succeeds even when the target page is a 404.
    let target_status = data.metadata.and_then(|m| m.status_code);
    if target_status == Some(StatusCode::NOT_FOUND.as_u16()) {
      return Err(FetchError::NotFound);
    }

    let markdown = data.markdown.unwrap_or_default();
    tracing::debug!(bytes = markdown.len(), "scraped page");
    Ok(FetchedPage { markdown })
  }
}

fn fetch_error(err: reqwest::Error) -> FetchError {
  if err.is_timeout() {
    FetchError::Timeout
  } else {
    FetchError::Transport(format!("firecrawl request failed: {}", describe(err)))
  }
}
