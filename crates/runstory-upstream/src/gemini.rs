//! Gemini `generateContent` client.

use std::time::Duration;

use reqwest::Client;
use runstory_core::upstream::{GenerateError, Generator};
use serde::{Deserialize, Serialize};

use crate::{Result, error::describe};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub base_url: String,
  pub api_key:  String,
  pub model:    String,
  pub timeout:  Duration,
}

#[derive(Clone)]
pub struct GeminiGenerator {
  client: Client,
  config: GeminiConfig,
}

impl GeminiGenerator {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .connect_timeout(Duration::from_secs(10))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.model
    )
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
  parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
  text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
  #[serde(default)]
  text: Option<String>,
}

impl GenerateResponse {
  /// Concatenated text parts of the first candidate.
  fn into_text(self) -> String {
    self
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
      .unwrap_or_default()
  }
}

// ─── Generator impl ──────────────────────────────────────────────────────────

impl Generator for GeminiGenerator {
  async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
    tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "requesting story");

    let body = GenerateRequest {
      contents: [Content { parts: [RequestPart { text: prompt }] }],
    };
    let resp = self
      .client
      .post(self.url())
      .header(API_KEY_HEADER, &self.config.api_key)
      .json(&body)
      .send()
      .await
      .map_err(generate_error)?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(%status, %body, "gemini rejected request");
      return Err(GenerateError::Transport(format!("gemini returned {status}")));
    }

    let text = resp.json::<GenerateResponse>().await.map_err(generate_error)?.into_text();

    if text.trim().is_empty() {
      return Err(GenerateError::Empty);
    }
    Ok(text)
  }
}

fn generate_error(err: reqwest::Error) -> GenerateError {
  if err.is_timeout() {
    GenerateError::Timeout
  } else {
    GenerateError::Transport(format!("gemini request failed: {}", describe(err)))
  }
}
