//! Server configuration, deserialised from `config.toml` layered under
//! `RUNSTORY_*` environment variables.

use std::{path::PathBuf, time::Duration};

use runstory_card::FontPaths;
use runstory_core::{Token, profile::DEFAULT_PROFILE_URL_TEMPLATE};
use runstory_service::StoryConfig;
use runstory_upstream::{FirecrawlConfig, GeminiConfig, firecrawl, gemini};
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  /// Absolute origin used to build share links, e.g. `https://story.example`.
  #[serde(default = "default_public_base_url")]
  pub public_base_url:       String,
  #[serde(default = "default_store_path")]
  pub store_path:            PathBuf,

  pub firecrawl_api_key:     String,
  #[serde(default = "default_firecrawl_base_url")]
  pub firecrawl_base_url:    String,

  pub gemini_api_key:        String,
  #[serde(default = "default_gemini_model")]
  pub gemini_model:          String,
  #[serde(default = "default_gemini_base_url")]
  pub gemini_base_url:       String,

  #[serde(default = "default_profile_url_template")]
  pub profile_url_template:  String,
  #[serde(default = "default_upstream_timeout_secs")]
  pub upstream_timeout_secs: u64,
  #[serde(default = "default_upstream_attempts")]
  pub upstream_attempts:     u32,

  #[serde(default)]
  pub regular_font:          Option<PathBuf>,
  #[serde(default)]
  pub bold_font:             Option<PathBuf>,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }
fn default_public_base_url() -> String { "http://localhost:5000".into() }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/runstory/stories.db") }
fn default_firecrawl_base_url() -> String { firecrawl::DEFAULT_BASE_URL.into() }
fn default_gemini_model() -> String { gemini::DEFAULT_MODEL.into() }
fn default_gemini_base_url() -> String { gemini::DEFAULT_BASE_URL.into() }
fn default_profile_url_template() -> String { DEFAULT_PROFILE_URL_TEMPLATE.into() }
fn default_upstream_timeout_secs() -> u64 { 60 }
fn default_upstream_attempts() -> u32 { 1 }

impl ServerConfig {
  pub fn upstream_timeout(&self) -> Duration { Duration::from_secs(self.upstream_timeout_secs) }

  pub fn story_config(&self) -> StoryConfig {
    StoryConfig {
      profile_url_template: self.profile_url_template.clone(),
      upstream_timeout: self.upstream_timeout(),
      upstream_attempts: self.upstream_attempts,
      ..StoryConfig::default()
    }
  }

  pub fn firecrawl(&self) -> FirecrawlConfig {
    FirecrawlConfig {
      base_url: self.firecrawl_base_url.clone(),
      api_key:  self.firecrawl_api_key.clone(),
      timeout:  self.upstream_timeout(),
    }
  }

  pub fn gemini(&self) -> GeminiConfig {
    GeminiConfig {
      base_url: self.gemini_base_url.clone(),
      api_key:  self.gemini_api_key.clone(),
      model:    self.gemini_model.clone(),
      timeout:  self.upstream_timeout(),
    }
  }

  pub fn font_paths(&self) -> FontPaths {
    FontPaths { regular: self.regular_font.clone(), bold: self.bold_font.clone() }
  }

  /// Public URL of the story page for `token`.
  pub fn share_url(&self, token: &Token) -> String {
    format!("{}/story/{token}", self.base())
  }

  /// Public URL of the social card for `token`.
  pub fn card_url(&self, token: &Token) -> String {
    format!("{}/social-card/{token}.png", self.base())
  }

  fn base(&self) -> &str { self.public_base_url.trim_end_matches('/') }
}

#[cfg(test)]
mod tests {
  use runstory_card::CardRenderer;
  use runstory_service::{Error, StoryService};
  use runstory_store_sqlite::SqliteStore;
  use runstory_upstream::{FirecrawlFetcher, GeminiGenerator};
  use tokio::net::TcpListener;

  use super::*;

  fn from_toml(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn defaults_fill_everything_but_keys() {
    let cfg = from_toml("firecrawl_api_key = \"fc\"\ngemini_api_key = \"g\"\n").unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.upstream_attempts, 1);
    assert_eq!(cfg.profile_url_template, DEFAULT_PROFILE_URL_TEMPLATE);
    assert!(cfg.regular_font.is_none());
    assert_eq!(cfg.story_config().upstream_timeout, Duration::from_secs(60));
  }

  #[test]
  fn api_keys_are_required() {
    assert!(from_toml("gemini_api_key = \"g\"\n").is_err());
  }

  #[test]
  fn share_links_ignore_trailing_slash() {
    let mut cfg = from_toml("firecrawl_api_key = \"fc\"\ngemini_api_key = \"g\"\n").unwrap();
    cfg.public_base_url = "https://story.example/".into();
    let token = Token::parse("0123456789abcdef").unwrap();
    assert_eq!(cfg.share_url(&token), "https://story.example/story/0123456789abcdef");
    assert_eq!(
      cfg.card_url(&token),
      "https://story.example/social-card/0123456789abcdef.png"
    );
  }

  /// Accepts connections and never answers.
  async fn silent_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let mut held = Vec::new();
      while let Ok((socket, _)) = listener.accept().await {
        held.push(socket);
      }
    });
    format!("http://{addr}")
  }

  #[tokio::test]
  async fn unanswered_upstream_is_a_timeout() {
    let mut cfg = from_toml("firecrawl_api_key = \"fc\"\ngemini_api_key = \"g\"\n").unwrap();
    cfg.firecrawl_base_url = silent_listener().await;
    cfg.gemini_base_url = silent_listener().await;
    cfg.upstream_timeout_secs = 1;

    let service = StoryService::new(
      SqliteStore::open_in_memory().await.unwrap(),
      FirecrawlFetcher::new(cfg.firecrawl()).unwrap(),
      GeminiGenerator::new(cfg.gemini()).unwrap(),
      CardRenderer::builtin(),
      cfg.story_config(),
    );

    for _ in 0..3 {
      let err = service.generate("A12345").await.unwrap_err();
      assert!(matches!(err, Error::UpstreamTimeout("fetch")), "{err:?}");
    }
  }
}
