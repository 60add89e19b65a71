//! runstory server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `RUNSTORY_*` environment variables, opens the SQLite store, and serves the
//! story API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use runstory_card::{CardRenderer, FontPaths};
use runstory_server::{AppState, ServerConfig};
use runstory_service::StoryService;
use runstory_store_sqlite::SqliteStore;
use runstory_upstream::{FirecrawlFetcher, GeminiGenerator};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "parkrun story server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RUNSTORY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let fetcher =
    FirecrawlFetcher::new(server_cfg.firecrawl()).context("failed to build Firecrawl client")?;
  let generator =
    GeminiGenerator::new(server_cfg.gemini()).context("failed to build Gemini client")?;

  let fonts = server_cfg.font_paths();
  let renderer = CardRenderer::load(&FontPaths {
    regular: fonts.regular.as_deref().map(expand_tilde),
    bold:    fonts.bold.as_deref().map(expand_tilde),
  });

  let service = StoryService::new(store, fetcher, generator, renderer, server_cfg.story_config());
  let state = AppState {
    service: Arc::new(service),
    config:  Arc::new(server_cfg.clone()),
  };

  let app = runstory_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
