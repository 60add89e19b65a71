//! HTTP surface for runstory.
//!
//! Exposes an axum [`Router`] over a [`StoryService`]: story generation from
//! a form post, JSON story retrieval by share token, and PNG social cards.

pub mod error;
pub mod etag;
pub mod handlers;
pub mod settings;

pub use error::ApiError;
pub use settings::ServerConfig;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use runstory_core::{
  store::StoryStore,
  upstream::{Fetcher, Generator},
};
use runstory_service::StoryService;
use tower_http::trace::TraceLayer;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, F, G> {
  pub service: Arc<StoryService<S, F, G>>,
  pub config:  Arc<ServerConfig>,
}

impl<S, F, G> Clone for AppState<S, F, G> {
  fn clone(&self) -> Self {
    Self { service: self.service.clone(), config: self.config.clone() }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the application [`Router`].
pub fn router<S, F, G>(state: AppState<S, F, G>) -> Router
where
  S: StoryStore + 'static,
  F: Fetcher + 'static,
  G: Generator + 'static,
{
  Router::new()
    .route("/generate_story",               post(handlers::generate_story::<S, F, G>))
    .route("/story/{token}",                get(handlers::story::<S, F, G>))
    .route("/social-card/{file}",           get(handlers::social_card::<S, F, G>))
    .route("/entities/{entity_id}/stories", get(handlers::entity_stories::<S, F, G>))
    .route("/health",                       get(handlers::health))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
