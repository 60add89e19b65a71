//! Route handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/generate_story` | Form field `athlete_id` |
//! | `GET`  | `/story/{token}` | 404 if unresolvable |
//! | `GET`  | `/social-card/{token}.png` | PNG with ETag |
//! | `GET`  | `/entities/{entity_id}/stories` | Newest first |
//! | `GET`  | `/health` | |

use axum::{
  Form, Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use runstory_core::{
  Token,
  record::Record,
  store::StoryStore,
  upstream::{Fetcher, Generator},
};
use runstory_service::Error;
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  etag::{compute_etag, if_none_match},
};

const CARD_CACHE_CONTROL: &str = "public, max-age=86400";

// ─── Generate ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
  #[serde(default)]
  pub athlete_id: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
  pub token:        Token,
  pub content:      String,
  pub display_name: String,
  pub entity_id:    String,
  pub share_url:    String,
  pub card_url:     String,
  pub reused:       bool,
}

/// `POST /generate_story`
pub async fn generate_story<S, F, G>(
  State(state): State<AppState<S, F, G>>,
  Form(form): Form<GenerateForm>,
) -> Result<Json<GenerateResponse>, ApiError>
where
  S: StoryStore,
  F: Fetcher,
  G: Generator,
{
  let story = state.service.generate(&form.athlete_id).await?;
  Ok(Json(GenerateResponse {
    share_url: state.config.share_url(&story.token),
    card_url: state.config.card_url(&story.token),
    token: story.token,
    content: story.content,
    display_name: story.display_name,
    entity_id: story.entity_id,
    reused: story.reused,
  }))
}

// ─── Story ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StoryResponse {
  pub token:        Token,
  pub entity_id:    String,
  pub content:      String,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
  pub expires_at:   DateTime<Utc>,
}

impl From<Record> for StoryResponse {
  fn from(r: Record) -> Self {
    Self {
      token:        r.token,
      entity_id:    r.entity_id,
      content:      r.content,
      display_name: r.display_name,
      created_at:   r.created_at,
      expires_at:   r.expires_at,
    }
  }
}

/// `GET /story/{token}`
pub async fn story<S, F, G>(
  State(state): State<AppState<S, F, G>>,
  Path(token): Path<String>,
) -> Result<Json<StoryResponse>, ApiError>
where
  S: StoryStore,
  F: Fetcher,
  G: Generator,
{
  let record = state.service.story(&token).await?;
  Ok(Json(record.into()))
}

// ─── Social card ─────────────────────────────────────────────────────────────

/// `GET /social-card/{token}.png`
pub async fn social_card<S, F, G>(
  State(state): State<AppState<S, F, G>>,
  Path(file): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: StoryStore,
  F: Fetcher,
  G: Generator,
{
  let token = parse_card_file(&file).ok_or(Error::NotFound)?;
  let png = state.service.social_card(token).await?;
  let etag = compute_etag(&png);

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match(v, &etag));

  let cache_headers = [
    (header::ETAG, etag),
    (header::CACHE_CONTROL, CARD_CACHE_CONTROL.to_owned()),
  ];

  if not_modified {
    return Ok((StatusCode::NOT_MODIFIED, cache_headers).into_response());
  }
  Ok((
    StatusCode::OK,
    cache_headers,
    [(header::CONTENT_TYPE, "image/png")],
    png,
  )
    .into_response())
}

/// `"<token>.png"` → `"<token>"`.
fn parse_card_file(file: &str) -> Option<&str> {
  file.strip_suffix(".png").filter(|token| !token.is_empty())
}

// ─── Entity stories ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StorySummary {
  pub token:        Token,
  pub display_name: String,
  pub fetched_at:   DateTime<Utc>,
  pub created_at:   DateTime<Utc>,
  pub share_url:    String,
}

/// `GET /entities/{entity_id}/stories`
pub async fn entity_stories<S, F, G>(
  State(state): State<AppState<S, F, G>>,
  Path(entity_id): Path<String>,
) -> Result<Json<Vec<StorySummary>>, ApiError>
where
  S: StoryStore,
  F: Fetcher,
  G: Generator,
{
  let records = state.service.stories_for(&entity_id).await?;
  let summaries = records
    .into_iter()
    .map(|r| StorySummary {
      share_url:    state.config.share_url(&r.token),
      token:        r.token,
      display_name: r.display_name,
      fetched_at:   r.fetched_at,
      created_at:   r.created_at,
    })
    .collect();
  Ok(Json(summaries))
}

// ─── Health ──────────────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse { "ok" }
