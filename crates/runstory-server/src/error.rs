//! HTTP mapping for service errors.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use runstory_service::Error;
use serde_json::json;
use thiserror::Error;

/// A service error on its way out of a handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match &self.0 {
      Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
      Error::UnknownEntity(_) | Error::NotFound => StatusCode::NOT_FOUND,
      Error::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
      Error::UpstreamUnavailable(_)
      | Error::Render(_)
      | Error::RenderTask(_)
      | Error::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Client-facing message. Server-side failures get a fixed message; their
  /// details only go to the log.
  pub fn message(&self) -> String {
    match &self.0 {
      Error::UpstreamUnavailable(_) => "upstream service unavailable".to_owned(),
      Error::UpstreamTimeout(what) => format!("upstream {what} timed out"),
      Error::Render(_) | Error::RenderTask(_) => "could not render social card".to_owned(),
      Error::Persistence(_) => "storage error".to_owned(),
      other => other.to_string(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(%status, "request failed: {}", self.0);
    }
    (status, Json(json!({ "error": self.message() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses() {
    let cases = [
      (Error::InvalidInput("x".into()), 400),
      (Error::UnknownEntity("A1".into()), 404),
      (Error::NotFound, 404),
      (Error::UpstreamUnavailable("down".into()), 500),
      (Error::UpstreamTimeout("fetch"), 504),
      (Error::Persistence("disk".into()), 500),
    ];
    for (err, code) in cases {
      assert_eq!(ApiError(err).status().as_u16(), code);
    }
  }

  #[tokio::test]
  async fn body_is_json_error() {
    let resp = ApiError(Error::UnknownEntity("A99".into())).into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "no parkrunner found for athlete ID A99");
  }

  #[tokio::test]
  async fn server_errors_hide_details() {
    let err = Error::UpstreamUnavailable("gemini returned 403: key=SECRET rejected".into());
    let resp = ApiError(err).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!text.contains("SECRET"), "{text}");
    let body: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["error"], "upstream service unavailable");

    let body = ApiError(Error::Persistence("disk full at /var/db".into())).message();
    assert_eq!(body, "storage error");
  }
}
