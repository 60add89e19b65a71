//! Strong ETags for rendered social cards.
//!
//! A card is a pure function of its stored story, so the hash of the PNG
//! bytes is stable for the lifetime of the token.

use sha2::{Digest, Sha256};

/// Quoted hex SHA-256 of `body`.
pub fn compute_etag(body: &[u8]) -> String {
  format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, weak validators and bare (unquoted)
/// tags.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let bare = etag.trim_matches('"');
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || candidate.strip_prefix("W/").unwrap_or(candidate).trim_matches('"') == bare
  })
}
