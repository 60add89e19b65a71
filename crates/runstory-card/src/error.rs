//! Error types for the social-card renderer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("PNG encoding failed: {0}")]
  Encode(#[from] image::ImageError),

  #[error("failed to load font {}: {source}", path.display())]
  FontLoad { path: PathBuf, source: FontSource },
}

/// Why a font file could not be used.
#[derive(Debug, Error)]
pub enum FontSource {
  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Parse(#[from] ab_glyph::InvalidFont),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
