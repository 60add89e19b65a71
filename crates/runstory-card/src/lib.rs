//! Social-card renderer for runstory.
//!
//! Turns a story and an athlete label into a fixed-size 1200×630 PNG suitable
//! for link previews. Pure synchronous; no HTTP or database dependencies.
//! Output is byte-identical for identical inputs and font files.
//!
//! # Quick start
//!
//! ```no_run
//! use runstory_card::{CardRenderer, FontPaths};
//!
//! let renderer = CardRenderer::load(&FontPaths::default());
//! let png = renderer.render("Once upon a Saturday...", "A12345").unwrap();
//! assert!(png.starts_with(b"\x89PNG"));
//! ```

mod bitmap;
pub mod error;
mod face;
pub mod layout;

use std::{io::Cursor, path::PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use serde::Deserialize;

pub use error::{Error, Result};
use face::{Face, TextSize};
use layout::{WRAP_COLUMNS, excerpt, wrap_text};

// ─── Layout constants ────────────────────────────────────────────────────────

pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 630;

const BACKGROUND: Rgb<u8> = Rgb([0x14, 0x14, 0x1e]);
const TITLE_COLOR: Rgb<u8> = Rgb([0xff, 0xa3, 0x00]);
const BODY_COLOR: Rgb<u8> = Rgb([0xf2, 0xf2, 0xf2]);
const FOOTER_COLOR: Rgb<u8> = Rgb([0x8a, 0x8a, 0x99]);

const TITLE_PREFIX: &str = "parkrun Story";
const FOOTER_TEXT: &str = "Generated with parkrun Story";

const MARGIN_X: i32 = 60;
const TITLE_Y: i32 = 60;
const BODY_Y: i32 = 170;
const LINE_PITCH: i32 = 44;
const FOOTER_Y: i32 = 570;

const TITLE_SIZE: TextSize = TextSize { px: 56.0, bitmap_scale: 5 };
const BODY_SIZE: TextSize = TextSize { px: 32.0, bitmap_scale: 4 };
const FOOTER_SIZE: TextSize = TextSize { px: 24.0, bitmap_scale: 3 };

// ─── Fonts ───────────────────────────────────────────────────────────────────

/// Locations of the regular/bold font pair. Unset paths select the built-in
/// bitmap face.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontPaths {
  pub regular: Option<PathBuf>,
  pub bold:    Option<PathBuf>,
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Draws social cards. Cheap to clone; loaded fonts are reference-counted.
#[derive(Clone)]
pub struct CardRenderer {
  regular: Face,
  bold:    Face,
}

impl CardRenderer {
  /// A renderer that only uses the built-in bitmap face.
  pub fn builtin() -> Self {
    Self { regular: Face::Bitmap, bold: Face::Bitmap }
  }

  /// Load the configured font pair. Never fails: if either face cannot be
  /// loaded, both fall back to the built-in face so the card keeps a
  /// consistent look.
  pub fn load(paths: &FontPaths) -> Self {
    let (Some(regular_path), Some(bold_path)) = (&paths.regular, &paths.bold) else {
      tracing::info!("no card fonts configured; using built-in bitmap face");
      return Self::builtin();
    };

    match (Face::load(regular_path), Face::load(bold_path)) {
      (Ok(regular), Ok(bold)) => {
        tracing::debug!(?regular_path, ?bold_path, "loaded card fonts");
        Self { regular, bold }
      }
      (regular, bold) => {
        for err in [regular.err(), bold.err()].into_iter().flatten() {
          tracing::warn!("card font unavailable, falling back to built-in face: {err}");
        }
        Self::builtin()
      }
    }
  }

  /// Whether rendering uses the built-in face.
  pub fn uses_builtin_face(&self) -> bool { self.regular.is_bitmap() && self.bold.is_bitmap() }

  /// Render a card for `text` under the title for `entity_label` and return
  /// the PNG bytes.
  ///
  /// Empty inputs are not errors; they produce a card with an empty title
  /// label or body.
  pub fn render(&self, text: &str, entity_label: &str) -> Result<Vec<u8>> {
    let mut img = RgbImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND);

    let title = format!("{TITLE_PREFIX} - Athlete {entity_label}");
    self.bold.draw(&mut img, MARGIN_X, TITLE_Y, TITLE_SIZE, TITLE_COLOR, &title);

    let lines = wrap_text(&excerpt(text), WRAP_COLUMNS);
    for (i, line) in lines.iter().enumerate() {
      let y = BODY_Y + LINE_PITCH * i as i32;
      self.regular.draw(&mut img, MARGIN_X, y, BODY_SIZE, BODY_COLOR, line);
    }

    self.regular.draw(&mut img, MARGIN_X, FOOTER_Y, FOOTER_SIZE, FOOTER_COLOR, FOOTER_TEXT);

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
  }
}

impl Default for CardRenderer {
  fn default() -> Self { Self::builtin() }
}
