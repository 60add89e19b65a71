//! Typefaces the renderer can draw with: a loaded outline font, or the
//! built-in bitmap face.

use std::path::Path;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};

use crate::{
  Result, bitmap,
  error::{Error, FontSource},
};

#[derive(Clone)]
pub enum Face {
  Outline(FontArc),
  Bitmap,
}

/// Size of a text run in both representations: pixel height for outline
/// fonts and the block scale for the bitmap face.
#[derive(Debug, Clone, Copy)]
pub struct TextSize {
  pub px:           f32,
  pub bitmap_scale: u32,
}

impl Face {
  /// Read and parse a TrueType/OpenType font file.
  pub fn load(path: &Path) -> Result<Self> {
    let font_load = |source: FontSource| Error::FontLoad { path: path.to_owned(), source };
    let bytes = std::fs::read(path).map_err(|e| font_load(e.into()))?;
    let font = FontArc::try_from_vec(bytes).map_err(|e| font_load(e.into()))?;
    Ok(Face::Outline(font))
  }

  pub fn is_bitmap(&self) -> bool { matches!(self, Face::Bitmap) }

  /// Draw `text` with its top-left corner at `(x, y)`.
  pub fn draw(
    &self,
    img: &mut RgbImage,
    x: i32,
    y: i32,
    size: TextSize,
    color: Rgb<u8>,
    text: &str,
  ) {
    match self {
      Face::Outline(font) => draw_outline(img, font, x, y, size.px, color, text),
      Face::Bitmap => bitmap::draw_text(img, x, y, size.bitmap_scale, color, text),
    }
  }
}

fn draw_outline(
  img: &mut RgbImage,
  font: &FontArc,
  x: i32,
  y: i32,
  px: f32,
  color: Rgb<u8>,
  text: &str,
) {
  let scale = PxScale::from(px);
  let scaled = font.as_scaled(scale);
  let mut caret = point(x as f32, y as f32 + scaled.ascent());
  let mut previous: Option<GlyphId> = None;

  for c in text.chars() {
    let id = scaled.glyph_id(c);
    if let Some(prev) = previous {
      caret.x += scaled.kern(prev, id);
    }
    let glyph = id.with_scale_and_position(scale, caret);
    caret.x += scaled.h_advance(id);
    previous = Some(id);

    let Some(outlined) = font.outline_glyph(glyph) else { continue };
    let bounds = outlined.px_bounds();
    outlined.draw(|gx, gy, coverage| {
      let px = bounds.min.x as i32 + gx as i32;
      let py = bounds.min.y as i32 + gy as i32;
      blend(img, px, py, color, coverage);
    });
  }
}

/// Mix `color` into the pixel at `(x, y)` by `coverage`; off-canvas pixels
/// are ignored.
fn blend(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
  if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
    return;
  }
  let coverage = coverage.clamp(0.0, 1.0);
  let pixel = img.get_pixel_mut(x as u32, y as u32);
  for (dst, src) in pixel.0.iter_mut().zip(color.0) {
    let mixed = f32::from(*dst) * (1.0 - coverage) + f32::from(src) * coverage;
    *dst = mixed.round() as u8;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loading_a_missing_file_fails() {
    let err = Face::load(Path::new("/definitely/not/here.ttf")).err().unwrap();
    assert!(matches!(err, Error::FontLoad { source: FontSource::Io(_), .. }), "{err:?}");
    assert!(err.to_string().contains("not/here.ttf"));
  }

  #[test]
  fn loading_garbage_fails() {
    let path = std::env::temp_dir().join("runstory-card-garbage.ttf");
    std::fs::write(&path, b"this is not a font").unwrap();
    let err = Face::load(&path).err().unwrap();
    let _ = std::fs::remove_file(&path);
    match err {
      Error::FontLoad { path: failed, source: FontSource::Parse(_) } => assert_eq!(failed, path),
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[test]
  fn blend_mixes_and_clips() {
    let mut img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
    blend(&mut img, 0, 0, Rgb([200, 100, 50]), 0.5);
    blend(&mut img, 5, 5, Rgb([255, 255, 255]), 1.0);
    assert_eq!(*img.get_pixel(0, 0), Rgb([100, 50, 25]));
    assert_eq!(*img.get_pixel(1, 1), Rgb([0, 0, 0]));
  }
}
