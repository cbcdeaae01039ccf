use std::collections::HashMap;

use crate::coords::{Rect, Vec2};
use crate::reactive::DisposeTextureData;

use super::{CachedResource, ContentError, ResourceKind, Texture};

/// Placement and metrics of one rasterized glyph.
///
/// `x_min`/`y_min` are the bitmap offsets from the pen position, with `y_min`
/// measured upward from the baseline.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphMetrics {
    pub glyph: char,
    /// Region of the atlas holding the bitmap (texels).
    pub atlas_bounds: Rect,
    pub advance: f32,
    pub x_min: f32,
    pub y_min: f32,
    pub width: f32,
    pub height: f32,
}

/// A glyph positioned by [`Font::layout`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacedGlyph {
    pub glyph: char,
    pub src: Rect,
    pub dest: Rect,
}

/// Rasterized font: an atlas texture plus the glyph table into it.
///
/// The atlas is pooled. It is released together with the font, never on its
/// own.
#[derive(Debug, Clone)]
pub struct Font {
    name: String,
    path: String,
    size: f32,
    atlas: Texture,
    glyphs: HashMap<char, GlyphMetrics>,
    ascent: f32,
    line_height: f32,
}

const FALLBACK_GLYPH: char = '?';

impl Font {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        size: f32,
        atlas: Texture,
        glyphs: impl IntoIterator<Item = GlyphMetrics>,
        ascent: f32,
        line_height: f32,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            atlas: atlas.pooled(),
            glyphs: glyphs.into_iter().map(|g| (g.glyph, g)).collect(),
            ascent,
            line_height,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn atlas(&self) -> &Texture {
        &self.atlas
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    #[inline]
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn glyph(&self, ch: char) -> Option<&GlyphMetrics> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Lays `text` out on a single baseline per line, starting with the top
    /// of the first line at `origin`.
    ///
    /// `'\n'` starts a new line. Characters missing from the atlas render as
    /// `'?'` when available and are skipped otherwise. Glyphs without a
    /// bitmap (spaces) only advance the pen.
    pub fn layout(&self, text: &str, origin: Vec2) -> Vec<PlacedGlyph> {
        let mut placed = Vec::with_capacity(text.len());
        let mut pen_x = origin.x;
        let mut baseline = origin.y + self.ascent;

        for ch in text.chars() {
            if ch == '\n' {
                pen_x = origin.x;
                baseline += self.line_height;
                continue;
            }

            let Some(metrics) = self.glyph(ch).or_else(|| self.glyph(FALLBACK_GLYPH)) else {
                log::trace!("font '{}' has no glyph for {ch:?}", self.name);
                continue;
            };

            if metrics.width > 0.0 && metrics.height > 0.0 {
                let x = pen_x + metrics.x_min;
                let y = baseline - (metrics.y_min + metrics.height);
                placed.push(PlacedGlyph {
                    glyph: metrics.glyph,
                    src: metrics.atlas_bounds,
                    dest: Rect::new(x, y, metrics.width, metrics.height),
                });
            }

            pen_x += metrics.advance;
        }

        placed
    }

    /// Width of the widest line and total height of `text`.
    pub fn measure(&self, text: &str) -> Vec2 {
        let mut widest = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let width: f32 = line
                .chars()
                .filter_map(|ch| self.glyph(ch).or_else(|| self.glyph(FALLBACK_GLYPH)))
                .map(|m| m.advance)
                .sum();
            widest = widest.max(width);
        }
        Vec2::new(widest, lines as f32 * self.line_height)
    }
}

impl CachedResource for Font {
    /// The atlas texture id.
    fn id(&self) -> u32 {
        self.atlas.id()
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Cache policy for fonts.
///
/// Unloading a font releases its pooled atlas, so the payload is a texture
/// disposal and font caches share the texture dispose channel.
#[derive(Debug)]
pub enum FontKind {}

impl ResourceKind for FontKind {
    const NAME: &'static str = "font";
    const SUPPORTED_EXTENSIONS: &'static [&'static str] = &[".ttf"];

    type Resource = Font;
    type Dispose = DisposeTextureData;

    fn dispose_data(font: &Font) -> Result<DisposeTextureData, ContentError> {
        Ok(DisposeTextureData::new(font.atlas.id()))
    }
}
