use std::rc::Rc;

use anyhow::anyhow;

use crate::config::FontConfig;
use crate::content::{
    ContentError, FileSystem, Font, GlyphMetrics, ImageData, PixelFormat, ResourceFactory, Texture,
    TextureUploader,
};
use crate::coords::Rect;

use super::texture::file_stem;

/// Texels left empty between packed glyphs.
const GLYPH_PADDING: u32 = 1;

/// Characters rasterized into every atlas.
const GLYPH_SET: std::ops::RangeInclusive<char> = ' '..='~';

/// Loads TrueType fonts, rasterizes the printable ASCII set into one R8
/// atlas and uploads it.
pub struct FontdueFontFactory<U: TextureUploader> {
    file_system: Rc<dyn FileSystem>,
    uploader: U,
    config: FontConfig,
}

impl<U: TextureUploader> FontdueFontFactory<U> {
    pub fn new(file_system: Rc<dyn FileSystem>, uploader: U, config: FontConfig) -> Self {
        Self { file_system, uploader, config }
    }
}

impl<U: TextureUploader> ResourceFactory<Font> for FontdueFontFactory<U> {
    fn create(&mut self, path: &str) -> Result<Font, ContentError> {
        let load = |e: anyhow::Error| ContentError::load("font", path, e);
        let size = self.config.size_in_points;

        let bytes = self
            .file_system
            .read(path)
            .map_err(|e| load(anyhow::Error::new(e)))?;
        let settings = fontdue::FontSettings { scale: size, ..fontdue::FontSettings::default() };
        let face = fontdue::Font::from_bytes(bytes, settings).map_err(|e| load(anyhow!(e)))?;

        let (ascent, line_height) = match face.horizontal_line_metrics(size) {
            Some(m) => (m.ascent, m.new_line_size),
            None => (size, size * 1.2),
        };

        let rasters: Vec<RasterGlyph> = GLYPH_SET
            .map(|ch| {
                let (m, coverage) = face.rasterize(ch, size);
                RasterGlyph {
                    glyph: ch,
                    x_min: m.xmin as f32,
                    y_min: m.ymin as f32,
                    width: m.width as u32,
                    height: m.height as u32,
                    advance: m.advance_width,
                    coverage,
                }
            })
            .collect();

        let (atlas_image, glyphs) = build_atlas(&rasters, self.config.atlas_width);

        let name = file_stem(path);
        let atlas_name = format!("{name} atlas");
        let id = self.uploader.upload(&atlas_name, &atlas_image).map_err(load)?;
        let atlas = Texture::new(id, atlas_name, path, atlas_image.width, atlas_image.height);

        log::debug!(
            "rasterized font '{name}' at {size}px: {} glyphs in {}x{} atlas",
            glyphs.len(),
            atlas_image.width,
            atlas_image.height
        );

        Ok(Font::new(name, path, size, atlas, glyphs, ascent, line_height))
    }
}

/// One rasterized glyph before packing.
#[derive(Debug, Clone)]
pub(crate) struct RasterGlyph {
    pub glyph: char,
    pub x_min: f32,
    pub y_min: f32,
    pub width: u32,
    pub height: u32,
    pub advance: f32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// Row-based ("shelf") packer over a fixed-width, growing-height atlas.
#[derive(Debug)]
pub(crate) struct ShelfPacker {
    width: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
        }
    }

    /// Reserves a `w`×`h` region and returns its top-left corner.
    ///
    /// Returns `None` only when `w` cannot fit the atlas width at all.
    pub fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w + 2 * GLYPH_PADDING > self.width {
            return None;
        }

        if self.cursor_x + w + GLYPH_PADDING > self.width {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        Some(at)
    }

    /// Height needed to hold everything placed so far.
    pub fn used_height(&self) -> u32 {
        self.cursor_y + self.row_height + GLYPH_PADDING
    }
}

/// Packs `glyphs` into an R8 atlas `width` texels wide.
///
/// Glyphs without a bitmap keep their advance with empty bounds. Glyphs wider
/// than the atlas are dropped from the bitmap with a warning.
pub(crate) fn build_atlas(glyphs: &[RasterGlyph], width: u32) -> (ImageData, Vec<GlyphMetrics>) {
    let width = width.max(1);
    let mut packer = ShelfPacker::new(width);
    let mut placements = Vec::with_capacity(glyphs.len());

    for g in glyphs {
        let at = if g.width == 0 || g.height == 0 {
            None
        } else {
            let at = packer.place(g.width, g.height);
            if at.is_none() {
                log::warn!("glyph {:?} ({}px wide) does not fit a {width}px atlas", g.glyph, g.width);
            }
            at
        };
        placements.push(at);
    }

    let height = packer.used_height().max(1);
    let mut pixels = vec![0u8; (width * height) as usize];
    let mut metrics = Vec::with_capacity(glyphs.len());

    for (g, at) in glyphs.iter().zip(placements) {
        let mut m = GlyphMetrics {
            glyph: g.glyph,
            advance: g.advance,
            x_min: g.x_min,
            y_min: g.y_min,
            ..GlyphMetrics::default()
        };

        if let Some((x, y)) = at {
            let w = g.width as usize;
            for row in 0..g.height as usize {
                let dst = (y as usize + row) * width as usize + x as usize;
                pixels[dst..dst + w].copy_from_slice(&g.coverage[row * w..(row + 1) * w]);
            }
            m.atlas_bounds = Rect::new(x as f32, y as f32, g.width as f32, g.height as f32);
            m.width = g.width as f32;
            m.height = g.height as f32;
        }

        metrics.push(m);
    }

    (ImageData::new(width, height, PixelFormat::R8, pixels), metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(ch: char, w: u32, h: u32, fill: u8) -> RasterGlyph {
        RasterGlyph {
            glyph: ch,
            x_min: 0.0,
            y_min: 0.0,
            width: w,
            height: h,
            advance: w as f32 + 1.0,
            coverage: vec![fill; (w * h) as usize],
        }
    }

    // ── packer ───────────────────────────────────────────────────────────

    #[test]
    fn packer_fills_row_then_wraps() {
        let mut p = ShelfPacker::new(12);
        assert_eq!(p.place(4, 3), Some((1, 1)));
        assert_eq!(p.place(4, 5), Some((6, 1)));
        // 11 + 4 + 1 > 12, so next shelf, below the tallest glyph of row one.
        assert_eq!(p.place(4, 2), Some((1, 7)));
        assert_eq!(p.used_height(), 10);
    }

    #[test]
    fn packer_rejects_too_wide() {
        let mut p = ShelfPacker::new(8);
        assert_eq!(p.place(7, 1), None);
        assert_eq!(p.place(6, 1), Some((1, 1)));
    }

    // ── atlas ────────────────────────────────────────────────────────────

    #[test]
    fn atlas_blits_coverage_at_bounds() {
        let glyphs = [raster('a', 2, 2, 200), raster('b', 3, 1, 50)];
        let (image, metrics) = build_atlas(&glyphs, 16);

        assert_eq!(image.format, PixelFormat::R8);
        assert!(image.is_valid());
        assert_eq!(image.height, 4);

        assert_eq!(metrics[0].atlas_bounds, Rect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(metrics[1].atlas_bounds, Rect::new(4.0, 1.0, 3.0, 1.0));

        let at = |x: usize, y: usize| image.pixels[y * 16 + x];
        assert_eq!(at(1, 1), 200);
        assert_eq!(at(2, 2), 200);
        assert_eq!(at(4, 1), 50);
        assert_eq!(at(6, 1), 50);
        assert_eq!(at(0, 0), 0);
        assert_eq!(at(4, 2), 0);
    }

    #[test]
    fn blank_glyphs_keep_advance_only() {
        let glyphs = [raster(' ', 0, 0, 0)];
        let (image, metrics) = build_atlas(&glyphs, 16);

        assert!(image.is_valid());
        assert_eq!(metrics[0].advance, 1.0);
        assert_eq!(metrics[0].atlas_bounds, Rect::default());
        assert_eq!(metrics[0].width, 0.0);
    }
}
