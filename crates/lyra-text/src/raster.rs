//! The glyph rasterization seam.
//!
//! The atlas builder never rasterizes glyphs itself; it talks to a
//! [`FontRasterizer`] which, given a codepoint and scaled pixel size,
//! reports ink-box dimensions, bearings and advance, and produces an 8-bit
//! alpha bitmap. The `fontdue` feature (on by default) provides a concrete
//! implementation; tests drive the atlas with a deterministic fake instead.

/// A loaded (font, pixel size) pair known to a rasterizer.
///
/// Opaque to the caller; only valid for the rasterizer that returned it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterFontId(pub usize);

/// Font-wide vertical metrics in pixels, y-up: `ascent` is positive,
/// `descent` negative.
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterFontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

/// Ink-box metrics for one glyph in pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlyphInk {
    /// Ink bitmap dimensions. Zero for glyphs with no coverage (spaces).
    pub width: u32,
    pub height: u32,
    /// Left edge of the ink box relative to the pen position.
    pub bearing_x: f32,
    /// Top edge of the ink box above the baseline (y-up).
    pub bearing_y: f32,
    /// Horizontal pen advance.
    pub advance: f32,
}

/// A rasterized glyph: coverage bytes, row-major with `pitch` bytes per row.
#[derive(Clone, Debug)]
pub struct RasterizedGlyph {
    pub ink: GlyphInk,
    pub pitch: usize,
    pub pixels: Vec<u8>,
}

/// External capability producing glyph metrics and bitmaps.
///
/// Implementations may cache internally; the atlas queries `glyph_ink` once
/// per codepoint during packing and `rasterize` once during the blit pass.
pub trait FontRasterizer {
    /// Parse font bytes at a pixel size. `None` means the data is not a
    /// usable font.
    fn load_font(&mut self, data: &[u8], size_px: f32) -> Option<RasterFontId>;

    fn font_metrics(&self, font: RasterFontId) -> RasterFontMetrics;

    /// Ink metrics for `codepoint`, or `None` when the font has no mapping
    /// for it.
    fn glyph_ink(&self, font: RasterFontId, codepoint: char) -> Option<GlyphInk>;

    fn rasterize(&mut self, font: RasterFontId, codepoint: char) -> Option<RasterizedGlyph>;
}

#[cfg(feature = "fontdue")]
pub use fontdue_impl::FontdueRasterizer;

#[cfg(feature = "fontdue")]
mod fontdue_impl {
    //! `fontdue` implementation of the rasterizer seam.

    use super::{FontRasterizer, GlyphInk, RasterFontId, RasterFontMetrics, RasterizedGlyph};

    /// Rasterizer backed by `fontdue`. One entry per loaded (font, size).
    #[derive(Default)]
    pub struct FontdueRasterizer {
        fonts: Vec<(fontdue::Font, f32)>,
    }

    impl FontdueRasterizer {
        pub fn new() -> Self {
            Self::default()
        }

        fn glyph_index(&self, font: RasterFontId, codepoint: char) -> Option<(&fontdue::Font, f32, u16)> {
            let (font, size) = &self.fonts[font.0];
            let index = font.lookup_glyph_index(codepoint);
            // Index 0 is the .notdef glyph; treat it as missing so the atlas
            // falls back instead of packing tofu boxes.
            if index == 0 {
                return None;
            }
            Some((font, *size, index))
        }
    }

    impl FontRasterizer for FontdueRasterizer {
        fn load_font(&mut self, data: &[u8], size_px: f32) -> Option<RasterFontId> {
            let font = fontdue::Font::from_bytes(data.to_vec(), fontdue::FontSettings::default())
                .map_err(|err| log::warn!("fontdue rejected font data: {err}"))
                .ok()?;
            self.fonts.push((font, size_px));
            Some(RasterFontId(self.fonts.len() - 1))
        }

        fn font_metrics(&self, font: RasterFontId) -> RasterFontMetrics {
            let (font, size) = &self.fonts[font.0];
            match font.horizontal_line_metrics(*size) {
                Some(m) => RasterFontMetrics {
                    ascent: m.ascent,
                    descent: m.descent,
                    line_gap: m.line_gap,
                },
                None => RasterFontMetrics::default(),
            }
        }

        fn glyph_ink(&self, font: RasterFontId, codepoint: char) -> Option<GlyphInk> {
            let (font, size, index) = self.glyph_index(font, codepoint)?;
            let m = font.metrics_indexed(index, size);
            Some(GlyphInk {
                width: m.width as u32,
                height: m.height as u32,
                bearing_x: m.xmin as f32,
                // fontdue's ymin is the ink bottom relative to the baseline
                // (y-up); the top edge is ymin + height.
                bearing_y: (m.ymin + m.height as i32) as f32,
                advance: m.advance_width,
            })
        }

        fn rasterize(&mut self, font: RasterFontId, codepoint: char) -> Option<RasterizedGlyph> {
            let (font, size, index) = self.glyph_index(font, codepoint)?;
            let (m, pixels) = font.rasterize_indexed(index, size);
            Some(RasterizedGlyph {
                ink: GlyphInk {
                    width: m.width as u32,
                    height: m.height as u32,
                    bearing_x: m.xmin as f32,
                    bearing_y: (m.ymin + m.height as i32) as f32,
                    advance: m.advance_width,
                },
                pitch: m.width,
                pixels,
            })
        }
    }
}
