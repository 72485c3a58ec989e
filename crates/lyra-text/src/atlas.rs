//! Font atlas: bakes one or more fonts into a single 8-bit coverage
//! texture.
//!
//! Build order matters for determinism: a fixed builtin block is packed
//! first (it carries the opaque white pixel every untextured primitive
//! samples), then every requested glyph in configuration order. The bin is
//! packed at its final width against a tall virtual height; the real
//! texture height is the smallest power of two covering what was actually
//! placed.

use std::collections::HashSet;
use std::fmt;

use lyra_draw::TextureId;

use crate::font::{Font, Glyph};
use crate::pack::{PackHeuristic, PackRect, RectPacker};
use crate::raster::{FontRasterizer, GlyphInk, RasterFontId};

/// Builtin block: left half is solid coverage (the white pixel lives at its
/// center), right half is reserved blank.
const BUILTIN_BLOCK_W: i32 = 90;
const BUILTIN_BLOCK_H: i32 = 27;

/// Virtual bin height while packing; the real height is trimmed afterwards.
const MAX_TEXTURE_HEIGHT: i32 = 32768;

/// One font source to bake. Ranges are inclusive codepoint intervals.
#[derive(Clone)]
pub struct FontConfig {
    pub data: Vec<u8>,
    pub size_pixels: f32,
    pub glyph_ranges: Vec<(u32, u32)>,
    /// Bake into the previous font instead of starting a new one, skipping
    /// codepoints it already has. Lets an icon or CJK font extend a base
    /// font at the same logical size.
    pub merge_mode: bool,
    /// Glyph substituted for unmapped codepoints.
    pub fallback_char: char,
}

impl FontConfig {
    /// Config covering Basic Latin and Latin-1 Supplement.
    pub fn new(data: Vec<u8>, size_pixels: f32) -> Self {
        Self {
            data,
            size_pixels,
            glyph_ranges: vec![(0x0020, 0x00FF)],
            merge_mode: false,
            fallback_char: '?',
        }
    }

    pub fn with_ranges(mut self, ranges: Vec<(u32, u32)>) -> Self {
        self.glyph_ranges = ranges;
        self
    }

    pub fn with_merge_mode(mut self, merge: bool) -> Self {
        self.merge_mode = merge;
        self
    }

    pub fn with_fallback_char(mut self, c: char) -> Self {
        self.fallback_char = c;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtlasError {
    /// `build` was called before any font was added.
    NoFonts,
    /// The rasterizer rejected the font data of the config at this index.
    FontLoadFailed { config_index: usize },
    /// Glyphs did not fit even in the tallest bin the atlas supports.
    /// Raise the texture width or request fewer glyphs.
    AtlasFull { unplaced: usize, max_height: i32 },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::NoFonts => write!(f, "no fonts added to the atlas"),
            AtlasError::FontLoadFailed { config_index } => {
                write!(f, "font config {config_index} holds unusable font data")
            }
            AtlasError::AtlasFull { unplaced, max_height } => write!(
                f,
                "{unplaced} glyph(s) did not fit in the atlas (max height {max_height})"
            ),
        }
    }
}

impl std::error::Error for AtlasError {}

/// Builds and owns the shared font texture.
///
/// Add configs with [`add_font`](Self::add_font), then either call
/// [`build`](Self::build) explicitly or let the first call to
/// [`tex_data_alpha8`](Self::tex_data_alpha8) trigger it.
pub struct FontAtlas {
    configs: Vec<FontConfig>,
    fonts: Vec<Font>,
    tex_id: TextureId,
    tex_desired_width: i32,
    tex_glyph_padding: i32,
    tex_width: i32,
    tex_height: i32,
    pixels: Option<Vec<u8>>,
    pixels_rgba: Option<Vec<u8>>,
    white_uv: [f32; 2],
}

impl Default for FontAtlas {
    fn default() -> Self {
        Self {
            configs: Vec::new(),
            fonts: Vec::new(),
            tex_id: TextureId::default(),
            tex_desired_width: 0,
            tex_glyph_padding: 2,
            tex_width: 0,
            tex_height: 0,
            pixels: None,
            pixels_rgba: None,
            white_uv: [0.0, 0.0],
        }
    }
}

struct PendingGlyph {
    font_index: usize,
    raster_font: RasterFontId,
    codepoint: char,
    ink: GlyphInk,
}

impl FontAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a font for the next build. Returns the index of the [`Font`]
    /// this config will bake into.
    pub fn add_font(&mut self, config: FontConfig) -> usize {
        assert!(!config.data.is_empty(), "font data must not be empty");
        assert!(config.size_pixels > 0.0, "font size must be positive");
        assert!(
            !config.merge_mode || !self.configs.is_empty(),
            "merge_mode requires a preceding font config"
        );
        self.configs.push(config);
        self.configs.iter().filter(|c| !c.merge_mode).count() - 1
    }

    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub fn font(&self, index: usize) -> &Font {
        &self.fonts[index]
    }

    pub fn is_built(&self) -> bool {
        self.pixels.is_some()
    }

    pub fn tex_id(&self) -> TextureId {
        self.tex_id
    }

    /// Record the backend texture handle the pixel data was uploaded to.
    pub fn set_tex_id(&mut self, id: TextureId) {
        self.tex_id = id;
    }

    /// Override the width heuristic. Takes effect on the next build.
    pub fn set_tex_desired_width(&mut self, width: i32) {
        self.tex_desired_width = width;
    }

    pub fn tex_size(&self) -> (i32, i32) {
        (self.tex_width, self.tex_height)
    }

    /// UV of a fully opaque texel, for untextured primitives.
    pub fn white_uv(&self) -> [f32; 2] {
        self.white_uv
    }

    /// Bake every queued config into the texture and the font tables.
    /// Rebuilding from the same configs is deterministic.
    pub fn build(&mut self, raster: &mut dyn FontRasterizer) -> Result<(), AtlasError> {
        if self.configs.is_empty() {
            return Err(AtlasError::NoFonts);
        }
        self.fonts.clear();
        self.pixels = None;
        self.pixels_rgba = None;

        // Load every source and create the output fonts. Merge-mode configs
        // resolve to the font created by the nearest non-merge predecessor.
        let mut raster_fonts = Vec::with_capacity(self.configs.len());
        let mut config_font = Vec::with_capacity(self.configs.len());
        let mut total_codepoints = 0usize;
        for (ci, cfg) in self.configs.iter().enumerate() {
            let handle = raster
                .load_font(&cfg.data, cfg.size_pixels)
                .ok_or(AtlasError::FontLoadFailed { config_index: ci })?;
            let font_index = if cfg.merge_mode {
                self.fonts.len() - 1
            } else {
                let m = raster.font_metrics(handle);
                self.fonts.push(Font::new(
                    cfg.size_pixels,
                    m.ascent.ceil(),
                    m.descent.floor(),
                    cfg.fallback_char,
                ));
                self.fonts.len() - 1
            };
            raster_fonts.push(handle);
            config_font.push(font_index);
            for &(lo, hi) in &cfg.glyph_ranges {
                total_codepoints += (hi.saturating_sub(lo) + 1) as usize;
            }
        }

        self.tex_width = if self.tex_desired_width > 0 {
            self.tex_desired_width
        } else if total_codepoints > 4000 {
            4096
        } else if total_codepoints > 2000 {
            2048
        } else if total_codepoints > 1000 {
            1024
        } else {
            512
        };

        // Expand ranges to concrete glyphs. A per-font seen set handles both
        // overlapping ranges and merge-mode dedup.
        let mut seen: Vec<HashSet<char>> = (0..self.fonts.len()).map(|_| HashSet::new()).collect();
        let mut pending = Vec::new();
        for (ci, cfg) in self.configs.iter().enumerate() {
            let font_index = config_font[ci];
            for &(lo, hi) in &cfg.glyph_ranges {
                for cp in lo..=hi {
                    let Some(c) = char::from_u32(cp) else { continue };
                    if !seen[font_index].insert(c) {
                        continue;
                    }
                    let Some(ink) = raster.glyph_ink(raster_fonts[ci], c) else {
                        // Not mapped by this source; leave room for a later
                        // merge config to supply it.
                        seen[font_index].remove(&c);
                        continue;
                    };
                    pending.push(PendingGlyph {
                        font_index,
                        raster_font: raster_fonts[ci],
                        codepoint: c,
                        ink,
                    });
                }
            }
        }

        // Pack the builtin block first, then every inked glyph. Inkless
        // glyphs (spaces) keep a zero rect and never touch the texture.
        let pad = self.tex_glyph_padding;
        let mut packer = RectPacker::new(self.tex_width, MAX_TEXTURE_HEIGHT);
        let builtin_rect =
            packer.insert(BUILTIN_BLOCK_W + pad, BUILTIN_BLOCK_H + pad, PackHeuristic::BestAreaFit);
        if builtin_rect.is_zero() {
            return Err(AtlasError::AtlasFull { unplaced: 1, max_height: MAX_TEXTURE_HEIGHT });
        }
        let sizes: Vec<(i32, i32)> = pending
            .iter()
            .map(|g| {
                if g.ink.width == 0 || g.ink.height == 0 {
                    (0, 0)
                } else {
                    (g.ink.width as i32 + pad, g.ink.height as i32 + pad)
                }
            })
            .collect();
        let rects = packer.insert_batch(&sizes, PackHeuristic::BestAreaFit);

        let unplaced = sizes
            .iter()
            .zip(&rects)
            .filter(|(&(w, h), r)| w > 0 && h > 0 && r.is_zero())
            .count();
        if unplaced > 0 {
            return Err(AtlasError::AtlasFull { unplaced, max_height: MAX_TEXTURE_HEIGHT });
        }

        let mut max_bottom = builtin_rect.y + builtin_rect.h;
        for rect in &rects {
            if !rect.is_zero() {
                max_bottom = max_bottom.max(rect.y + rect.h);
            }
        }
        self.tex_height = (max_bottom as u32).next_power_of_two() as i32;

        let tex_w = self.tex_width;
        let tex_h = self.tex_height;
        let mut pixels = vec![0u8; (tex_w * tex_h) as usize];
        self.render_builtin_block(&mut pixels, builtin_rect);

        // Blit glyph bitmaps and record their metrics. Glyph boxes are
        // relative to the top of the line: the baseline sits at the font's
        // ascent, and the rasterizer's vertical bearing is measured up from
        // the baseline.
        for (g, rect) in pending.iter().zip(&rects) {
            let font = &mut self.fonts[g.font_index];
            if rect.is_zero() {
                font.add_glyph(Glyph {
                    codepoint: g.codepoint,
                    advance_x: g.ink.advance,
                    x0: 0.0,
                    y0: 0.0,
                    x1: 0.0,
                    y1: 0.0,
                    u0: 0.0,
                    v0: 0.0,
                    u1: 0.0,
                    v1: 0.0,
                });
                continue;
            }
            let Some(bitmap) = raster.rasterize(g.raster_font, g.codepoint) else {
                continue;
            };
            let w = g.ink.width as usize;
            for row in 0..g.ink.height as usize {
                let dst = (rect.y as usize + row) * tex_w as usize + rect.x as usize;
                let src = row * bitmap.pitch;
                pixels[dst..dst + w].copy_from_slice(&bitmap.pixels[src..src + w]);
            }

            let x0 = g.ink.bearing_x;
            let y0 = font.ascent - g.ink.bearing_y;
            font.add_glyph(Glyph {
                codepoint: g.codepoint,
                advance_x: g.ink.advance,
                x0,
                y0,
                x1: x0 + g.ink.width as f32,
                y1: y0 + g.ink.height as f32,
                u0: rect.x as f32 / tex_w as f32,
                v0: rect.y as f32 / tex_h as f32,
                u1: (rect.x + g.ink.width as i32) as f32 / tex_w as f32,
                v1: (rect.y + g.ink.height as i32) as f32 / tex_h as f32,
            });
        }

        for font in &mut self.fonts {
            font.build_lookup_table();
        }

        let glyph_count: usize = self.fonts.iter().map(|f| f.glyphs().len()).sum();
        log::debug!(
            "font atlas built: {}x{} px, {} font(s), {} glyph(s), {:.1}% packed",
            tex_w,
            tex_h,
            self.fonts.len(),
            glyph_count,
            packer.occupancy() * 100.0
        );

        self.pixels = Some(pixels);
        Ok(())
    }

    fn render_builtin_block(&mut self, pixels: &mut [u8], rect: PackRect) {
        for row in 0..BUILTIN_BLOCK_H {
            let base = ((rect.y + row) * self.tex_width + rect.x) as usize;
            for col in 0..BUILTIN_BLOCK_W / 2 {
                pixels[base + col as usize] = 0xFF;
            }
        }
        self.white_uv = [
            (rect.x as f32 + BUILTIN_BLOCK_W as f32 * 0.25) / self.tex_width as f32,
            (rect.y as f32 + BUILTIN_BLOCK_H as f32 * 0.5) / self.tex_height as f32,
        ];
    }

    /// One coverage byte per texel, building the atlas first if needed.
    pub fn tex_data_alpha8(
        &mut self,
        raster: &mut dyn FontRasterizer,
    ) -> Result<(&[u8], i32, i32), AtlasError> {
        if self.pixels.is_none() {
            self.build(raster)?;
        }
        let pixels = self.pixels.as_deref().unwrap_or(&[]);
        Ok((pixels, self.tex_width, self.tex_height))
    }

    /// RGBA8 view of the texture: white texels with coverage as alpha.
    /// Converted lazily from the alpha8 data and cached.
    pub fn tex_data_rgba32(
        &mut self,
        raster: &mut dyn FontRasterizer,
    ) -> Result<(&[u8], i32, i32), AtlasError> {
        if self.pixels.is_none() {
            self.build(raster)?;
        }
        if self.pixels_rgba.is_none() {
            let alpha = self.pixels.as_deref().unwrap_or(&[]);
            let mut rgba = Vec::with_capacity(alpha.len() * 4);
            for &a in alpha {
                rgba.extend_from_slice(&[0xFF, 0xFF, 0xFF, a]);
            }
            self.pixels_rgba = Some(rgba);
        }
        let pixels = self.pixels_rgba.as_deref().unwrap_or(&[]);
        Ok((pixels, self.tex_width, self.tex_height))
    }

    /// Drop the CPU-side pixel copies once the texture is uploaded. Fonts
    /// and UVs stay valid.
    pub fn clear_tex_data(&mut self) {
        self.pixels = None;
        self.pixels_rgba = None;
    }

    /// Reset the atlas to empty: configs, fonts and pixels.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterFontMetrics, RasterizedGlyph};

    // Deterministic rasterizer: ASCII printables only, solid-coverage
    // bitmaps. At size s, glyphs are round(0.6s) x round(0.7s) with the ink
    // top at 0.7s above the baseline; the space is inkless with half the
    // advance. Data b"bad" fails to load.
    struct FakeRasterizer {
        sizes: Vec<f32>,
    }

    impl FakeRasterizer {
        fn new() -> Self {
            Self { sizes: Vec::new() }
        }
    }

    impl FontRasterizer for FakeRasterizer {
        fn load_font(&mut self, data: &[u8], size_px: f32) -> Option<RasterFontId> {
            if data == b"bad" {
                return None;
            }
            self.sizes.push(size_px);
            Some(RasterFontId(self.sizes.len() - 1))
        }

        fn font_metrics(&self, font: RasterFontId) -> RasterFontMetrics {
            let size = self.sizes[font.0];
            RasterFontMetrics {
                ascent: size * 0.8,
                descent: -size * 0.2,
                line_gap: 0.0,
            }
        }

        fn glyph_ink(&self, font: RasterFontId, codepoint: char) -> Option<GlyphInk> {
            if !codepoint.is_ascii_graphic() && codepoint != ' ' {
                return None;
            }
            let size = self.sizes[font.0];
            if codepoint == ' ' {
                return Some(GlyphInk {
                    width: 0,
                    height: 0,
                    bearing_x: 0.0,
                    bearing_y: 0.0,
                    advance: size * 0.5,
                });
            }
            Some(GlyphInk {
                width: (size * 0.6).round() as u32,
                height: (size * 0.7).round() as u32,
                bearing_x: 0.0,
                bearing_y: size * 0.7,
                advance: size * 0.6 + 2.0,
            })
        }

        fn rasterize(&mut self, font: RasterFontId, codepoint: char) -> Option<RasterizedGlyph> {
            let ink = self.glyph_ink(font, codepoint)?;
            Some(RasterizedGlyph {
                pitch: ink.width as usize,
                pixels: vec![0xFF; (ink.width * ink.height) as usize],
                ink,
            })
        }
    }

    fn basic_atlas() -> (FontAtlas, FakeRasterizer) {
        let mut atlas = FontAtlas::new();
        atlas.add_font(FontConfig::new(b"font".to_vec(), 10.0).with_ranges(vec![(0x20, 0x7E)]));
        (atlas, FakeRasterizer::new())
    }

    #[test]
    fn test_build_basic_latin() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.build(&mut raster).unwrap();
        assert!(atlas.is_built());
        assert_eq!(atlas.fonts().len(), 1);

        let font = atlas.font(0);
        assert_eq!(font.ascent, 8.0);
        assert_eq!(font.descent, -2.0);
        assert!(font.has_glyph('A'));
        assert_eq!(font.find_glyph('A').unwrap().codepoint, 'A');
        // '?' is in range, so unmapped codepoints fall back to it.
        assert_eq!(font.find_glyph('\u{2603}').unwrap().codepoint, '?');

        let (w, h) = atlas.tex_size();
        assert_eq!(w, 512);
        assert!(h > 0 && (h as u32).is_power_of_two());
    }

    #[test]
    fn test_no_fonts_is_an_error() {
        let mut atlas = FontAtlas::new();
        let mut raster = FakeRasterizer::new();
        assert_eq!(atlas.build(&mut raster), Err(AtlasError::NoFonts));
    }

    #[test]
    fn test_bad_font_data_reports_config_index() {
        let mut atlas = FontAtlas::new();
        atlas.add_font(FontConfig::new(b"font".to_vec(), 10.0));
        atlas.add_font(FontConfig::new(b"bad".to_vec(), 10.0));
        let mut raster = FakeRasterizer::new();
        assert_eq!(
            atlas.build(&mut raster),
            Err(AtlasError::FontLoadFailed { config_index: 1 })
        );
    }

    #[test]
    fn test_white_uv_is_opaque() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.build(&mut raster).unwrap();
        let [u, v] = atlas.white_uv();
        let (pixels, w, h) = atlas.tex_data_alpha8(&mut raster).unwrap();
        let x = (u * w as f32) as usize;
        let y = (v * h as f32) as usize;
        assert_eq!(pixels[y * w as usize + x], 0xFF);
    }

    #[test]
    fn test_glyph_uvs_map_back_to_texel_rects() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.build(&mut raster).unwrap();
        let (w, h) = atlas.tex_size();
        let glyphs: Vec<_> = atlas.font(0).glyphs().to_vec();
        let (pixels, _, _) = atlas.tex_data_alpha8(&mut raster).unwrap();
        for glyph in glyphs.iter().filter(|g| g.visible()) {
            // UVs are exact texel edges: scaling back by the texture size
            // recovers integer pixel coordinates and the baked ink size.
            let px = glyph.u0 * w as f32;
            let py = glyph.v0 * h as f32;
            assert!((px - px.round()).abs() < 1e-3);
            assert!((py - py.round()).abs() < 1e-3);
            let ink_w = (glyph.u1 - glyph.u0) * w as f32;
            assert!((ink_w - (glyph.x1 - glyph.x0)).abs() < 1e-3);
            // The rasterized coverage is actually there.
            let idx = py.round() as usize * w as usize + px.round() as usize;
            assert_eq!(pixels[idx], 0xFF);
        }
    }

    #[test]
    fn test_glyph_box_sits_on_baseline() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.build(&mut raster).unwrap();
        let font = atlas.font(0);
        let glyph = font.find_glyph('A').unwrap();
        // Ink top is 7px above the baseline at ascent 8.
        assert_eq!(glyph.y0, 1.0);
        assert_eq!(glyph.y1, 8.0);
    }

    #[test]
    fn test_space_has_advance_but_no_ink() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.build(&mut raster).unwrap();
        let font = atlas.font(0);
        let space = font.find_glyph(' ').unwrap();
        assert!(!space.visible());
        assert_eq!(space.advance_x, 5.0);
        // Tab synthesized alongside.
        assert_eq!(font.char_advance('\t'), 20.0);
    }

    #[test]
    fn test_merge_mode_extends_previous_font() {
        let mut atlas = FontAtlas::new();
        atlas.add_font(FontConfig::new(b"base".to_vec(), 10.0).with_ranges(vec![(0x41, 0x43)]));
        let merged = atlas.add_font(
            FontConfig::new(b"extra".to_vec(), 10.0)
                .with_ranges(vec![(0x42, 0x45)])
                .with_merge_mode(true),
        );
        assert_eq!(merged, 0);
        let mut raster = FakeRasterizer::new();
        atlas.build(&mut raster).unwrap();
        assert_eq!(atlas.fonts().len(), 1);

        let font = atlas.font(0);
        for c in 'A'..='E' {
            assert!(font.has_glyph(c));
        }
        // 'B' and 'C' appear once: the merge config skipped them.
        let count = font
            .glyphs()
            .iter()
            .filter(|g| ('A'..='E').contains(&g.codepoint))
            .count();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_atlas_full_when_glyphs_cannot_fit() {
        // 20000px-tall glyphs: the second cannot fit in a 32768-tall bin.
        struct GiantRasterizer;
        impl FontRasterizer for GiantRasterizer {
            fn load_font(&mut self, _: &[u8], _: f32) -> Option<RasterFontId> {
                Some(RasterFontId(0))
            }
            fn font_metrics(&self, _: RasterFontId) -> RasterFontMetrics {
                RasterFontMetrics { ascent: 8.0, descent: -2.0, line_gap: 0.0 }
            }
            fn glyph_ink(&self, _: RasterFontId, _: char) -> Option<GlyphInk> {
                Some(GlyphInk {
                    width: 400,
                    height: 20000,
                    bearing_x: 0.0,
                    bearing_y: 7.0,
                    advance: 10.0,
                })
            }
            fn rasterize(&mut self, _: RasterFontId, _: char) -> Option<RasterizedGlyph> {
                None
            }
        }

        let mut atlas = FontAtlas::new();
        atlas.add_font(FontConfig::new(b"font".to_vec(), 10.0).with_ranges(vec![(0x41, 0x42)]));
        let err = atlas.build(&mut GiantRasterizer).unwrap_err();
        assert!(matches!(err, AtlasError::AtlasFull { unplaced: 1, .. }));
        assert!(!atlas.is_built());
    }

    #[test]
    fn test_tex_data_alpha8_builds_lazily() {
        let (mut atlas, mut raster) = basic_atlas();
        assert!(!atlas.is_built());
        let (pixels, w, h) = atlas.tex_data_alpha8(&mut raster).unwrap();
        assert_eq!(pixels.len(), (w * h) as usize);
        assert!(atlas.is_built());
    }

    #[test]
    fn test_rgba32_matches_alpha8_coverage() {
        let (mut atlas, mut raster) = basic_atlas();
        let alpha = atlas.tex_data_alpha8(&mut raster).unwrap().0.to_vec();
        let (rgba, _, _) = atlas.tex_data_rgba32(&mut raster).unwrap();
        assert_eq!(rgba.len(), alpha.len() * 4);
        for (i, &a) in alpha.iter().enumerate() {
            assert_eq!(rgba[i * 4], 0xFF);
            assert_eq!(rgba[i * 4 + 3], a);
        }
    }

    #[test]
    fn test_desired_width_override() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.set_tex_desired_width(256);
        atlas.build(&mut raster).unwrap();
        assert_eq!(atlas.tex_size().0, 256);
    }

    #[test]
    fn test_clear_tex_data_keeps_fonts() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.build(&mut raster).unwrap();
        atlas.clear_tex_data();
        assert!(!atlas.is_built());
        assert!(atlas.font(0).has_glyph('A'));
        assert_ne!(atlas.white_uv(), [0.0, 0.0]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let (mut atlas, mut raster) = basic_atlas();
        atlas.build(&mut raster).unwrap();
        let first_uvs: Vec<_> = atlas.font(0).glyphs().iter().map(|g| (g.u0, g.v0)).collect();
        let first_white = atlas.white_uv();
        atlas.build(&mut FakeRasterizer::new()).unwrap();
        let second_uvs: Vec<_> = atlas.font(0).glyphs().iter().map(|g| (g.u0, g.v0)).collect();
        assert_eq!(first_uvs, second_uvs);
        assert_eq!(atlas.white_uv(), first_white);
    }
}
