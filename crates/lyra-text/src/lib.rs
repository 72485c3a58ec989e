//! Font atlas baking and text rendering on top of `lyra-draw`.
//!
//! The pipeline is rectangle packing ([`RectPacker`]), a rasterizer seam
//! ([`FontRasterizer`], with a `fontdue` implementation behind the default
//! `fontdue` feature), and the atlas builder ([`FontAtlas`]) that bakes
//! glyph coverage into one texture and produces [`Font`] tables. Text is
//! drawn through [`DrawListTextExt::add_text`] and batches with every other
//! draw-list primitive on the atlas texture.
//!
//! ```no_run
//! use lyra_text::{DrawListTextExt, FontAtlas, FontConfig, FontdueRasterizer};
//! # fn demo(font_bytes: Vec<u8>, mut draw: lyra_draw::DrawListBuilder) {
//! let mut atlas = FontAtlas::new();
//! atlas.add_font(FontConfig::new(font_bytes, 16.0));
//! let mut raster = FontdueRasterizer::new();
//! atlas.build(&mut raster).unwrap();
//! // upload tex_data_alpha8 to the GPU, then:
//! let font = atlas.font(0);
//! draw.add_text(font, 16.0, glam::Vec2::new(8.0, 8.0), lyra_draw::Color::WHITE, "hi", 0.0);
//! # }
//! ```

mod atlas;
mod font;
mod pack;
mod raster;

pub use atlas::{AtlasError, FontAtlas, FontConfig};
pub use font::{DrawListTextExt, Font, Glyph};
pub use pack::{PackHeuristic, PackRect, RectPacker};
pub use raster::{FontRasterizer, GlyphInk, RasterFontId, RasterFontMetrics, RasterizedGlyph};

#[cfg(feature = "fontdue")]
pub use raster::FontdueRasterizer;
