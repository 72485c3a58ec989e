//! Baked fonts: dense glyph lookup, word wrapping, measurement and
//! rendering into a draw list.
//!
//! A [`Font`] is produced by [`crate::FontAtlas::build`]; it owns no pixels,
//! only per-glyph metrics and atlas UVs. Rendering writes straight through
//! the draw list's primitive cursor API, so text batches with every other
//! primitive on the same texture.

use glam::Vec2;
use lyra_draw::{Color, DrawListBuilder, Rect};

const INDEX_NONE: u32 = u32::MAX;

/// One baked glyph. The box (`x0..y1`) is relative to the top of the line
/// (baseline sits at `Font::ascent`), in pixels at `Font::size_pixels`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub codepoint: char,
    pub advance_x: f32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl Glyph {
    /// Whether the glyph has any ink to draw. Spaces and tabs carry an
    /// advance but a zero-size box.
    #[inline]
    pub fn visible(&self) -> bool {
        self.x0 != self.x1
    }
}

/// A font baked at one pixel size.
///
/// Lookup is through dense arrays indexed by codepoint, so the hot path of
/// measurement and rendering is a bounds check and a load. Codepoints past
/// the end of the arrays resolve to the fallback glyph.
pub struct Font {
    /// Size the glyphs were rasterized at. Rendering at another size scales
    /// the baked metrics.
    pub size_pixels: f32,
    /// Distance from the top of the line to the baseline, >= 0.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line, <= 0.
    pub descent: f32,
    pub fallback_char: char,
    glyphs: Vec<Glyph>,
    index_advance: Vec<f32>,
    index_lookup: Vec<u32>,
    fallback_glyph: Option<usize>,
    fallback_advance_x: f32,
}

impl Font {
    pub(crate) fn new(size_pixels: f32, ascent: f32, descent: f32, fallback_char: char) -> Self {
        Self {
            size_pixels,
            ascent,
            descent,
            fallback_char,
            glyphs: Vec::new(),
            index_advance: Vec::new(),
            index_lookup: Vec::new(),
            fallback_glyph: None,
            fallback_advance_x: 0.0,
        }
    }

    pub(crate) fn add_glyph(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    /// Rebuild the dense lookup arrays. Called once per font at the end of
    /// an atlas build, after every glyph has been added.
    pub(crate) fn build_lookup_table(&mut self) {
        let max_codepoint = self
            .glyphs
            .iter()
            .map(|g| g.codepoint as usize)
            .max()
            .unwrap_or(0);
        self.index_advance.clear();
        self.index_advance.resize(max_codepoint + 1, -1.0);
        self.index_lookup.clear();
        self.index_lookup.resize(max_codepoint + 1, INDEX_NONE);
        for (i, glyph) in self.glyphs.iter().enumerate() {
            let cp = glyph.codepoint as usize;
            self.index_advance[cp] = glyph.advance_x;
            self.index_lookup[cp] = i as u32;
        }

        // Synthesize a tab from the space glyph: same box, four times the
        // advance. Fonts rarely map U+0009 themselves.
        if self.lookup('\t').is_none() {
            if let Some(space) = self.lookup(' ') {
                let mut tab = self.glyphs[space];
                tab.codepoint = '\t';
                tab.advance_x *= 4.0;
                let tab_advance = tab.advance_x;
                self.glyphs.push(tab);
                self.index_advance['\t' as usize] = tab_advance;
                self.index_lookup['\t' as usize] = (self.glyphs.len() - 1) as u32;
            }
        }

        self.fallback_glyph = self
            .lookup(self.fallback_char)
            .or(if self.glyphs.is_empty() { None } else { Some(0) });
        self.fallback_advance_x = self
            .fallback_glyph
            .map(|i| self.glyphs[i].advance_x)
            .unwrap_or(0.0);
        for advance in &mut self.index_advance {
            if *advance < 0.0 {
                *advance = self.fallback_advance_x;
            }
        }
    }

    #[inline]
    fn lookup(&self, c: char) -> Option<usize> {
        match self.index_lookup.get(c as usize) {
            Some(&i) if i != INDEX_NONE => Some(i as usize),
            _ => None,
        }
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Whether the font maps `c` itself, ignoring the fallback glyph.
    pub fn has_glyph(&self, c: char) -> bool {
        self.lookup(c).is_some()
    }

    /// Glyph for `c`, falling back to the fallback glyph for unmapped
    /// codepoints. `None` only when the font is empty.
    pub fn find_glyph(&self, c: char) -> Option<&Glyph> {
        self.lookup(c)
            .or(self.fallback_glyph)
            .map(|i| &self.glyphs[i])
    }

    pub fn find_glyph_no_fallback(&self, c: char) -> Option<&Glyph> {
        self.lookup(c).map(|i| &self.glyphs[i])
    }

    /// Advance for `c` at the baked size; unmapped codepoints get the
    /// fallback advance.
    #[inline]
    pub fn char_advance(&self, c: char) -> f32 {
        match self.index_advance.get(c as usize) {
            Some(&advance) => advance,
            None => self.fallback_advance_x,
        }
    }

    pub fn fallback_advance(&self) -> f32 {
        self.fallback_advance_x
    }

    /// Byte offset into `text` where a line rendered at `scale` should wrap
    /// to stay within `wrap_width`.
    ///
    /// Prefers breaking at whitespace or just after `.,;!?"`; a word wider
    /// than the wrap width is split mid-word. May return 0 when not even one
    /// glyph fits; callers force at least one-character progress.
    pub fn calc_word_wrap_position(&self, scale: f32, text: &str, wrap_width: f32) -> usize {
        // Work in unscaled advances.
        let wrap_width = wrap_width / if scale > 0.0 { scale } else { 1.0 };

        let mut line_width = 0.0f32;
        let mut word_width = 0.0f32;
        let mut blank_width = 0.0f32;
        let mut word_end = 0usize;
        let mut prev_word_end: Option<usize> = None;
        let mut inside_word = true;

        let mut pos = 0usize;
        for (i, c) in text.char_indices() {
            pos = i;
            if c == '\n' {
                line_width = 0.0;
                word_width = 0.0;
                blank_width = 0.0;
                inside_word = true;
                pos = i + 1;
                continue;
            }
            if c == '\r' {
                pos = i + 1;
                continue;
            }

            let char_width = self.char_advance(c);
            if is_blank(c) {
                if inside_word {
                    line_width += blank_width;
                    blank_width = 0.0;
                    word_end = i;
                }
                blank_width += char_width;
                inside_word = false;
            } else {
                word_width += char_width;
                if inside_word {
                    word_end = i + c.len_utf8();
                } else {
                    prev_word_end = Some(word_end);
                    line_width += word_width + blank_width;
                    word_width = 0.0;
                    blank_width = 0.0;
                }
                // Allow wrapping right after punctuation.
                inside_word = !matches!(c, '.' | ',' | ';' | '!' | '?' | '"');
            }

            if line_width + word_width > wrap_width {
                // Word too wide for the line: split mid-word.
                if word_width < wrap_width {
                    return prev_word_end.unwrap_or(word_end);
                }
                return pos;
            }
            pos = i + c.len_utf8();
        }
        pos.min(text.len())
    }

    /// Size of `text` rendered at `size`, honoring `\n`, ignoring `\r`.
    ///
    /// `wrap_width > 0` wraps via [`Self::calc_word_wrap_position`];
    /// `max_width > 0` stops measuring when a line would exceed it.
    pub fn calc_text_size(&self, size: f32, max_width: f32, wrap_width: f32, text: &str) -> Vec2 {
        let line_height = size;
        let scale = size / self.size_pixels;
        let word_wrap = wrap_width > 0.0;

        let mut text_size = Vec2::ZERO;
        let mut line_width = 0.0f32;
        let mut word_wrap_eol: Option<usize> = None;

        let mut i = 0usize;
        while i < text.len() {
            if word_wrap {
                let eol = *word_wrap_eol.get_or_insert_with(|| {
                    let rel = self.calc_word_wrap_position(scale, &text[i..], wrap_width - line_width);
                    // Too narrow to fit anything: force one char per line.
                    i + rel.max(next_char_len(&text[i..]))
                });
                if i >= eol {
                    text_size.x = text_size.x.max(line_width);
                    text_size.y += line_height;
                    line_width = 0.0;
                    word_wrap_eol = None;
                    i = skip_wrap_blanks(text, i);
                    continue;
                }
            }

            let c = first_char(&text[i..]);
            let next = i + c.len_utf8();
            if c == '\n' {
                text_size.x = text_size.x.max(line_width);
                text_size.y += line_height;
                line_width = 0.0;
                word_wrap_eol = None;
                i = next;
                continue;
            }
            if c == '\r' {
                i = next;
                continue;
            }

            let char_width = self.char_advance(c) * scale;
            if max_width > 0.0 && line_width + char_width >= max_width {
                break;
            }
            line_width += char_width;
            i = next;
        }

        text_size.x = text_size.x.max(line_width);
        if line_width > 0.0 || text_size.y == 0.0 {
            text_size.y += line_height;
        }
        text_size
    }

    /// Emit `text` into `draw`, one quad per visible glyph.
    ///
    /// The caller must have reserved worst-case space through
    /// [`DrawListBuilder::prim_reserve`] and must return the unused tail
    /// with [`DrawListBuilder::prim_unreserve`]; [`DrawListTextExt::add_text`]
    /// does both. Whole lines above or below `clip_rect` are skipped without
    /// touching buffers, as are glyphs outside it horizontally. With
    /// `cpu_fine_clip` glyph quads straddling the clip rect edge are
    /// trimmed, UVs re-interpolated to match.
    #[allow(clippy::too_many_arguments)]
    pub fn render_text(
        &self,
        draw: &mut DrawListBuilder,
        size: f32,
        pos: Vec2,
        color: Color,
        clip_rect: Rect,
        text: &str,
        wrap_width: f32,
        cpu_fine_clip: bool,
    ) {
        // Pixel-snap the origin so glyph edges land on texel boundaries.
        let start_x = pos.x.floor();
        let mut x = start_x;
        let mut y = pos.y.floor();
        if y > clip_rect.max[1] {
            return;
        }

        let scale = size / self.size_pixels;
        let line_height = size;
        let word_wrap = wrap_width > 0.0;
        let mut word_wrap_eol: Option<usize> = None;

        let mut i = 0usize;
        // Fast-forward whole lines above the clip rect.
        if !word_wrap {
            while y + line_height < clip_rect.min[1] && i < text.len() {
                match text[i..].find('\n') {
                    Some(nl) => i += nl + 1,
                    None => i = text.len(),
                }
                y += line_height;
            }
        }

        while i < text.len() {
            if word_wrap {
                let eol = *word_wrap_eol.get_or_insert_with(|| {
                    let rel = self.calc_word_wrap_position(scale, &text[i..], wrap_width - (x - start_x));
                    i + rel.max(next_char_len(&text[i..]))
                });
                if i >= eol {
                    x = start_x;
                    y += line_height;
                    if y > clip_rect.max[1] {
                        break;
                    }
                    word_wrap_eol = None;
                    i = skip_wrap_blanks(text, i);
                    continue;
                }
            }

            let c = first_char(&text[i..]);
            i += c.len_utf8();
            if c == '\n' {
                x = start_x;
                y += line_height;
                if y > clip_rect.max[1] {
                    break;
                }
                word_wrap_eol = None;
                continue;
            }
            if c == '\r' {
                continue;
            }

            let Some(glyph) = self.find_glyph(c) else {
                continue;
            };
            let char_width = glyph.advance_x * scale;
            if glyph.visible() {
                let mut x1 = x + glyph.x0 * scale;
                let mut x2 = x + glyph.x1 * scale;
                let mut y1 = y + glyph.y0 * scale;
                let mut y2 = y + glyph.y1 * scale;
                if x1 <= clip_rect.max[0] && x2 >= clip_rect.min[0] {
                    let mut u1 = glyph.u0;
                    let mut v1 = glyph.v0;
                    let mut u2 = glyph.u1;
                    let mut v2 = glyph.v1;

                    if cpu_fine_clip {
                        if x1 < clip_rect.min[0] {
                            u1 += (1.0 - (x2 - clip_rect.min[0]) / (x2 - x1)) * (u2 - u1);
                            x1 = clip_rect.min[0];
                        }
                        if y1 < clip_rect.min[1] {
                            v1 += (1.0 - (y2 - clip_rect.min[1]) / (y2 - y1)) * (v2 - v1);
                            y1 = clip_rect.min[1];
                        }
                        if x2 > clip_rect.max[0] {
                            u2 = u1 + ((clip_rect.max[0] - x1) / (x2 - x1)) * (u2 - u1);
                            x2 = clip_rect.max[0];
                        }
                        if y2 > clip_rect.max[1] {
                            v2 = v1 + ((clip_rect.max[1] - y1) / (y2 - y1)) * (v2 - v1);
                            y2 = clip_rect.max[1];
                        }
                        if y1 >= y2 {
                            x += char_width;
                            continue;
                        }
                    }

                    let base = draw.vertex_index();
                    for idx in [base, base + 1, base + 2, base, base + 2, base + 3] {
                        draw.prim_write_idx(idx);
                    }
                    draw.prim_write_vtx(Vec2::new(x1, y1), [u1, v1], color);
                    draw.prim_write_vtx(Vec2::new(x2, y1), [u2, v1], color);
                    draw.prim_write_vtx(Vec2::new(x2, y2), [u2, v2], color);
                    draw.prim_write_vtx(Vec2::new(x1, y2), [u1, v2], color);
                }
            }
            x += char_width;
        }
    }
}

/// Text entry points grafted onto [`DrawListBuilder`].
pub trait DrawListTextExt {
    /// Draw `text` at `pos` in the current clip rect and texture. The
    /// current texture should be the atlas texture the font was baked into.
    /// `wrap_width > 0` enables word wrapping at that pixel width.
    fn add_text(&mut self, font: &Font, size: f32, pos: Vec2, color: Color, text: &str, wrap_width: f32);
}

impl DrawListTextExt for DrawListBuilder {
    fn add_text(&mut self, font: &Font, size: f32, pos: Vec2, color: Color, text: &str, wrap_width: f32) {
        if color.a <= 0.0 || text.is_empty() {
            return;
        }

        // Reserve for the worst case of one quad per char, render, then
        // return whatever clipping and blanks left unused.
        let char_count = text.chars().count();
        let idx_reserve = char_count * 6;
        let vtx_reserve = char_count * 4;
        self.prim_reserve(idx_reserve, vtx_reserve);

        let (vtx_before, idx_before) = self.prim_cursors();
        let clip_rect = self.current_clip_rect();
        font.render_text(self, size, pos, color, clip_rect, text, wrap_width, false);
        let (vtx_after, idx_after) = self.prim_cursors();

        self.prim_unreserve(
            idx_reserve - (idx_after - idx_before),
            vtx_reserve - (vtx_after - vtx_before),
        );
    }
}

#[inline]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[inline]
fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or('\0')
}

#[inline]
fn next_char_len(s: &str) -> usize {
    s.chars().next().map(char::len_utf8).unwrap_or(1)
}

/// After a wrap point, swallow trailing blanks and at most one newline so
/// they render on neither line.
fn skip_wrap_blanks(text: &str, mut i: usize) -> usize {
    while i < text.len() {
        let c = first_char(&text[i..]);
        if is_blank(c) {
            i += c.len_utf8();
        } else {
            if c == '\n' {
                i += 1;
            }
            break;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_draw::{DrawListBuilder, DrawListOptions};

    // 10px font, baseline at 8. Every printable ASCII glyph advances 10,
    // except the space which advances 5 and has no ink.
    fn test_font() -> Font {
        let mut font = Font::new(10.0, 8.0, -2.0, '?');
        for cp in ' '..='~' {
            let visible = cp != ' ';
            font.add_glyph(Glyph {
                codepoint: cp,
                advance_x: if visible { 10.0 } else { 5.0 },
                x0: 0.0,
                y0: 1.0,
                x1: if visible { 8.0 } else { 0.0 },
                y1: if visible { 9.0 } else { 1.0 },
                u0: 0.0,
                v0: 0.0,
                u1: 0.1,
                v1: 0.1,
            });
        }
        font.build_lookup_table();
        font
    }

    fn test_draw_list() -> DrawListBuilder {
        DrawListBuilder::new(DrawListOptions {
            full_clip_rect: Rect::new([0.0, 0.0], [800.0, 600.0]),
            ..DrawListOptions::default()
        })
    }

    #[test]
    fn test_lookup_and_fallback() {
        let font = test_font();
        assert!(font.has_glyph('A'));
        assert!(!font.has_glyph('\u{1000}'));
        assert_eq!(font.find_glyph('A').unwrap().codepoint, 'A');
        // Unmapped codepoints resolve to the fallback glyph and advance.
        assert_eq!(font.find_glyph('\u{1000}').unwrap().codepoint, '?');
        assert_eq!(font.char_advance('\u{1000}'), font.fallback_advance());
        assert!(font.find_glyph_no_fallback('\u{1000}').is_none());
    }

    #[test]
    fn test_tab_synthesized_from_space() {
        let font = test_font();
        assert!(font.has_glyph('\t'));
        assert_eq!(font.char_advance('\t'), 4.0 * font.char_advance(' '));
        assert!(!font.find_glyph('\t').unwrap().visible());
    }

    #[test]
    fn test_calc_text_size_single_line() {
        let font = test_font();
        let size = font.calc_text_size(10.0, 0.0, 0.0, "abc");
        assert_eq!(size, Vec2::new(30.0, 10.0));
        // Empty text still occupies one line of height.
        assert_eq!(font.calc_text_size(10.0, 0.0, 0.0, ""), Vec2::new(0.0, 10.0));
    }

    #[test]
    fn test_calc_text_size_newlines_and_cr() {
        let font = test_font();
        let size = font.calc_text_size(10.0, 0.0, 0.0, "ab\r\ncdef");
        assert_eq!(size, Vec2::new(40.0, 20.0));
        // Trailing newline adds an empty line of width 0 but no height.
        let size = font.calc_text_size(10.0, 0.0, 0.0, "ab\n");
        assert_eq!(size, Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_calc_text_size_scales_with_size() {
        let font = test_font();
        let size = font.calc_text_size(20.0, 0.0, 0.0, "abc");
        assert_eq!(size, Vec2::new(60.0, 20.0));
    }

    #[test]
    fn test_word_wrap_breaks_at_blank() {
        let font = test_font();
        // "aa bb": wrap at 25px forces "aa" / "bb"; the separating space
        // collapses and counts toward neither line.
        let size = font.calc_text_size(10.0, 0.0, 25.0, "aa bb");
        assert_eq!(size, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_word_wrap_after_punctuation() {
        let font = test_font();
        let pos = font.calc_word_wrap_position(1.0, "ab.cd", 35.0);
        assert_eq!(&"ab.cd"[..pos], "ab.");
        let size = font.calc_text_size(10.0, 0.0, 35.0, "ab.cd");
        assert_eq!(size, Vec2::new(30.0, 20.0));
    }

    #[test]
    fn test_word_wrap_splits_oversized_word() {
        let font = test_font();
        // No glyph fits in 1px, but every line still makes progress.
        let size = font.calc_text_size(10.0, 0.0, 1.0, "WWWW");
        assert_eq!(size, Vec2::new(10.0, 40.0));
    }

    #[test]
    fn test_add_text_emits_one_quad_per_visible_glyph() {
        let font = test_font();
        let mut draw = test_draw_list();
        draw.add_text(&font, 10.0, Vec2::new(10.0, 10.0), Color::WHITE, "AB", 0.0);
        assert_eq!(draw.vertices().len(), 8);
        assert_eq!(draw.indices().len(), 12);
        assert_eq!(draw.commands().len(), 1);
        assert_eq!(draw.commands()[0].elem_count, 12);
    }

    #[test]
    fn test_add_text_space_reserves_returned() {
        let font = test_font();
        let mut draw = test_draw_list();
        // The space has no ink; its reserved quad must be handed back.
        draw.add_text(&font, 10.0, Vec2::new(10.0, 10.0), Color::WHITE, "A B", 0.0);
        assert_eq!(draw.vertices().len(), 8);
        assert_eq!(draw.indices().len(), 12);
    }

    #[test]
    fn test_add_text_fully_clipped_emits_nothing() {
        let font = test_font();
        let mut draw = test_draw_list();
        draw.add_text(&font, 10.0, Vec2::new(10.0, 10_000.0), Color::WHITE, "hello", 0.0);
        assert!(draw.vertices().is_empty());
        assert!(draw.indices().is_empty());
        assert_eq!(draw.commands()[0].elem_count, 0);
    }

    #[test]
    fn test_add_text_skips_lines_above_clip() {
        let font = test_font();
        let mut draw = test_draw_list();
        draw.push_clip_rect(Rect::new([0.0, 100.0], [800.0, 600.0]));
        // Ten lines starting at y=0; only the ones reaching y >= 100 emit.
        let text = "a\n".repeat(10);
        draw.add_text(&font, 10.0, Vec2::ZERO, Color::WHITE, &text, 0.0);
        // Lines 0..9 occupy y in [0,100); line 9 at y=90 has line bottom 100,
        // which is not strictly above the clip top, so it is kept.
        assert_eq!(draw.vertices().len(), 4);
    }

    #[test]
    fn test_add_text_zero_alpha_is_noop() {
        let font = test_font();
        let mut draw = test_draw_list();
        draw.add_text(&font, 10.0, Vec2::ZERO, Color::WHITE.with_alpha(0.0), "abc", 0.0);
        assert!(draw.vertices().is_empty());
    }

    #[test]
    fn test_render_text_cpu_fine_clip_trims_uvs() {
        let font = test_font();
        let mut draw = test_draw_list();
        let clip = Rect::new([0.0, 0.0], [14.0, 600.0]);
        // Two glyphs at x=10: first spans [10,18], straddling the clip edge.
        draw.prim_reserve(12, 8);
        font.render_text(&mut draw, 10.0, Vec2::new(10.0, 0.0), Color::WHITE, clip, "AB", 0.0, true);
        let (vtx, idx) = draw.prim_cursors();
        draw.prim_unreserve(12 - idx, 8 - vtx);
        // Second glyph starts at x=20, past the clip edge: culled entirely.
        assert_eq!(draw.vertices().len(), 4);
        let v = draw.vertices();
        assert_eq!(v[1].pos[0], 14.0);
        // UV trimmed proportionally: kept 4/8 of the box.
        assert!((v[1].uv[0] - 0.05).abs() < 1e-6);
    }
}
