use glam::Vec2;

use crate::color::Color;
use crate::draw_list::DrawListBuilder;

/// Width of the translucent fringe ring added around antialiased geometry,
/// in pixels.
const FRINGE: f32 = 1.0;

/// Rescale an averaged pair of unit edge normals back to miter length.
///
/// `n` is the mean of two unit normals, so `1 / |n|^2` stretches it to the
/// angle bisector of the joint. The factor is clamped to 100x so nearly
/// opposite edges cannot blow the miter out to infinity.
#[inline]
fn fix_normal(mut n: Vec2) -> Vec2 {
    let d2 = n.length_squared();
    if d2 > 0.000001 {
        let inv_len2 = (1.0 / d2).min(100.0);
        n *= inv_len2;
    }
    n
}

/// Primitive tessellation: accumulated path points are converted into
/// triangulated, optionally antialiased fill and stroke geometry written
/// through the reserve/write cursor contract.
impl DrawListBuilder {
    /// Stroke an open or closed polyline with uniform thickness.
    ///
    /// Antialiased thin strokes (`thickness <= 1`) use 3 vertices per point
    /// (core + two fringe); thick strokes use 4 per point (two core + two
    /// fringe), each segment contributing an inner quad plus two fringe
    /// quads.
    pub fn add_polyline(&mut self, points: &[Vec2], color: Color, closed: bool, thickness: f32) {
        let n = points.len();
        if n < 2 || color.a <= 0.0 {
            return;
        }
        let uv = self.options().white_uv;
        let count = if closed { n } else { n - 1 };
        let thick_line = thickness > 1.0;

        if self.options().anti_aliased_lines {
            let color_trans = color.with_alpha(0.0);
            let idx_count = count * if thick_line { 18 } else { 12 };
            let vtx_count = n * if thick_line { 4 } else { 3 };
            self.prim_reserve(idx_count, vtx_count);

            // Per-segment outward normals; the last point of an open line
            // reuses the final segment's normal.
            let mut normals = vec![Vec2::ZERO; n];
            for i1 in 0..count {
                let i2 = if i1 + 1 == n { 0 } else { i1 + 1 };
                let d = (points[i2] - points[i1]).normalize_or_zero();
                normals[i1] = Vec2::new(d.y, -d.x);
            }
            if !closed {
                normals[n - 1] = normals[n - 2];
            }

            if !thick_line {
                let mut edges = vec![Vec2::ZERO; n * 2];
                if !closed {
                    edges[0] = points[0] + normals[0] * FRINGE;
                    edges[1] = points[0] - normals[0] * FRINGE;
                    edges[(n - 1) * 2] = points[n - 1] + normals[n - 1] * FRINGE;
                    edges[(n - 1) * 2 + 1] = points[n - 1] - normals[n - 1] * FRINGE;
                }

                let base = self.vertex_index();
                let mut idx1 = base;
                for i1 in 0..count {
                    let i2 = if i1 + 1 == n { 0 } else { i1 + 1 };
                    let idx2 = if i2 == 0 { base } else { idx1 + 3 };

                    let dm = fix_normal((normals[i1] + normals[i2]) * 0.5) * FRINGE;
                    edges[i2 * 2] = points[i2] + dm;
                    edges[i2 * 2 + 1] = points[i2] - dm;

                    for i in [
                        idx2, idx1, idx1 + 2, idx1 + 2, idx2 + 2, idx2, //
                        idx2 + 1, idx1 + 1, idx1, idx1, idx2, idx2 + 1,
                    ] {
                        self.prim_write_idx(i);
                    }
                    idx1 = idx2;
                }
                for i in 0..n {
                    self.prim_write_vtx(points[i], uv, color);
                    self.prim_write_vtx(edges[i * 2], uv, color_trans);
                    self.prim_write_vtx(edges[i * 2 + 1], uv, color_trans);
                }
            } else {
                let half_inner = (thickness - FRINGE) * 0.5;
                let mut edges = vec![Vec2::ZERO; n * 4];
                if !closed {
                    let last = n - 1;
                    edges[0] = points[0] + normals[0] * (half_inner + FRINGE);
                    edges[1] = points[0] + normals[0] * half_inner;
                    edges[2] = points[0] - normals[0] * half_inner;
                    edges[3] = points[0] - normals[0] * (half_inner + FRINGE);
                    edges[last * 4] = points[last] + normals[last] * (half_inner + FRINGE);
                    edges[last * 4 + 1] = points[last] + normals[last] * half_inner;
                    edges[last * 4 + 2] = points[last] - normals[last] * half_inner;
                    edges[last * 4 + 3] = points[last] - normals[last] * (half_inner + FRINGE);
                }

                let base = self.vertex_index();
                let mut idx1 = base;
                for i1 in 0..count {
                    let i2 = if i1 + 1 == n { 0 } else { i1 + 1 };
                    let idx2 = if i2 == 0 { base } else { idx1 + 4 };

                    let dm = fix_normal((normals[i1] + normals[i2]) * 0.5);
                    let dm_out = dm * (half_inner + FRINGE);
                    let dm_in = dm * half_inner;
                    edges[i2 * 4] = points[i2] + dm_out;
                    edges[i2 * 4 + 1] = points[i2] + dm_in;
                    edges[i2 * 4 + 2] = points[i2] - dm_in;
                    edges[i2 * 4 + 3] = points[i2] - dm_out;

                    for i in [
                        idx2 + 1, idx1 + 1, idx1 + 2, idx1 + 2, idx2 + 2, idx2 + 1, //
                        idx2 + 1, idx1 + 1, idx1, idx1, idx2, idx2 + 1, //
                        idx2 + 2, idx1 + 2, idx1 + 3, idx1 + 3, idx2 + 3, idx2 + 2,
                    ] {
                        self.prim_write_idx(i);
                    }
                    idx1 = idx2;
                }
                for i in 0..n {
                    self.prim_write_vtx(edges[i * 4], uv, color_trans);
                    self.prim_write_vtx(edges[i * 4 + 1], uv, color);
                    self.prim_write_vtx(edges[i * 4 + 2], uv, color);
                    self.prim_write_vtx(edges[i * 4 + 3], uv, color_trans);
                }
            }
        } else {
            // Aliased: one quad per segment.
            self.prim_reserve(count * 6, count * 4);
            for i1 in 0..count {
                let i2 = if i1 + 1 == n { 0 } else { i1 + 1 };
                let p1 = points[i1];
                let p2 = points[i2];
                let d = (p2 - p1).normalize_or_zero() * (thickness * 0.5);

                let base = self.vertex_index();
                self.prim_write_vtx(Vec2::new(p1.x + d.y, p1.y - d.x), uv, color);
                self.prim_write_vtx(Vec2::new(p2.x + d.y, p2.y - d.x), uv, color);
                self.prim_write_vtx(Vec2::new(p2.x - d.y, p2.y + d.x), uv, color);
                self.prim_write_vtx(Vec2::new(p1.x - d.y, p1.y + d.x), uv, color);
                for i in [base, base + 1, base + 2, base, base + 2, base + 3] {
                    self.prim_write_idx(i);
                }
            }
        }
    }

    /// Fill a convex polygon, fan-triangulated from vertex 0.
    ///
    /// With antialiasing an outward zero-alpha fringe ring is added per edge
    /// for a smooth silhouette: 2 extra vertices and 2 extra triangles per
    /// edge on top of the `(n - 2)` fan triangles.
    pub fn add_convex_poly_filled(&mut self, points: &[Vec2], color: Color) {
        let n = points.len();
        if n < 3 || color.a <= 0.0 {
            return;
        }
        let uv = self.options().white_uv;

        if self.options().anti_aliased_fill {
            let color_trans = color.with_alpha(0.0);
            let idx_count = (n - 2) * 3 + n * 6;
            let vtx_count = n * 2;
            self.prim_reserve(idx_count, vtx_count);

            // Interleaved inner/outer pairs: inner at even offsets, fringe
            // outline at odd offsets.
            let vtx_inner = self.vertex_index();
            let vtx_outer = vtx_inner + 1;
            for i in 2..n as u32 {
                self.prim_write_idx(vtx_inner);
                self.prim_write_idx(vtx_inner + ((i - 1) << 1));
                self.prim_write_idx(vtx_inner + (i << 1));
            }

            let mut normals = vec![Vec2::ZERO; n];
            let mut i0 = n - 1;
            for i1 in 0..n {
                let d = (points[i1] - points[i0]).normalize_or_zero();
                normals[i0] = Vec2::new(d.y, -d.x);
                i0 = i1;
            }

            let mut i0 = n - 1;
            for i1 in 0..n {
                let dm = fix_normal((normals[i0] + normals[i1]) * 0.5) * (FRINGE * 0.5);
                self.prim_write_vtx(points[i1] - dm, uv, color);
                self.prim_write_vtx(points[i1] + dm, uv, color_trans);

                let (a, b) = (i0 as u32, i1 as u32);
                for i in [
                    vtx_inner + (b << 1),
                    vtx_inner + (a << 1),
                    vtx_outer + (a << 1),
                    vtx_outer + (a << 1),
                    vtx_outer + (b << 1),
                    vtx_inner + (b << 1),
                ] {
                    self.prim_write_idx(i);
                }
                i0 = i1;
            }
        } else {
            self.prim_reserve((n - 2) * 3, n);
            let base = self.vertex_index();
            for i in 2..n as u32 {
                self.prim_write_idx(base);
                self.prim_write_idx(base + i - 1);
                self.prim_write_idx(base + i);
            }
            for &p in points {
                self.prim_write_vtx(p, uv, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw_list::DrawListOptions;
    use crate::rect::Rect;

    fn test_list(aa: bool) -> DrawListBuilder {
        DrawListBuilder::new(DrawListOptions {
            full_clip_rect: Rect::new([0.0, 0.0], [800.0, 600.0]),
            anti_aliased_lines: aa,
            anti_aliased_fill: aa,
            ..Default::default()
        })
    }

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_fill_aa_counts() {
        let mut list = test_list(true);
        let pts = square();
        list.add_convex_poly_filled(&pts, Color::WHITE);
        let n = pts.len();
        assert_eq!(list.vertices().len(), n * 2);
        assert_eq!(list.indices().len(), (n - 2) * 3 + n * 6);
        assert_eq!(list.commands()[0].elem_count as usize, list.indices().len());
    }

    #[test]
    fn test_fill_aa_fringe_is_transparent() {
        let mut list = test_list(true);
        list.add_convex_poly_filled(&square(), Color::WHITE);
        // Inner vertices carry full alpha, fringe vertices zero alpha.
        for pair in list.vertices().chunks(2) {
            assert_eq!(pair[0].color[3], 255);
            assert_eq!(pair[1].color[3], 0);
        }
    }

    #[test]
    fn test_fill_no_aa_counts() {
        let mut list = test_list(false);
        let pts = square();
        list.add_convex_poly_filled(&pts, Color::WHITE);
        assert_eq!(list.vertices().len(), 4);
        assert_eq!(list.indices().len(), 6);
    }

    #[test]
    fn test_thin_stroke_counts() {
        let mut list = test_list(true);
        let pts = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(20.0, 5.0)];
        list.add_polyline(&pts, Color::WHITE, false, 1.0);
        // 3 vertices per point, 12 indices per segment.
        assert_eq!(list.vertices().len(), 3 * 3);
        assert_eq!(list.indices().len(), 2 * 12);
    }

    #[test]
    fn test_thick_stroke_counts() {
        let mut list = test_list(true);
        let pts = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(20.0, 5.0)];
        list.add_polyline(&pts, Color::WHITE, false, 4.0);
        // 4 vertices per point, 18 indices per segment.
        assert_eq!(list.vertices().len(), 3 * 4);
        assert_eq!(list.indices().len(), 2 * 18);
    }

    #[test]
    fn test_closed_stroke_counts() {
        let mut list = test_list(true);
        let pts = square();
        list.add_polyline(&pts, Color::WHITE, true, 1.0);
        assert_eq!(list.vertices().len(), 4 * 3);
        assert_eq!(list.indices().len(), 4 * 12);
    }

    #[test]
    fn test_aliased_stroke_counts() {
        let mut list = test_list(false);
        let pts = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)];
        list.add_polyline(&pts, Color::WHITE, false, 2.0);
        assert_eq!(list.vertices().len(), 4);
        assert_eq!(list.indices().len(), 6);
    }

    #[test]
    fn test_sharp_corner_miter_is_clamped() {
        let mut list = test_list(true);
        // A nearly-degenerate hairpin: averaged normals almost cancel.
        let pts = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(0.0, 0.1),
        ];
        list.add_polyline(&pts, Color::WHITE, false, 1.0);
        // The clamp (<= 100x) keeps every fringe vertex within a sane
        // distance of the joint instead of shooting off toward infinity.
        for v in list.vertices() {
            assert!(v.pos[0].abs() < 200.0 && v.pos[1].abs() < 200.0);
        }
    }

    #[test]
    fn test_degenerate_inputs_are_ignored() {
        let mut list = test_list(true);
        list.add_polyline(&[Vec2::ZERO], Color::WHITE, false, 1.0);
        list.add_convex_poly_filled(&[Vec2::ZERO, Vec2::ONE], Color::WHITE);
        assert!(list.vertices().is_empty());
        assert!(list.indices().is_empty());
    }

    #[test]
    fn test_all_indices_in_range() {
        let mut list = test_list(true);
        list.add_convex_poly_filled(&square(), Color::WHITE);
        list.add_polyline(&square(), Color::BLACK, true, 3.0);
        let vtx_count = list.vertices().len() as u32;
        for &i in list.indices() {
            assert!(i < vtx_count);
        }
    }
}
