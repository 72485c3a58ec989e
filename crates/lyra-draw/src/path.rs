use std::f32::consts::PI;

use glam::Vec2;

use crate::color::Color;
use crate::draw_list::DrawListBuilder;
use crate::vertex::TextureId;

/// Path building and the convenience primitives layered on top of it.
///
/// Primitives decompose into path calls followed by `path_fill_convex` or
/// `path_stroke`, which tessellate the accumulated points and clear the path.
impl DrawListBuilder {
    pub fn path_clear(&mut self) {
        self.path.clear();
    }

    #[inline]
    pub fn path_line_to(&mut self, p: Vec2) {
        self.path.push(p);
    }

    /// Append an arc around `center`, sweeping from `a_min` to `a_max`
    /// radians in `num_segments` steps.
    pub fn path_arc_to(&mut self, center: Vec2, radius: f32, a_min: f32, a_max: f32, num_segments: u32) {
        if radius == 0.0 {
            self.path.push(center);
            return;
        }
        self.path.reserve(num_segments as usize + 1);
        for i in 0..=num_segments {
            let a = a_min + (i as f32 / num_segments as f32) * (a_max - a_min);
            self.path
                .push(center + Vec2::new(a.cos(), a.sin()) * radius);
        }
    }

    /// Append a cubic bezier from the current point to `p4`.
    ///
    /// `num_segments == 0` subdivides adaptively (de Casteljau) against the
    /// configured curve tolerance; otherwise the curve is flattened with
    /// fixed parameter steps.
    pub fn path_bezier_cubic_to(&mut self, p2: Vec2, p3: Vec2, p4: Vec2, num_segments: u32) {
        let p1 = *self.path.last().expect("path_bezier_cubic_to needs a current point");
        if num_segments == 0 {
            let tol = self.options().curve_tolerance;
            bezier_casteljau(&mut self.path, p1, p2, p3, p4, tol, 0);
        } else {
            let t_step = 1.0 / num_segments as f32;
            for i in 1..=num_segments {
                self.path.push(bezier_point(p1, p2, p3, p4, t_step * i as f32));
            }
        }
    }

    /// Append a rectangle outline, with optional rounded corners.
    pub fn path_rect(&mut self, a: Vec2, b: Vec2, rounding: f32) {
        let rounding = rounding
            .min((b.x - a.x).abs() * 0.5)
            .min((b.y - a.y).abs() * 0.5);
        if rounding <= 0.0 {
            self.path_line_to(a);
            self.path_line_to(Vec2::new(b.x, a.y));
            self.path_line_to(b);
            self.path_line_to(Vec2::new(a.x, b.y));
        } else {
            // One quarter arc per corner, clockwise from top-left.
            let segments = 8;
            let r = rounding;
            self.path_arc_to(Vec2::new(a.x + r, a.y + r), r, PI, PI * 1.5, segments);
            self.path_arc_to(Vec2::new(b.x - r, a.y + r), r, PI * 1.5, PI * 2.0, segments);
            self.path_arc_to(Vec2::new(b.x - r, b.y - r), r, 0.0, PI * 0.5, segments);
            self.path_arc_to(Vec2::new(a.x + r, b.y - r), r, PI * 0.5, PI, segments);
        }
    }

    /// Tessellate the accumulated path as a convex fill and clear it.
    pub fn path_fill_convex(&mut self, color: Color) {
        let points = std::mem::take(&mut self.path);
        self.add_convex_poly_filled(&points, color);
        self.path = points;
        self.path.clear();
    }

    /// Tessellate the accumulated path as a stroke and clear it.
    pub fn path_stroke(&mut self, color: Color, closed: bool, thickness: f32) {
        let points = std::mem::take(&mut self.path);
        self.add_polyline(&points, color, closed, thickness);
        self.path = points;
        self.path.clear();
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    pub fn add_line(&mut self, a: Vec2, b: Vec2, color: Color, thickness: f32) {
        if color.a <= 0.0 {
            return;
        }
        // Center 1px lines on the pixel grid.
        let half = Vec2::splat(0.5);
        self.path_line_to(a + half);
        self.path_line_to(b + half);
        self.path_stroke(color, false, thickness);
    }

    pub fn add_rect(&mut self, a: Vec2, b: Vec2, color: Color, rounding: f32, thickness: f32) {
        if color.a <= 0.0 {
            return;
        }
        self.path_rect(a + Vec2::splat(0.5), b - Vec2::splat(0.5), rounding);
        self.path_stroke(color, true, thickness);
    }

    pub fn add_rect_filled(&mut self, a: Vec2, b: Vec2, color: Color, rounding: f32) {
        if color.a <= 0.0 {
            return;
        }
        if rounding > 0.0 {
            self.path_rect(a, b, rounding);
            self.path_fill_convex(color);
        } else {
            self.prim_reserve(6, 4);
            self.prim_rect(a, b, color);
        }
    }

    pub fn add_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color, thickness: f32) {
        if color.a <= 0.0 {
            return;
        }
        self.path_line_to(a);
        self.path_line_to(b);
        self.path_line_to(c);
        self.path_stroke(color, true, thickness);
    }

    pub fn add_triangle_filled(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if color.a <= 0.0 {
            return;
        }
        self.path_line_to(a);
        self.path_line_to(b);
        self.path_line_to(c);
        self.path_fill_convex(color);
    }

    pub fn add_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Color,
        num_segments: u32,
        thickness: f32,
    ) {
        if color.a <= 0.0 || num_segments < 3 {
            return;
        }
        // Stop one segment short so the closing stroke segment is not
        // duplicated by the arc endpoint.
        let a_max = PI * 2.0 * (num_segments as f32 - 1.0) / num_segments as f32;
        self.path_arc_to(center, radius, 0.0, a_max, num_segments - 1);
        self.path_stroke(color, true, thickness);
    }

    pub fn add_circle_filled(&mut self, center: Vec2, radius: f32, color: Color, num_segments: u32) {
        if color.a <= 0.0 || num_segments < 3 {
            return;
        }
        let a_max = PI * 2.0 * (num_segments as f32 - 1.0) / num_segments as f32;
        self.path_arc_to(center, radius, 0.0, a_max, num_segments - 1);
        self.path_fill_convex(color);
    }

    pub fn add_bezier_curve(
        &mut self,
        p1: Vec2,
        p2: Vec2,
        p3: Vec2,
        p4: Vec2,
        color: Color,
        thickness: f32,
        num_segments: u32,
    ) {
        if color.a <= 0.0 {
            return;
        }
        self.path_line_to(p1);
        self.path_bezier_cubic_to(p2, p3, p4, num_segments);
        self.path_stroke(color, false, thickness);
    }

    /// Textured quad. Temporarily binds `texture` when it differs from the
    /// current one.
    pub fn add_image(
        &mut self,
        texture: TextureId,
        a: Vec2,
        b: Vec2,
        uv_a: [f32; 2],
        uv_b: [f32; 2],
        color: Color,
    ) {
        if color.a <= 0.0 {
            return;
        }
        let needs_push = texture != self.current_texture();
        if needs_push {
            self.push_texture(texture);
        }
        self.prim_reserve(6, 4);
        self.prim_rect_uv(a, b, uv_a, uv_b, color);
        if needs_push {
            self.pop_texture();
        }
    }
}

#[inline]
fn bezier_point(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    let w1 = u * u * u;
    let w2 = 3.0 * u * u * t;
    let w3 = 3.0 * u * t * t;
    let w4 = t * t * t;
    p1 * w1 + p2 * w2 + p3 * w3 + p4 * w4
}

/// Recursive flatness-driven subdivision. Each flat (or depth-capped)
/// sub-curve emits its own endpoint, so the final leaf pushes the curve's
/// endpoint exactly once.
fn bezier_casteljau(
    path: &mut Vec<Vec2>,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    p4: Vec2,
    tol: f32,
    level: u32,
) {
    let d = p4 - p1;
    let d2 = ((p2.x - p4.x) * d.y - (p2.y - p4.y) * d.x).abs();
    let d3 = ((p3.x - p4.x) * d.y - (p3.y - p4.y) * d.x).abs();
    if (d2 + d3) * (d2 + d3) < tol * d.length_squared() || level >= 10 {
        path.push(p4);
    } else {
        let p12 = (p1 + p2) * 0.5;
        let p23 = (p2 + p3) * 0.5;
        let p34 = (p3 + p4) * 0.5;
        let p123 = (p12 + p23) * 0.5;
        let p234 = (p23 + p34) * 0.5;
        let p1234 = (p123 + p234) * 0.5;
        bezier_casteljau(path, p1, p12, p123, p1234, tol, level + 1);
        bezier_casteljau(path, p1234, p234, p34, p4, tol, level + 1);
    }
}
