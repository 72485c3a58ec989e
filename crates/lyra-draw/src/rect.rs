/// Axis-aligned rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    pub fn from_min_size(min: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            min,
            max: [min[0] + size[0], min[1] + size[1]],
        }
    }

    /// A rectangle covering everything; useful as a "no clipping" sentinel.
    pub const EVERYTHING: Rect = Rect::new([f32::MIN, f32::MIN], [f32::MAX, f32::MAX]);

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    /// Intersection of two rectangles. May produce an inverted (empty) rect.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            [
                self.min[0].max(other.min[0]),
                self.min[1].max(other.min[1]),
            ],
            [
                self.max[0].min(other.max[0]),
                self.max[1].min(other.max[1]),
            ],
        )
    }

    pub fn contains(&self, p: [f32; 2]) -> bool {
        p[0] >= self.min[0] && p[0] < self.max[0] && p[1] >= self.min[1] && p[1] < self.max[1]
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min[0] < other.max[0]
            && self.max[0] > other.min[0]
            && self.min[1] < other.max[1]
            && self.max[1] > other.min[1]
    }
}
