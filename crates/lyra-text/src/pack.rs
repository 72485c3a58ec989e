//! Rectangle bin packing for atlas layout.
//!
//! MaxRects packing into a fixed-width bin: the packer keeps a list of
//! maximal free rectangles, scores every free rectangle for each incoming
//! request under a selectable heuristic, and splits/prunes the free list on
//! placement. Strictly better packing than a shelf packer at higher cost,
//! which is fine here because an atlas build is a one-shot batch operation,
//! not a per-frame one.

/// Rectangle in bin pixel coordinates. A zero-size rect means "not placed".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PackRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PackRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    const fn contains(&self, other: &PackRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }

    #[inline]
    const fn intersects(&self, other: &PackRect) -> bool {
        other.x < self.x + self.w
            && other.x + other.w > self.x
            && other.y < self.y + self.h
            && other.y + other.h > self.y
    }
}

/// How candidate free rectangles are scored.
///
/// Each heuristic defines a primary and a secondary score; lower is better
/// and ties are broken by the secondary. Contact-point is the odd one out:
/// it maximizes the touching-edge length (stored negated so the comparison
/// stays "lower wins").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PackHeuristic {
    /// Minimize the smaller leftover side.
    BestShortSideFit,
    /// Minimize the larger leftover side.
    BestLongSideFit,
    /// Minimize leftover area, short side second.
    BestAreaFit,
    /// Lowest top edge, then leftmost.
    BottomLeft,
    /// Maximize perimeter contact with placed rects and bin edges.
    ContactPoint,
}

/// Places rectangle requests into a fixed-width, fixed-height bin without
/// overlap. Created once per atlas build and discarded.
pub struct RectPacker {
    bin_width: i32,
    bin_height: i32,
    allow_flip: bool,
    used: Vec<PackRect>,
    free: Vec<PackRect>,
}

impl RectPacker {
    pub fn new(width: i32, height: i32) -> Self {
        let mut packer = Self {
            bin_width: 0,
            bin_height: 0,
            allow_flip: false,
            used: Vec::new(),
            free: Vec::new(),
        };
        packer.init(width, height);
        packer
    }

    /// Allow placements to swap width/height when that scores better.
    pub fn with_flip(mut self, allow: bool) -> Self {
        self.allow_flip = allow;
        self
    }

    /// Reset the free list to one rectangle covering the whole bin.
    pub fn init(&mut self, width: i32, height: i32) {
        assert!(width > 0 && height > 0, "bin dimensions must be positive");
        self.bin_width = width;
        self.bin_height = height;
        self.used.clear();
        self.free.clear();
        self.free.push(PackRect::new(0, 0, width, height));
    }

    /// Place a single rectangle. Returns a zero-size rect if nothing fits or
    /// the request is degenerate.
    pub fn insert(&mut self, w: i32, h: i32, heuristic: PackHeuristic) -> PackRect {
        if w <= 0 || h <= 0 {
            return PackRect::default();
        }
        let (node, _, _) = self.score_rect(w, h, heuristic);
        if node.is_zero() {
            return node;
        }
        self.place(node);
        node
    }

    /// Place a batch of rectangles: at each step every unplaced request is
    /// scored and the single globally best-scoring one is placed.
    ///
    /// The result is index-aligned with `sizes`; requests that did not fit
    /// (or were degenerate) come back as zero rects.
    pub fn insert_batch(&mut self, sizes: &[(i32, i32)], heuristic: PackHeuristic) -> Vec<PackRect> {
        let mut out = vec![PackRect::default(); sizes.len()];
        let mut remaining: Vec<usize> = (0..sizes.len())
            .filter(|&i| sizes[i].0 > 0 && sizes[i].1 > 0)
            .collect();

        while !remaining.is_empty() {
            let mut best: Option<(usize, PackRect, i32, i32)> = None;
            for (slot, &i) in remaining.iter().enumerate() {
                let (w, h) = sizes[i];
                let (node, s1, s2) = self.score_rect(w, h, heuristic);
                if node.is_zero() {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((_, _, b1, b2)) => s1 < b1 || (s1 == b1 && s2 < b2),
                };
                if better {
                    best = Some((slot, node, s1, s2));
                }
            }
            let Some((slot, node, _, _)) = best else {
                // Nothing left fits; the rest stay zero.
                break;
            };
            let index = remaining.swap_remove(slot);
            self.place(node);
            out[index] = node;
        }
        out
    }

    /// Fraction of the bin surface covered by placed rectangles.
    pub fn occupancy(&self) -> f32 {
        let used: i64 = self.used.iter().map(|r| r.w as i64 * r.h as i64).sum();
        used as f32 / (self.bin_width as f32 * self.bin_height as f32)
    }

    pub fn used_rects(&self) -> &[PackRect] {
        &self.used
    }

    // ------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------

    /// Best placement for (w, h) under `heuristic`, with its scores.
    fn score_rect(&self, w: i32, h: i32, heuristic: PackHeuristic) -> (PackRect, i32, i32) {
        let mut best = PackRect::default();
        let mut best_1 = i32::MAX;
        let mut best_2 = i32::MAX;

        let mut consider = |node: PackRect, s1: i32, s2: i32| {
            if s1 < best_1 || (s1 == best_1 && s2 < best_2) {
                best = node;
                best_1 = s1;
                best_2 = s2;
            }
        };

        for fr in &self.free {
            for orientation in self.orientations(w, h) {
                let Some((rw, rh)) = orientation else { continue };
                if fr.w < rw || fr.h < rh {
                    continue;
                }
                let node = PackRect::new(fr.x, fr.y, rw, rh);
                let (s1, s2) = match heuristic {
                    PackHeuristic::BestShortSideFit => {
                        let leftover_h = fr.w - rw;
                        let leftover_v = fr.h - rh;
                        (leftover_h.min(leftover_v), leftover_h.max(leftover_v))
                    }
                    PackHeuristic::BestLongSideFit => {
                        let leftover_h = fr.w - rw;
                        let leftover_v = fr.h - rh;
                        (leftover_h.max(leftover_v), leftover_h.min(leftover_v))
                    }
                    PackHeuristic::BestAreaFit => {
                        let leftover_h = fr.w - rw;
                        let leftover_v = fr.h - rh;
                        (fr.w * fr.h - rw * rh, leftover_h.min(leftover_v))
                    }
                    PackHeuristic::BottomLeft => (fr.y + rh, fr.x),
                    PackHeuristic::ContactPoint => {
                        (-self.contact_point_score(fr.x, fr.y, rw, rh), 0)
                    }
                };
                consider(node, s1, s2);
            }
        }
        (best, best_1, best_2)
    }

    /// The (w, h) orientations to try: as-given, plus flipped when enabled
    /// and not square.
    fn orientations(&self, w: i32, h: i32) -> [Option<(i32, i32)>; 2] {
        if self.allow_flip && w != h {
            [Some((w, h)), Some((h, w))]
        } else {
            [Some((w, h)), None]
        }
    }

    /// Total edge length the candidate shares with the bin border and with
    /// already placed rectangles.
    fn contact_point_score(&self, x: i32, y: i32, w: i32, h: i32) -> i32 {
        let mut score = 0;
        if x == 0 || x + w == self.bin_width {
            score += h;
        }
        if y == 0 || y + h == self.bin_height {
            score += w;
        }
        for r in &self.used {
            if r.x == x + w || r.x + r.w == x {
                score += common_interval(r.y, r.y + r.h, y, y + h);
            }
            if r.y == y + h || r.y + r.h == y {
                score += common_interval(r.x, r.x + r.w, x, x + w);
            }
        }
        score
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    fn place(&mut self, node: PackRect) {
        // Split every free rectangle the new node intersects into up to four
        // remainder rectangles, then prune contained duplicates to bound
        // free-list growth.
        let mut split_out = Vec::new();
        self.free.retain(|fr| {
            if !node.intersects(fr) {
                return true;
            }
            split_free_rect(*fr, node, &mut split_out);
            false
        });
        self.free.append(&mut split_out);
        self.prune_free_list();
        self.used.push(node);
    }

    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut removed = false;
            let mut j = i + 1;
            while j < self.free.len() {
                if self.free[j].contains(&self.free[i]) {
                    self.free.swap_remove(i);
                    removed = true;
                    break;
                }
                if self.free[i].contains(&self.free[j]) {
                    self.free.swap_remove(j);
                } else {
                    j += 1;
                }
            }
            if !removed {
                i += 1;
            }
        }
    }
}

/// Remainders of `free` after carving out `used` (which must intersect it):
/// up to four rectangles covering the free area above, below, left and right
/// of the used one.
fn split_free_rect(free: PackRect, used: PackRect, out: &mut Vec<PackRect>) {
    if used.x < free.x + free.w && used.x + used.w > free.x {
        // Top remainder.
        if used.y > free.y && used.y < free.y + free.h {
            out.push(PackRect::new(free.x, free.y, free.w, used.y - free.y));
        }
        // Bottom remainder.
        if used.y + used.h < free.y + free.h {
            out.push(PackRect::new(
                free.x,
                used.y + used.h,
                free.w,
                free.y + free.h - (used.y + used.h),
            ));
        }
    }
    if used.y < free.y + free.h && used.y + used.h > free.y {
        // Left remainder.
        if used.x > free.x && used.x < free.x + free.w {
            out.push(PackRect::new(free.x, free.y, used.x - free.x, free.h));
        }
        // Right remainder.
        if used.x + used.w < free.x + free.w {
            out.push(PackRect::new(
                used.x + used.w,
                free.y,
                free.x + free.w - (used.x + used.w),
                free.h,
            ));
        }
    }
}

/// Length of the overlap between [a_start, a_end) and [b_start, b_end).
#[inline]
fn common_interval(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> i32 {
    if a_end < b_start || b_end < a_start {
        0
    } else {
        a_end.min(b_end) - a_start.max(b_start)
    }
}
