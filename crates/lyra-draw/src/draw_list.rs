use glam::Vec2;

use crate::color::Color;
use crate::rect::Rect;
use crate::vertex::{TextureId, Vertex};

/// One GPU indexed-draw invocation.
///
/// Commands partition the index buffer into contiguous, non-overlapping
/// ranges in submission order: command N draws the `elem_count` indices that
/// follow the indices consumed by commands 0..N.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub elem_count: u32,
    pub clip_rect: Rect,
    pub texture: TextureId,
}

/// Shared parameters a draw list is created with.
///
/// `white_uv` must point at a guaranteed solid texel inside the default
/// texture (the font atlas exposes one) so untextured geometry batches with
/// text in a single draw.
#[derive(Clone, Copy, Debug)]
pub struct DrawListOptions {
    pub full_clip_rect: Rect,
    pub default_texture: TextureId,
    pub white_uv: [f32; 2],
    pub anti_aliased_lines: bool,
    pub anti_aliased_fill: bool,
    /// Maximum error when flattening bezier curves, in pixels.
    pub curve_tolerance: f32,
}

impl Default for DrawListOptions {
    fn default() -> Self {
        Self {
            full_clip_rect: Rect::EVERYTHING,
            default_texture: TextureId::default(),
            white_uv: [0.0, 0.0],
            anti_aliased_lines: true,
            anti_aliased_fill: true,
            curve_tolerance: 1.25,
        }
    }
}

/// An independent (command list, index buffer) bin used for out-of-order
/// compositing. Vertices are shared across channels; only the commands and
/// indices are redirected while a split is active.
#[derive(Clone, Debug, Default)]
struct DrawChannel {
    commands: Vec<DrawCommand>,
    indices: Vec<u32>,
    idx_write: usize,
}

/// Accumulates vertices, indices and draw commands for one frame.
///
/// Single-threaded: one builder is mutated by one logical UI thread per
/// frame, and the finished buffers are lent to the GPU backend by shared
/// reference. `clear()` resets the contents but keeps backing capacity so
/// steady-state frames allocate nothing.
pub struct DrawListBuilder {
    opts: DrawListOptions,

    vertices: Vec<Vertex>,
    vtx_write: usize,

    channels: Vec<DrawChannel>,
    current_channel: usize,

    clip_stack: Vec<Rect>,
    texture_stack: Vec<TextureId>,

    // Transient point buffer consumed by path_fill_convex / path_stroke.
    pub(crate) path: Vec<Vec2>,
}

impl DrawListBuilder {
    pub fn new(opts: DrawListOptions) -> Self {
        let mut list = Self {
            opts,
            vertices: Vec::new(),
            vtx_write: 0,
            channels: vec![DrawChannel::default()],
            current_channel: 0,
            clip_stack: Vec::new(),
            texture_stack: Vec::new(),
            path: Vec::new(),
        };
        list.clear();
        list
    }

    pub fn options(&self) -> &DrawListOptions {
        &self.opts
    }

    /// Reset to one default command and the full-screen clip rect.
    ///
    /// Backing storage capacity is retained for reuse across frames.
    pub fn clear(&mut self) {
        log::trace!(
            "draw list clear: {} vtx, {} cmds",
            self.vertices.len(),
            self.channels[0].commands.len()
        );
        self.vertices.clear();
        self.vtx_write = 0;
        self.channels.truncate(1);
        self.current_channel = 0;
        let ch = &mut self.channels[0];
        ch.commands.clear();
        ch.indices.clear();
        ch.idx_write = 0;
        self.clip_stack.clear();
        self.texture_stack.clear();
        self.path.clear();

        // The initial full-screen rect is the only force-pushed clip.
        self.clip_stack.push(self.opts.full_clip_rect);
        let clip = self.opts.full_clip_rect;
        let texture = self.opts.default_texture;
        self.channels[0].commands.push(DrawCommand {
            elem_count: 0,
            clip_rect: clip,
            texture,
        });
    }

    // ------------------------------------------------------------------
    // Clip / texture state
    // ------------------------------------------------------------------

    pub fn current_clip_rect(&self) -> Rect {
        *self.clip_stack.last().unwrap_or(&self.opts.full_clip_rect)
    }

    pub fn current_texture(&self) -> TextureId {
        self.texture_stack
            .last()
            .copied()
            .unwrap_or(self.opts.default_texture)
    }

    /// Push a clip rect, intersected with the current one.
    pub fn push_clip_rect(&mut self, rect: Rect) {
        let rect = rect.intersect(&self.current_clip_rect());
        self.clip_stack.push(rect);
        self.on_state_change();
    }

    /// Push the full-screen clip rect, replacing rather than intersecting.
    pub fn push_clip_rect_full_screen(&mut self) {
        self.clip_stack.push(self.opts.full_clip_rect);
        self.on_state_change();
    }

    pub fn pop_clip_rect(&mut self) {
        debug_assert!(
            self.clip_stack.len() > 1,
            "pop_clip_rect without matching push"
        );
        self.clip_stack.pop();
        self.on_state_change();
    }

    pub fn push_texture(&mut self, texture: TextureId) {
        self.texture_stack.push(texture);
        self.on_state_change();
    }

    pub fn pop_texture(&mut self) {
        debug_assert!(
            !self.texture_stack.is_empty(),
            "pop_texture without matching push"
        );
        self.texture_stack.pop();
        self.on_state_change();
    }

    /// Open a fresh command regardless of merging rules.
    pub fn add_draw_cmd(&mut self) {
        let clip_rect = self.current_clip_rect();
        let texture = self.current_texture();
        self.channels[self.current_channel]
            .commands
            .push(DrawCommand {
                elem_count: 0,
                clip_rect,
                texture,
            });
    }

    /// Make the current command match the current (clip, texture) state.
    ///
    /// Either opens a new command (current one is non-empty with different
    /// state), retargets the current empty command, or folds an empty command
    /// backward into an identical predecessor so state toggling does not
    /// fragment adjacent same-state submissions.
    fn on_state_change(&mut self) {
        let clip_rect = self.current_clip_rect();
        let texture = self.current_texture();
        let ch = &mut self.channels[self.current_channel];
        let n = ch.commands.len();
        if n == 0 {
            ch.commands.push(DrawCommand {
                elem_count: 0,
                clip_rect,
                texture,
            });
            return;
        }
        let cur = ch.commands[n - 1];
        if cur.elem_count == 0 {
            if n > 1
                && ch.commands[n - 2].clip_rect == clip_rect
                && ch.commands[n - 2].texture == texture
            {
                // Fold backward: the previous command already has this state.
                ch.commands.pop();
            } else {
                let cur = ch.commands.last_mut().expect("command list non-empty");
                cur.clip_rect = clip_rect;
                cur.texture = texture;
            }
        } else if cur.clip_rect != clip_rect || cur.texture != texture {
            ch.commands.push(DrawCommand {
                elem_count: 0,
                clip_rect,
                texture,
            });
        }
    }

    // ------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------

    /// Split into `count` independent (command list, index buffer) bins.
    ///
    /// Emission continues on channel 0 until `channels_set_current` is
    /// called. Must start from exactly one active channel; nested splits are
    /// a caller bug.
    pub fn channels_split(&mut self, count: usize) {
        assert!(count >= 1, "channels_split requires at least one channel");
        assert_eq!(
            self.channels.len(),
            1,
            "channels_split while already split"
        );
        let clip_rect = self.current_clip_rect();
        let texture = self.current_texture();
        for _ in 1..count {
            self.channels.push(DrawChannel {
                commands: vec![DrawCommand {
                    elem_count: 0,
                    clip_rect,
                    texture,
                }],
                indices: Vec::new(),
                idx_write: 0,
            });
        }
    }

    /// Redirect subsequent emission to channel `index`.
    pub fn channels_set_current(&mut self, index: usize) {
        assert!(index < self.channels.len(), "channel index out of range");
        self.current_channel = index;
    }

    /// Concatenate all channels back into channel 0, in channel order, and
    /// return to single-channel mode. Each bin's trailing zero-element
    /// command is dropped so unused channels contribute nothing.
    pub fn channels_merge(&mut self) {
        if self.channels.len() == 1 {
            self.current_channel = 0;
            return;
        }
        let mut tail: Vec<DrawChannel> = self.channels.drain(1..).collect();
        let ch0 = &mut self.channels[0];
        if ch0.commands.last().map(|c| c.elem_count) == Some(0) {
            ch0.commands.pop();
        }
        for ch in &mut tail {
            if ch.commands.last().map(|c| c.elem_count) == Some(0) {
                ch.commands.pop();
            }
            ch0.commands.append(&mut ch.commands);
            ch0.indices.append(&mut ch.indices);
        }
        ch0.idx_write = ch0.indices.len();
        self.current_channel = 0;
        // Leave a command matching the current state so emission can resume.
        self.on_state_change();
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    // ------------------------------------------------------------------
    // Buffer access (consumed by the GPU backend once per frame)
    // ------------------------------------------------------------------

    /// A trailing zero-element command left by a state change with nothing
    /// emitted after it is not handed to the backend; at least one command
    /// is always returned so the default state stays observable.
    pub fn commands(&self) -> &[DrawCommand] {
        let commands = &self.channels[0].commands;
        let mut end = commands.len();
        while end > 1 && commands[end - 1].elem_count == 0 {
            end -= 1;
        }
        &commands[..end]
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.channels[0].indices
    }

    // ------------------------------------------------------------------
    // Primitive reserve/write contract
    // ------------------------------------------------------------------

    /// Grow backing storage for `idx_count` indices and `vtx_count` vertices
    /// and account them to the current command.
    ///
    /// Subsequent `prim_write_*` calls fill the reserved slots in order.
    /// Callers must reserve the exact upper bound before writing and return
    /// any surplus with [`prim_unreserve`](Self::prim_unreserve);
    /// under-reservation corrupts adjacent primitives and is only caught by
    /// the debug assertions here, not by release-mode runtime checks.
    pub fn prim_reserve(&mut self, idx_count: usize, vtx_count: usize) {
        let ch = &mut self.channels[self.current_channel];
        debug_assert_eq!(
            self.vtx_write,
            self.vertices.len(),
            "previous reservation not fully written or unreserved"
        );
        debug_assert_eq!(ch.idx_write, ch.indices.len());

        let cmd = ch.commands.last_mut().expect("command list non-empty");
        cmd.elem_count += idx_count as u32;

        self.vertices.resize(
            self.vertices.len() + vtx_count,
            Vertex {
                pos: [0.0; 2],
                uv: [0.0; 2],
                color: [0; 4],
            },
        );
        ch.indices.resize(ch.indices.len() + idx_count, 0);
    }

    /// Return over-reserved space and correct the trailing command's element
    /// count. Counts are the number of *unused* slots at the end.
    pub fn prim_unreserve(&mut self, idx_count: usize, vtx_count: usize) {
        let ch = &mut self.channels[self.current_channel];
        let cmd = ch.commands.last_mut().expect("command list non-empty");
        debug_assert!(cmd.elem_count >= idx_count as u32);
        cmd.elem_count -= idx_count as u32;

        let new_vtx_len = self.vertices.len() - vtx_count;
        let new_idx_len = ch.indices.len() - idx_count;
        debug_assert_eq!(self.vtx_write, new_vtx_len, "unreserve does not match writes");
        debug_assert_eq!(ch.idx_write, new_idx_len);
        self.vertices.truncate(new_vtx_len);
        ch.indices.truncate(new_idx_len);
        self.vtx_write = new_vtx_len;
        ch.idx_write = new_idx_len;
    }

    /// Index the next written vertex will get.
    #[inline]
    pub fn vertex_index(&self) -> u32 {
        self.vtx_write as u32
    }

    /// Current (vertex, index) write cursors; lets callers that emit a
    /// variable amount of geometry compute how much of a reservation they
    /// actually used.
    #[inline]
    pub fn prim_cursors(&self) -> (usize, usize) {
        (self.vtx_write, self.channels[self.current_channel].idx_write)
    }

    #[inline]
    pub fn prim_write_vtx(&mut self, pos: Vec2, uv: [f32; 2], color: Color) {
        self.vertices[self.vtx_write] = Vertex::new(pos.to_array(), uv, color);
        self.vtx_write += 1;
    }

    #[inline]
    pub fn prim_write_idx(&mut self, idx: u32) {
        let ch = &mut self.channels[self.current_channel];
        ch.indices[ch.idx_write] = idx;
        ch.idx_write += 1;
    }

    /// Axis-aligned quad sampling the white pixel (assumes reserved 6/4).
    pub fn prim_rect(&mut self, a: Vec2, c: Vec2, color: Color) {
        let uv = self.opts.white_uv;
        self.prim_rect_uv(a, c, uv, uv, color);
    }

    /// Axis-aligned textured quad (assumes reserved 6/4).
    pub fn prim_rect_uv(
        &mut self,
        a: Vec2,
        c: Vec2,
        uv_a: [f32; 2],
        uv_c: [f32; 2],
        color: Color,
    ) {
        let b = Vec2::new(c.x, a.y);
        let d = Vec2::new(a.x, c.y);
        let uv_b = [uv_c[0], uv_a[1]];
        let uv_d = [uv_a[0], uv_c[1]];
        let idx = self.vertex_index();
        for i in [idx, idx + 1, idx + 2, idx, idx + 2, idx + 3] {
            self.prim_write_idx(i);
        }
        self.prim_write_vtx(a, uv_a, color);
        self.prim_write_vtx(b, uv_b, color);
        self.prim_write_vtx(c, uv_c, color);
        self.prim_write_vtx(d, uv_d, color);
    }
}
