use bytemuck::{Pod, Zeroable};

use crate::color::Color;

/// Vertex format written into draw-list buffers.
///
/// Positions are in screen-space pixels. UVs are normalized coordinates into
/// the bound texture (untextured geometry samples the atlas white pixel so it
/// batches with everything else). Color is packed RGBA, one byte per channel
/// (Unorm8x4), which keeps the vertex at 20 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

impl Vertex {
    #[inline]
    pub fn new(pos: [f32; 2], uv: [f32; 2], color: Color) -> Self {
        Self {
            pos,
            uv,
            color: color.to_rgba8(),
        }
    }
}

/// An opaque handle to a texture owned by the rendering backend.
///
/// The draw list only tracks which handle each command should bind; creation
/// and caching of the actual GPU resource is the backend's concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u64);
