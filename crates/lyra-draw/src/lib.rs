//! # lyra-draw
//!
//! Graphics backend agnostic immediate-mode draw lists.
//!
//! A [`DrawListBuilder`] accumulates vertices, indices and draw commands for
//! one frame: primitives decompose into path calls plus a convex fill or
//! stroke, emission is coalesced into as few commands as clip/texture state
//! allows, and channels let callers composite out of submission order. The
//! GPU backend consumes the finished buffers once per frame; this crate has
//! zero dependencies on any specific graphics API.
//!
//! Text rendering lives in `lyra-text`, which emits glyph quads through the
//! same reserve/write contract.

mod color;
mod draw_list;
mod path;
mod rect;
mod tessellate;
mod vertex;

pub use color::*;
pub use draw_list::*;
pub use rect::*;
pub use vertex::*;
