//! Non-owning handles for resources owned by external collaborators.
//!
//! The device never allocates or frees the storage behind these handles; it
//! only caches the small amount of derived information it needs (the vertex
//! format tag, the base offset inside a shared pool). Handing the device a
//! different handle for a slot that previously held another one is an
//! identity change and triggers a rebind at the next apply.

use crate::context::{BufferId, TextureId};
use crate::vertex::VertexFormat;

/// Vertex buffer handle plus the layout tag the device caches for attribute
/// wiring. `base_offset` is the byte offset of this buffer's first vertex
/// inside the underlying buffer object (non-zero when the buffer is a slice
/// of a shared pool).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexBuffer {
    pub id: BufferId,
    pub format: VertexFormat,
    pub base_offset: u64,
}

impl VertexBuffer {
    pub fn new(id: BufferId, format: VertexFormat) -> Self {
        Self {
            id,
            format,
            base_offset: 0,
        }
    }
}

/// Index buffer handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexBuffer {
    pub id: BufferId,
}

impl IndexBuffer {
    pub fn new(id: BufferId) -> Self {
        Self { id }
    }
}

/// Texture handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
}

impl Texture {
    pub fn new(id: TextureId) -> Self {
        Self { id }
    }
}

/// Face selector for cube-map uploads and copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeMapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}
