//! Vertex formats understood by the device.
//!
//! The device does not own vertex data; it only needs to know the layout of
//! whatever buffer is bound so the context can wire input attributes. The two
//! formats form a closed set: `Flat` for screen-space drawing and `World` for
//! lit 3D geometry.

use bytemuck::{Pod, Zeroable};

/// Shader input slots shared by every vertex format.
pub mod locations {
    pub const POSITION: u32 = 0;
    pub const COLOR: u32 = 1;
    pub const TEXCOORD: u32 = 2;
    pub const NORMAL: u32 = 3;
}

/// Layout tag carried by a vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Position + color + texcoord; screen-space geometry.
    Flat,
    /// Position + color + texcoord + normal; world geometry.
    World,
}

/// Component type of a single vertex attribute, as the context consumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Float32x2,
    Float32x3,
    /// Four normalized bytes, e.g. a packed RGBA color.
    Unorm8x4,
}

/// One input attribute within a vertex layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: AttributeFormat,
    pub offset: u64,
}

/// Full attribute wiring for one [`VertexFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: &'static [VertexAttribute],
}

/// Screen-space vertex: position, packed color, texture coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct FlatVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: u32,
    pub u: f32,
    pub v: f32,
}

/// World vertex: position, packed color, texture coordinate, normal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct WorldVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: u32,
    pub u: f32,
    pub v: f32,
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
}

const FLAT_LAYOUT: VertexLayout = VertexLayout {
    stride: std::mem::size_of::<FlatVertex>() as u64,
    attributes: &[
        VertexAttribute {
            location: locations::POSITION,
            format: AttributeFormat::Float32x3,
            offset: 0,
        },
        VertexAttribute {
            location: locations::COLOR,
            format: AttributeFormat::Unorm8x4,
            offset: 12,
        },
        VertexAttribute {
            location: locations::TEXCOORD,
            format: AttributeFormat::Float32x2,
            offset: 16,
        },
    ],
};

const WORLD_LAYOUT: VertexLayout = VertexLayout {
    stride: std::mem::size_of::<WorldVertex>() as u64,
    attributes: &[
        VertexAttribute {
            location: locations::POSITION,
            format: AttributeFormat::Float32x3,
            offset: 0,
        },
        VertexAttribute {
            location: locations::COLOR,
            format: AttributeFormat::Unorm8x4,
            offset: 12,
        },
        VertexAttribute {
            location: locations::TEXCOORD,
            format: AttributeFormat::Float32x2,
            offset: 16,
        },
        VertexAttribute {
            location: locations::NORMAL,
            format: AttributeFormat::Float32x3,
            offset: 24,
        },
    ],
};

impl VertexFormat {
    pub fn layout(self) -> &'static VertexLayout {
        match self {
            VertexFormat::Flat => &FLAT_LAYOUT,
            VertexFormat::World => &WORLD_LAYOUT,
        }
    }
}
