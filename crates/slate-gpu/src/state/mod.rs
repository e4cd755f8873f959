//! Pipeline state snapshots.
//!
//! Each fixed-function group is a small `Copy` record; the tracker keeps a
//! desired and an applied snapshot per group and a group is stale exactly
//! when the two differ. The apply engine pushes a whole group to the context
//! in a single call, so coalescing falls out of the comparison.

pub mod topology;
pub(crate) mod tracker;

pub use topology::PrimitiveType;

use crate::context::BufferId;
use crate::vertex::VertexFormat;

/// Face culling selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cull {
    #[default]
    None,
    Clockwise,
}

/// Blend factor for source/destination color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Blend {
    InverseSourceAlpha,
    SourceAlpha,
    One,
}

/// Blend equation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    #[default]
    Add,
    ReverseSubtract,
}

/// Polygon fill selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    #[default]
    Solid,
    Wireframe,
}

/// Rasterizer group: applied to the context as one transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterizerState {
    pub cull: Cull,
    pub fill: FillMode,
    pub multisample: bool,
    pub alpha_test: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull: Cull::None,
            fill: FillMode::Solid,
            multisample: false,
            alpha_test: false,
        }
    }
}

/// Blend group: applied to the context as one transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendState {
    pub enabled: bool,
    pub op: BlendOperation,
    pub source: Blend,
    pub dest: Blend,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            op: BlendOperation::Add,
            source: Blend::SourceAlpha,
            dest: Blend::InverseSourceAlpha,
        }
    }
}

/// Depth group: applied to the context as one transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
}

/// Resolved vertex-buffer binding as handed to the context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexBufferBinding {
    pub buffer: BufferId,
    pub format: VertexFormat,
    pub base_offset: u64,
}
