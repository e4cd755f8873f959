//! Desired/applied shadow of the full context state.
//!
//! Every group starts with no applied snapshot, so the first apply after
//! device creation pushes everything once regardless of defaults; after that
//! a group is touched only when its desired snapshot actually differs from
//! what the context last received.

use crate::context::{BufferId, TextureId};
use crate::samplers::{FilterSpec, TextureAddress};
use crate::shaders::ShaderName;
use crate::state::{BlendState, DepthState, RasterizerState, VertexBufferBinding};

/// One tracked state group: the desired snapshot and the snapshot last
/// pushed to the context (`None` until the first apply).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Group<T> {
    desired: T,
    applied: Option<T>,
}

impl<T: Copy + PartialEq> Group<T> {
    pub fn new(initial: T) -> Self {
        Self {
            desired: initial,
            applied: None,
        }
    }

    /// Record a new desired value. Returns true if the desired snapshot
    /// changed (the caller uses this to set the needs-apply hint).
    pub fn request(&mut self, value: T) -> bool {
        if self.desired == value {
            return false;
        }
        self.desired = value;
        true
    }

    pub fn is_stale(&self) -> bool {
        self.applied != Some(self.desired)
    }

    pub fn desired(&self) -> T {
        self.desired
    }

    pub fn applied(&self) -> Option<T> {
        self.applied
    }

    pub fn mark_applied(&mut self) {
        self.applied = Some(self.desired);
    }

    /// Forget what the context holds, forcing a re-push at the next apply
    /// even if the desired value is unchanged.
    pub fn invalidate(&mut self) {
        self.applied = None;
    }
}

/// Desired state of the single texture unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TextureStage {
    pub texture: Option<TextureId>,
    pub wrap: TextureAddress,
    pub filter: FilterSpec,
}

impl Default for TextureStage {
    fn default() -> Self {
        Self {
            texture: None,
            wrap: TextureAddress::Wrap,
            filter: FilterSpec::default(),
        }
    }
}

/// The complete shadow state owned by the device.
pub(crate) struct StateTracker {
    pub shader: Group<ShaderName>,
    pub texture: Group<TextureStage>,
    pub vertex: Group<Option<VertexBufferBinding>>,
    pub index: Group<Option<BufferId>>,
    pub raster: Group<RasterizerState>,
    pub blend: Group<BlendState>,
    pub depth: Group<DepthState>,
    pub viewport: Group<(u32, u32)>,
}

impl StateTracker {
    pub fn new(initial_shader: ShaderName) -> Self {
        Self {
            shader: Group::new(initial_shader),
            texture: Group::new(TextureStage::default()),
            vertex: Group::new(None),
            index: Group::new(None),
            raster: Group::new(RasterizerState::default()),
            blend: Group::new(BlendState::default()),
            depth: Group::new(DepthState::default()),
            viewport: Group::new((0, 0)),
        }
    }
}
