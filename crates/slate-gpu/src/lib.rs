//! `slate-gpu` is the render-state caching and deferred-application layer of
//! the renderer.
//!
//! Callers express *desired* state through cheap setters on
//! [`RenderDevice`]; the expensive transitions are deferred to the
//! underlying [`Context`] until a draw or presentation entry point needs the
//! state current, and redundant repeated changes collapse into a single
//! transition. Derived sampler objects are deduplicated by filter content
//! (see [`samplers`]).
//!
//! The crate provides:
//! - The device itself with its deferred apply engine (see [`RenderDevice`]).
//! - The [`Context`] boundary trait the device drives, with ids and state
//!   group records (see [`context`] and [`state`]).
//! - A recording backend for tests and diagnostics (see
//!   [`recording::RecordingContext`]).
//!
//! Failures are never raised as results or panics from the hot entry points;
//! they land in a single-slot error channel polled via
//! [`RenderDevice::get_error`].

pub mod context;
pub mod recording;
pub mod resources;
pub mod samplers;
pub mod state;
pub mod uniforms;
pub mod vertex;

mod device;
mod error;
mod shaders;

pub use context::{
    BufferId, ClearMask, Context, ContextCapabilities, ContextError, ProgramId, RenderTarget,
    SamplerId, TextureId, UniformLocation,
};
pub use device::RenderDevice;
pub use error::{ErrorChannel, ERROR_CAPACITY};
pub use resources::{CubeMapFace, IndexBuffer, Texture, VertexBuffer};
pub use samplers::{
    FilterSpec, SamplerDesc, SamplerFilterKey, SamplerVariants, TextureAddress, TextureFilter,
};
pub use shaders::ShaderName;
pub use state::{
    Blend, BlendOperation, BlendState, Cull, DepthState, FillMode, PrimitiveType, RasterizerState,
    VertexBufferBinding,
};
pub use uniforms::{UniformName, UniformShape};
pub use vertex::{FlatVertex, VertexFormat, WorldVertex};
