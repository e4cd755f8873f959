//! The boundary between the device and the underlying graphics context.
//!
//! Everything behind [`Context`] — window/surface ownership, program
//! compilation, buffer and texture storage — belongs to external
//! collaborators. The device calls these primitives only from the deferred
//! apply engine, the upload entry points, and setup/teardown, always from a
//! single thread.

use thiserror::Error;

use crate::resources::CubeMapFace;
use crate::samplers::SamplerDesc;
use crate::state::{BlendState, DepthState, PrimitiveType, RasterizerState, VertexBufferBinding};
use crate::uniforms::UniformShape;

/// Compiled program object id, owned by the external shader manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Buffer object id, owned by the external buffer allocator (except the
/// device's own streaming buffers, created through [`Context::create_buffer`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Texture object id, owned externally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Sampler object id, created and destroyed through the context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SamplerId(pub u32);

/// Location of a uniform variable within one program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Failure reported by the context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context reports error code {code:#06x}")]
    Api { code: u32 },
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),
    #[error("context lost")]
    Lost,
}

/// Capabilities the device adapts to. `max_anisotropy <= 1.0` means
/// anisotropic filtering is unsupported.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextCapabilities {
    pub max_anisotropy: f32,
}

impl Default for ContextCapabilities {
    fn default() -> Self {
        Self { max_anisotropy: 1.0 }
    }
}

bitflags::bitflags! {
    /// Which planes a frame begin clears.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Where a frame renders to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// The default framebuffer (the window surface).
    Default,
    /// An offscreen texture target.
    Texture(TextureId),
}

/// Context-level primitives, in the granularity the apply engine needs: one
/// call per fixed-function state group, identity-addressed binds, and
/// explicit creation for the few objects the device derives itself.
///
/// Methods without a return value follow the context's deferred error model:
/// failures accumulate inside the context and are drained via
/// [`Context::poll_error`] after the calls that matter.
pub trait Context {
    fn capabilities(&self) -> ContextCapabilities;

    /// Make the context current on the calling thread. Idempotent.
    fn make_current(&mut self);

    // --- programs + uniforms ------------------------------------------------

    fn bind_program(&mut self, program: ProgramId);

    /// Location of `name` in `program`, or `None` when the program does not
    /// use that variable.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Transfer `values` to `location` of the currently bound program, with
    /// the transfer width given by `shape`.
    fn set_uniform(&mut self, location: UniformLocation, shape: UniformShape, values: &[f32]);

    // --- textures + samplers ------------------------------------------------

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);
    fn bind_sampler(&mut self, unit: u32, sampler: SamplerId);
    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId, ContextError>;
    fn destroy_sampler(&mut self, sampler: SamplerId);

    // --- buffers ------------------------------------------------------------

    /// Create a buffer object for the device's own use (streaming geometry).
    fn create_buffer(&mut self) -> Result<BufferId, ContextError>;
    fn destroy_buffer(&mut self, buffer: BufferId);
    fn bind_vertex_buffer(&mut self, binding: Option<VertexBufferBinding>);
    fn bind_index_buffer(&mut self, buffer: Option<BufferId>);

    // --- fixed-function groups ---------------------------------------------

    fn set_rasterizer_state(&mut self, state: &RasterizerState);
    fn set_blend_state(&mut self, state: &BlendState);
    fn set_depth_state(&mut self, state: &DepthState);
    fn set_viewport(&mut self, width: u32, height: u32);

    // --- uploads ------------------------------------------------------------

    fn vertex_buffer_data(&mut self, buffer: BufferId, data: &[u8]);
    fn vertex_buffer_subdata(&mut self, buffer: BufferId, offset: u64, data: &[u8]);
    fn index_buffer_data(&mut self, buffer: BufferId, data: &[u8]);
    fn texture_pixels(&mut self, texture: TextureId, data: &[u8]);
    fn cube_texture_pixels(&mut self, texture: TextureId, face: CubeMapFace, data: &[u8]);

    /// Map the pixel transfer buffer backing `texture` for writing. Paired
    /// with [`Context::unmap_pixel_buffer`], which performs the actual
    /// upload.
    fn map_pixel_buffer(&mut self, texture: TextureId) -> Result<&mut [u8], ContextError>;
    fn unmap_pixel_buffer(&mut self, texture: TextureId);

    // --- frame + draws ------------------------------------------------------

    fn begin_frame(
        &mut self,
        target: RenderTarget,
        clear: ClearMask,
        backcolor: [f32; 4],
        use_depth: bool,
    );
    fn finish_frame(&mut self);
    fn clear_texture(&mut self, texture: TextureId, color: [f32; 4]);
    fn copy_to_cube_face(&mut self, dst: TextureId, face: CubeMapFace);
    fn draw(&mut self, primitive: PrimitiveType, start_vertex: u32, vertex_count: u32);
    fn draw_indexed(&mut self, primitive: PrimitiveType, start_index: u32, index_count: u32);
    fn swap_buffers(&mut self);

    /// Drain the context's pending error condition, if any.
    fn poll_error(&mut self) -> Option<ContextError>;
}
