//! A headless [`Context`] that records every call instead of driving a GPU.
//!
//! Used by this crate's own tests to assert exactly which transitions the
//! apply engine issues, and useful for diagnostics: a recorded call stream
//! is a complete description of what a real backend would have received.
//! Failure injection covers the error-channel paths (sampler creation,
//! buffer creation, pixel mapping, polled context errors).

use std::collections::{HashMap, VecDeque};

use crate::context::{
    BufferId, ClearMask, Context, ContextCapabilities, ContextError, ProgramId, RenderTarget,
    SamplerId, TextureId, UniformLocation,
};
use crate::resources::CubeMapFace;
use crate::samplers::SamplerDesc;
use crate::state::{BlendState, DepthState, PrimitiveType, RasterizerState, VertexBufferBinding};
use crate::uniforms::UniformShape;

/// One recorded context call, in issue order.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextCall {
    MakeCurrent,
    BindProgram(ProgramId),
    UniformLocationQuery {
        program: ProgramId,
        name: String,
    },
    SetUniform {
        location: UniformLocation,
        shape: UniformShape,
        values: Vec<f32>,
    },
    BindTexture {
        unit: u32,
        texture: Option<TextureId>,
    },
    BindSampler {
        unit: u32,
        sampler: SamplerId,
    },
    CreateSampler(SamplerDesc),
    DestroySampler(SamplerId),
    CreateBuffer(BufferId),
    DestroyBuffer(BufferId),
    BindVertexBuffer(Option<VertexBufferBinding>),
    BindIndexBuffer(Option<BufferId>),
    SetRasterizerState(RasterizerState),
    SetBlendState(BlendState),
    SetDepthState(DepthState),
    SetViewport {
        width: u32,
        height: u32,
    },
    VertexBufferData {
        buffer: BufferId,
        len: usize,
    },
    VertexBufferSubdata {
        buffer: BufferId,
        offset: u64,
        len: usize,
    },
    IndexBufferData {
        buffer: BufferId,
        len: usize,
    },
    TexturePixels {
        texture: TextureId,
        len: usize,
    },
    CubeTexturePixels {
        texture: TextureId,
        face: CubeMapFace,
        len: usize,
    },
    MapPixelBuffer(TextureId),
    UnmapPixelBuffer(TextureId),
    BeginFrame {
        target: RenderTarget,
        clear: ClearMask,
        backcolor: [f32; 4],
        use_depth: bool,
    },
    FinishFrame,
    ClearTexture {
        texture: TextureId,
        color: [f32; 4],
    },
    CopyToCubeFace {
        dst: TextureId,
        face: CubeMapFace,
    },
    Draw {
        primitive: PrimitiveType,
        start_vertex: u32,
        vertex_count: u32,
    },
    DrawIndexed {
        primitive: PrimitiveType,
        start_index: u32,
        index_count: u32,
    },
    SwapBuffers,
}

/// Recording backend with injectable failures.
pub struct RecordingContext {
    pub calls: Vec<ContextCall>,
    pub capabilities: ContextCapabilities,
    /// Number of upcoming `create_sampler` calls that fail.
    pub fail_sampler_creations: u32,
    /// Number of upcoming `create_buffer` calls that fail.
    pub fail_buffer_creations: u32,
    /// Whether `map_pixel_buffer` fails.
    pub fail_pixel_map: bool,
    /// Backing storage for mapped pixel transfers, by texture.
    pub pixel_buffers: HashMap<TextureId, Vec<u8>>,
    pending_errors: VecDeque<ContextError>,
    locations: HashMap<(ProgramId, String), UniformLocation>,
    missing_uniforms: Vec<(ProgramId, String)>,
    next_sampler: u32,
    next_buffer: u32,
    next_location: u32,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            capabilities: ContextCapabilities {
                max_anisotropy: 16.0,
            },
            fail_sampler_creations: 0,
            fail_buffer_creations: 0,
            fail_pixel_map: false,
            pixel_buffers: HashMap::new(),
            pending_errors: VecDeque::new(),
            locations: HashMap::new(),
            missing_uniforms: Vec::new(),
            next_sampler: 0x1000,
            next_buffer: 0x2000,
            next_location: 0,
        }
    }

    /// Queue an error condition for the next `poll_error`.
    pub fn inject_error(&mut self, err: ContextError) {
        self.pending_errors.push_back(err);
    }

    /// Declare that `program` does not use uniform `name`.
    pub fn mark_uniform_missing(&mut self, program: ProgramId, name: &str) {
        self.missing_uniforms.push((program, name.to_owned()));
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&ContextCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&ContextCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Context for RecordingContext {
    fn capabilities(&self) -> ContextCapabilities {
        self.capabilities
    }

    fn make_current(&mut self) {
        self.calls.push(ContextCall::MakeCurrent);
    }

    fn bind_program(&mut self, program: ProgramId) {
        self.calls.push(ContextCall::BindProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.calls.push(ContextCall::UniformLocationQuery {
            program,
            name: name.to_owned(),
        });
        if self
            .missing_uniforms
            .iter()
            .any(|(p, n)| *p == program && n == name)
        {
            return None;
        }
        let next_location = &mut self.next_location;
        let location = *self
            .locations
            .entry((program, name.to_owned()))
            .or_insert_with(|| {
                let location = UniformLocation(*next_location);
                *next_location += 1;
                location
            });
        Some(location)
    }

    fn set_uniform(&mut self, location: UniformLocation, shape: UniformShape, values: &[f32]) {
        self.calls.push(ContextCall::SetUniform {
            location,
            shape,
            values: values.to_vec(),
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        self.calls.push(ContextCall::BindTexture { unit, texture });
    }

    fn bind_sampler(&mut self, unit: u32, sampler: SamplerId) {
        self.calls.push(ContextCall::BindSampler { unit, sampler });
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId, ContextError> {
        self.calls.push(ContextCall::CreateSampler(*desc));
        if self.fail_sampler_creations > 0 {
            self.fail_sampler_creations -= 1;
            return Err(ContextError::ResourceCreation(
                "injected sampler failure".into(),
            ));
        }
        let id = SamplerId(self.next_sampler);
        self.next_sampler += 1;
        Ok(id)
    }

    fn destroy_sampler(&mut self, sampler: SamplerId) {
        self.calls.push(ContextCall::DestroySampler(sampler));
    }

    fn create_buffer(&mut self) -> Result<BufferId, ContextError> {
        if self.fail_buffer_creations > 0 {
            self.fail_buffer_creations -= 1;
            return Err(ContextError::ResourceCreation(
                "injected buffer failure".into(),
            ));
        }
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.calls.push(ContextCall::CreateBuffer(id));
        Ok(id)
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.calls.push(ContextCall::DestroyBuffer(buffer));
    }

    fn bind_vertex_buffer(&mut self, binding: Option<VertexBufferBinding>) {
        self.calls.push(ContextCall::BindVertexBuffer(binding));
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferId>) {
        self.calls.push(ContextCall::BindIndexBuffer(buffer));
    }

    fn set_rasterizer_state(&mut self, state: &RasterizerState) {
        self.calls.push(ContextCall::SetRasterizerState(*state));
    }

    fn set_blend_state(&mut self, state: &BlendState) {
        self.calls.push(ContextCall::SetBlendState(*state));
    }

    fn set_depth_state(&mut self, state: &DepthState) {
        self.calls.push(ContextCall::SetDepthState(*state));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(ContextCall::SetViewport { width, height });
    }

    fn vertex_buffer_data(&mut self, buffer: BufferId, data: &[u8]) {
        self.calls.push(ContextCall::VertexBufferData {
            buffer,
            len: data.len(),
        });
    }

    fn vertex_buffer_subdata(&mut self, buffer: BufferId, offset: u64, data: &[u8]) {
        self.calls.push(ContextCall::VertexBufferSubdata {
            buffer,
            offset,
            len: data.len(),
        });
    }

    fn index_buffer_data(&mut self, buffer: BufferId, data: &[u8]) {
        self.calls.push(ContextCall::IndexBufferData {
            buffer,
            len: data.len(),
        });
    }

    fn texture_pixels(&mut self, texture: TextureId, data: &[u8]) {
        self.calls.push(ContextCall::TexturePixels {
            texture,
            len: data.len(),
        });
    }

    fn cube_texture_pixels(&mut self, texture: TextureId, face: CubeMapFace, data: &[u8]) {
        self.calls.push(ContextCall::CubeTexturePixels {
            texture,
            face,
            len: data.len(),
        });
    }

    fn map_pixel_buffer(&mut self, texture: TextureId) -> Result<&mut [u8], ContextError> {
        self.calls.push(ContextCall::MapPixelBuffer(texture));
        if self.fail_pixel_map {
            return Err(ContextError::ResourceCreation(
                "injected pixel map failure".into(),
            ));
        }
        Ok(self.pixel_buffers.entry(texture).or_default().as_mut_slice())
    }

    fn unmap_pixel_buffer(&mut self, texture: TextureId) {
        self.calls.push(ContextCall::UnmapPixelBuffer(texture));
    }

    fn begin_frame(
        &mut self,
        target: RenderTarget,
        clear: ClearMask,
        backcolor: [f32; 4],
        use_depth: bool,
    ) {
        self.calls.push(ContextCall::BeginFrame {
            target,
            clear,
            backcolor,
            use_depth,
        });
    }

    fn finish_frame(&mut self) {
        self.calls.push(ContextCall::FinishFrame);
    }

    fn clear_texture(&mut self, texture: TextureId, color: [f32; 4]) {
        self.calls.push(ContextCall::ClearTexture { texture, color });
    }

    fn copy_to_cube_face(&mut self, dst: TextureId, face: CubeMapFace) {
        self.calls.push(ContextCall::CopyToCubeFace { dst, face });
    }

    fn draw(&mut self, primitive: PrimitiveType, start_vertex: u32, vertex_count: u32) {
        self.calls.push(ContextCall::Draw {
            primitive,
            start_vertex,
            vertex_count,
        });
    }

    fn draw_indexed(&mut self, primitive: PrimitiveType, start_index: u32, index_count: u32) {
        self.calls.push(ContextCall::DrawIndexed {
            primitive,
            start_index,
            index_count,
        });
    }

    fn swap_buffers(&mut self) {
        self.calls.push(ContextCall::SwapBuffers);
    }

    fn poll_error(&mut self) -> Option<ContextError> {
        self.pending_errors.pop_front()
    }
}
