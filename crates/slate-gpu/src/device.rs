//! The render device: cheap setters in front, deferred application behind.
//!
//! Setters only mutate the shadow state. The context is touched when a draw
//! or presentation entry point runs the apply engine, which pushes exactly
//! the stale groups in a fixed order: shader, uniforms, textures, vertex
//! buffer, index buffer, rasterizer, blend, depth. A draw issued with
//! nothing stale performs zero context state calls beyond the draw itself.
//!
//! Failures never propagate as `Result` or panic; they are recorded in the
//! single-slot error channel for the caller to poll (see [`crate::ErrorChannel`]).

use tracing::{debug, trace};

use crate::context::{BufferId, ClearMask, Context, ContextError, ProgramId, RenderTarget};
use crate::error::ErrorChannel;
use crate::resources::{CubeMapFace, IndexBuffer, Texture, VertexBuffer};
use crate::samplers::{FilterSpec, SamplerCache, SamplerFilterKey, TextureAddress, TextureFilter};
use crate::shaders::{ProgramTable, ShaderName};
use crate::state::tracker::StateTracker;
use crate::state::{
    Blend, BlendOperation, Cull, FillMode, PrimitiveType, VertexBufferBinding,
};
use crate::uniforms::{BoundStamps, UniformName, UniformStore};
use crate::vertex::VertexFormat;

/// The two dynamic vertex buffers used for streamed geometry. Roles swap on
/// every upload so a write never lands in the buffer the context may still
/// be reading from the previous use.
struct StreamBuffers {
    buffers: [BufferId; 2],
    next: usize,
}

impl StreamBuffers {
    fn acquire(&mut self) -> BufferId {
        let buffer = self.buffers[self.next];
        self.next = 1 - self.next;
        buffer
    }
}

/// Deferred-state render device over a [`Context`].
///
/// Owned by exactly one rendering thread; all calls are synchronous and run
/// to completion. See the crate docs for the overall contract.
pub struct RenderDevice<C: Context> {
    context: C,
    tracker: StateTracker,
    uniforms: UniformStore,
    bound_stamps: BoundStamps,
    programs: ProgramTable,
    samplers: SamplerCache,
    errors: ErrorChannel,
    stream: StreamBuffers,
    needs_apply: bool,
    context_current: bool,
}

impl<C: Context> RenderDevice<C> {
    /// Build a device over `context`, with one compiled program id per
    /// [`ShaderName`] (compilation itself happens outside this crate).
    pub fn new(
        mut context: C,
        programs: [ProgramId; ShaderName::COUNT],
    ) -> Result<Self, ContextError> {
        context.make_current();
        let first = context.create_buffer()?;
        let second = match context.create_buffer() {
            Ok(buffer) => buffer,
            Err(err) => {
                context.destroy_buffer(first);
                return Err(err);
            }
        };
        debug!(
            max_anisotropy = context.capabilities().max_anisotropy,
            "created render device"
        );
        Ok(Self {
            context,
            tracker: StateTracker::new(ShaderName::Screen2d),
            uniforms: UniformStore::new(),
            bound_stamps: BoundStamps::new(),
            programs: ProgramTable::new(programs),
            samplers: SamplerCache::new(),
            errors: ErrorChannel::new(),
            stream: StreamBuffers {
                buffers: [first, second],
                next: 0,
            },
            needs_apply: true,
            context_current: true,
        })
    }

    /// The underlying context (read-only; used by diagnostics and tests).
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the underlying context. State changed through this
    /// bypasses the shadow tracking; intended for tests and diagnostics.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    // --- setters ------------------------------------------------------------

    pub fn set_cull_mode(&mut self, mode: Cull) {
        let mut state = self.tracker.raster.desired();
        state.cull = mode;
        self.needs_apply |= self.tracker.raster.request(state);
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) {
        let mut state = self.tracker.raster.desired();
        state.fill = mode;
        self.needs_apply |= self.tracker.raster.request(state);
    }

    pub fn set_multisample_antialias(&mut self, value: bool) {
        let mut state = self.tracker.raster.desired();
        state.multisample = value;
        self.needs_apply |= self.tracker.raster.request(state);
    }

    pub fn set_alpha_test_enable(&mut self, value: bool) {
        let mut state = self.tracker.raster.desired();
        state.alpha_test = value;
        self.needs_apply |= self.tracker.raster.request(state);
    }

    pub fn set_alpha_blend_enable(&mut self, value: bool) {
        let mut state = self.tracker.blend.desired();
        state.enabled = value;
        self.needs_apply |= self.tracker.blend.request(state);
    }

    pub fn set_blend_operation(&mut self, op: BlendOperation) {
        let mut state = self.tracker.blend.desired();
        state.op = op;
        self.needs_apply |= self.tracker.blend.request(state);
    }

    pub fn set_source_blend(&mut self, blend: Blend) {
        let mut state = self.tracker.blend.desired();
        state.source = blend;
        self.needs_apply |= self.tracker.blend.request(state);
    }

    pub fn set_destination_blend(&mut self, blend: Blend) {
        let mut state = self.tracker.blend.desired();
        state.dest = blend;
        self.needs_apply |= self.tracker.blend.request(state);
    }

    pub fn set_z_enable(&mut self, value: bool) {
        let mut state = self.tracker.depth.desired();
        state.test = value;
        self.needs_apply |= self.tracker.depth.request(state);
    }

    pub fn set_z_write_enable(&mut self, value: bool) {
        let mut state = self.tracker.depth.desired();
        state.write = value;
        self.needs_apply |= self.tracker.depth.request(state);
    }

    pub fn set_shader(&mut self, shader: ShaderName) {
        self.needs_apply |= self.tracker.shader.request(shader);
    }

    /// The currently selected program name.
    pub fn active_shader(&self) -> ShaderName {
        self.tracker.shader.desired()
    }

    pub fn set_texture(&mut self, texture: Option<&Texture>) {
        let mut stage = self.tracker.texture.desired();
        stage.texture = texture.map(|t| t.id);
        self.needs_apply |= self.tracker.texture.request(stage);
    }

    pub fn set_sampler_filter(
        &mut self,
        min: TextureFilter,
        mag: TextureFilter,
        mip: TextureFilter,
        max_anisotropy: f32,
    ) {
        let mut stage = self.tracker.texture.desired();
        stage.filter = FilterSpec {
            min,
            mag,
            mip,
            max_anisotropy,
        };
        self.needs_apply |= self.tracker.texture.request(stage);
    }

    pub fn set_sampler_state(&mut self, address: TextureAddress) {
        let mut stage = self.tracker.texture.desired();
        stage.wrap = address;
        self.needs_apply |= self.tracker.texture.request(stage);
    }

    pub fn set_vertex_buffer(&mut self, buffer: Option<&VertexBuffer>) {
        let binding = buffer.map(|b| VertexBufferBinding {
            buffer: b.id,
            format: b.format,
            base_offset: b.base_offset,
        });
        self.needs_apply |= self.tracker.vertex.request(binding);
    }

    pub fn set_index_buffer(&mut self, buffer: Option<&IndexBuffer>) {
        self.needs_apply |= self.tracker.index.request(buffer.map(|b| b.id));
    }

    /// Write a uniform value. The slice length must match the slot's shape
    /// (1/2/3/4/16 components). Identical values still count as updates;
    /// staleness is decided by stamps, not value comparison.
    pub fn set_uniform(&mut self, name: UniformName, values: &[f32]) {
        self.uniforms.set(name, values);
        self.needs_apply = true;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.tracker.viewport.request((width, height));
    }

    // --- deferred apply engine ----------------------------------------------

    /// Push all stale state to the context. Called implicitly by the draw and
    /// presentation entry points; exposed for callers that need state current
    /// without drawing.
    pub fn apply_changes(&mut self) {
        if !self.needs_apply {
            return;
        }
        self.ensure_current();
        self.apply_shader();
        self.apply_uniforms();
        self.apply_textures();
        self.apply_vertex_buffer();
        self.apply_index_buffer();
        self.apply_rasterizer_state();
        self.apply_blend_state();
        self.apply_depth_state();
        // The texture unit stays stale when sampler creation failed; keep the
        // hint set so the next apply retries.
        self.needs_apply = self.tracker.texture.is_stale();
        self.report_context_error("apply_changes");
    }

    pub fn apply_shader(&mut self) {
        if !self.tracker.shader.is_stale() {
            return;
        }
        let shader = self.tracker.shader.desired();
        self.context.bind_program(self.programs.program(shader));
        // A fresh binding has received none of the current uniform values.
        self.bound_stamps.reset();
        trace!(?shader, "bound program");
        self.tracker.shader.mark_applied();
    }

    pub fn apply_uniforms(&mut self) {
        let shader = self.tracker.shader.desired();
        for name in UniformName::ALL {
            let stamp = self.uniforms.stamp(name);
            if stamp <= self.bound_stamps.get(name) {
                continue;
            }
            let glsl_name = self.uniforms.glsl_name(name);
            if let Some(location) =
                self.programs.location(&mut self.context, shader, name, glsl_name)
            {
                self.context.set_uniform(
                    location,
                    self.uniforms.shape(name),
                    self.uniforms.value(name),
                );
            }
            // Programs that do not use the variable skip the transfer but
            // still advance the bound stamp, so the lookup is not repeated
            // until the slot is written again.
            self.bound_stamps.set(name, stamp);
        }
    }

    pub fn apply_textures(&mut self) {
        if !self.tracker.texture.is_stale() {
            return;
        }
        let stage = self.tracker.texture.desired();
        let previously_bound = self
            .tracker
            .texture
            .applied()
            .is_some_and(|s| s.texture.is_some());
        let Some(texture) = stage.texture else {
            if previously_bound {
                self.context.bind_texture(0, None);
            }
            self.tracker.texture.mark_applied();
            return;
        };
        let key = SamplerFilterKey::resolve(stage.filter, &self.context.capabilities());
        let Some(variants) = self.samplers.resolve(&mut self.context, &mut self.errors, key)
        else {
            // Creation failed: leave the unit stale so the next apply retries
            // the same key instead of caching the failure.
            return;
        };
        self.context.bind_texture(0, Some(texture));
        self.context.bind_sampler(0, variants.for_address(stage.wrap));
        self.tracker.texture.mark_applied();
    }

    pub fn apply_vertex_buffer(&mut self) {
        if !self.tracker.vertex.is_stale() {
            return;
        }
        let binding = self.tracker.vertex.desired();
        let previously_bound = matches!(self.tracker.vertex.applied(), Some(Some(_)));
        if binding.is_some() || previously_bound {
            self.context.bind_vertex_buffer(binding);
        }
        self.tracker.vertex.mark_applied();
    }

    pub fn apply_index_buffer(&mut self) {
        if !self.tracker.index.is_stale() {
            return;
        }
        let buffer = self.tracker.index.desired();
        let previously_bound = matches!(self.tracker.index.applied(), Some(Some(_)));
        if buffer.is_some() || previously_bound {
            self.context.bind_index_buffer(buffer);
        }
        self.tracker.index.mark_applied();
    }

    pub fn apply_rasterizer_state(&mut self) {
        if !self.tracker.raster.is_stale() {
            return;
        }
        let state = self.tracker.raster.desired();
        self.context.set_rasterizer_state(&state);
        self.tracker.raster.mark_applied();
    }

    pub fn apply_blend_state(&mut self) {
        if !self.tracker.blend.is_stale() {
            return;
        }
        let state = self.tracker.blend.desired();
        self.context.set_blend_state(&state);
        self.tracker.blend.mark_applied();
    }

    pub fn apply_depth_state(&mut self) {
        if !self.tracker.depth.is_stale() {
            return;
        }
        let state = self.tracker.depth.desired();
        self.context.set_depth_state(&state);
        self.tracker.depth.mark_applied();
    }

    pub fn apply_viewport(&mut self) {
        if !self.tracker.viewport.is_stale() {
            return;
        }
        let (width, height) = self.tracker.viewport.desired();
        if width == 0 || height == 0 {
            self.tracker.viewport.mark_applied();
            return;
        }
        self.context.set_viewport(width, height);
        self.tracker.viewport.mark_applied();
    }

    // --- draws --------------------------------------------------------------

    pub fn draw(&mut self, primitive: PrimitiveType, start_vertex: u32, primitive_count: u32) {
        self.ensure_current();
        self.apply_changes();
        self.context
            .draw(primitive, start_vertex, primitive.vertex_count(primitive_count));
        self.report_context_error("draw");
    }

    pub fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        start_index: u32,
        primitive_count: u32,
    ) {
        self.ensure_current();
        self.apply_changes();
        self.context.draw_indexed(
            primitive,
            start_index,
            primitive.vertex_count(primitive_count),
        );
        self.report_context_error("draw_indexed");
    }

    /// Draw raw vertex data streamed through the device's double-buffered
    /// dynamic buffers (always [`VertexFormat::Flat`]). Consecutive calls
    /// target alternating buffer objects.
    pub fn draw_data(
        &mut self,
        primitive: PrimitiveType,
        start_vertex: u32,
        primitive_count: u32,
        data: &[u8],
    ) {
        self.ensure_current();
        self.apply_changes();
        let target = self.stream.acquire();
        self.context.vertex_buffer_data(target, data);
        self.context.bind_vertex_buffer(Some(VertexBufferBinding {
            buffer: target,
            format: VertexFormat::Flat,
            base_offset: 0,
        }));
        // The stream bind bypassed the tracker; whatever buffer the caller
        // has selected must be re-bound at the next regular draw.
        self.tracker.vertex.invalidate();
        self.needs_apply = true;
        self.context
            .draw(primitive, start_vertex, primitive.vertex_count(primitive_count));
        self.report_context_error("draw_data");
    }

    // --- frame bracketing ---------------------------------------------------

    /// Begin a frame against the window surface or a texture target,
    /// optionally clearing it to `backcolor` (ARGB, 8 bits per channel).
    pub fn start_rendering(
        &mut self,
        clear: bool,
        backcolor: u32,
        target: Option<&Texture>,
        use_depthbuffer: bool,
    ) {
        self.ensure_current();
        let target = match target {
            Some(texture) => RenderTarget::Texture(texture.id),
            None => RenderTarget::Default,
        };
        let mut mask = ClearMask::empty();
        if clear {
            mask |= ClearMask::COLOR;
            if use_depthbuffer {
                mask |= ClearMask::DEPTH | ClearMask::STENCIL;
            }
        }
        self.context
            .begin_frame(target, mask, unpack_argb(backcolor), use_depthbuffer);
        self.apply_viewport();
        self.apply_changes();
        self.report_context_error("start_rendering");
    }

    pub fn finish_rendering(&mut self) {
        self.context.finish_frame();
        self.context_current = false;
    }

    pub fn present(&mut self) {
        self.ensure_current();
        self.apply_changes();
        self.context.swap_buffers();
        self.report_context_error("present");
    }

    // --- uploads ------------------------------------------------------------

    /// Replace `buffer`'s contents and record its new layout tag. If the
    /// buffer is currently selected, the binding picks up the new format.
    pub fn set_vertex_buffer_data(
        &mut self,
        buffer: &mut VertexBuffer,
        data: &[u8],
        format: VertexFormat,
    ) {
        self.ensure_current();
        buffer.format = format;
        if let Some(binding) = self.tracker.vertex.desired() {
            if binding.buffer == buffer.id && binding.format != format {
                self.needs_apply |= self
                    .tracker
                    .vertex
                    .request(Some(VertexBufferBinding { format, ..binding }));
            }
        }
        self.context.vertex_buffer_data(buffer.id, data);
        self.report_context_error("set_vertex_buffer_data");
    }

    pub fn set_vertex_buffer_subdata(
        &mut self,
        buffer: &VertexBuffer,
        dest_offset: u64,
        data: &[u8],
    ) {
        self.ensure_current();
        self.context
            .vertex_buffer_subdata(buffer.id, dest_offset, data);
        self.report_context_error("set_vertex_buffer_subdata");
    }

    pub fn set_index_buffer_data(&mut self, buffer: &IndexBuffer, data: &[u8]) {
        self.ensure_current();
        self.context.index_buffer_data(buffer.id, data);
        self.report_context_error("set_index_buffer_data");
    }

    pub fn set_pixels(&mut self, texture: &Texture, data: &[u8]) {
        self.ensure_current();
        self.context.texture_pixels(texture.id, data);
        self.report_context_error("set_pixels");
    }

    pub fn set_cube_pixels(&mut self, texture: &Texture, face: CubeMapFace, data: &[u8]) {
        self.ensure_current();
        self.context.cube_texture_pixels(texture.id, face, data);
        self.report_context_error("set_cube_pixels");
    }

    /// Mapped pixel transfer: `f` writes into the mapping, the following
    /// unmap performs the upload. A failed map is recorded in the error
    /// channel and `f` is not called.
    pub fn with_mapped_pixels(&mut self, texture: &Texture, f: impl FnOnce(&mut [u8])) {
        self.ensure_current();
        match self.context.map_pixel_buffer(texture.id) {
            Ok(pixels) => f(pixels),
            Err(err) => {
                self.errors
                    .record(format_args!("map_pixel_buffer: {err}"));
                return;
            }
        }
        self.context.unmap_pixel_buffer(texture.id);
        self.report_context_error("unmap_pixel_buffer");
    }

    // --- texture maintenance ------------------------------------------------

    pub fn clear_texture(&mut self, backcolor: u32, texture: &Texture) {
        self.ensure_current();
        self.context.clear_texture(texture.id, unpack_argb(backcolor));
        self.report_context_error("clear_texture");
    }

    pub fn copy_texture(&mut self, dst: &Texture, face: CubeMapFace) {
        self.ensure_current();
        self.context.copy_to_cube_face(dst.id, face);
        self.report_context_error("copy_texture");
    }

    /// Forget what the texture unit holds if it references `texture`,
    /// forcing a rebind at the next apply. Used after external code replaces
    /// the texture's storage behind the same handle.
    pub fn invalidate_texture(&mut self, texture: &Texture) {
        let desired = self.tracker.texture.desired();
        let applied = self.tracker.texture.applied();
        let referenced = desired.texture == Some(texture.id)
            || applied.is_some_and(|s| s.texture == Some(texture.id));
        if referenced {
            self.tracker.texture.invalidate();
            self.needs_apply = true;
        }
    }

    // --- diagnostics --------------------------------------------------------

    /// Poll the context for a pending error condition, recording it in the
    /// error channel. Returns whether an error was seen.
    pub fn check_context_error(&mut self) -> bool {
        if let Some(err) = self.context.poll_error() {
            self.errors.record(format_args!("{err}"));
            return true;
        }
        false
    }

    /// The last recorded error message. Possibly stale: the slot keeps its
    /// contents until the next failure overwrites them (see
    /// [`crate::ErrorChannel`]).
    pub fn get_error(&self) -> &str {
        self.errors.get()
    }

    fn report_context_error(&mut self, operation: &str) {
        if let Some(err) = self.context.poll_error() {
            self.errors.record(format_args!("{operation}: {err}"));
        }
    }

    fn ensure_current(&mut self) {
        if !self.context_current {
            self.context.make_current();
            self.context_current = true;
        }
    }
}

impl<C: Context> Drop for RenderDevice<C> {
    fn drop(&mut self) {
        self.context.destroy_buffer(self.stream.buffers[0]);
        self.context.destroy_buffer(self.stream.buffers[1]);
    }
}

fn unpack_argb(color: u32) -> [f32; 4] {
    let a = ((color >> 24) & 0xff) as f32 / 255.0;
    let r = ((color >> 16) & 0xff) as f32 / 255.0;
    let g = ((color >> 8) & 0xff) as f32 / 255.0;
    let b = (color & 0xff) as f32 / 255.0;
    [r, g, b, a]
}
