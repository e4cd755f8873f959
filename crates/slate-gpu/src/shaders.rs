//! Program table: the closed shader set and its cached uniform locations.
//!
//! Shader compilation and linking happen outside this crate; the device is
//! handed one program id per [`ShaderName`] at construction. Uniform
//! locations are resolved lazily through the context on first use and cached
//! in a dense table, including negative results (a program that does not use
//! a uniform is asked exactly once).

use crate::context::{Context, ProgramId, UniformLocation};
use crate::uniforms::UniformName;

/// The closed set of programs the renderer draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderName {
    Screen2d,
    Screen2dAntialiased,
    Screen2dFullbright,
    Sprite2d,
    Fill2d,
    Plot2d,
    World3d,
    World3dFullbright,
    World3dHighlight,
    World3dFog,
    World3dHighlightFog,
    World3dVertexColor,
    World3dConstantColor,
    Skybox,
}

impl ShaderName {
    pub const COUNT: usize = 14;

    pub const ALL: [ShaderName; Self::COUNT] = [
        ShaderName::Screen2d,
        ShaderName::Screen2dAntialiased,
        ShaderName::Screen2dFullbright,
        ShaderName::Sprite2d,
        ShaderName::Fill2d,
        ShaderName::Plot2d,
        ShaderName::World3d,
        ShaderName::World3dFullbright,
        ShaderName::World3dHighlight,
        ShaderName::World3dFog,
        ShaderName::World3dHighlightFog,
        ShaderName::World3dVertexColor,
        ShaderName::World3dConstantColor,
        ShaderName::Skybox,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Cached outcome of one (program, uniform) location query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LocationSlot {
    Unresolved,
    Missing,
    Located(UniformLocation),
}

/// Dense program-id and uniform-location tables, indexed by [`ShaderName`]
/// and [`UniformName`].
pub(crate) struct ProgramTable {
    programs: [ProgramId; ShaderName::COUNT],
    locations: [[LocationSlot; UniformName::COUNT]; ShaderName::COUNT],
}

impl ProgramTable {
    pub fn new(programs: [ProgramId; ShaderName::COUNT]) -> Self {
        Self {
            programs,
            locations: [[LocationSlot::Unresolved; UniformName::COUNT]; ShaderName::COUNT],
        }
    }

    pub fn program(&self, shader: ShaderName) -> ProgramId {
        self.programs[shader.index()]
    }

    /// The location of `uniform` in `shader`'s program, or `None` when the
    /// program does not use that variable. The first call per pair queries
    /// the context; later calls hit the cache either way.
    pub fn location<C: Context>(
        &mut self,
        context: &mut C,
        shader: ShaderName,
        uniform: UniformName,
        glsl_name: &str,
    ) -> Option<UniformLocation> {
        let slot = &mut self.locations[shader.index()][uniform.index()];
        if *slot == LocationSlot::Unresolved {
            let program = self.programs[shader.index()];
            *slot = match context.uniform_location(program, glsl_name) {
                Some(location) => LocationSlot::Located(location),
                None => LocationSlot::Missing,
            };
        }
        match *slot {
            LocationSlot::Located(location) => Some(location),
            _ => None,
        }
    }
}
