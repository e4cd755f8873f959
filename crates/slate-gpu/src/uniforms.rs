//! The uniform store: a flat value buffer with per-slot update stamps.
//!
//! The uniform set is closed and known at build time, so slots live in a
//! dense table indexed by [`UniformName`] and values in one flat `f32`
//! buffer. Staleness is decided by comparing stamps, never values: writing
//! the same value twice still counts as an update. The layout is established
//! once at device construction and is append-only.

/// Value shape of a uniform slot, which also fixes its transfer width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformShape {
    Matrix,
    Vec4,
    Vec3,
    Vec2,
    Scalar,
}

impl UniformShape {
    pub fn component_count(self) -> usize {
        match self {
            UniformShape::Matrix => 16,
            UniformShape::Vec4 => 4,
            UniformShape::Vec3 => 3,
            UniformShape::Vec2 => 2,
            UniformShape::Scalar => 1,
        }
    }
}

/// The closed set of uniforms any shader in the program table may consume.
/// Not every program uses every uniform; absent variables are skipped at
/// transfer time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformName {
    Projection,
    View,
    World,
    ModelNormal,
    Desaturation,
    HighlightColor,
    FillColor,
    VertexColor,
    StencilColor,
    CameraPos,
    TextureFactor,
    FogSettings,
    FogColor,
    RenderSettings,
}

impl UniformName {
    pub const COUNT: usize = 14;

    pub const ALL: [UniformName; Self::COUNT] = [
        UniformName::Projection,
        UniformName::View,
        UniformName::World,
        UniformName::ModelNormal,
        UniformName::Desaturation,
        UniformName::HighlightColor,
        UniformName::FillColor,
        UniformName::VertexColor,
        UniformName::StencilColor,
        UniformName::CameraPos,
        UniformName::TextureFactor,
        UniformName::FogSettings,
        UniformName::FogColor,
        UniformName::RenderSettings,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Declaration table: GLSL variable name and shape per slot, in slot order.
const DECLARATIONS: [(&str, UniformShape); UniformName::COUNT] = [
    ("projection", UniformShape::Matrix),
    ("view", UniformShape::Matrix),
    ("world", UniformShape::Matrix),
    ("modelnormal", UniformShape::Matrix),
    ("desaturation", UniformShape::Scalar),
    ("highlightcolor", UniformShape::Vec4),
    ("fillcolor", UniformShape::Vec4),
    ("vertexcolor", UniformShape::Vec4),
    ("stencilcolor", UniformShape::Vec4),
    ("campos", UniformShape::Vec3),
    ("texturefactor", UniformShape::Vec4),
    ("fogsettings", UniformShape::Vec2),
    ("fogcolor", UniformShape::Vec4),
    ("rendersettings", UniformShape::Vec4),
];

#[derive(Clone, Copy, Debug)]
struct UniformSlot {
    glsl_name: &'static str,
    shape: UniformShape,
    offset: usize,
    stamp: u64,
}

/// Flat uniform value storage plus the per-slot update stamps.
pub(crate) struct UniformStore {
    slots: [UniformSlot; UniformName::COUNT],
    values: Vec<f32>,
    counter: u64,
}

impl UniformStore {
    pub fn new() -> Self {
        let mut offset = 0;
        let slots = std::array::from_fn(|i| {
            let (glsl_name, shape) = DECLARATIONS[i];
            let slot = UniformSlot {
                glsl_name,
                shape,
                offset,
                stamp: 0,
            };
            offset += shape.component_count();
            slot
        });
        Self {
            slots,
            values: vec![0.0; offset],
            counter: 0,
        }
    }

    /// Copy `values` into the slot and stamp it with a fresh update count.
    /// The caller is responsible for the length matching the slot's shape.
    pub fn set(&mut self, name: UniformName, values: &[f32]) {
        let slot = &mut self.slots[name.index()];
        let width = slot.shape.component_count();
        debug_assert_eq!(
            values.len(),
            width,
            "uniform {name:?} expects {width} components"
        );
        let n = values.len().min(width);
        self.values[slot.offset..slot.offset + n].copy_from_slice(&values[..n]);
        self.counter += 1;
        slot.stamp = self.counter;
    }

    pub fn stamp(&self, name: UniformName) -> u64 {
        self.slots[name.index()].stamp
    }

    pub fn shape(&self, name: UniformName) -> UniformShape {
        self.slots[name.index()].shape
    }

    pub fn glsl_name(&self, name: UniformName) -> &'static str {
        self.slots[name.index()].glsl_name
    }

    /// The slot's full component span in the flat buffer.
    pub fn value(&self, name: UniformName) -> &[f32] {
        let slot = &self.slots[name.index()];
        &self.values[slot.offset..slot.offset + slot.shape.component_count()]
    }
}

/// Per-binding record of which update stamp each slot was last transferred
/// with. Reset whenever a different program is bound: a fresh binding has
/// received nothing.
pub(crate) struct BoundStamps {
    stamps: [u64; UniformName::COUNT],
}

impl BoundStamps {
    pub fn new() -> Self {
        Self {
            stamps: [0; UniformName::COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.stamps = [0; UniformName::COUNT];
    }

    pub fn get(&self, name: UniformName) -> u64 {
        self.stamps[name.index()]
    }

    pub fn set(&mut self, name: UniformName, stamp: u64) {
        self.stamps[name.index()] = stamp;
    }
}
