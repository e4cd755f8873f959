use std::fmt;

/// Primitive types accepted by the draw entry points.
///
/// This is a semantic enum (not raw context constants) so the rest of the
/// renderer stays platform-independent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    LineList,
    TriangleList,
    TriangleStrip,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::LineList => "line_list",
            PrimitiveType::TriangleList => "triangle_list",
            PrimitiveType::TriangleStrip => "triangle_strip",
        };
        f.write_str(s)
    }
}

impl PrimitiveType {
    /// Number of vertices consumed by `primitive_count` primitives.
    pub fn vertex_count(self, primitive_count: u32) -> u32 {
        match self {
            PrimitiveType::LineList => primitive_count * 2,
            PrimitiveType::TriangleList => primitive_count * 3,
            PrimitiveType::TriangleStrip => {
                if primitive_count == 0 {
                    0
                } else {
                    primitive_count + 2
                }
            }
        }
    }
}
