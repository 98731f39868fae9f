use relief_geom::Vec3;

/// One grid vertex in the interleaved layout a renderer uploads verbatim:
/// position, RGBA color, normal, shininess.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub color: [f32; 4],
    pub normal: Vec3,
    pub shininess: f32,
}

impl Vertex {
    /// Floats per vertex, matching the attribute stride.
    pub const FLOATS: usize = 11;
}
