/// Buffer handles and draw primitives

use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle to a GPU buffer owned by the graphics device
    pub struct BufferHandle;
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

/// Index element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

/// A range of vertices or indices to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub topology: PrimitiveTopology,
    /// First vertex (non-indexed) or first index (indexed)
    pub base: u32,
    /// Number of vertices or indices
    pub count: u32,
    /// Index type, `None` for non-indexed draws
    pub index_type: Option<IndexType>,
}

impl Primitive {
    /// Three vertices covering the whole viewport, generated in the vertex shader
    pub const FULLSCREEN_TRIANGLE: Primitive = Primitive {
        topology: PrimitiveTopology::TriangleList,
        base: 0,
        count: 3,
        index_type: None,
    };

    /// Whether the draw reads the bound index buffer
    pub fn is_indexed(&self) -> bool {
        self.index_type.is_some()
    }
}
