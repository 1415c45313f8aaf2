/// Render target handles and descriptors

use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle to a render target owned by the graphics device
    pub struct RenderTargetHandle;
}

/// Texture formats used by shadow maps and blur targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, used for packed depth / packed VSM moments
    Rgba8Unorm,
    /// Half-float RGBA (VSM16)
    Rgba16Float,
    /// Float RGBA (VSM32)
    Rgba32Float,
    /// Depth only, sampled with hardware comparison
    Depth32Float,
}

impl TextureFormat {
    /// Whether this is a depth format
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }
}

/// Descriptor for creating a render target
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDesc {
    /// Debug name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of slices (6 for cubemaps)
    pub layers: u32,
    /// Cubemap faces instead of an array
    pub cubemap: bool,
    /// Color attachment format, `None` for depth-only targets
    pub color_format: Option<TextureFormat>,
    /// Whether the target carries a depth attachment
    pub depth: bool,
    /// Depth attachment is sampled with hardware depth comparison
    pub depth_compare: bool,
}
