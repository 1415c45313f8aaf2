/// Main graphics device trait
///
/// The visibility core never talks to a GPU API directly. It issues an ordered
/// stream of state changes and draws through this trait; every call is assumed
/// to execute in issue order on the backend.

use crate::error::Result;
use crate::graphics_device::{
    BufferHandle, RenderTargetHandle, RenderTargetDesc, ShaderHandle, ShaderDesc,
    UniformValue, UniformBufferSlot, Primitive,
    Viewport, Rect2D, ClearOptions, BlendState, DepthState, DepthBias, CullMode,
};

/// Backend features that change how shadows are rendered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceCapabilities {
    /// Depth textures can be sampled with hardware comparison (PCF)
    pub supports_depth_shadow: bool,
    /// Polygon offset is available
    pub supports_depth_bias: bool,
    /// Float render targets can be linearly filtered (otherwise VSM uses packed 8-bit)
    pub float_filterable: bool,
    /// Largest texture edge in pixels
    pub max_texture_size: u32,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            supports_depth_shadow: true,
            supports_depth_bias: true,
            float_filterable: true,
            max_texture_size: 8192,
        }
    }
}

/// Graphics device consumed by culling, shadow rendering and VSM blur
pub trait GraphicsDevice {
    /// Backend feature set
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Create a render target
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetHandle>;

    /// Destroy a render target (unknown handles are ignored)
    fn destroy_render_target(&mut self, target: RenderTargetHandle);

    /// Descriptor of a live render target
    fn render_target_desc(&self, target: RenderTargetHandle) -> Option<&RenderTargetDesc>;

    /// Size of the default framebuffer in pixels
    fn backbuffer_size(&self) -> (u32, u32);

    /// Create a GPU buffer
    fn create_buffer(&mut self, name: &str, size: u64) -> Result<BufferHandle>;

    /// Compile a shader
    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderHandle>;

    /// Bind a render target slice (`None` = default framebuffer)
    fn set_render_target(&mut self, target: Option<RenderTargetHandle>, slice: u32) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Clear the current scissor region of the bound target
    fn clear(&mut self, options: &ClearOptions) -> Result<()>;

    fn set_blend_state(&mut self, state: BlendState) -> Result<()>;

    fn set_depth_state(&mut self, state: DepthState) -> Result<()>;

    /// Set (or disable with `None`) polygon offset
    fn set_depth_bias(&mut self, bias: Option<DepthBias>) -> Result<()>;

    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()>;

    /// Bind a shader for subsequent draws
    fn set_shader(&mut self, shader: ShaderHandle) -> Result<()>;

    /// Set a named parameter on the bound shader
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()>;

    /// Upload and bind a uniform block
    fn set_uniform_buffer(&mut self, slot: UniformBufferSlot, data: &[u8]) -> Result<()>;

    fn set_vertex_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()>;

    fn set_index_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()>;

    /// Issue a draw with the current state
    fn draw(&mut self, primitive: &Primitive) -> Result<()>;
}
