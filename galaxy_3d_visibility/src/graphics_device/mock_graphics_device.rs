/// Mock graphics device for unit tests (no GPU required)
///
/// Records every call as a short command string and keeps one `f32` channel
/// per texel for each render target slice. Draws with a shader whose name
/// starts with `vsm_blur` are executed on the CPU (clamp-to-edge sampling,
/// limited to the current scissor) so blur results can be checked numerically.

use slotmap::SlotMap;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    GraphicsDevice, DeviceCapabilities,
    BufferHandle, RenderTargetHandle, RenderTargetDesc, ShaderHandle, ShaderDesc,
    UniformValue, UniformBufferSlot, Primitive,
    Viewport, Rect2D, ClearOptions, BlendState, DepthState, DepthBias, CullMode,
};

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockRenderTarget {
    pub desc: RenderTargetDesc,
    /// One `width * height` texel plane per slice
    pub slices: Vec<Vec<f32>>,
}

impl MockRenderTarget {
    fn new(desc: RenderTargetDesc) -> Self {
        let texel_count = (desc.width * desc.height) as usize;
        let slices = (0..desc.layers.max(1)).map(|_| vec![0.0; texel_count]).collect();
        Self { desc, slices }
    }
}

#[derive(Debug)]
pub struct MockBuffer {
    pub name: String,
    pub size: u64,
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

pub struct MockGraphicsDevice {
    pub capabilities: DeviceCapabilities,
    pub targets: SlotMap<RenderTargetHandle, MockRenderTarget>,
    pub shaders: SlotMap<ShaderHandle, ShaderDesc>,
    pub buffers: SlotMap<BufferHandle, MockBuffer>,
    pub commands: Vec<String>,
    /// Shader names starting with this prefix fail to compile
    pub fail_shader_prefix: Option<String>,
    /// Every draw fails with a backend error
    pub fail_draws: bool,
    pub backbuffer: (u32, u32),
    pub current_target: Option<RenderTargetHandle>,
    pub current_slice: u32,
    pub viewport: Option<Viewport>,
    pub scissor: Option<Rect2D>,
    pub blend_state: Option<BlendState>,
    pub depth_state: Option<DepthState>,
    pub depth_bias: Option<DepthBias>,
    pub current_shader: Option<ShaderHandle>,
    pub uniforms: FxHashMap<String, UniformValue>,
    pub uniform_buffers: FxHashMap<UniformBufferSlot, Vec<u8>>,
    pub draw_count: u32,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            capabilities: DeviceCapabilities::default(),
            targets: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            buffers: SlotMap::with_key(),
            commands: Vec::new(),
            fail_shader_prefix: None,
            fail_draws: false,
            backbuffer: (1280, 720),
            current_target: None,
            current_slice: 0,
            viewport: None,
            scissor: None,
            blend_state: None,
            depth_state: None,
            depth_bias: None,
            current_shader: None,
            uniforms: FxHashMap::default(),
            uniform_buffers: FxHashMap::default(),
            draw_count: 0,
        }
    }

    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        let mut device = Self::new();
        device.capabilities = capabilities;
        device
    }

    /// Commands starting with `prefix`
    pub fn commands_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.commands.iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| c.as_str())
            .collect()
    }

    pub fn texels(&self, target: RenderTargetHandle, slice: u32) -> Option<&[f32]> {
        self.targets.get(target)
            .and_then(|t| t.slices.get(slice as usize))
            .map(|s| s.as_slice())
    }

    pub fn write_texels(&mut self, target: RenderTargetHandle, slice: u32, data: &[f32]) {
        if let Some(plane) = self.targets.get_mut(target).and_then(|t| t.slices.get_mut(slice as usize)) {
            let n = plane.len().min(data.len());
            plane[..n].copy_from_slice(&data[..n]);
        }
    }

    pub fn shader_name(&self, shader: ShaderHandle) -> Option<&str> {
        self.shaders.get(shader).map(|d| d.name.as_str())
    }

    fn target_name(&self, target: Option<RenderTargetHandle>) -> String {
        match target.and_then(|t| self.targets.get(t)) {
            Some(t) => t.desc.name.clone(),
            None => "backbuffer".to_string(),
        }
    }

    /// Scissor clipped to the bound target (whole target when no scissor is set)
    fn active_region(&self, width: u32, height: u32) -> (i32, i32, i32, i32) {
        match self.scissor {
            Some(s) => (
                s.x.max(0),
                s.y.max(0),
                (s.x + s.width as i32).min(width as i32),
                (s.y + s.height as i32).min(height as i32),
            ),
            None => (0, 0, width as i32, height as i32),
        }
    }

    fn run_blur_draw(&mut self) -> Result<()> {
        let source = match self.uniforms.get("source") {
            Some(UniformValue::Texture(t)) => *t,
            _ => engine_bail!("galaxy3d::MockGraphicsDevice", "blur draw without source texture"),
        };
        let offset = match self.uniforms.get("pixel_offset") {
            Some(UniformValue::Vec2(v)) => *v,
            _ => engine_bail!("galaxy3d::MockGraphicsDevice", "blur draw without pixel_offset"),
        };
        let weights = match self.uniforms.get("weights") {
            Some(UniformValue::FloatArray(w)) => w.clone(),
            _ => engine_bail!("galaxy3d::MockGraphicsDevice", "blur draw without weights"),
        };
        let dest = match self.current_target {
            Some(t) => t,
            None => engine_bail!("galaxy3d::MockGraphicsDevice", "blur draw into backbuffer"),
        };

        let (src_w, src_h, src_plane) = match self.targets.get(source) {
            Some(t) => (t.desc.width as i32, t.desc.height as i32, t.slices[0].clone()),
            None => engine_bail!("galaxy3d::MockGraphicsDevice", "blur source is not a live target"),
        };
        let (dst_w, dst_h) = match self.targets.get(dest) {
            Some(t) => (t.desc.width, t.desc.height),
            None => engine_bail!("galaxy3d::MockGraphicsDevice", "blur destination is not a live target"),
        };

        let step_x = (offset.x * src_w as f32).round() as i32;
        let step_y = (offset.y * src_h as f32).round() as i32;
        let half = (weights.len() as i32 - 1) / 2;
        let (x0, y0, x1, y1) = self.active_region(dst_w, dst_h);
        let slice = self.current_slice as usize;

        let Some(plane) = self.targets.get_mut(dest).and_then(|t| t.slices.get_mut(slice)) else {
            engine_bail!("galaxy3d::MockGraphicsDevice", "blur destination slice {} missing", slice);
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let mut sum = 0.0;
                for (i, w) in weights.iter().enumerate() {
                    let tap = i as i32 - half;
                    let sx = (x + tap * step_x).clamp(0, src_w - 1);
                    let sy = (y + tap * step_y).clamp(0, src_h - 1);
                    sum += w * src_plane[(sy * src_w + sx) as usize];
                }
                plane[(y * dst_w as i32 + x) as usize] = sum;
            }
        }
        Ok(())
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetHandle> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("galaxy3d::MockGraphicsDevice", "render target '{}' has zero size", desc.name);
        }
        self.commands.push(format!("create_render_target:{}", desc.name));
        Ok(self.targets.insert(MockRenderTarget::new(desc.clone())))
    }

    fn destroy_render_target(&mut self, target: RenderTargetHandle) {
        if let Some(t) = self.targets.remove(target) {
            self.commands.push(format!("destroy_render_target:{}", t.desc.name));
        }
    }

    fn render_target_desc(&self, target: RenderTargetHandle) -> Option<&RenderTargetDesc> {
        self.targets.get(target).map(|t| &t.desc)
    }

    fn backbuffer_size(&self) -> (u32, u32) {
        self.backbuffer
    }

    fn create_buffer(&mut self, name: &str, size: u64) -> Result<BufferHandle> {
        self.commands.push(format!("create_buffer:{}", name));
        Ok(self.buffers.insert(MockBuffer { name: name.to_string(), size }))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderHandle> {
        if let Some(prefix) = &self.fail_shader_prefix {
            if desc.name.starts_with(prefix.as_str()) {
                return Err(crate::error::Error::ShaderCompilationFailed(desc.name.clone()));
            }
        }
        self.commands.push(format!("create_shader:{}", desc.name));
        Ok(self.shaders.insert(desc.clone()))
    }

    fn set_render_target(&mut self, target: Option<RenderTargetHandle>, slice: u32) -> Result<()> {
        if let Some(t) = target {
            match self.targets.get(t) {
                Some(rt) if slice < rt.desc.layers.max(1) => {}
                Some(rt) => engine_bail!("galaxy3d::MockGraphicsDevice",
                    "slice {} out of range for '{}'", slice, rt.desc.name),
                None => engine_bail!("galaxy3d::MockGraphicsDevice", "unknown render target"),
            }
        }
        self.commands.push(format!("set_render_target:{}:{}", self.target_name(target), slice));
        self.current_target = target;
        self.current_slice = slice;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.commands.push(format!("set_viewport:{},{},{},{}",
            viewport.x, viewport.y, viewport.width, viewport.height));
        self.viewport = Some(viewport);
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.commands.push(format!("set_scissor:{},{},{},{}",
            scissor.x, scissor.y, scissor.width, scissor.height));
        self.scissor = Some(scissor);
        Ok(())
    }

    fn clear(&mut self, options: &ClearOptions) -> Result<()> {
        self.commands.push(format!("clear:color={},depth={}",
            options.color.is_some(), options.depth.is_some()));
        if let (Some(color), Some(target)) = (options.color, self.current_target) {
            let (w, h) = match self.targets.get(target) {
                Some(t) => (t.desc.width, t.desc.height),
                None => return Ok(()),
            };
            let (x0, y0, x1, y1) = self.active_region(w, h);
            let slice = self.current_slice as usize;
            if let Some(plane) = self.targets.get_mut(target).and_then(|t| t.slices.get_mut(slice)) {
                for y in y0..y1 {
                    for x in x0..x1 {
                        plane[(y * w as i32 + x) as usize] = color[0];
                    }
                }
            }
        }
        Ok(())
    }

    fn set_blend_state(&mut self, state: BlendState) -> Result<()> {
        self.commands.push(format!("set_blend_state:color_write={}", state.color_write));
        self.blend_state = Some(state);
        Ok(())
    }

    fn set_depth_state(&mut self, state: DepthState) -> Result<()> {
        self.commands.push(format!("set_depth_state:test={},write={}", state.test, state.write));
        self.depth_state = Some(state);
        Ok(())
    }

    fn set_depth_bias(&mut self, bias: Option<DepthBias>) -> Result<()> {
        self.commands.push(format!("set_depth_bias:{}", bias.is_some()));
        self.depth_bias = bias;
        Ok(())
    }

    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()> {
        self.commands.push(format!("set_cull_mode:{:?}", mode));
        Ok(())
    }

    fn set_shader(&mut self, shader: ShaderHandle) -> Result<()> {
        let name = match self.shaders.get(shader) {
            Some(desc) => desc.name.clone(),
            None => engine_bail!("galaxy3d::MockGraphicsDevice", "unknown shader"),
        };
        self.commands.push(format!("set_shader:{}", name));
        self.current_shader = Some(shader);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()> {
        self.commands.push(format!("set_uniform:{}", name));
        self.uniforms.insert(name.to_string(), value);
        Ok(())
    }

    fn set_uniform_buffer(&mut self, slot: UniformBufferSlot, data: &[u8]) -> Result<()> {
        self.commands.push(format!("set_uniform_buffer:{:?}", slot));
        self.uniform_buffers.insert(slot, data.to_vec());
        Ok(())
    }

    fn set_vertex_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()> {
        self.commands.push(format!("set_vertex_buffer:{}", buffer.is_some()));
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()> {
        self.commands.push(format!("set_index_buffer:{}", buffer.is_some()));
        Ok(())
    }

    fn draw(&mut self, primitive: &Primitive) -> Result<()> {
        if self.fail_draws {
            return Err(crate::error::Error::BackendError("draw failed".to_string()));
        }
        let shader_name = self.current_shader
            .and_then(|s| self.shaders.get(s))
            .map(|d| d.name.clone())
            .unwrap_or_default();
        self.commands.push(format!("draw:{}:{}", shader_name, primitive.count));
        self.draw_count += 1;
        if shader_name.starts_with("vsm_blur") {
            self.run_blur_draw()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
