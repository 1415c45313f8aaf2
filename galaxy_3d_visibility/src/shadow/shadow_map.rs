/// Shadow map render targets.
///
/// A shadow map is a single render target. Non-clustered point lights use a
/// six-slice cubemap (one slice per face); spot and directional lights use
/// one slice with cascades laid out as viewports; the clustered atlas is one
/// slice shared by every local light.

use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, RenderTargetDesc, RenderTargetHandle, TextureFormat};
use crate::scene::LightType;
use super::shadow_kind::ShadowKind;

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowMap {
    target: RenderTargetHandle,
    resolution: u32,
    color_format: Option<TextureFormat>,
    cubemap: bool,
    atlas: bool,
}

impl ShadowMap {
    /// Create the shadow map owned by one light
    pub fn create(
        device: &mut dyn GraphicsDevice,
        light_name: &str,
        kind: ShadowKind,
        resolution: u32,
        hardware_pcf: bool,
    ) -> Result<Self> {
        let cubemap = kind.light_type == LightType::Point;
        let color_format = kind.color_format(hardware_pcf, device.capabilities());
        let desc = RenderTargetDesc {
            name: format!("{}_shadow_map", light_name),
            width: resolution,
            height: resolution,
            layers: if cubemap { 6 } else { 1 },
            cubemap,
            color_format,
            depth: true,
            depth_compare: hardware_pcf,
        };
        let target = device.create_render_target(&desc)?;
        crate::engine_debug!("galaxy3d::ShadowMap",
            "Created {}x{} shadow map for '{}' ({:?})", resolution, resolution, light_name, color_format);
        Ok(Self { target, resolution, color_format, cubemap, atlas: false })
    }

    /// Create the shared local-light atlas
    pub fn create_atlas(
        device: &mut dyn GraphicsDevice,
        resolution: u32,
        hardware_depth: bool,
    ) -> Result<Self> {
        let color_format = if hardware_depth { None } else { Some(TextureFormat::Rgba8Unorm) };
        let desc = RenderTargetDesc {
            name: "shadow_atlas".to_string(),
            width: resolution,
            height: resolution,
            layers: 1,
            cubemap: false,
            color_format,
            depth: true,
            depth_compare: hardware_depth,
        };
        let target = device.create_render_target(&desc)?;
        Ok(Self { target, resolution, color_format, cubemap: false, atlas: true })
    }

    pub fn target(&self) -> RenderTargetHandle { self.target }
    pub fn resolution(&self) -> u32 { self.resolution }
    pub fn color_format(&self) -> Option<TextureFormat> { self.color_format }
    pub fn is_cubemap(&self) -> bool { self.cubemap }
    pub fn is_atlas(&self) -> bool { self.atlas }

    /// Depth-only map sampled with hardware comparison
    pub fn is_depth_compare(&self) -> bool { self.color_format.is_none() }

    /// Render target and slice written by `face`
    pub fn face_target(&self, face: u32) -> (RenderTargetHandle, u32) {
        (self.target, if self.cubemap { face } else { 0 })
    }

    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        device.destroy_render_target(self.target);
    }
}

#[cfg(test)]
#[path = "shadow_map_tests.rs"]
mod tests;
