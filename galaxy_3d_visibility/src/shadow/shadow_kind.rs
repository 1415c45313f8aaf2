/// Light type × shadow type dispatch table.
///
/// Every decision that depends on the (light type, shadow type) pair lives
/// here: face count, hardware PCF eligibility, shadow map format, render
/// state, blur eligibility and shader pass selection.

use crate::graphics_device::{BlendState, DeviceCapabilities, TextureFormat};
use crate::material::ShaderPassId;
use crate::scene::{LightType, ShadowType, SHADOW_TYPE_COUNT};

/// First shader pass id used by shadow variants
pub const SHADER_PASS_SHADOW_BASE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowKind {
    pub light_type: LightType,
    pub shadow_type: ShadowType,
}

impl ShadowKind {
    pub fn new(light_type: LightType, shadow_type: ShadowType) -> Self {
        Self { light_type, shadow_type }
    }

    pub fn is_vsm(&self) -> bool {
        self.shadow_type.is_vsm()
    }

    /// Sub-renders per shadow update: 1 spot, 6 point, one per cascade
    pub fn face_count(&self, cascades: u32) -> u32 {
        match self.light_type {
            LightType::Spot => 1,
            LightType::Point => 6,
            LightType::Directional => cascades,
        }
    }

    /// Whether the map is sampled with hardware depth comparison.
    ///
    /// Point lights outside clustered lighting render a cubemap with
    /// color-encoded depth and always filter manually.
    pub fn hardware_pcf(&self, clustered: bool, caps: &DeviceCapabilities) -> bool {
        if self.light_type == LightType::Point && !clustered {
            return false;
        }
        match self.shadow_type {
            ShadowType::Pcf5 => true,
            ShadowType::Pcf1 | ShadowType::Pcf3 => caps.supports_depth_shadow,
            _ => false,
        }
    }

    /// Kind a local light renders with inside the shared atlas.
    ///
    /// The atlas holds one depth format for every light, so VSM falls back
    /// to `Pcf3` there.
    pub fn in_atlas(self) -> Self {
        if self.is_vsm() {
            Self::new(self.light_type, ShadowType::Pcf3)
        } else {
            self
        }
    }

    /// Polygon offset is applied (not for manually filtered point cubemaps)
    pub fn uses_depth_bias(&self, clustered: bool) -> bool {
        !(self.light_type == LightType::Point && !clustered)
    }

    /// Depth-only targets disable color writes
    pub fn blend_state(&self, hardware_pcf: bool) -> BlendState {
        if hardware_pcf { BlendState::NO_COLOR_WRITE } else { BlendState::NO_BLEND }
    }

    /// Color format of the shadow map, `None` for depth-only maps
    pub fn color_format(&self, hardware_pcf: bool, caps: &DeviceCapabilities) -> Option<TextureFormat> {
        if hardware_pcf {
            return None;
        }
        Some(match self.shadow_type {
            ShadowType::Vsm16 => TextureFormat::Rgba16Float,
            ShadowType::Vsm32 if caps.float_filterable => TextureFormat::Rgba32Float,
            ShadowType::Vsm32 => TextureFormat::Rgba16Float,
            _ => TextureFormat::Rgba8Unorm,
        })
    }

    /// Blur is allowed for VSM, and under clustered lighting only for directional lights
    pub fn can_blur(&self, clustered: bool) -> bool {
        self.is_vsm() && (!clustered || self.light_type == LightType::Directional)
    }

    /// Blur shader reads 8-bit packed moments
    pub fn packed_vsm(&self) -> bool {
        self.shadow_type == ShadowType::Vsm8
    }

    /// Shader pass of the shadow variant
    pub fn shader_pass(&self) -> ShaderPassId {
        ShaderPassId(SHADER_PASS_SHADOW_BASE
            + self.light_type.index() * SHADOW_TYPE_COUNT
            + self.shadow_type.index())
    }
}

#[cfg(test)]
#[path = "shadow_kind_tests.rs"]
mod tests;
