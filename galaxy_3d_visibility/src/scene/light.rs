/// Lights and their per-frame shadow state.
///
/// Authoring properties (type, range, shadow settings) are set by the caller.
/// Culling writes `visible_this_frame` / `max_screen_size`, the atlas writes
/// slot bookkeeping and the shadow renderer consumes `ShadowUpdateMode::ThisFrame`.

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3, Vec4};
use rustc_hash::FxHashMap;
use slotmap::new_key_type;
use crate::error::Result;
use crate::engine_bail;
use crate::camera::BoundingSphere;
use crate::graphics_device::{DepthBias, DepthState};
use crate::shadow::{ShadowKind, ShadowMap, ShadowRenderData};
use super::scene::CameraKey;

new_key_type! {
    /// Stable key for a Light within a Scene
    pub struct LightKey;
}

/// Maximum number of directional shadow cascades
pub const MAX_CASCADES: usize = 4;

/// Largest VSM blur kernel
pub const MAX_VSM_BLUR_SIZE: u32 = 25;

// ===== ENUMS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl LightType {
    /// Index used to build shader pass identifiers
    pub fn index(self) -> u32 {
        match self {
            LightType::Directional => 0,
            LightType::Point => 1,
            LightType::Spot => 2,
        }
    }

    pub fn is_local(self) -> bool {
        self != LightType::Directional
    }
}

/// Shadow filtering technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowType {
    /// Single-tap PCF
    Pcf1,
    /// 3x3 PCF
    Pcf3,
    /// 5x5 PCF (always hardware depth comparison)
    Pcf5,
    /// Variance shadow map packed in 8-bit RGBA
    Vsm8,
    /// Variance shadow map, half float
    Vsm16,
    /// Variance shadow map, float
    Vsm32,
}

/// Number of `ShadowType` variants
pub const SHADOW_TYPE_COUNT: u32 = 6;

impl ShadowType {
    pub fn index(self) -> u32 {
        match self {
            ShadowType::Pcf1 => 0,
            ShadowType::Pcf3 => 1,
            ShadowType::Pcf5 => 2,
            ShadowType::Vsm8 => 3,
            ShadowType::Vsm16 => 4,
            ShadowType::Vsm32 => 5,
        }
    }

    pub fn is_vsm(self) -> bool {
        matches!(self, ShadowType::Vsm8 | ShadowType::Vsm16 | ShadowType::Vsm32)
    }
}

/// VSM blur kernel shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurMode {
    Box,
    Gaussian,
}

/// When the shadow map is re-rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowUpdateMode {
    /// Never (keep the existing shadow map)
    None,
    /// Once, then back to `None`
    ThisFrame,
    /// Every frame
    Realtime,
}

bitflags! {
    /// Which objects a light affects
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LightMask: u32 {
        const AFFECT_DYNAMIC     = 1 << 0;
        const AFFECT_LIGHTMAPPED = 1 << 1;
        const BAKE               = 1 << 2;
    }
}

// ===== LIGHT =====

pub struct Light {
    name: String,
    light_type: LightType,
    enabled: bool,
    cast_shadows: bool,
    shadow_type: ShadowType,
    vsm_blur_mode: BlurMode,
    vsm_blur_size: u32,
    pub shadow_update_mode: ShadowUpdateMode,
    position: Vec3,
    rotation: Quat,
    range: f32,
    /// Degrees
    inner_cone_angle: f32,
    /// Degrees
    outer_cone_angle: f32,
    shadow_resolution: u32,
    shadow_bias: f32,
    shadow_depth_state: DepthState,
    num_cascades: u32,
    cascade_distribution: f32,
    shadow_distance: f32,
    mask: LightMask,

    // ===== PER-FRAME STATE =====
    pub visible_this_frame: bool,
    pub max_screen_size: f32,
    pub use_physical_units: bool,
    pub(crate) shadow_map: Option<ShadowMap>,
    /// Invalidated maps whose device targets still need destroying
    retired_maps: Vec<ShadowMap>,
    /// Last slot held in the shared atlas (clustered lighting)
    pub(crate) atlas_slot: Option<usize>,
    /// A slot was granted this frame
    pub(crate) atlas_allocated: bool,
    /// Atlas version the slot belongs to
    pub(crate) atlas_version: u32,
    /// Slot assignment changed this frame
    pub atlas_slot_updated: bool,
    /// Normalized rect of the slot inside the atlas
    pub(crate) atlas_viewport: Vec4,
    render_data: FxHashMap<(Option<CameraKey>, u32), ShadowRenderData>,
    cascade_palette: [Mat4; MAX_CASCADES],
    cascade_distances: [f32; MAX_CASCADES],
}

impl Light {
    pub fn new(name: impl Into<String>, light_type: LightType) -> Self {
        Self {
            name: name.into(),
            light_type,
            enabled: true,
            cast_shadows: false,
            shadow_type: ShadowType::Pcf3,
            vsm_blur_mode: BlurMode::Gaussian,
            vsm_blur_size: 11,
            shadow_update_mode: ShadowUpdateMode::Realtime,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            range: 10.0,
            inner_cone_angle: 40.0,
            outer_cone_angle: 45.0,
            shadow_resolution: 1024,
            shadow_bias: 0.05,
            shadow_depth_state: DepthState::DEFAULT,
            num_cascades: 1,
            cascade_distribution: 0.5,
            shadow_distance: 40.0,
            mask: LightMask::AFFECT_DYNAMIC,
            visible_this_frame: false,
            max_screen_size: 0.0,
            use_physical_units: false,
            shadow_map: None,
            retired_maps: Vec::new(),
            atlas_slot: None,
            atlas_allocated: false,
            atlas_version: 0,
            atlas_slot_updated: false,
            atlas_viewport: Vec4::new(0.0, 0.0, 1.0, 1.0),
            render_data: FxHashMap::default(),
            cascade_palette: [Mat4::IDENTITY; MAX_CASCADES],
            cascade_distances: [0.0; MAX_CASCADES],
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str { &self.name }
    pub fn light_type(&self) -> LightType { self.light_type }
    pub fn enabled(&self) -> bool { self.enabled }
    pub fn cast_shadows(&self) -> bool { self.cast_shadows }
    pub fn shadow_type(&self) -> ShadowType { self.shadow_type }
    pub fn vsm_blur_mode(&self) -> BlurMode { self.vsm_blur_mode }
    pub fn vsm_blur_size(&self) -> u32 { self.vsm_blur_size }
    pub fn position(&self) -> Vec3 { self.position }
    pub fn rotation(&self) -> Quat { self.rotation }
    pub fn range(&self) -> f32 { self.range }
    pub fn inner_cone_angle(&self) -> f32 { self.inner_cone_angle }
    pub fn outer_cone_angle(&self) -> f32 { self.outer_cone_angle }
    pub fn shadow_resolution(&self) -> u32 { self.shadow_resolution }
    pub fn shadow_bias(&self) -> f32 { self.shadow_bias }
    pub fn shadow_depth_state(&self) -> DepthState { self.shadow_depth_state }
    pub fn num_cascades(&self) -> u32 { self.num_cascades }
    pub fn cascade_distribution(&self) -> f32 { self.cascade_distribution }
    pub fn shadow_distance(&self) -> f32 { self.shadow_distance }
    pub fn mask(&self) -> LightMask { self.mask }
    pub fn shadow_map(&self) -> Option<&ShadowMap> { self.shadow_map.as_ref() }
    /// Atlas slot granted this frame
    pub fn atlas_slot(&self) -> Option<usize> {
        if self.atlas_allocated { self.atlas_slot } else { None }
    }
    pub fn atlas_viewport(&self) -> Vec4 { self.atlas_viewport }

    /// Light type crossed with shadow type
    pub fn kind(&self) -> ShadowKind {
        ShadowKind::new(self.light_type, self.shadow_type)
    }

    /// Direction the light shines along (-Z of its rotation)
    pub fn direction(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Number of shadow faces rendered per update
    pub fn shadow_face_count(&self) -> u32 {
        self.kind().face_count(self.num_cascades)
    }

    /// Influence volume of a local light.
    ///
    /// Spot lights use the sphere bounding their cone.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        match self.light_type {
            LightType::Spot => {
                let angle = self.outer_cone_angle.to_radians();
                let (radius, offset) = if self.outer_cone_angle > 45.0 {
                    (self.range * angle.sin(), self.range * angle.cos())
                } else {
                    let r = self.range / (2.0 * angle.cos());
                    (r, r)
                };
                BoundingSphere::new(self.position + self.direction() * offset, radius)
            }
            _ => BoundingSphere::new(self.position, self.range),
        }
    }

    /// Polygon offset for shadow rendering
    pub fn depth_bias(&self) -> DepthBias {
        DepthBias { constant: self.shadow_bias * -1000.0, slope_scale: self.shadow_bias * -1000.0 }
    }

    // ===== SETTERS =====

    pub fn set_enabled(&mut self, enabled: bool) { self.enabled = enabled; }
    pub fn set_cast_shadows(&mut self, cast: bool) { self.cast_shadows = cast; }
    pub fn set_vsm_blur_mode(&mut self, mode: BlurMode) { self.vsm_blur_mode = mode; }
    pub fn set_position(&mut self, position: Vec3) { self.position = position; }
    pub fn set_rotation(&mut self, rotation: Quat) { self.rotation = rotation; }
    pub fn set_range(&mut self, range: f32) { self.range = range; }
    pub fn set_shadow_bias(&mut self, bias: f32) { self.shadow_bias = bias; }
    pub fn set_shadow_depth_state(&mut self, state: DepthState) { self.shadow_depth_state = state; }
    pub fn set_cascade_distribution(&mut self, distribution: f32) { self.cascade_distribution = distribution.clamp(0.0, 1.0); }
    pub fn set_shadow_distance(&mut self, distance: f32) { self.shadow_distance = distance; }
    pub fn set_mask(&mut self, mask: LightMask) { self.mask = mask; }

    pub fn set_cone_angles(&mut self, inner_degrees: f32, outer_degrees: f32) {
        self.inner_cone_angle = inner_degrees;
        self.outer_cone_angle = outer_degrees;
    }

    /// Changing the shadow type or resolution invalidates the shadow map.
    ///
    /// Point lights have no VSM support and fall back to `Pcf3`.
    pub fn set_shadow_type(&mut self, shadow_type: ShadowType) {
        let shadow_type = if self.light_type == LightType::Point && shadow_type.is_vsm() {
            ShadowType::Pcf3
        } else {
            shadow_type
        };
        if self.shadow_type != shadow_type {
            self.shadow_type = shadow_type;
            self.retire_shadow_map();
        }
    }

    pub fn set_shadow_resolution(&mut self, resolution: u32) {
        if self.shadow_resolution != resolution {
            self.shadow_resolution = resolution;
            self.retire_shadow_map();
        }
    }

    /// Kernel size, forced odd and clamped to [1, MAX_VSM_BLUR_SIZE]
    pub fn set_vsm_blur_size(&mut self, size: u32) {
        let odd = if size % 2 == 0 { size + 1 } else { size };
        self.vsm_blur_size = odd.clamp(1, MAX_VSM_BLUR_SIZE);
    }

    /// Cascade count, clamped to [1, MAX_CASCADES]
    pub fn set_num_cascades(&mut self, count: u32) {
        self.num_cascades = count.clamp(1, MAX_CASCADES as u32);
    }

    /// Take ownership of the shadow map (e.g. to destroy it)
    pub fn take_shadow_map(&mut self) -> Option<ShadowMap> {
        self.shadow_map.take()
    }

    fn retire_shadow_map(&mut self) {
        if let Some(map) = self.shadow_map.take() {
            self.retired_maps.push(map);
        }
    }

    /// Invalidated shadow maps not destroyed yet
    pub fn retired_shadow_maps(&self) -> &[ShadowMap] {
        &self.retired_maps
    }

    /// Take ownership of the invalidated shadow maps so their targets can be destroyed
    pub fn take_retired_shadow_maps(&mut self) -> Vec<ShadowMap> {
        std::mem::take(&mut self.retired_maps)
    }

    // ===== SHADOW RENDER DATA =====

    /// Render data for a face (`camera` is `Some` only for directional lights)
    pub fn render_data(&self, camera: Option<CameraKey>, face: u32) -> Option<&ShadowRenderData> {
        self.render_data.get(&(camera, face))
    }

    /// Render data for a face, created on first use
    pub fn render_data_mut(&mut self, camera: Option<CameraKey>, face: u32) -> &mut ShadowRenderData {
        let name = &self.name;
        self.render_data
            .entry((camera, face))
            .or_insert_with(|| ShadowRenderData::new(format!("{}_shadow_{}", name, face), face))
    }

    /// Drop the cascade render data kept for `camera`
    pub(crate) fn forget_camera(&mut self, camera: CameraKey) {
        self.render_data.retain(|&(key, _), _| key != Some(camera));
    }

    // ===== CASCADES =====

    pub fn cascade_matrix(&self, cascade: usize) -> Option<&Mat4> {
        self.cascade_palette.get(cascade)
    }

    /// Write a cascade's shadow matrix, checked against the cascade count
    pub fn set_cascade_matrix(&mut self, cascade: usize, matrix: Mat4) -> Result<()> {
        if cascade >= self.num_cascades as usize {
            engine_bail!(InvariantViolation => "galaxy3d::Light",
                "Light '{}': cascade {} out of range ({} cascades)", self.name, cascade, self.num_cascades);
        }
        self.cascade_palette[cascade] = matrix;
        Ok(())
    }

    pub fn cascade_palette(&self) -> &[Mat4; MAX_CASCADES] {
        &self.cascade_palette
    }

    /// Far distance of each cascade (view space)
    pub fn cascade_distances(&self) -> &[f32; MAX_CASCADES] {
        &self.cascade_distances
    }

    pub(crate) fn set_cascade_distances(&mut self, distances: [f32; MAX_CASCADES]) {
        self.cascade_distances = distances;
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
