/// Renderer configuration and per-frame statistics

use crate::camera::ViewSettings;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Local lights are binned into a cluster grid and share the shadow atlas
    pub clustered_lighting: bool,
    /// Lights use physical units (lux / lumen) instead of artist intensity
    pub physical_units: bool,
    /// Edge size in pixels of the shared local-light shadow atlas
    pub shadow_atlas_resolution: u32,
    /// Fixed atlas grid size (slots per edge), `None` picks `ceil(sqrt(lights))`
    pub shadow_atlas_split: Option<u32>,
    /// View matrix options (depth range remap)
    pub view: ViewSettings,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clustered_lighting: false,
            physical_units: false,
            shadow_atlas_resolution: 2048,
            shadow_atlas_split: None,
            view: ViewSettings::default(),
        }
    }
}

/// Frame statistics, reset by `Renderer::begin_frame`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cameras processed by the culling pass
    pub cameras: u32,
    /// Visible instances submitted to frustum culling
    pub candidates: u32,
    /// Instances rejected by frustum culling
    pub culled: u32,
    /// Lights affecting dynamic or lightmapped objects
    pub dynamic_lights: u32,
    /// Lights contributing to baking
    pub baked_lights: u32,
    /// Shadow map faces rendered
    pub shadow_map_updates: u32,
    /// Draw calls issued by shadow passes
    pub shadow_draw_calls: u32,
    /// VSM blur passes (two per blurred shadow map)
    pub vsm_blur_passes: u32,
}
