//! Frame driver.
//!
//! `Renderer` owns the configuration, the frame statistics and the
//! cross-frame state (culling scratch, the local-light atlas, the VSM blur
//! caches). A frame is `update` followed by `render_shadows`.

use crate::config::{FrameStats, RendererConfig};
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::material::ShaderProvider;
use crate::scene::{CameraKey, LightType, Scene};
use crate::shadow::{ShadowAtlas, ShadowPassContext, ShadowRenderer};
use crate::visibility::FrameCuller;

pub struct Renderer {
    config: RendererConfig,
    stats: FrameStats,
    frame_culler: FrameCuller,
    atlas: ShadowAtlas,
    shadow_renderer: ShadowRenderer,
    camera_keys: Vec<CameraKey>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        crate::engine_info!("galaxy3d::Renderer",
            "Renderer created (clustered lighting: {}, atlas {}px)",
            config.clustered_lighting, config.shadow_atlas_resolution);
        Self {
            config,
            stats: FrameStats::default(),
            frame_culler: FrameCuller::new(),
            atlas: ShadowAtlas::new(),
            shadow_renderer: ShadowRenderer::new(),
            camera_keys: Vec::new(),
        }
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &RendererConfig { &self.config }

    /// Takes effect from the next `update`
    pub fn config_mut(&mut self) -> &mut RendererConfig { &mut self.config }

    /// Counters of the current frame
    pub fn stats(&self) -> &FrameStats { &self.stats }

    pub fn frame_culler(&self) -> &FrameCuller { &self.frame_culler }
    pub fn atlas(&self) -> &ShadowAtlas { &self.atlas }
    pub fn shadow_renderer(&self) -> &ShadowRenderer { &self.shadow_renderer }

    // ===== FRAME =====

    /// Reset the per-frame state of the scene and the statistics.
    ///
    /// Directional lights are always visible when enabled; local lights wait
    /// for light culling.
    pub fn begin_frame(&mut self, scene: &mut Scene) {
        for instance in scene.instances.values_mut() {
            instance.visible_this_frame = false;
        }
        for light in scene.lights.values_mut() {
            light.visible_this_frame = light.light_type() == LightType::Directional && light.enabled();
            light.max_screen_size = 0.0;
            light.atlas_slot_updated = false;
            light.atlas_allocated = false;
        }
        self.stats = FrameStats::default();
    }

    /// Begin the frame and run every culling stage
    pub fn update(&mut self, scene: &mut Scene, device: &mut dyn GraphicsDevice) -> Result<()> {
        self.begin_frame(scene);
        self.frame_culler.cull_composition(scene, device, &mut self.atlas, &self.config, &mut self.stats)
    }

    /// Render the shadow maps culled by the last `update`.
    ///
    /// Local lights first, then the directional lights of every camera.
    pub fn render_shadows(
        &mut self,
        scene: &mut Scene,
        device: &mut dyn GraphicsDevice,
        shaders: &mut dyn ShaderProvider,
    ) -> Result<()> {
        let mut ctx = ShadowPassContext {
            device,
            shaders,
            config: &self.config,
            atlas: self.atlas.shadow_map(),
            stats: &mut self.stats,
        };

        for &light in &self.frame_culler.collected_lights().local {
            self.shadow_renderer.render(scene, &mut ctx, light, None)?;
        }

        self.camera_keys.clear();
        self.camera_keys.extend_from_slice(scene.composition().cameras());
        for &camera in &self.camera_keys {
            for &light in self.frame_culler.shadow_casters().directional_lights(camera) {
                self.shadow_renderer.render(scene, &mut ctx, light, Some(camera))?;
            }
        }
        Ok(())
    }

    /// Release every device resource owned by the renderer and the scene lights
    pub fn destroy(&mut self, scene: &mut Scene, device: &mut dyn GraphicsDevice) {
        for light in scene.lights.values_mut() {
            if let Some(map) = light.take_shadow_map() {
                map.destroy(device);
            }
            for map in light.take_retired_shadow_maps() {
                map.destroy(device);
            }
        }
        self.atlas.destroy(device);
        self.shadow_renderer.destroy(device);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
