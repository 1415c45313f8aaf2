/// Per-frame culling of a whole layer composition.
///
/// Order matters: light culling fills `visible_this_frame` and
/// `max_screen_size`, which the atlas needs to rank lights, and the atlas
/// slot changes decide which local shadows the caster culling refreshes.

use rustc_hash::FxHashSet;
use crate::camera::ViewUniforms;
use crate::config::{FrameStats, RendererConfig};
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, RenderTargetHandle};
use crate::scene::{CameraKey, LayerId, LightKey, Scene};
use crate::shadow::ShadowAtlas;
use super::culled_instances::GpuUpdateSet;
use super::culler::VisibilityCuller;
use super::light_culler::{collect_lights, cull_lights, CollectedLights};
use super::shadow_culler::ShadowCasterCuller;

#[derive(Default)]
pub struct FrameCuller {
    visibility: VisibilityCuller,
    shadow_casters: ShadowCasterCuller,
    collected: CollectedLights,
    seen_layers: FxHashSet<LayerId>,
    seen_lights: FxHashSet<LightKey>,
    camera_keys: Vec<CameraKey>,
    layer_ids: Vec<LayerId>,
}

impl FrameCuller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lights gathered by the last pass
    pub fn collected_lights(&self) -> &CollectedLights {
        &self.collected
    }

    /// Instances scheduled for the GPU update stage by the last pass
    pub fn gpu_updates(&self) -> &GpuUpdateSet {
        self.visibility.gpu_updates()
    }

    pub fn shadow_casters(&self) -> &ShadowCasterCuller {
        &self.shadow_casters
    }

    /// Cull cameras, lights and shadow casters of the composition
    pub fn cull_composition(
        &mut self,
        scene: &mut Scene,
        device: &mut dyn GraphicsDevice,
        atlas: &mut ShadowAtlas,
        config: &RendererConfig,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let Scene { instances, lights, cameras, composition, .. } = scene;
        self.visibility.begin_pass();

        self.seen_layers.clear();
        self.seen_lights.clear();
        self.collected = collect_lights(composition, lights, &mut self.seen_layers, &mut self.seen_lights);
        stats.dynamic_lights += self.collected.dynamic_count;
        stats.baked_lights += self.collected.baked_count;

        self.camera_keys.clear();
        self.camera_keys.extend_from_slice(composition.cameras());
        for &camera_key in &self.camera_keys {
            let Some(camera) = cameras.get_mut(camera_key) else { continue };
            if !camera.enabled() {
                continue;
            }
            stats.cameras += 1;

            self.layer_ids.clear();
            self.layer_ids.extend_from_slice(camera.layers());
            let mut bound_target: Option<Option<RenderTargetHandle>> = None;

            for &layer_id in &self.layer_ids {
                let Some(layer) = composition.layer_mut(layer_id) else { continue };
                if !layer.enabled() {
                    continue;
                }

                let target = layer.render_target().or(camera.render_target());
                if bound_target != Some(target) {
                    let size = target
                        .and_then(|t| device.render_target_desc(t))
                        .map(|desc| (desc.width, desc.height))
                        .unwrap_or_else(|| device.backbuffer_size());
                    ViewUniforms::compute(camera, size, &config.view);
                    bound_target = Some(target);
                }

                cull_lights(camera, lights, layer.lights(), config);

                // Buckets keep layer order; draw sorting belongs to the draw stage
                let (keys, culled) = layer.instances_and_culled_mut(camera_key);
                self.visibility.cull(camera, instances, keys, culled, stats);
            }
        }

        if config.clustered_lighting {
            atlas.update(device, lights, &self.collected.local, config)?;
        }

        self.shadow_casters.cull_local(device, lights, &self.collected.local, composition, instances, config)?;
        self.shadow_casters.cull_directional(device, lights, cameras, composition, instances, config)
    }
}

#[cfg(test)]
#[path = "frame_culler_tests.rs"]
mod tests;
