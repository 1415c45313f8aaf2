/// Shadow caster culling.
///
/// Local lights place one shadow camera per face; directional lights place
/// one camera per cascade of every camera that renders them. Each shadow
/// camera then gathers the shadow-casting instances it can see into its
/// render data, sorted so that casters sharing a shadow shader and a mesh
/// are drawn back to back.

use glam::Vec4;
use rdst::{RadixKey, RadixSort};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use crate::camera::{Camera, AABB};
use crate::config::RendererConfig;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::scene::{
    CameraKey, LayerComposition, LayerId, Light, LightKey, LightType, RenderInstance,
    RenderInstanceKey, ShadowUpdateMode,
};
use crate::shadow::cascades::{cascade_viewport, fit_depth_range, place_cascade_camera, split_distances};
use crate::shadow::local::update_local_shadow_camera;
use crate::shadow::ShadowMap;
use super::cullable::Cullable;

/// Caster with its batching key; radix sorted descending
#[derive(Debug, Clone, Copy)]
struct CasterSortEntry {
    key: u64,
    instance: RenderInstanceKey,
}

impl RadixKey for CasterSortEntry {
    const LEVELS: usize = 8;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (!self.key >> (level * 8)) as u8
    }
}

/// Gather the casters of `light` visible to `shadow_camera` into `casters`.
///
/// Candidates are `candidates` when given, otherwise the instances of every
/// enabled layer referencing the light. Kept casters are flagged visible for
/// the frame. The dedup sets are cleared before use.
#[allow(clippy::too_many_arguments)]
pub fn gather_shadow_casters(
    shadow_camera: &Camera,
    light: LightKey,
    candidates: Option<&[RenderInstanceKey]>,
    composition: &LayerComposition,
    instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
    seen_layers: &mut FxHashSet<LayerId>,
    seen_casters: &mut FxHashSet<RenderInstanceKey>,
    casters: &mut Vec<RenderInstanceKey>,
) {
    casters.clear();
    seen_layers.clear();
    seen_casters.clear();

    let mut visit = |keys: &[RenderInstanceKey]| {
        for &key in keys {
            let Some(instance) = instances.get_mut(key) else { continue };
            if !instance.casts_shadow() {
                continue;
            }
            if instance.participates_in_culling() && !Cullable::is_visible(&*instance, shadow_camera) {
                continue;
            }
            if seen_casters.insert(key) {
                instance.visible_this_frame = true;
                casters.push(key);
            }
        }
    };

    match candidates {
        Some(keys) => visit(keys),
        None => {
            for layer in composition.layers() {
                if layer.enabled() && layer.has_light(light) && seen_layers.insert(layer.id()) {
                    visit(layer.instances());
                }
            }
        }
    }

    sort_casters(casters, instances);
}

/// Order casters by (shadow key, mesh id), descending
fn sort_casters(casters: &mut Vec<RenderInstanceKey>, instances: &SlotMap<RenderInstanceKey, RenderInstance>) {
    if casters.len() < 2 {
        return;
    }
    let mut entries: Vec<CasterSortEntry> = casters.iter()
        .filter_map(|&key| {
            let instance = instances.get(key)?;
            let sort_key = ((instance.shadow_key as u64) << 32) | instance.mesh().id() as u64;
            Some(CasterSortEntry { key: sort_key, instance: key })
        })
        .collect();
    entries.radix_sort_unstable();
    casters.clear();
    casters.extend(entries.iter().map(|e| e.instance));
}

/// Create the own shadow map of a light that has none yet, destroying the
/// maps its last shadow type or resolution change invalidated
fn ensure_shadow_map(
    device: &mut dyn GraphicsDevice,
    light: &mut Light,
    config: &RendererConfig,
) -> Result<()> {
    for map in light.take_retired_shadow_maps() {
        map.destroy(device);
    }
    if light.shadow_map.is_some() {
        return Ok(());
    }
    let kind = light.kind();
    let hardware_pcf = kind.hardware_pcf(config.clustered_lighting, device.capabilities());
    light.shadow_map = Some(ShadowMap::create(
        device, light.name(), kind, light.shadow_resolution(), hardware_pcf)?);
    Ok(())
}

/// Shadow caster culling state, reused across frames
#[derive(Default)]
pub struct ShadowCasterCuller {
    seen_layers: FxHashSet<LayerId>,
    seen_casters: FxHashSet<RenderInstanceKey>,
    seen_directional: FxHashSet<LightKey>,
    directional_lights: FxHashMap<CameraKey, Vec<LightKey>>,
}

impl ShadowCasterCuller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directional lights whose cascades were culled for `camera` this frame
    pub fn directional_lights(&self, camera: CameraKey) -> &[LightKey] {
        self.directional_lights.get(&camera).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cull the casters of every visible shadow-casting local light
    #[allow(clippy::too_many_arguments)]
    pub fn cull_local(
        &mut self,
        device: &mut dyn GraphicsDevice,
        lights: &mut SlotMap<LightKey, Light>,
        local: &[LightKey],
        composition: &LayerComposition,
        instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
        config: &RendererConfig,
    ) -> Result<()> {
        let clustered = config.clustered_lighting;
        for &key in local {
            let Some(light) = lights.get_mut(key) else { continue };
            if !light.enabled() || !light.visible_this_frame || !light.cast_shadows() {
                continue;
            }

            let escalate = if clustered {
                light.atlas_slot_updated
            } else {
                light.shadow_map().is_none()
            };
            if escalate && light.shadow_update_mode == ShadowUpdateMode::None {
                light.shadow_update_mode = ShadowUpdateMode::ThisFrame;
            }
            if light.shadow_update_mode == ShadowUpdateMode::None {
                continue;
            }

            let atlas_resolution = if clustered {
                if light.atlas_slot().is_none() {
                    continue;
                }
                Some(config.shadow_atlas_resolution)
            } else {
                ensure_shadow_map(device, light, config)?;
                None
            };

            for face in 0..light.shadow_face_count() {
                update_local_shadow_camera(light, face, atlas_resolution);
                let data = light.render_data_mut(None, face);
                if !clustered {
                    let full = Vec4::new(0.0, 0.0, 1.0, 1.0);
                    data.shadow_camera.set_rect(full);
                    data.shadow_camera.set_scissor_rect(full);
                }
                gather_shadow_casters(
                    &data.shadow_camera, key, None, composition, instances,
                    &mut self.seen_layers, &mut self.seen_casters, &mut data.visible_casters);
            }
        }
        Ok(())
    }

    /// Rebuild the camera to directional light map and cull every cascade
    #[allow(clippy::too_many_arguments)]
    pub fn cull_directional(
        &mut self,
        device: &mut dyn GraphicsDevice,
        lights: &mut SlotMap<LightKey, Light>,
        cameras: &SlotMap<CameraKey, Camera>,
        composition: &LayerComposition,
        instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
        config: &RendererConfig,
    ) -> Result<()> {
        self.directional_lights.clear();

        for &camera_key in composition.cameras() {
            let Some(camera) = cameras.get(camera_key) else { continue };
            if !camera.enabled() {
                continue;
            }
            self.seen_directional.clear();

            for layer_id in camera.layers() {
                let Some(layer) = composition.layer(*layer_id) else { continue };
                if !layer.enabled() {
                    continue;
                }
                for &light_key in layer.lights_of_type(LightType::Directional) {
                    let Some(light) = lights.get_mut(light_key) else { continue };
                    if !light.enabled() || !light.cast_shadows() {
                        continue;
                    }
                    if !self.seen_directional.insert(light_key) {
                        continue;
                    }
                    self.directional_lights.entry(camera_key).or_default().push(light_key);

                    ensure_shadow_map(device, light, config)?;
                    self.cull_cascades(light, light_key, camera_key, camera, composition, instances);
                }
            }
        }
        Ok(())
    }

    /// Place the cascade cameras of `light` for `camera` and gather their casters
    #[allow(clippy::too_many_arguments)]
    fn cull_cascades(
        &mut self,
        light: &mut Light,
        light_key: LightKey,
        camera_key: CameraKey,
        camera: &Camera,
        composition: &LayerComposition,
        instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
    ) {
        let count = light.num_cascades();
        let near = camera.near();
        let far = camera.far().min(light.shadow_distance());
        let distances = split_distances(near, far, count, light.cascade_distribution());
        light.set_cascade_distances(distances);

        let rotation = light.rotation();
        let resolution = light.shadow_resolution();
        let mut slice_near = near;
        for cascade in 0..count {
            let slice_far = distances[cascade as usize];
            let rect = cascade_viewport(count, cascade);
            let data = light.render_data_mut(Some(camera_key), cascade);
            data.shadow_camera.set_rect(rect);
            data.shadow_camera.set_scissor_rect(rect);

            let cascade_resolution = (resolution as f32 * rect.z) as u32;
            place_cascade_camera(data, rotation, camera, slice_near, slice_far, cascade_resolution);
            gather_shadow_casters(
                &data.shadow_camera, light_key, None, composition, instances,
                &mut self.seen_layers, &mut self.seen_casters, &mut data.visible_casters);

            let bounds = data.visible_casters.iter()
                .filter_map(|&key| instances.get(key))
                .fold(AABB::EMPTY, |acc, instance| acc.union(instance.world_aabb()));
            fit_depth_range(data, &bounds);
            slice_near = slice_far;
        }
    }
}

#[cfg(test)]
#[path = "shadow_culler_tests.rs"]
mod tests;
