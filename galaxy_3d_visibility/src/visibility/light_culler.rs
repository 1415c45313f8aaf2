/// Light collection and per-camera light visibility.
///
/// `collect_lights` walks the composition once per frame and gathers every
/// referenced light exactly once. `cull_lights` then marks the lights each
/// camera can see; directional lights are never frustum tested.

use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::camera::{Camera, FrustumTest};
use crate::config::RendererConfig;
use crate::scene::{LayerComposition, LayerId, Light, LightKey, LightMask, LightType};

/// Lights referenced by the composition this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedLights {
    /// Every referenced light, in first-reference order
    pub all: Vec<LightKey>,
    /// Point and spot lights, in first-reference order
    pub local: Vec<LightKey>,
    /// Lights affecting dynamic or lightmapped geometry
    pub dynamic_count: u32,
    /// Lights baked into lightmaps
    pub baked_count: u32,
}

impl CollectedLights {
    pub fn clear(&mut self) {
        self.all.clear();
        self.local.clear();
        self.dynamic_count = 0;
        self.baked_count = 0;
    }
}

/// Gather the lights of every layer of the composition.
///
/// Layers appear twice in the sub-layer list but contribute once. The dedup
/// sets are owned (and cleared) by the caller.
pub fn collect_lights(
    composition: &LayerComposition,
    lights: &SlotMap<LightKey, Light>,
    seen_layers: &mut FxHashSet<LayerId>,
    seen_lights: &mut FxHashSet<LightKey>,
) -> CollectedLights {
    let mut collected = CollectedLights::default();

    for sub_layer in composition.sub_layers() {
        if !seen_layers.insert(sub_layer.layer) {
            continue;
        }
        let Some(layer) = composition.layer(sub_layer.layer) else { continue };

        for &key in layer.lights() {
            if !seen_lights.insert(key) {
                continue;
            }
            let Some(light) = lights.get(key) else { continue };

            collected.all.push(key);
            if light.light_type().is_local() {
                collected.local.push(key);
            }
            if light.mask().intersects(LightMask::AFFECT_DYNAMIC | LightMask::AFFECT_LIGHTMAPPED) {
                collected.dynamic_count += 1;
            }
            if light.mask().contains(LightMask::BAKE) {
                collected.baked_count += 1;
            }
        }
    }

    collected
}

/// Mark the lights of `keys` visible to `camera`.
///
/// Local lights outside the frustum stay invisible, except shadow casters
/// that have no shadow map yet outside clustered lighting: one shadow render
/// has to happen for the map to exist.
pub fn cull_lights(
    camera: &Camera,
    lights: &mut SlotMap<LightKey, Light>,
    keys: &[LightKey],
    config: &RendererConfig,
) {
    for &key in keys {
        let Some(light) = lights.get_mut(key) else { continue };
        if !light.enabled() {
            continue;
        }

        if light.light_type() == LightType::Directional {
            light.use_physical_units = config.physical_units;
            continue;
        }

        let sphere = light.bounding_sphere();
        if camera.frustum().classify_sphere(&sphere) != FrustumTest::Outside {
            light.visible_this_frame = true;
            light.use_physical_units = config.physical_units;
            light.max_screen_size = light.max_screen_size.max(camera.screen_size(&sphere));
        } else if !config.clustered_lighting && light.cast_shadows() && light.shadow_map().is_none() {
            light.visible_this_frame = true;
        }
    }
}

#[cfg(test)]
#[path = "light_culler_tests.rs"]
mod tests;
