/// Camera visibility culling of one layer's instances.
///
/// Kept instances are flagged visible for the frame and bucketed by
/// transparency in layer order. Instances carrying skinning, morphing or
/// splat data are scheduled once per frame for their GPU update stage.

use slotmap::SlotMap;
use crate::camera::Camera;
use crate::config::FrameStats;
use crate::scene::{RenderInstance, RenderInstanceKey};
use super::cullable::Cullable;
use super::culled_instances::{CulledInstances, GpuUpdateSet};

#[derive(Default)]
pub struct VisibilityCuller {
    gpu_updates: GpuUpdateSet,
}

impl VisibilityCuller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a culling pass: forget the previous GPU update schedule
    pub fn begin_pass(&mut self) {
        self.gpu_updates.clear();
    }

    /// Instances needing the GPU update stage this frame, in first-seen order
    pub fn gpu_updates(&self) -> &GpuUpdateSet {
        &self.gpu_updates
    }

    /// Cull `keys` against `camera` into `culled` (cleared first)
    pub fn cull(
        &mut self,
        camera: &Camera,
        instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
        keys: &[RenderInstanceKey],
        culled: &mut CulledInstances,
        stats: &mut FrameStats,
    ) {
        culled.clear();
        let frustum_culling = camera.frustum_culling();
        let mut candidates = 0u32;

        for &key in keys {
            let Some(instance) = instances.get_mut(key) else { continue };
            if !instance.is_visible() {
                continue;
            }
            candidates += 1;

            let keep = !frustum_culling
                || !instance.participates_in_culling()
                || Cullable::is_visible(&*instance, camera);
            if !keep {
                continue;
            }

            instance.visible_this_frame = true;
            if instance.is_transparent() {
                culled.transparent.push(key);
            } else {
                culled.opaque.push(key);
            }
            if instance.needs_gpu_update() {
                self.gpu_updates.insert(key);
            }
        }

        let kept = culled.len() as u32;
        stats.candidates += candidates;
        stats.culled += candidates - kept;
    }
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
