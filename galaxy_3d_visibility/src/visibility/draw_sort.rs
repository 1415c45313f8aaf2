/// Draw-call ordering inside one sub-layer.
///
/// Precedence of `compare_draw_calls`: ascending draw order (unordered calls
/// sit at 0), then back-to-front distance, then front-to-back
/// distance, and finally the forward sort key (descending). Distances are only
/// filled for the sort mode that needs them, so at most one of them
/// participates. Each key is a total order and ties fall through to the next,
/// which keeps the comparator transitive.
///
/// Culling never calls these; the draw stage sorts the culled buckets.

use std::cmp::Ordering;
use glam::Vec3;
use slotmap::SlotMap;
use crate::camera::Camera;
use crate::scene::{RenderInstance, RenderInstanceKey};

/// How a sub-layer orders its visible instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Keep culling order
    None,
    /// By `draw_order`
    Manual,
    /// By forward sort key (material / shader batching)
    #[default]
    Material,
    /// Farthest first along the camera forward axis
    BackToFront,
    /// Nearest first along the camera forward axis
    FrontToBack,
}

/// Compare two draw calls of the same sub-layer
pub fn compare_draw_calls(a: &RenderInstance, b: &RenderInstance) -> Ordering {
    a.draw_order().cmp(&b.draw_order())
        .then_with(|| b.zdist.total_cmp(&a.zdist))
        .then_with(|| a.zdist2.total_cmp(&b.zdist2))
        .then_with(|| b.forward_key.cmp(&a.forward_key))
}

/// Distance of the instance bounds center along the camera forward axis
fn sort_distance(instance: &RenderInstance, position: Vec3, forward: Vec3) -> f32 {
    (instance.world_aabb().center() - position).dot(forward)
}

/// Fill the sort distances needed by `mode` and sort `keys` in place.
///
/// Stale keys are left where they are relative to each other.
pub fn sort_draw_calls(
    keys: &mut [RenderInstanceKey],
    instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
    camera: &Camera,
    mode: SortMode,
) {
    if mode == SortMode::None || keys.len() < 2 {
        return;
    }

    let position = camera.position();
    let forward = camera.forward();
    for &key in keys.iter() {
        let Some(instance) = instances.get_mut(key) else { continue };
        let distance = sort_distance(instance, position, forward);
        let (zdist, zdist2) = match mode {
            SortMode::BackToFront => (distance, 0.0),
            SortMode::FrontToBack => (0.0, distance),
            _ => (0.0, 0.0),
        };
        instance.zdist = zdist;
        instance.zdist2 = zdist2;
    }

    keys.sort_by(|&a, &b| match (instances.get(a), instances.get(b)) {
        (Some(a), Some(b)) => compare_draw_calls(a, b),
        _ => Ordering::Equal,
    });
}

#[cfg(test)]
#[path = "draw_sort_tests.rs"]
mod tests;
