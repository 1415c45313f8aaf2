/// Directional light cascades.
///
/// The view range of a camera is split into up to four slices; each slice is
/// covered by an orthographic shadow camera placed in the light's frame and
/// snapped to shadow-map texels so that shadows do not shimmer while the
/// camera moves.

use glam::{Quat, Vec3, Vec4};
use crate::camera::{AspectRatio, BoundingSphere, Camera, Projection, AABB};
use crate::scene::MAX_CASCADES;
use super::shadow_render_data::ShadowRenderData;

/// Distance the cascade camera is pulled back before the depth range is fitted
const CASCADE_PULLBACK: f32 = 100_000.0;

/// Normalized viewport of each cascade inside the shadow map, per cascade count
const CASCADE_VIEWPORTS: [[Vec4; MAX_CASCADES]; MAX_CASCADES] = [
    [
        Vec4::new(0.0, 0.0, 1.0, 1.0),
        Vec4::ZERO,
        Vec4::ZERO,
        Vec4::ZERO,
    ],
    [
        Vec4::new(0.0, 0.0, 0.5, 0.5),
        Vec4::new(0.0, 0.5, 0.5, 0.5),
        Vec4::ZERO,
        Vec4::ZERO,
    ],
    [
        Vec4::new(0.0, 0.0, 0.5, 0.5),
        Vec4::new(0.0, 0.5, 0.5, 0.5),
        Vec4::new(0.5, 0.0, 0.5, 0.5),
        Vec4::ZERO,
    ],
    [
        Vec4::new(0.0, 0.0, 0.5, 0.5),
        Vec4::new(0.0, 0.5, 0.5, 0.5),
        Vec4::new(0.5, 0.0, 0.5, 0.5),
        Vec4::new(0.5, 0.5, 0.5, 0.5),
    ],
];

/// Viewport of `cascade` when the map holds `count` cascades
pub fn cascade_viewport(count: u32, cascade: u32) -> Vec4 {
    let count = (count as usize).clamp(1, MAX_CASCADES);
    CASCADE_VIEWPORTS[count - 1][(cascade as usize).min(count - 1)]
}

/// Far distance of each cascade.
///
/// Inner splits blend a linear and a logarithmic distribution by
/// `distribution` (0 = linear, 1 = logarithmic); unused entries hold `far`.
pub fn split_distances(near: f32, far: f32, count: u32, distribution: f32) -> [f32; MAX_CASCADES] {
    let count = count.clamp(1, MAX_CASCADES as u32);
    let mut distances = [far; MAX_CASCADES];
    for i in 1..count {
        let fraction = i as f32 / count as f32;
        let linear = near + (far - near) * fraction;
        let log = near * (far / near).powf(fraction);
        distances[i as usize - 1] = linear + (log - linear) * distribution;
    }
    distances
}

/// Place the cascade camera around the slice `[near, far]` of `camera`.
///
/// The camera is oriented like the light, centered on the bounding sphere of
/// the slice (snapped to texels) and pulled far back so that every caster in
/// front of the slice is captured. Returns the sphere radius.
pub fn place_cascade_camera(
    data: &mut ShadowRenderData,
    light_rotation: Quat,
    camera: &Camera,
    near: f32,
    far: f32,
    resolution: u32,
) -> f32 {
    let points = camera.frustum_slice_points(near, far, camera.current_aspect());
    let sphere = BoundingSphere::from_points(&points);
    let radius = sphere.radius.max(f32::EPSILON);

    let right = light_rotation * Vec3::X;
    let up = light_rotation * Vec3::Y;
    let direction = light_rotation * Vec3::NEG_Z;

    let size_ratio = 0.25 * resolution as f32 / radius;
    let x = (sphere.center.dot(up) * size_ratio).ceil() / size_ratio;
    let y = (sphere.center.dot(right) * size_ratio).ceil() / size_ratio;
    let center = up * x + right * y + direction * sphere.center.dot(direction);

    let shadow_camera = &mut data.shadow_camera;
    shadow_camera.set_rotation(light_rotation);
    shadow_camera.set_position(center - direction * CASCADE_PULLBACK);
    shadow_camera.set_clip_planes(0.01, 2.0 * CASCADE_PULLBACK);
    shadow_camera.set_aspect_ratio(AspectRatio::Fixed(1.0));
    shadow_camera.set_projection(Projection::Orthographic { height: radius });
    data.refresh_camera();
    data.projection_compensation = radius;
    radius
}

/// Move the cascade camera right behind the casters and tighten its far plane
pub fn fit_depth_range(data: &mut ShadowRenderData, casters: &AABB) {
    if casters.is_empty() {
        return;
    }
    let view = data.shadow_camera.world_matrix().inverse();
    let (mut min_z, mut max_z) = (f32::MAX, f32::MIN);
    for corner in casters.corners() {
        let z = view.transform_point3(corner).z;
        min_z = min_z.min(z);
        max_z = max_z.max(z);
    }

    let shadow_camera = &mut data.shadow_camera;
    let backward = shadow_camera.rotation() * Vec3::Z;
    shadow_camera.set_position(shadow_camera.position() + backward * (max_z + 0.1));
    let near = shadow_camera.near();
    shadow_camera.set_clip_planes(near, max_z - min_z + 0.2);
    data.refresh_camera();
}

#[cfg(test)]
#[path = "cascades_tests.rs"]
mod tests;
