/// Shadow cameras of local lights.
///
/// Spot lights render one perspective face along their direction. Point
/// lights render six 90° cube faces; inside the clustered atlas the field of
/// view is widened so that each tile carries a filtering border.

use std::f32::consts::FRAC_PI_2;
use glam::Vec3;
use crate::camera::{AspectRatio, Projection};
use crate::scene::{Light, LightType};

/// Border texels kept around each atlas tile for filtering
pub const ATLAS_EDGE_PIXELS: f32 = 3.0;

/// Look direction and up vector of each cube face (+X, -X, +Y, -Y, +Z, -Z)
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// Vertical field of view of a point light face.
///
/// `atlas_tile` is the tile size in pixels for lights rendered into the atlas.
pub fn point_face_fov(atlas_tile: Option<f32>) -> f32 {
    match atlas_tile {
        Some(tile) if tile > 0.0 => {
            let texel_size = 2.0 / tile;
            2.0 * (1.0 + texel_size * ATLAS_EDGE_PIXELS).atan()
        }
        _ => FRAC_PI_2,
    }
}

/// Place the shadow camera of one face of a local light and refresh its frustum.
///
/// `atlas_resolution` is set for lights rendered into the clustered atlas.
pub fn update_local_shadow_camera(light: &mut Light, face: u32, atlas_resolution: Option<u32>) {
    let range = light.range();
    let position = light.position();
    let rotation = light.rotation();
    let light_type = light.light_type();
    let outer_cone = light.outer_cone_angle();
    let atlas_tile = atlas_resolution.map(|res| res as f32 * light.atlas_viewport().z / 3.0);

    let data = light.render_data_mut(None, face);
    let camera = &mut data.shadow_camera;
    camera.set_clip_planes(range / 1000.0, range);
    camera.set_position(position);
    camera.set_aspect_ratio(AspectRatio::Fixed(1.0));

    match light_type {
        LightType::Spot => {
            camera.set_rotation(rotation);
            camera.set_projection(Projection::Perspective { fov_y: (outer_cone * 2.0).to_radians() });
        }
        LightType::Point => {
            let (direction, up) = CUBE_FACES[face as usize % CUBE_FACES.len()];
            camera.look_at(position + direction, up);
            camera.set_projection(Projection::Perspective { fov_y: point_face_fov(atlas_tile) });
        }
        LightType::Directional => {}
    }

    data.refresh_camera();
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
