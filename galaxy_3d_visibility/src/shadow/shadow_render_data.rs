/// Per-face shadow render record: shadow camera, sampling matrix and casters.

use glam::Mat4;
use crate::camera::Camera;
use crate::scene::RenderInstanceKey;

/// Color clear value of manually sampled shadow maps (farthest depth)
pub const SHADOW_CLEAR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone)]
pub struct ShadowRenderData {
    /// Camera rendering this face; its rect/scissor rect locate the face in the target
    pub shadow_camera: Camera,
    /// Cubemap face, cascade index or 0
    pub face: u32,
    /// Slice of the shadow camera's render target written by this face
    pub target_slice: u32,
    /// World to shadow-map texture space (xy in [0, 1] of the target, z in [0, 1])
    pub shadow_matrix: Mat4,
    /// Shadow casters visible to the shadow camera, sorted for batching
    pub visible_casters: Vec<RenderInstanceKey>,
    /// Ratio between the cascade extent and the shadow map size
    pub projection_compensation: f32,
}

impl ShadowRenderData {
    pub fn new(name: String, face: u32) -> Self {
        let mut shadow_camera = Camera::new(name);
        shadow_camera.set_clear_depth(Some(1.0));
        shadow_camera.set_clear_color(Some(SHADOW_CLEAR_COLOR));
        Self {
            shadow_camera,
            face,
            target_slice: 0,
            shadow_matrix: Mat4::IDENTITY,
            visible_casters: Vec::new(),
            projection_compensation: 1.0,
        }
    }

    /// Recompute the shadow camera matrices and frustum (square aspect)
    pub fn refresh_camera(&mut self) {
        let projection = self.shadow_camera.projection_matrix_for(1.0);
        let view = self.shadow_camera.world_matrix().inverse();
        self.shadow_camera.update_frustum(projection, view);
    }

    /// Clear the color buffer only for manually sampled shadow maps
    pub fn set_clear_color_buffer(&mut self, clear: bool) {
        self.shadow_camera.set_clear_color(if clear { Some(SHADOW_CLEAR_COLOR) } else { None });
    }
}
