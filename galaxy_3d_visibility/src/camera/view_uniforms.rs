/// Per-view uniform data (camera matrices) and its upload.
///
/// `ViewUniforms::compute` is the single place where a camera's per-frame
/// matrices are produced. It refreshes the camera frustum from the final
/// (jittered) view-projection, so every culling pass after it sees the same
/// volume the GPU rasterizes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, UniformBufferSlot};
use super::camera::{Camera, Projection};

/// Options applied when building view matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    /// Remap clip depth from [-w, w] to [0, w] for the device projection
    pub depth_range_zero_to_one: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self { depth_range_zero_to_one: true }
    }
}

/// Matrix mapping clip z from [-w, w] to [0, w]
pub const DEPTH_RANGE_REMAP: Mat4 = Mat4::from_cols(
    Vec4::X,
    Vec4::Y,
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

/// Camera matrices for one view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewUniforms {
    pub view: Mat4,
    /// Device projection (jitter and depth remap applied)
    pub projection: Mat4,
    pub inverse_view: Mat4,
    pub view_projection: Mat4,
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    pub exposure: f32,
}

/// GPU layout of `ViewUniforms`
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ViewUniformBlock {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inverse_view: [[f32; 4]; 4],
    pub view_projection: [[f32; 4]; 4],
    /// xyz = camera position
    pub position: [f32; 4],
    /// x = near, y = far, z = exposure
    pub params: [f32; 4],
}

impl ViewUniforms {
    /// Compute the view matrices of `camera` for a target of `target_size`
    /// pixels and refresh the camera frustum
    pub fn compute(camera: &mut Camera, target_size: (u32, u32), settings: &ViewSettings) -> Self {
        let aspect = camera.resolve_aspect(target_size);
        let mut projection = camera.projection_matrix_for(aspect);

        let jitter = camera.jitter();
        if jitter != glam::Vec2::ZERO {
            let width = (target_size.0 as f32 * camera.rect().z).max(1.0);
            let height = (target_size.1 as f32 * camera.rect().w).max(1.0);
            let offset_x = 2.0 * jitter.x / width;
            let offset_y = 2.0 * jitter.y / height;
            match camera.projection() {
                // clip w = -z_view, so the z column shifts NDC by a constant
                Projection::Perspective { .. } => {
                    projection.z_axis.x -= offset_x;
                    projection.z_axis.y -= offset_y;
                }
                Projection::Orthographic { .. } => {
                    projection.w_axis.x += offset_x;
                    projection.w_axis.y += offset_y;
                }
            }
        }

        let inverse_view = camera.world_matrix();
        let view = inverse_view.inverse();
        camera.update_frustum(projection, view);

        let device_projection = if settings.depth_range_zero_to_one {
            DEPTH_RANGE_REMAP * projection
        } else {
            projection
        };

        Self {
            view,
            projection: device_projection,
            inverse_view,
            view_projection: device_projection * view,
            position: camera.position(),
            near: camera.near(),
            far: camera.far(),
            exposure: camera.exposure(),
        }
    }

    pub fn to_block(&self) -> ViewUniformBlock {
        ViewUniformBlock {
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            inverse_view: self.inverse_view.to_cols_array_2d(),
            view_projection: self.view_projection.to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
            params: [self.near, self.far, self.exposure, 0.0],
        }
    }
}

/// Upload the view block to the device's per-view slot
pub fn dispatch_view_uniforms(device: &mut dyn GraphicsDevice, uniforms: &ViewUniforms) -> Result<()> {
    let block = uniforms.to_block();
    device.set_uniform_buffer(UniformBufferSlot::View, bytemuck::bytes_of(&block))
}

#[cfg(test)]
#[path = "view_uniforms_tests.rs"]
mod tests;
