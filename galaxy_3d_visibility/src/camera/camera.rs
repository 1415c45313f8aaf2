/// Camera: world placement, projection parameters and per-frame matrices.
///
/// The caller places the camera (position, rotation) and sets its projection
/// parameters. The renderer refreshes the derived matrices and the frustum
/// once per frame (`ViewUniforms::compute`) before any culling runs. Shadow
/// passes use the same type for their per-face shadow cameras.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use crate::graphics_device::RenderTargetHandle;
use crate::scene::LayerId;
use super::bounds::BoundingSphere;
use super::frustum::Frustum;

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Vertical field of view in radians
    Perspective { fov_y: f32 },
    /// Half of the visible height in world units
    Orthographic { height: f32 },
}

/// How the aspect ratio is obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectRatio {
    /// Derived from the render target size and the viewport rect
    Auto,
    Fixed(f32),
}

#[derive(Debug, Clone)]
pub struct Camera {
    name: String,
    enabled: bool,
    position: Vec3,
    rotation: Quat,
    projection: Projection,
    near: f32,
    far: f32,
    aspect: AspectRatio,
    /// Normalized viewport (x, y, width, height)
    rect: Vec4,
    /// Normalized scissor (x, y, width, height)
    scissor_rect: Vec4,
    clear_color: Option<[f32; 4]>,
    clear_depth: Option<f32>,
    frustum_culling: bool,
    render_target: Option<RenderTargetHandle>,
    layers: Vec<LayerId>,
    /// Sub-pixel projection offset in pixels (temporal techniques)
    jitter: Vec2,
    exposure: f32,

    // ===== DERIVED (refreshed per frame) =====
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Perspective camera at the origin looking down -Z
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Projection::Perspective { fov_y: 45f32.to_radians() },
            near: 0.1,
            far: 1000.0,
            aspect: AspectRatio::Auto,
            rect: Vec4::new(0.0, 0.0, 1.0, 1.0),
            scissor_rect: Vec4::new(0.0, 0.0, 1.0, 1.0),
            clear_color: Some([0.0, 0.0, 0.0, 1.0]),
            clear_depth: Some(1.0),
            frustum_culling: true,
            render_target: None,
            layers: Vec::new(),
            jitter: Vec2::ZERO,
            exposure: 1.0,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            frustum: Frustum::default(),
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str { &self.name }
    pub fn enabled(&self) -> bool { self.enabled }
    pub fn position(&self) -> Vec3 { self.position }
    pub fn rotation(&self) -> Quat { self.rotation }
    pub fn projection(&self) -> Projection { self.projection }
    pub fn near(&self) -> f32 { self.near }
    pub fn far(&self) -> f32 { self.far }
    pub fn aspect_ratio(&self) -> AspectRatio { self.aspect }
    pub fn rect(&self) -> Vec4 { self.rect }
    pub fn scissor_rect(&self) -> Vec4 { self.scissor_rect }
    pub fn clear_color(&self) -> Option<[f32; 4]> { self.clear_color }
    pub fn clear_depth(&self) -> Option<f32> { self.clear_depth }
    pub fn frustum_culling(&self) -> bool { self.frustum_culling }
    pub fn render_target(&self) -> Option<RenderTargetHandle> { self.render_target }
    pub fn layers(&self) -> &[LayerId] { &self.layers }
    pub fn jitter(&self) -> Vec2 { self.jitter }
    pub fn exposure(&self) -> f32 { self.exposure }

    /// World transform (rotation then translation)
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Unit forward vector (-Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// View matrix computed during the last refresh
    pub fn view_matrix(&self) -> &Mat4 { &self.view_matrix }

    /// Projection matrix computed during the last refresh (jitter included)
    pub fn projection_matrix(&self) -> &Mat4 { &self.projection_matrix }

    pub fn view_projection_matrix(&self) -> &Mat4 { &self.view_projection }

    /// Aspect ratio of the projection computed during the last refresh
    pub fn current_aspect(&self) -> f32 {
        let p = &self.projection_matrix;
        if p.x_axis.x != 0.0 { p.y_axis.y / p.x_axis.x } else { 1.0 }
    }

    /// World-space frustum computed during the last refresh
    pub fn frustum(&self) -> &Frustum { &self.frustum }

    // ===== SETTERS =====

    pub fn set_enabled(&mut self, enabled: bool) { self.enabled = enabled; }
    pub fn set_position(&mut self, position: Vec3) { self.position = position; }
    pub fn set_rotation(&mut self, rotation: Quat) { self.rotation = rotation; }
    pub fn set_projection(&mut self, projection: Projection) { self.projection = projection; }
    pub fn set_aspect_ratio(&mut self, aspect: AspectRatio) { self.aspect = aspect; }
    pub fn set_rect(&mut self, rect: Vec4) { self.rect = rect; }
    pub fn set_scissor_rect(&mut self, rect: Vec4) { self.scissor_rect = rect; }
    pub fn set_clear_color(&mut self, color: Option<[f32; 4]>) { self.clear_color = color; }
    pub fn set_clear_depth(&mut self, depth: Option<f32>) { self.clear_depth = depth; }
    pub fn set_frustum_culling(&mut self, enabled: bool) { self.frustum_culling = enabled; }
    pub fn set_render_target(&mut self, target: Option<RenderTargetHandle>) { self.render_target = target; }
    pub fn set_layers(&mut self, layers: Vec<LayerId>) { self.layers = layers; }
    pub fn set_jitter(&mut self, jitter: Vec2) { self.jitter = jitter; }
    pub fn set_exposure(&mut self, exposure: f32) { self.exposure = exposure; }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    /// Orient the camera so that it looks at `target`
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation;
    }

    // ===== PROJECTION =====

    /// Aspect ratio for a target of `target_size` pixels
    pub fn resolve_aspect(&self, target_size: (u32, u32)) -> f32 {
        match self.aspect {
            AspectRatio::Fixed(aspect) => aspect,
            AspectRatio::Auto => {
                let w = target_size.0 as f32 * self.rect.z;
                let h = target_size.1 as f32 * self.rect.w;
                if h > 0.0 { w / h } else { 1.0 }
            }
        }
    }

    /// Unjittered projection (OpenGL depth convention, clip z in [-w, w])
    pub fn projection_matrix_for(&self, aspect: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov_y } => {
                Mat4::perspective_rh_gl(fov_y, aspect, self.near, self.far)
            }
            Projection::Orthographic { height } => {
                let width = height * aspect;
                Mat4::orthographic_rh_gl(-width, width, -height, height, self.near, self.far)
            }
        }
    }

    /// Store the per-frame matrices and derive the frustum from `projection * view`
    pub fn update_frustum(&mut self, projection: Mat4, view: Mat4) {
        self.projection_matrix = projection;
        self.view_matrix = view;
        self.view_projection = projection * view;
        self.frustum = Frustum::from_view_projection(&self.view_projection);
    }

    /// Fraction of the viewport height covered by `sphere`, in [0, 1].
    ///
    /// A camera inside the sphere sees it fill the screen.
    pub fn screen_size(&self, sphere: &BoundingSphere) -> f32 {
        match self.projection {
            Projection::Perspective { fov_y } => {
                let distance = self.position.distance(sphere.center);
                if distance < sphere.radius {
                    return 1.0;
                }
                let view_angle = (sphere.radius / distance).asin();
                let size = view_angle.tan() / (fov_y * 0.5).tan();
                size.min(1.0)
            }
            Projection::Orthographic { height } => {
                if height <= 0.0 {
                    return 1.0;
                }
                (sphere.radius / height).clamp(0.0, 1.0)
            }
        }
    }

    /// Corners of the view volume slice between `near` and `far` distances
    /// along the view direction, in world space (near face first)
    pub fn frustum_slice_points(&self, near: f32, far: f32, aspect: f32) -> [Vec3; 8] {
        let (near_h, far_h) = match self.projection {
            Projection::Perspective { fov_y } => {
                let t = (fov_y * 0.5).tan();
                (near * t, far * t)
            }
            Projection::Orthographic { height } => (height, height),
        };
        let world = self.world_matrix();
        let mut points = [Vec3::ZERO; 8];
        for (i, (distance, half_h)) in [(near, near_h), (far, far_h)].into_iter().enumerate() {
            let half_w = half_h * aspect;
            let corners = [
                Vec3::new(-half_w, -half_h, -distance),
                Vec3::new(half_w, -half_h, -distance),
                Vec3::new(half_w, half_h, -distance),
                Vec3::new(-half_w, half_h, -distance),
            ];
            for (j, corner) in corners.into_iter().enumerate() {
                points[i * 4 + j] = world.transform_point3(corner);
            }
        }
        points
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
