/// Per-object visibility capability used by camera and shadow culling

use crate::camera::Camera;
use crate::scene::{InstanceFlags, RenderInstance};

pub trait Cullable {
    /// Whether the object takes part in frustum culling at all
    fn participates_in_culling(&self) -> bool;

    /// Whether the object is inside the camera's current frustum
    fn is_visible(&self, camera: &Camera) -> bool;
}

impl Cullable for RenderInstance {
    fn participates_in_culling(&self) -> bool {
        self.flags().contains(InstanceFlags::CULL)
    }

    fn is_visible(&self, camera: &Camera) -> bool {
        camera.frustum().intersects_aabb(self.world_aabb())
    }
}
