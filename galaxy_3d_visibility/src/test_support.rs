/// Shared fixtures for unit tests

use std::sync::Arc;
use glam::{Mat4, Quat, Vec3};
use slotmap::KeyData;
use crate::camera::{Camera, ViewSettings, ViewUniforms, AABB};
use crate::graphics_device::{BufferHandle, IndexType, Primitive, PrimitiveTopology};
use crate::scene::{
    CameraKey, InstanceFlags, Layer, LayerId, Light, LightKey, LightType, Mesh,
    RenderInstanceKey, Scene,
};

/// Unit cube mesh (half extent 0.5) with an index buffer
pub fn cube_mesh(id: u32) -> Arc<Mesh> {
    Arc::new(Mesh::new(
        id,
        BufferHandle::from(KeyData::from_ffi(1)),
        Some(BufferHandle::from(KeyData::from_ffi(2))),
        Primitive { topology: PrimitiveTopology::TriangleList, base: 0, count: 36, index_type: Some(IndexType::U16) },
        AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
    ))
}

/// Camera at `position` looking down -Z with refreshed matrices
pub fn camera_at(position: Vec3) -> Camera {
    let mut camera = Camera::new("main");
    camera.set_position(position);
    camera.set_rotation(Quat::IDENTITY);
    camera.set_layers(vec![LayerId(0)]);
    ViewUniforms::compute(&mut camera, (256, 256), &ViewSettings::default());
    camera
}

/// Scene with one layer (id 0) and one camera rendering it
pub fn basic_scene() -> (Scene, CameraKey) {
    let mut scene = Scene::new();
    scene.add_layer(Layer::new(LayerId(0), "world"));
    let camera = scene.add_camera(camera_at(Vec3::ZERO));
    (scene, camera)
}

/// Add a shadow-casting cube at `position` to layer 0
pub fn add_cube(scene: &mut Scene, position: Vec3) -> RenderInstanceKey {
    let key = scene.create_render_instance(cube_mesh(1), Mat4::from_translation(position));
    if let Some(instance) = scene.render_instance_mut(key) {
        instance.set_flag(InstanceFlags::CAST_SHADOW, true);
    }
    scene.add_instance_to_layer(LayerId(0), key);
    key
}

/// Add a light to the scene and to layer 0
pub fn add_light(scene: &mut Scene, light: Light) -> LightKey {
    let key = scene.add_light(light);
    scene.add_light_to_layer(LayerId(0), key);
    key
}

/// Shadow-casting point light
pub fn point_light(name: &str, position: Vec3, range: f32) -> Light {
    let mut light = Light::new(name, LightType::Point);
    light.set_position(position);
    light.set_range(range);
    light.set_cast_shadows(true);
    light
}
