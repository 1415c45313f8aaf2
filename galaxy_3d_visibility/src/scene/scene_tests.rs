/// Tests for Scene
///
/// These tests validate the keyed containers of the scene and the way they
/// keep layer references in sync on removal.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use slotmap::KeyData;
use super::*;
use crate::camera::{Camera, AABB};
use crate::graphics_device::{BufferHandle, Primitive, PrimitiveTopology};
use crate::material::{Material, ParamValue};
use crate::scene::{LayerId, LightType, SubLayer};

// ============================================================================
// Helper Functions
// ============================================================================

fn cube_mesh() -> Arc<Mesh> {
    Arc::new(Mesh::new(
        1,
        BufferHandle::from(KeyData::from_ffi(1)),
        None,
        Primitive { topology: PrimitiveTopology::TriangleList, base: 0, count: 36, index_type: None },
        AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
    ))
}

fn scene_with_layer() -> Scene {
    let mut scene = Scene::new();
    scene.add_layer(Layer::new(LayerId(0), "world"));
    scene
}

// ============================================================================
// Instances
// ============================================================================

#[test]
fn test_new_scene_is_empty() {
    let scene = Scene::new();
    assert_eq!(scene.render_instance_count(), 0);
    assert!(scene.composition().layers().is_empty());
    assert!(scene.composition().cameras().is_empty());
    assert!(scene.material(scene.default_material()).is_some());
}

#[test]
fn test_create_and_get_instance() {
    let mut scene = Scene::new();
    let key = scene.create_render_instance(cube_mesh(), Mat4::from_translation(Vec3::X));

    let instance = scene.render_instance(key).unwrap();
    assert_eq!(instance.world_aabb().center(), Vec3::X);
    assert_eq!(scene.render_instance_count(), 1);
}

#[test]
fn test_set_world_matrix_updates_bounds() {
    let mut scene = Scene::new();
    let key = scene.create_render_instance(cube_mesh(), Mat4::IDENTITY);

    assert!(scene.set_world_matrix(key, Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0))));
    let aabb = scene.render_instance(key).unwrap().world_aabb();
    assert_eq!(aabb.center(), Vec3::new(0.0, 4.0, 0.0));
}

#[test]
fn test_remove_instance_clears_layer_reference() {
    let mut scene = scene_with_layer();
    let key = scene.create_render_instance(cube_mesh(), Mat4::IDENTITY);
    assert!(scene.add_instance_to_layer(LayerId(0), key));

    assert!(scene.remove_render_instance(key));
    assert!(scene.render_instance(key).is_none());
    assert!(scene.composition().layer(LayerId(0)).unwrap().instances().is_empty());

    // Second removal reports the stale key
    assert!(!scene.remove_render_instance(key));
    assert!(!scene.set_world_matrix(key, Mat4::IDENTITY));
}

#[test]
fn test_add_instance_to_unknown_layer() {
    let mut scene = scene_with_layer();
    let key = scene.create_render_instance(cube_mesh(), Mat4::IDENTITY);
    assert!(!scene.add_instance_to_layer(LayerId(9), key));
}

// ============================================================================
// Lights / cameras / materials
// ============================================================================

#[test]
fn test_light_layer_references() {
    let mut scene = scene_with_layer();
    let light = scene.add_light(Light::new("lamp", LightType::Point));

    assert!(scene.add_light_to_layer(LayerId(0), light));
    assert!(scene.add_light_to_layer(LayerId(0), light));
    let layer = scene.composition().layer(LayerId(0)).unwrap();
    assert_eq!(layer.lights(), &[light]);
    assert_eq!(layer.lights_of_type(LightType::Point), &[light]);

    let removed = scene.remove_light(light).unwrap();
    assert_eq!(removed.name(), "lamp");
    assert!(!scene.composition().layer(LayerId(0)).unwrap().has_light(light));
    assert!(!scene.add_light_to_layer(LayerId(0), light));
}

#[test]
fn test_cameras_are_ordered_and_unique() {
    let mut scene = Scene::new();
    let a = scene.add_camera(Camera::new("a"));
    let b = scene.add_camera(Camera::new("b"));
    scene.composition_mut().add_camera(a);

    assert_eq!(scene.composition().cameras(), &[a, b]);

    scene.remove_camera(a);
    assert_eq!(scene.composition().cameras(), &[b]);
    assert!(scene.camera(a).is_none());
    assert_eq!(scene.camera(b).unwrap().name(), "b");
}

#[test]
fn test_remove_camera_drops_its_cascade_data() {
    let mut scene = Scene::new();
    let kept = scene.add_camera(Camera::new("kept"));
    let gone = scene.add_camera(Camera::new("gone"));
    let sun = scene.add_light(Light::new("sun", LightType::Directional));
    let light = scene.light_mut(sun).unwrap();
    light.render_data_mut(Some(kept), 0);
    light.render_data_mut(Some(gone), 0);
    light.render_data_mut(Some(gone), 1);

    scene.remove_camera(gone);

    let light = scene.light(sun).unwrap();
    assert!(light.render_data(Some(kept), 0).is_some());
    assert!(light.render_data(Some(gone), 0).is_none());
    assert!(light.render_data(Some(gone), 1).is_none());
}

#[test]
fn test_material_access() {
    let mut scene = Scene::new();
    let material = Material::new("stone", vec![("roughness".to_string(), ParamValue::Float(0.5))]).unwrap();
    let key = scene.add_material(material);

    scene.material_mut(key).unwrap().set_param("roughness", ParamValue::Float(0.9)).unwrap();
    assert_eq!(scene.material(key).unwrap().param("roughness"), Some(&ParamValue::Float(0.9)));
    assert_ne!(key, scene.default_material());
}

#[test]
fn test_sub_layers_list_each_layer_twice() {
    let mut scene = Scene::new();
    scene.add_layer(Layer::new(LayerId(0), "world"));
    scene.add_layer(Layer::new(LayerId(1), "ui"));

    let subs = scene.composition().sub_layers();
    assert_eq!(subs.len(), 4);
    assert_eq!(subs[0], SubLayer { layer: LayerId(0), transparent: false });
    assert_eq!(subs[1], SubLayer { layer: LayerId(0), transparent: true });
    assert_eq!(subs[3], SubLayer { layer: LayerId(1), transparent: true });
}
