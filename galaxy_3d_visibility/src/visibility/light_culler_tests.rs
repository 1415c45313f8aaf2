use glam::Vec3;
use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::scene::{Layer, Scene};
use crate::shadow::ShadowMap;
use crate::test_support::{camera_at, point_light};

fn two_layer_scene() -> (Scene, LightKey, LightKey, LightKey) {
    let mut scene = Scene::new();
    scene.add_layer(Layer::new(LayerId(0), "world"));
    scene.add_layer(Layer::new(LayerId(1), "fx"));

    let sun = scene.add_light(Light::new("sun", LightType::Directional));
    let lamp = scene.add_light(point_light("lamp", Vec3::ZERO, 5.0));
    let mut baked = Light::new("baked", LightType::Spot);
    baked.set_mask(LightMask::BAKE);
    let baked = scene.add_light(baked);

    for layer in [LayerId(0), LayerId(1)] {
        scene.add_light_to_layer(layer, sun);
        scene.add_light_to_layer(layer, lamp);
    }
    scene.add_light_to_layer(LayerId(1), baked);
    (scene, sun, lamp, baked)
}

// ============================================================================
// collect_lights
// ============================================================================

#[test]
fn test_collect_lights_has_no_duplicates() {
    let (scene, sun, lamp, baked) = two_layer_scene();
    let mut seen_layers = FxHashSet::default();
    let mut seen_lights = FxHashSet::default();

    let collected = collect_lights(scene.composition(), &scene.lights, &mut seen_layers, &mut seen_lights);

    assert_eq!(collected.all, vec![sun, lamp, baked]);
    assert_eq!(collected.local, vec![lamp, baked]);
    assert_eq!(collected.dynamic_count, 2);
    assert_eq!(collected.baked_count, 1);
    assert_eq!(seen_layers.len(), 2);
}

#[test]
fn test_collect_lights_includes_disabled_lights() {
    let (mut scene, sun, _, _) = two_layer_scene();
    scene.light_mut(sun).unwrap().set_enabled(false);

    let collected = collect_lights(
        scene.composition(), &scene.lights, &mut FxHashSet::default(), &mut FxHashSet::default());
    assert!(collected.all.contains(&sun));
}

#[test]
fn test_collect_lights_empty_composition() {
    let scene = Scene::new();
    let collected = collect_lights(
        scene.composition(), &scene.lights, &mut FxHashSet::default(), &mut FxHashSet::default());
    assert_eq!(collected, CollectedLights::default());
}

// ============================================================================
// cull_lights
// ============================================================================

#[test]
fn test_local_light_in_view_is_visible() {
    let camera = camera_at(Vec3::ZERO);
    let (mut scene, _, lamp, _) = two_layer_scene();
    scene.light_mut(lamp).unwrap().set_position(Vec3::new(0.0, 0.0, -10.0));
    let config = RendererConfig { physical_units: true, ..RendererConfig::default() };

    cull_lights(&camera, &mut scene.lights, &[lamp], &config);

    let light = scene.light(lamp).unwrap();
    assert!(light.visible_this_frame);
    assert!(light.use_physical_units);
    assert!(light.max_screen_size > 0.0 && light.max_screen_size <= 1.0);
}

#[test]
fn test_max_screen_size_keeps_largest() {
    let near = camera_at(Vec3::new(0.0, 0.0, -2.0));
    let far = camera_at(Vec3::new(0.0, 0.0, 30.0));
    let (mut scene, _, lamp, _) = two_layer_scene();
    scene.light_mut(lamp).unwrap().set_position(Vec3::new(0.0, 0.0, -10.0));
    let config = RendererConfig::default();

    cull_lights(&near, &mut scene.lights, &[lamp], &config);
    let size = scene.light(lamp).unwrap().max_screen_size;
    cull_lights(&far, &mut scene.lights, &[lamp], &config);

    assert_eq!(scene.light(lamp).unwrap().max_screen_size, size);
}

#[test]
fn test_shadow_caster_without_map_is_forced_visible() {
    let camera = camera_at(Vec3::ZERO);
    let (mut scene, _, lamp, _) = two_layer_scene();
    scene.light_mut(lamp).unwrap().set_position(Vec3::new(0.0, 0.0, 50.0));

    cull_lights(&camera, &mut scene.lights, &[lamp], &RendererConfig::default());
    let light = scene.light(lamp).unwrap();
    assert!(light.visible_this_frame);
    assert_eq!(light.max_screen_size, 0.0);
}

#[test]
fn test_out_of_view_light_with_map_stays_invisible() {
    let camera = camera_at(Vec3::ZERO);
    let mut device = MockGraphicsDevice::new();
    let (mut scene, _, lamp, _) = two_layer_scene();
    {
        let light = scene.light_mut(lamp).unwrap();
        light.set_position(Vec3::new(0.0, 0.0, 50.0));
        light.shadow_map = Some(ShadowMap::create(&mut device, "lamp", light.kind(), 64, false).unwrap());
    }

    cull_lights(&camera, &mut scene.lights, &[lamp], &RendererConfig::default());
    assert!(!scene.light(lamp).unwrap().visible_this_frame);
}

#[test]
fn test_clustered_lighting_never_forces_visibility() {
    let camera = camera_at(Vec3::ZERO);
    let (mut scene, _, lamp, _) = two_layer_scene();
    scene.light_mut(lamp).unwrap().set_position(Vec3::new(0.0, 0.0, 50.0));
    let config = RendererConfig { clustered_lighting: true, ..RendererConfig::default() };

    cull_lights(&camera, &mut scene.lights, &[lamp], &config);
    assert!(!scene.light(lamp).unwrap().visible_this_frame);
}

#[test]
fn test_directional_and_disabled_lights() {
    let camera = camera_at(Vec3::ZERO);
    let (mut scene, sun, lamp, _) = two_layer_scene();
    scene.light_mut(lamp).unwrap().set_enabled(false);
    scene.light_mut(lamp).unwrap().set_position(Vec3::new(0.0, 0.0, -10.0));
    let config = RendererConfig { physical_units: true, ..RendererConfig::default() };

    cull_lights(&camera, &mut scene.lights, &[sun, lamp], &config);

    assert!(scene.light(sun).unwrap().use_physical_units);
    // Directional visibility is owned by frame begin, not by culling
    assert!(!scene.light(sun).unwrap().visible_this_frame);
    assert!(!scene.light(lamp).unwrap().visible_this_frame);
}
