use glam::{Mat4, Vec3};
use slotmap::SlotMap;
use super::*;
use crate::test_support::{camera_at, cube_mesh};

fn instances_at(z_values: &[f32]) -> (SlotMap<RenderInstanceKey, RenderInstance>, Vec<RenderInstanceKey>) {
    let mut instances = SlotMap::with_key();
    let keys = z_values.iter()
        .map(|&z| instances.insert(RenderInstance::new(cube_mesh(1), Mat4::from_translation(Vec3::new(0.0, 0.0, z)))))
        .collect();
    (instances, keys)
}

// ============================================================================
// Comparator
// ============================================================================

#[test]
fn test_draw_order_takes_precedence() {
    let (mut instances, keys) = instances_at(&[-1.0, -2.0]);
    instances[keys[0]].set_draw_order(5);
    instances[keys[0]].forward_key = 100;
    instances[keys[1]].set_draw_order(2);

    assert_eq!(compare_draw_calls(&instances[keys[0]], &instances[keys[1]]), Ordering::Greater);
}

#[test]
fn test_forward_key_descending() {
    let (mut instances, keys) = instances_at(&[-1.0, -2.0]);
    instances[keys[0]].forward_key = 1;
    instances[keys[1]].forward_key = 9;

    assert_eq!(compare_draw_calls(&instances[keys[0]], &instances[keys[1]]), Ordering::Greater);
    assert_eq!(compare_draw_calls(&instances[keys[1]], &instances[keys[0]]), Ordering::Less);
}

#[test]
fn test_mixed_draw_orders_sort_consistently() {
    let (mut instances, keys) = instances_at(&[-1.0, -2.0, -3.0]);
    // Unordered call with the highest forward key sits between two ordered ones
    instances[keys[0]].set_draw_order(2);
    instances[keys[1]].forward_key = 100;
    instances[keys[2]].set_draw_order(-1);

    let [a, b, c] = [&instances[keys[0]], &instances[keys[1]], &instances[keys[2]]];
    assert_eq!(compare_draw_calls(c, b), Ordering::Less);
    assert_eq!(compare_draw_calls(b, a), Ordering::Less);
    assert_eq!(compare_draw_calls(c, a), Ordering::Less);
}

#[test]
fn test_manual_sort_is_ordered_with_unordered_calls() {
    let camera = camera_at(Vec3::ZERO);
    let z_values: Vec<f32> = (0..64).map(|i| -1.0 - i as f32).collect();
    let (mut instances, mut keys) = instances_at(&z_values);
    for (i, &key) in keys.iter().enumerate() {
        let order = if i % 3 == 0 { 0 } else { (i as i32 * 7) % 11 - 5 };
        instances[key].set_draw_order(order);
        instances[key].forward_key = (i as u32 * 13) % 17;
    }

    sort_draw_calls(&mut keys, &mut instances, &camera, SortMode::Manual);

    for pair in keys.windows(2) {
        assert_ne!(compare_draw_calls(&instances[pair[0]], &instances[pair[1]]), Ordering::Greater);
    }
}

// ============================================================================
// Sort modes
// ============================================================================

#[test]
fn test_back_to_front() {
    let camera = camera_at(Vec3::ZERO);
    let (mut instances, mut keys) = instances_at(&[-2.0, -8.0, -4.0]);
    let expected = vec![keys[1], keys[2], keys[0]];

    sort_draw_calls(&mut keys, &mut instances, &camera, SortMode::BackToFront);
    assert_eq!(keys, expected);
}

#[test]
fn test_front_to_back() {
    let camera = camera_at(Vec3::ZERO);
    let (mut instances, mut keys) = instances_at(&[-2.0, -8.0, -4.0]);
    let expected = vec![keys[0], keys[2], keys[1]];

    sort_draw_calls(&mut keys, &mut instances, &camera, SortMode::FrontToBack);
    assert_eq!(keys, expected);
}

#[test]
fn test_material_mode_ignores_previous_distances() {
    let camera = camera_at(Vec3::ZERO);
    let (mut instances, mut keys) = instances_at(&[-2.0, -8.0]);
    sort_draw_calls(&mut keys, &mut instances, &camera, SortMode::BackToFront);

    instances[keys[0]].forward_key = 1;
    instances[keys[1]].forward_key = 2;
    sort_draw_calls(&mut keys, &mut instances, &camera, SortMode::Material);

    assert_eq!(instances[keys[0]].forward_key, 2);
    assert_eq!(instances[keys[0]].zdist, 0.0);
}

#[test]
fn test_none_keeps_order() {
    let camera = camera_at(Vec3::ZERO);
    let (mut instances, mut keys) = instances_at(&[-2.0, -8.0, -4.0]);
    instances[keys[2]].forward_key = 50;
    let before = keys.clone();

    sort_draw_calls(&mut keys, &mut instances, &camera, SortMode::None);
    assert_eq!(keys, before);
}
