use slotmap::SlotMap;
use super::*;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::scene::{Light, LightType};

fn two_lights() -> (LightKey, LightKey) {
    let mut lights: SlotMap<LightKey, Light> = SlotMap::with_key();
    let a = lights.insert(Light::new("a", LightType::Spot));
    let b = lights.insert(Light::new("b", LightType::Spot));
    (a, b)
}

#[test]
fn test_released_target_is_reused() {
    let mut device = MockGraphicsDevice::new();
    let mut cache = RenderTargetCache::new();
    let (a, b) = two_lights();
    let format = Some(TextureFormat::Rgba16Float);

    let first = cache.borrow(&mut device, a, "a_tmp", 64, 64, format).unwrap();
    cache.release(a);
    let second = cache.borrow(&mut device, b, "b_tmp", 64, 64, format).unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.created_count(), 1);
    assert_eq!(cache.borrowed_count(), 1);
}

#[test]
fn test_pool_is_keyed_by_size_and_format() {
    let mut device = MockGraphicsDevice::new();
    let mut cache = RenderTargetCache::new();
    let (a, _) = two_lights();

    let first = cache.borrow(&mut device, a, "tmp", 64, 64, Some(TextureFormat::Rgba8Unorm)).unwrap();
    cache.release(a);
    let second = cache.borrow(&mut device, a, "tmp", 64, 64, Some(TextureFormat::Rgba32Float)).unwrap();
    cache.release(a);
    let third = cache.borrow(&mut device, a, "tmp", 128, 128, Some(TextureFormat::Rgba8Unorm)).unwrap();

    assert_ne!(first, second);
    assert_ne!(first, third);
    assert_eq!(cache.created_count(), 3);
}

#[test]
fn test_second_borrow_by_same_light_fails() {
    let mut device = MockGraphicsDevice::new();
    let mut cache = RenderTargetCache::new();
    let (a, b) = two_lights();

    cache.borrow(&mut device, a, "a_tmp", 32, 32, None).unwrap();
    let err = cache.borrow(&mut device, a, "a_tmp", 32, 32, None).unwrap_err();
    assert!(matches!(err, Error::InvariantViolation(_)));

    // Other lights are unaffected
    assert!(cache.borrow(&mut device, b, "b_tmp", 32, 32, None).is_ok());
}

#[test]
fn test_clear_destroys_everything() {
    let mut device = MockGraphicsDevice::new();
    let mut cache = RenderTargetCache::new();
    let (a, b) = two_lights();

    cache.borrow(&mut device, a, "a_tmp", 32, 32, None).unwrap();
    cache.borrow(&mut device, b, "b_tmp", 32, 32, None).unwrap();
    cache.release(b);
    cache.clear(&mut device);

    assert!(device.targets.is_empty());
    assert_eq!(cache.borrowed_count(), 0);
    assert_eq!(cache.free_count(), 0);
}
