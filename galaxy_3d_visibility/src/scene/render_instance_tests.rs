use std::sync::Arc;
use glam::{Mat4, Vec3};
use slotmap::KeyData;
use crate::camera::AABB;
use crate::graphics_device::{BufferHandle, Primitive, PrimitiveTopology, IndexType};
use super::*;

fn unit_mesh() -> Arc<Mesh> {
    Arc::new(Mesh::new(
        7,
        BufferHandle::from(KeyData::from_ffi(1)),
        None,
        Primitive { topology: PrimitiveTopology::TriangleList, base: 0, count: 36, index_type: Some(IndexType::U16) },
        AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
    ))
}

// ============================================================================
// Flags
// ============================================================================

#[test]
fn test_default_flags() {
    let instance = RenderInstance::new(unit_mesh(), Mat4::IDENTITY);
    assert!(instance.is_visible());
    assert!(instance.flags().contains(InstanceFlags::CULL));
    assert!(!instance.casts_shadow());
    assert!(!instance.is_transparent());
    assert!(!instance.visible_this_frame);
}

#[test]
fn test_set_flag_preserves_others() {
    let mut instance = RenderInstance::new(unit_mesh(), Mat4::IDENTITY);
    instance.set_flag(InstanceFlags::CAST_SHADOW, true);
    instance.set_flag(InstanceFlags::VISIBLE, false);

    assert!(instance.casts_shadow());
    assert!(!instance.is_visible());
    assert!(instance.flags().contains(InstanceFlags::CULL));
}

#[test]
fn test_flag_bits_are_distinct() {
    let all = [
        InstanceFlags::VISIBLE, InstanceFlags::CAST_SHADOW, InstanceFlags::RECEIVE_SHADOW,
        InstanceFlags::CULL, InstanceFlags::TRANSPARENT,
    ];
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert!(!a.intersects(*b));
        }
    }
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_world_aabb_follows_world_matrix() {
    let mut instance = RenderInstance::new(unit_mesh(), Mat4::from_translation(Vec3::X * 10.0));
    assert_eq!(instance.world_aabb().min, Vec3::new(9.0, -1.0, -1.0));

    instance.set_world_matrix(Mat4::from_scale(Vec3::splat(2.0)));
    assert_eq!(instance.world_aabb().max, Vec3::splat(2.0));
}

// ============================================================================
// Auxiliary data
// ============================================================================

#[test]
fn test_needs_gpu_update() {
    let mut instance = RenderInstance::new(unit_mesh(), Mat4::IDENTITY);
    assert!(!instance.needs_gpu_update());

    instance.set_skin(Some(SkinInstance { bone_matrices: vec![Mat4::IDENTITY; 4] }));
    assert!(instance.needs_gpu_update());

    instance.set_skin(None);
    instance.set_splat(Some(SplatInstance { splat_count: 100 }));
    assert!(instance.needs_gpu_update());
}

#[test]
fn test_mesh_uniforms() {
    let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let instance = RenderInstance::new(unit_mesh(), world);
    let block = instance.mesh_uniforms();

    assert_eq!(block.world, world.to_cols_array_2d());
    assert_eq!(std::mem::size_of::<MeshUniformBlock>(), 128);
}

#[test]
fn test_mesh_accessors() {
    let mesh = unit_mesh();
    assert_eq!(mesh.id(), 7);
    assert!(mesh.index_buffer().is_none());
    assert_eq!(mesh.primitive().count, 36);
}
