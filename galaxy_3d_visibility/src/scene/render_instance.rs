/// Render instances: the drawable units culled and drawn every frame.
///
/// An instance references a shared `Mesh` (GPU buffers, primitive, local
/// bounds) and an optional material. Culling reads its flags and bounds and
/// writes `visible_this_frame`; shadow passes write its `shadow_key`.

use std::sync::Arc;
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use slotmap::new_key_type;
use crate::camera::AABB;
use crate::graphics_device::{BufferHandle, Primitive};
use crate::material::MaterialKey;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a RenderInstance within a Scene.
    ///
    /// Keys remain valid even after other instances are removed.
    pub struct RenderInstanceKey;
}

// ===== FLAGS =====

bitflags! {
    /// Render instance flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InstanceFlags: u32 {
        /// Instance is drawn at all
        const VISIBLE        = 1 << 0;
        /// Instance is drawn into shadow maps
        const CAST_SHADOW    = 1 << 1;
        /// Instance samples shadow maps
        const RECEIVE_SHADOW = 1 << 2;
        /// Instance is tested against camera frustums (otherwise always kept)
        const CULL           = 1 << 3;
        /// Instance goes to the transparent bucket
        const TRANSPARENT    = 1 << 4;
    }
}

impl Default for InstanceFlags {
    fn default() -> Self {
        InstanceFlags::VISIBLE | InstanceFlags::CULL
    }
}

// ===== MESH =====

/// GPU geometry shared by instances
#[derive(Debug, Clone)]
pub struct Mesh {
    id: u32,
    vertex_buffer: BufferHandle,
    index_buffer: Option<BufferHandle>,
    primitive: Primitive,
    /// Local-space bounds
    bounding_box: AABB,
}

impl Mesh {
    pub fn new(
        id: u32,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        primitive: Primitive,
        bounding_box: AABB,
    ) -> Self {
        Self { id, vertex_buffer, index_buffer, primitive, bounding_box }
    }

    /// Identifier used as secondary shadow sort key
    pub fn id(&self) -> u32 { self.id }
    pub fn vertex_buffer(&self) -> BufferHandle { self.vertex_buffer }
    pub fn index_buffer(&self) -> Option<BufferHandle> { self.index_buffer }
    pub fn primitive(&self) -> &Primitive { &self.primitive }
    pub fn bounding_box(&self) -> &AABB { &self.bounding_box }
}

// ===== AUXILIARY DATA =====

/// Skinning palette, refreshed by the GPU update stage
#[derive(Debug, Clone, Default)]
pub struct SkinInstance {
    pub bone_matrices: Vec<Mat4>,
}

/// Morph target weights
#[derive(Debug, Clone, Default)]
pub struct MorphInstance {
    pub weights: Vec<f32>,
}

/// Gaussian splat data needing a per-frame sort
#[derive(Debug, Clone, Default)]
pub struct SplatInstance {
    pub splat_count: u32,
}

/// Per-mesh uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshUniformBlock {
    pub world: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

// ===== RENDER INSTANCE =====

pub struct RenderInstance {
    mesh: Arc<Mesh>,
    material: Option<MaterialKey>,
    /// World transform (pre-computed by the caller)
    world_matrix: Mat4,
    /// World-space bounds, kept in sync with `world_matrix`
    world_aabb: AABB,
    flags: InstanceFlags,
    /// Explicit draw order (0 = unordered)
    draw_order: i32,
    /// Opaque/forward sort key
    pub forward_key: u32,
    /// Shadow pass sort key (shader identity of the last shadow draw)
    pub shadow_key: u32,
    /// Set by culling when a camera or shadow camera sees the instance
    pub visible_this_frame: bool,
    /// Camera-space depths computed by draw sorting
    pub(crate) zdist: f32,
    pub(crate) zdist2: f32,
    skin: Option<SkinInstance>,
    morph: Option<MorphInstance>,
    splat: Option<SplatInstance>,
}

impl RenderInstance {
    pub fn new(mesh: Arc<Mesh>, world_matrix: Mat4) -> Self {
        let world_aabb = mesh.bounding_box().transformed(&world_matrix);
        Self {
            mesh,
            material: None,
            world_matrix,
            world_aabb,
            flags: InstanceFlags::default(),
            draw_order: 0,
            forward_key: 0,
            shadow_key: 0,
            visible_this_frame: false,
            zdist: 0.0,
            zdist2: 0.0,
            skin: None,
            morph: None,
            splat: None,
        }
    }

    // ===== ACCESSORS =====

    pub fn mesh(&self) -> &Arc<Mesh> { &self.mesh }
    pub fn material(&self) -> Option<MaterialKey> { self.material }
    pub fn world_matrix(&self) -> &Mat4 { &self.world_matrix }
    pub fn world_aabb(&self) -> &AABB { &self.world_aabb }
    pub fn flags(&self) -> InstanceFlags { self.flags }
    pub fn draw_order(&self) -> i32 { self.draw_order }
    pub fn skin(&self) -> Option<&SkinInstance> { self.skin.as_ref() }
    pub fn morph(&self) -> Option<&MorphInstance> { self.morph.as_ref() }
    pub fn splat(&self) -> Option<&SplatInstance> { self.splat.as_ref() }

    pub fn is_visible(&self) -> bool { self.flags.contains(InstanceFlags::VISIBLE) }
    pub fn casts_shadow(&self) -> bool { self.flags.contains(InstanceFlags::CAST_SHADOW) }
    pub fn is_transparent(&self) -> bool { self.flags.contains(InstanceFlags::TRANSPARENT) }

    /// Instance needs the per-frame GPU update stage (skinning, morphing, splat sort)
    pub fn needs_gpu_update(&self) -> bool {
        self.skin.is_some() || self.morph.is_some() || self.splat.is_some()
    }

    // ===== SETTERS =====

    pub fn set_world_matrix(&mut self, matrix: Mat4) {
        self.world_matrix = matrix;
        self.world_aabb = self.mesh.bounding_box().transformed(&matrix);
    }

    pub fn set_material(&mut self, material: Option<MaterialKey>) { self.material = material; }
    pub fn set_flags(&mut self, flags: InstanceFlags) { self.flags = flags; }
    pub fn set_draw_order(&mut self, order: i32) { self.draw_order = order; }
    pub fn set_skin(&mut self, skin: Option<SkinInstance>) { self.skin = skin; }
    pub fn set_morph(&mut self, morph: Option<MorphInstance>) { self.morph = morph; }
    pub fn set_splat(&mut self, splat: Option<SplatInstance>) { self.splat = splat; }

    pub fn set_flag(&mut self, flag: InstanceFlags, enabled: bool) {
        self.flags.set(flag, enabled);
    }

    /// Per-mesh uniform data (world matrix and its normal matrix)
    pub fn mesh_uniforms(&self) -> MeshUniformBlock {
        let normal = self.world_matrix.inverse().transpose();
        MeshUniformBlock {
            world: self.world_matrix.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
#[path = "render_instance_tests.rs"]
mod tests;
