/// Scene: instances, lights, cameras and materials behind stable keys.
///
/// Uses SlotMaps for O(1) insert/remove. The layer composition references
/// these objects by key; fields are crate-visible so frame passes can borrow
/// the maps independently (e.g. lights mutably while reading cameras).

use std::sync::Arc;
use glam::Mat4;
use slotmap::{new_key_type, SlotMap};
use crate::camera::Camera;
use crate::material::{Material, MaterialKey};
use super::layer::{Layer, LayerComposition, LayerId};
use super::light::{Light, LightKey};
use super::render_instance::{Mesh, RenderInstance, RenderInstanceKey};

new_key_type! {
    /// Stable key for a Camera within a Scene
    pub struct CameraKey;
}

pub struct Scene {
    pub(crate) instances: SlotMap<RenderInstanceKey, RenderInstance>,
    pub(crate) lights: SlotMap<LightKey, Light>,
    pub(crate) cameras: SlotMap<CameraKey, Camera>,
    pub(crate) materials: SlotMap<MaterialKey, Material>,
    /// Used by instances without a material
    pub(crate) default_material: MaterialKey,
    pub(crate) composition: LayerComposition,
}

impl Scene {
    pub fn new() -> Self {
        let mut materials = SlotMap::with_key();
        let default_material = materials.insert(Material::default());
        Self {
            instances: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            materials,
            default_material,
            composition: LayerComposition::new(),
        }
    }

    // ===== INSTANCES =====

    pub fn create_render_instance(&mut self, mesh: Arc<Mesh>, world_matrix: Mat4) -> RenderInstanceKey {
        self.instances.insert(RenderInstance::new(mesh, world_matrix))
    }

    pub fn render_instance(&self, key: RenderInstanceKey) -> Option<&RenderInstance> {
        self.instances.get(key)
    }

    pub fn render_instance_mut(&mut self, key: RenderInstanceKey) -> Option<&mut RenderInstance> {
        self.instances.get_mut(key)
    }

    /// Remove an instance and its layer references. Returns false if the key is invalid.
    pub fn remove_render_instance(&mut self, key: RenderInstanceKey) -> bool {
        if self.instances.remove(key).is_none() {
            return false;
        }
        for layer in self.composition.layers_mut() {
            layer.remove_instance(key);
        }
        true
    }

    /// Set the world matrix of a render instance. Returns false if key is invalid.
    pub fn set_world_matrix(&mut self, key: RenderInstanceKey, matrix: Mat4) -> bool {
        match self.instances.get_mut(key) {
            Some(instance) => {
                instance.set_world_matrix(matrix);
                true
            }
            None => false,
        }
    }

    pub fn render_instances(&self) -> impl Iterator<Item = (RenderInstanceKey, &RenderInstance)> {
        self.instances.iter()
    }

    pub fn render_instance_count(&self) -> usize {
        self.instances.len()
    }

    // ===== LIGHTS =====

    pub fn add_light(&mut self, light: Light) -> LightKey {
        self.lights.insert(light)
    }

    pub fn light(&self, key: LightKey) -> Option<&Light> {
        self.lights.get(key)
    }

    pub fn light_mut(&mut self, key: LightKey) -> Option<&mut Light> {
        self.lights.get_mut(key)
    }

    /// Remove a light and its layer references
    pub fn remove_light(&mut self, key: LightKey) -> Option<Light> {
        let light = self.lights.remove(key)?;
        for layer in self.composition.layers_mut() {
            layer.remove_light(key);
        }
        Some(light)
    }

    // ===== CAMERAS =====

    /// Add a camera and append it to the active camera list
    pub fn add_camera(&mut self, camera: Camera) -> CameraKey {
        let key = self.cameras.insert(camera);
        self.composition.add_camera(key);
        key
    }

    pub fn camera(&self, key: CameraKey) -> Option<&Camera> {
        self.cameras.get(key)
    }

    pub fn camera_mut(&mut self, key: CameraKey) -> Option<&mut Camera> {
        self.cameras.get_mut(key)
    }

    /// Remove a camera and the directional shadow data lights keep for it
    pub fn remove_camera(&mut self, key: CameraKey) -> Option<Camera> {
        self.composition.remove_camera(key);
        for light in self.lights.values_mut() {
            light.forget_camera(key);
        }
        self.cameras.remove(key)
    }

    // ===== MATERIALS =====

    pub fn add_material(&mut self, material: Material) -> MaterialKey {
        self.materials.insert(material)
    }

    pub fn material(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }

    pub fn material_mut(&mut self, key: MaterialKey) -> Option<&mut Material> {
        self.materials.get_mut(key)
    }

    pub fn default_material(&self) -> MaterialKey {
        self.default_material
    }

    // ===== LAYERS =====

    pub fn composition(&self) -> &LayerComposition {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut LayerComposition {
        &mut self.composition
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.composition.push_layer(layer);
    }

    /// Append an instance to a layer. Returns false if either is unknown.
    pub fn add_instance_to_layer(&mut self, layer: LayerId, key: RenderInstanceKey) -> bool {
        if !self.instances.contains_key(key) {
            return false;
        }
        match self.composition.layer_mut(layer) {
            Some(layer) => {
                layer.add_instance(key);
                true
            }
            None => false,
        }
    }

    /// Reference a light from a layer. Returns false if either is unknown.
    pub fn add_light_to_layer(&mut self, layer: LayerId, key: LightKey) -> bool {
        let Some(light_type) = self.lights.get(key).map(|l| l.light_type()) else {
            return false;
        };
        match self.composition.layer_mut(layer) {
            Some(layer) => {
                layer.add_light(key, light_type);
                true
            }
            None => false,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
