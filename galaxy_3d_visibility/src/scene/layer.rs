/// Layers and the layer composition.
///
/// A layer is an ordered list of instances plus the lights affecting them.
/// The composition lists every layer twice in its sub-layer order (opaque
/// then transparent pass) and holds the ordered active camera list.

use rustc_hash::{FxHashMap, FxHashSet};
use crate::graphics_device::RenderTargetHandle;
use crate::visibility::{CulledInstances, SortMode};
use super::light::{LightKey, LightType};
use super::render_instance::RenderInstanceKey;
use super::scene::CameraKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u32);

pub struct Layer {
    id: LayerId,
    name: String,
    enabled: bool,
    instances: Vec<RenderInstanceKey>,
    lights: Vec<LightKey>,
    light_set: FxHashSet<LightKey>,
    /// Lights split by type: directional, point, spot
    split_lights: [Vec<LightKey>; 3],
    /// Overrides the camera's render target
    render_target: Option<RenderTargetHandle>,
    pub opaque_sort_mode: SortMode,
    pub transparent_sort_mode: SortMode,
    culled: FxHashMap<CameraKey, CulledInstances>,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            instances: Vec::new(),
            lights: Vec::new(),
            light_set: FxHashSet::default(),
            split_lights: [Vec::new(), Vec::new(), Vec::new()],
            render_target: None,
            opaque_sort_mode: SortMode::Material,
            transparent_sort_mode: SortMode::BackToFront,
            culled: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> LayerId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn enabled(&self) -> bool { self.enabled }
    pub fn set_enabled(&mut self, enabled: bool) { self.enabled = enabled; }
    pub fn render_target(&self) -> Option<RenderTargetHandle> { self.render_target }
    pub fn set_render_target(&mut self, target: Option<RenderTargetHandle>) { self.render_target = target; }

    // ===== INSTANCES =====

    pub fn instances(&self) -> &[RenderInstanceKey] { &self.instances }

    /// Append an instance (ignored if already present)
    pub fn add_instance(&mut self, key: RenderInstanceKey) {
        if !self.instances.contains(&key) {
            self.instances.push(key);
        }
    }

    pub fn remove_instance(&mut self, key: RenderInstanceKey) {
        self.instances.retain(|&k| k != key);
    }

    // ===== LIGHTS =====

    /// Lights in insertion order
    pub fn lights(&self) -> &[LightKey] { &self.lights }

    pub fn has_light(&self, key: LightKey) -> bool {
        self.light_set.contains(&key)
    }

    /// Lights of one type, in insertion order
    pub fn lights_of_type(&self, light_type: LightType) -> &[LightKey] {
        &self.split_lights[light_type.index() as usize]
    }

    /// Reference a light (ignored if already referenced)
    pub fn add_light(&mut self, key: LightKey, light_type: LightType) {
        if self.light_set.insert(key) {
            self.lights.push(key);
            self.split_lights[light_type.index() as usize].push(key);
        }
    }

    pub fn remove_light(&mut self, key: LightKey) {
        if self.light_set.remove(&key) {
            self.lights.retain(|&k| k != key);
            for list in &mut self.split_lights {
                list.retain(|&k| k != key);
            }
        }
    }

    // ===== CULLING OUTPUT =====

    /// Culled instances for `camera` from the last culling pass
    pub fn culled_instances(&self, camera: CameraKey) -> Option<&CulledInstances> {
        self.culled.get(&camera)
    }

    pub(crate) fn culled_instances_mut(&mut self, camera: CameraKey) -> &mut CulledInstances {
        self.culled.entry(camera).or_default()
    }

    /// Instance list and the culling output of `camera`, borrowed together
    pub(crate) fn instances_and_culled_mut(
        &mut self,
        camera: CameraKey,
    ) -> (&[RenderInstanceKey], &mut CulledInstances) {
        (&self.instances, self.culled.entry(camera).or_default())
    }
}

/// One pass over a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubLayer {
    pub layer: LayerId,
    pub transparent: bool,
}

/// Ordered layers, sub-layers and active cameras
#[derive(Default)]
pub struct LayerComposition {
    layers: Vec<Layer>,
    sub_layers: Vec<SubLayer>,
    cameras: Vec<CameraKey>,
}

impl LayerComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer with its opaque and transparent sub-layers
    pub fn push_layer(&mut self, layer: Layer) {
        let id = layer.id();
        self.layers.push(layer);
        self.sub_layers.push(SubLayer { layer: id, transparent: false });
        self.sub_layers.push(SubLayer { layer: id, transparent: true });
    }

    pub fn layers(&self) -> &[Layer] { &self.layers }
    pub fn layers_mut(&mut self) -> &mut [Layer] { &mut self.layers }
    pub fn sub_layers(&self) -> &[SubLayer] { &self.sub_layers }
    pub fn cameras(&self) -> &[CameraKey] { &self.cameras }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    /// Append a camera (ignored if already present)
    pub fn add_camera(&mut self, camera: CameraKey) {
        if !self.cameras.contains(&camera) {
            self.cameras.push(camera);
        }
    }

    pub fn remove_camera(&mut self, camera: CameraKey) {
        self.cameras.retain(|&c| c != camera);
    }
}
