/// Shared shadow atlas of clustered local lights.
///
/// The atlas is one square render target split into a grid of square slots.
/// Every frame the visible shadow-casting local lights are ranked by screen
/// size and handed a slot; a light keeping the slot it had last frame (same
/// atlas version, same owner) does not need its shadow re-rendered. Point
/// lights lay their six faces out as a 3x2 tile block inside their slot.

use glam::Vec4;
use slotmap::SlotMap;
use crate::config::RendererConfig;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::scene::{Light, LightKey, LightType};
use super::shadow_map::ShadowMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasSlot {
    /// Normalized rect (x, y, width, height) inside the atlas
    pub rect: Vec4,
    /// Light that held the slot last
    pub owner: Option<LightKey>,
    used: bool,
}

impl AtlasSlot {
    fn new(rect: Vec4) -> Self {
        Self { rect, owner: None, used: false }
    }

    /// Slot taken this frame
    pub fn is_used(&self) -> bool { self.used }
}

/// Normalized rect of a face of a light inside its slot
pub fn face_rect(light_type: LightType, slot: Vec4, face: u32) -> Vec4 {
    match light_type {
        LightType::Point => {
            let size = slot.z / 3.0;
            let column = (face % 3) as f32;
            let row = (face / 3) as f32;
            Vec4::new(slot.x + column * size, slot.y + row * size, size, size)
        }
        _ => slot,
    }
}

#[derive(Default)]
pub struct ShadowAtlas {
    shadow_map: Option<ShadowMap>,
    resolution: u32,
    /// Slots per edge
    split: u32,
    slots: Vec<AtlasSlot>,
    version: u32,
    candidates: Vec<LightKey>,
}

impl ShadowAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shadow_map(&self) -> Option<&ShadowMap> { self.shadow_map.as_ref() }
    pub fn resolution(&self) -> u32 { self.resolution }
    pub fn split(&self) -> u32 { self.split }
    pub fn slots(&self) -> &[AtlasSlot] { &self.slots }

    /// Bumped whenever existing slot assignments become invalid
    pub fn version(&self) -> u32 { self.version }

    /// Assign atlas slots to the visible shadow-casting lights of `local`
    pub fn update(
        &mut self,
        device: &mut dyn GraphicsDevice,
        lights: &mut SlotMap<LightKey, Light>,
        local: &[LightKey],
        config: &RendererConfig,
    ) -> Result<()> {
        self.allocate(device, config.shadow_atlas_resolution)?;

        self.candidates.clear();
        for &key in local {
            let Some(light) = lights.get_mut(key) else { continue };
            light.atlas_allocated = false;
            light.atlas_slot_updated = false;
            if light.enabled() && light.visible_this_frame && light.cast_shadows() {
                self.candidates.push(key);
            }
        }
        self.candidates.sort_by(|&a, &b| {
            lights[b].max_screen_size.total_cmp(&lights[a].max_screen_size)
        });

        let split = config.shadow_atlas_split
            .unwrap_or_else(|| (self.candidates.len() as f32).sqrt().ceil() as u32)
            .max(1);
        self.subdivide(split);

        let count = self.candidates.len().min(self.slots.len());
        if count < self.candidates.len() {
            crate::engine_debug!("galaxy3d::ShadowAtlas",
                "{} shadow casting lights, only {} atlas slots", self.candidates.len(), self.slots.len());
        }
        for slot in &mut self.slots {
            slot.used = false;
        }

        // Lights keeping last frame's slot
        for &key in &self.candidates[..count] {
            let light = &mut lights[key];
            let Some(index) = light.atlas_slot else { continue };
            if light.atlas_version != self.version {
                continue;
            }
            let Some(slot) = self.slots.get_mut(index) else { continue };
            if slot.owner == Some(key) && !slot.used {
                slot.used = true;
                light.atlas_allocated = true;
            }
        }

        let mut next_free = 0usize;
        for &key in &self.candidates[..count] {
            let light = &mut lights[key];
            if !light.atlas_allocated {
                while self.slots[next_free].used {
                    next_free += 1;
                }
                let slot = &mut self.slots[next_free];
                slot.used = true;
                slot.owner = Some(key);
                light.atlas_slot = Some(next_free);
                light.atlas_version = self.version;
                light.atlas_allocated = true;
                light.atlas_slot_updated = true;
            }

            let Some(index) = light.atlas_slot else { continue };
            let rect = self.slots[index].rect;
            Self::setup_slot(light, rect);
        }
        Ok(())
    }

    /// (Re)create the atlas target when the resolution changes
    fn allocate(&mut self, device: &mut dyn GraphicsDevice, resolution: u32) -> Result<()> {
        if self.shadow_map.is_some() && self.resolution == resolution {
            return Ok(());
        }
        if let Some(map) = self.shadow_map.take() {
            map.destroy(device);
        }
        let hardware_depth = device.capabilities().supports_depth_shadow;
        self.shadow_map = Some(ShadowMap::create_atlas(device, resolution, hardware_depth)?);
        self.resolution = resolution;
        self.version += 1;
        crate::engine_debug!("galaxy3d::ShadowAtlas",
            "Allocated {}x{} shadow atlas (version {})", resolution, resolution, self.version);
        Ok(())
    }

    /// Rebuild the slot grid when the split changes
    fn subdivide(&mut self, split: u32) {
        if split == self.split && !self.slots.is_empty() {
            return;
        }
        let size = 1.0 / split as f32;
        self.slots.clear();
        for y in 0..split {
            for x in 0..split {
                let rect = Vec4::new(x as f32 * size, y as f32 * size, size, size);
                self.slots.push(AtlasSlot::new(rect));
            }
        }
        self.split = split;
        self.version += 1;
    }

    /// Point the shadow cameras of every face of `light` at its slot
    fn setup_slot(light: &mut Light, rect: Vec4) {
        light.atlas_viewport = rect;
        let light_type = light.light_type();
        for face in 0..light.shadow_face_count() {
            let face_rect = face_rect(light_type, rect, face);
            let camera = &mut light.render_data_mut(None, face).shadow_camera;
            camera.set_rect(face_rect);
            camera.set_scissor_rect(face_rect);
        }
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(map) = self.shadow_map.take() {
            map.destroy(device);
        }
        self.slots.clear();
        self.split = 0;
        self.resolution = 0;
    }
}

#[cfg(test)]
#[path = "atlas_tests.rs"]
mod tests;
