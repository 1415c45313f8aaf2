/// Pool of temporary render targets lent to shadow post-processing.
///
/// Targets are matched by size and color format and reused across frames.
/// A light holds at most one borrowed target at a time.

use rustc_hash::FxHashMap;
use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, RenderTargetDesc, RenderTargetHandle, TextureFormat};
use crate::scene::LightKey;

type PoolKey = (u32, u32, Option<TextureFormat>);

#[derive(Default)]
pub struct RenderTargetCache {
    free: FxHashMap<PoolKey, Vec<RenderTargetHandle>>,
    borrowed: FxHashMap<LightKey, (PoolKey, RenderTargetHandle)>,
    created: u32,
}

impl RenderTargetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lend a `width` x `height` single-slice target to `owner`
    pub fn borrow(
        &mut self,
        device: &mut dyn GraphicsDevice,
        owner: LightKey,
        name: &str,
        width: u32,
        height: u32,
        color_format: Option<TextureFormat>,
    ) -> Result<RenderTargetHandle> {
        if self.borrowed.contains_key(&owner) {
            engine_bail!(InvariantViolation => "galaxy3d::RenderTargetCache",
                "'{}' already holds a temporary render target", name);
        }

        let key = (width, height, color_format);
        let target = match self.free.get_mut(&key).and_then(|pool| pool.pop()) {
            Some(target) => target,
            None => {
                let desc = RenderTargetDesc {
                    name: name.to_string(),
                    width,
                    height,
                    layers: 1,
                    cubemap: false,
                    color_format,
                    depth: false,
                    depth_compare: false,
                };
                self.created += 1;
                device.create_render_target(&desc)?
            }
        };
        self.borrowed.insert(owner, (key, target));
        Ok(target)
    }

    /// Give back the target borrowed by `owner` (no-op if none)
    pub fn release(&mut self, owner: LightKey) {
        if let Some((key, target)) = self.borrowed.remove(&owner) {
            self.free.entry(key).or_default().push(target);
        }
    }

    pub fn borrowed_count(&self) -> usize {
        self.borrowed.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Targets created since the cache was built
    pub fn created_count(&self) -> u32 {
        self.created
    }

    /// Destroy every pooled and borrowed target
    pub fn clear(&mut self, device: &mut dyn GraphicsDevice) {
        for (_, pool) in self.free.drain() {
            for target in pool {
                device.destroy_render_target(target);
            }
        }
        for (_, (_, target)) in self.borrowed.drain() {
            device.destroy_render_target(target);
        }
    }
}

#[cfg(test)]
#[path = "render_target_cache_tests.rs"]
mod tests;
