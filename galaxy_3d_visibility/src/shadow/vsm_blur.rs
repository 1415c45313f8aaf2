/// Separable blur of variance shadow maps.
///
/// The moments are blurred horizontally into a temporary target borrowed from
/// the `RenderTargetCache`, then vertically back into the shadow map. The
/// outermost texel ring is left untouched so that clamp-to-edge sampling of
/// the map keeps reading unblurred border depth.

use glam::Vec2;
use rustc_hash::FxHashMap;
use crate::config::FrameStats;
use crate::error::Result;
use crate::graphics_device::{
    BlendState, DepthState, GraphicsDevice, Primitive, Rect2D, RenderTargetHandle,
    ShaderDesc, ShaderHandle, ShaderSource, UniformValue, Viewport,
};
use crate::scene::{BlurMode, Light, LightKey};
use super::render_target_cache::RenderTargetCache;

const VSM_BLUR_SOURCE: &str = include_str!("shaders/vsm_blur.wgsl");

/// Blur weights for a kernel of `size` taps, normalized to sum to 1
pub fn blur_weights(mode: BlurMode, size: u32) -> Vec<f32> {
    let size = size.max(1);
    match mode {
        BlurMode::Box => vec![1.0 / size as f32; size as usize],
        BlurMode::Gaussian => {
            let sigma = (size - 1) as f32 / 6.0;
            if sigma <= 0.0 {
                return vec![1.0];
            }
            let half = (size - 1) as f32 / 2.0;
            let mut weights: Vec<f32> = (0..size)
                .map(|i| {
                    let x = i as f32 - half;
                    (-(x * x) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let sum: f32 = weights.iter().sum();
            for w in &mut weights {
                *w /= sum;
            }
            weights
        }
    }
}

#[derive(Default)]
pub struct VsmBlur {
    weights: FxHashMap<(BlurMode, u32), Vec<f32>>,
    shaders: FxHashMap<(bool, BlurMode, u32), ShaderHandle>,
    targets: RenderTargetCache,
}

impl VsmBlur {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_targets(&self) -> &RenderTargetCache {
        &self.targets
    }

    /// Blur the shadow map of `light` in place
    pub fn apply(
        &mut self,
        device: &mut dyn GraphicsDevice,
        light_key: LightKey,
        light: &Light,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let Some(map) = light.shadow_map() else {
            crate::engine_bail!(InvariantViolation => "galaxy3d::VsmBlur",
                "Light '{}' has no shadow map to blur", light.name());
        };
        let packed = light.kind().packed_vsm();
        let mode = light.vsm_blur_mode();
        let size = light.vsm_blur_size();

        let shader = match self.shader(device, packed, mode, size) {
            Ok(shader) => shader,
            Err(err) => {
                crate::engine_warn!("galaxy3d::VsmBlur",
                    "Skipping blur of '{}': {}", light.name(), err);
                return Ok(());
            }
        };
        let weights = self.weights
            .entry((mode, size))
            .or_insert_with(|| blur_weights(mode, size))
            .clone();

        device.set_blend_state(BlendState::NO_BLEND)?;
        device.set_depth_state(DepthState::NO_DEPTH)?;
        device.set_depth_bias(None)?;

        let resolution = map.resolution();
        let temp = self.targets.borrow(
            device,
            light_key,
            &format!("{}_vsm_blur", light.name()),
            resolution,
            resolution,
            map.color_format(),
        )?;
        let result = Self::run_passes(device, shader, map.target(), temp, resolution, weights);
        self.targets.release(light_key);
        result?;

        stats.vsm_blur_passes += 2;
        Ok(())
    }

    fn run_passes(
        device: &mut dyn GraphicsDevice,
        shader: ShaderHandle,
        map: RenderTargetHandle,
        temp: RenderTargetHandle,
        resolution: u32,
        weights: Vec<f32>,
    ) -> Result<()> {
        let texel = 1.0 / resolution as f32;
        let viewport = Viewport {
            x: 0.0,
            y: 0.0,
            width: resolution as f32,
            height: resolution as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = Rect2D {
            x: 1,
            y: 1,
            width: resolution.saturating_sub(2),
            height: resolution.saturating_sub(2),
        };

        let passes = [
            (map, temp, Vec2::new(texel, 0.0)),
            (temp, map, Vec2::new(0.0, texel)),
        ];
        for (source, dest, offset) in passes {
            device.set_render_target(Some(dest), 0)?;
            device.set_viewport(viewport)?;
            device.set_scissor(scissor)?;
            device.set_shader(shader)?;
            device.set_uniform("source", UniformValue::Texture(source))?;
            device.set_uniform("pixel_offset", UniformValue::Vec2(offset))?;
            device.set_uniform("weights", UniformValue::FloatArray(weights.clone()))?;
            device.draw(&Primitive::FULLSCREEN_TRIANGLE)?;
        }
        Ok(())
    }

    fn shader(
        &mut self,
        device: &mut dyn GraphicsDevice,
        packed: bool,
        mode: BlurMode,
        size: u32,
    ) -> Result<ShaderHandle> {
        if let Some(&shader) = self.shaders.get(&(packed, mode, size)) {
            return Ok(shader);
        }
        let name = format!("vsm_blur_{}_{}_{}",
            if packed { "packed" } else { "float" },
            match mode { BlurMode::Box => "box", BlurMode::Gaussian => "gaussian" },
            size);
        let desc = ShaderDesc {
            name,
            source: ShaderSource::Wgsl(VSM_BLUR_SOURCE.to_string()),
            defines: vec![
                ("SAMPLES".to_string(), size.to_string()),
                ("PACKED".to_string(), packed.to_string()),
            ],
        };
        let shader = device.create_shader(&desc)?;
        self.shaders.insert((packed, mode, size), shader);
        Ok(shader)
    }

    /// Destroy the pooled temporary targets
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        self.targets.clear(device);
        self.shaders.clear();
    }
}

#[cfg(test)]
#[path = "vsm_blur_tests.rs"]
mod tests;
