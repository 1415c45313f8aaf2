/// Shadow pass renderer.
///
/// Renders the faces of one light (six for point lights, one per cascade for
/// directional lights, one for spot lights) into its shadow map or into the
/// shared atlas, then blurs VSM maps. Faces are rendered strictly in order;
/// each face clears and draws only its own rect of the target.

use glam::{Mat4, Vec4};
use slotmap::SlotMap;
use crate::camera::{dispatch_view_uniforms, ViewUniforms};
use crate::config::{FrameStats, RendererConfig};
use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{
    ClearOptions, GraphicsDevice, Rect2D, RenderTargetHandle, UniformBufferSlot, UniformValue, Viewport,
};
use crate::material::{Material, MaterialKey, ShaderPassId, ShaderProvider};
use crate::scene::{
    CameraKey, Light, LightKey, LightType, RenderInstance, RenderInstanceKey, Scene, ShadowUpdateMode,
};
use super::shadow_map::ShadowMap;
use super::vsm_blur::VsmBlur;

/// Device-side collaborators of one shadow pass
pub struct ShadowPassContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub shaders: &'a mut dyn ShaderProvider,
    pub config: &'a RendererConfig,
    /// Shared local-light atlas (clustered lighting)
    pub atlas: Option<&'a ShadowMap>,
    pub stats: &'a mut FrameStats,
}

/// Target bound for one face
#[derive(Debug, Clone, Copy, PartialEq)]
struct FaceTarget {
    target: RenderTargetHandle,
    slice: u32,
    resolution: u32,
    hardware_pcf: bool,
}

/// Map GL clip space to the texture-space rect `rect` of a shadow map.
///
/// x and y land in `rect` (v grows downward), z is moved to [0, 1].
pub fn viewport_remap(rect: Vec4) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(0.5 * rect.z, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -0.5 * rect.w, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.5, 0.0),
        Vec4::new(rect.x + 0.5 * rect.z, rect.y + 0.5 * rect.w, 0.5, 1.0),
    )
}

#[derive(Default)]
pub struct ShadowRenderer {
    vsm_blur: VsmBlur,
}

impl ShadowRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vsm_blur(&self) -> &VsmBlur {
        &self.vsm_blur
    }

    /// Whether `light` renders its shadow this frame.
    ///
    /// A `ThisFrame` request is consumed when it is honored.
    pub fn needs_shadow_rendering(light: &mut Light) -> bool {
        let needs = light.enabled()
            && light.cast_shadows()
            && light.shadow_update_mode != ShadowUpdateMode::None
            && light.visible_this_frame;
        if needs && light.shadow_update_mode == ShadowUpdateMode::ThisFrame {
            light.shadow_update_mode = ShadowUpdateMode::None;
        }
        needs
    }

    /// Render every face of `light_key`.
    ///
    /// `camera` selects the cascades of a directional light and is ignored
    /// for local lights.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        ctx: &mut ShadowPassContext,
        light_key: LightKey,
        camera: Option<CameraKey>,
    ) -> Result<()> {
        let Scene { instances, lights, materials, default_material, .. } = scene;
        let Some(light) = lights.get_mut(light_key) else { return Ok(()) };

        let clustered = ctx.config.clustered_lighting && light.light_type().is_local();
        if clustered && light.atlas_slot().is_none() {
            return Ok(());
        }
        let camera = match light.light_type() {
            LightType::Directional => match camera {
                Some(camera) => Some(camera),
                None => engine_bail!(InvariantViolation => "galaxy3d::ShadowRenderer",
                    "Directional light '{}' rendered without a camera", light.name()),
            },
            _ => None,
        };
        if !Self::needs_shadow_rendering(light) {
            return Ok(());
        }

        let faces = light.shadow_face_count();
        for face in 0..faces {
            let target = Self::prepare_face(light, camera, face, ctx)?;
            Self::render_face(light, camera, face, target, instances, materials, *default_material, ctx)?;
        }
        ctx.stats.shadow_map_updates += faces;

        self.render_vsm(light_key, light, ctx)
    }

    /// Resolve the target of `face` and configure its shadow camera
    fn prepare_face(
        light: &mut Light,
        camera: Option<CameraKey>,
        face: u32,
        ctx: &ShadowPassContext,
    ) -> Result<FaceTarget> {
        let clustered = ctx.config.clustered_lighting && light.light_type().is_local();
        let map = if clustered { ctx.atlas } else { light.shadow_map() };
        let Some(map) = map else {
            engine_bail!(InvariantViolation => "galaxy3d::ShadowRenderer",
                "Light '{}' has no shadow map at render time", light.name());
        };
        // The atlas format was chosen once for all local lights
        let hardware_pcf = if clustered {
            map.is_depth_compare()
        } else {
            light.kind().hardware_pcf(false, ctx.device.capabilities())
        };
        let (target, slice) = map.face_target(face);
        let resolution = map.resolution();

        let data = light.render_data_mut(camera, face);
        data.set_clear_color_buffer(!hardware_pcf);
        data.target_slice = slice;
        data.shadow_camera.set_render_target(Some(target));

        Ok(FaceTarget { target, slice, resolution, hardware_pcf })
    }

    #[allow(clippy::too_many_arguments)]
    fn render_face(
        light: &mut Light,
        camera: Option<CameraKey>,
        face: u32,
        target: FaceTarget,
        instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
        materials: &mut SlotMap<MaterialKey, Material>,
        default_material: MaterialKey,
        ctx: &mut ShadowPassContext,
    ) -> Result<()> {
        let light_type = light.light_type();
        let clustered = ctx.config.clustered_lighting && light_type.is_local();
        let kind = if clustered { light.kind().in_atlas() } else { light.kind() };
        let position = light.position();
        let range = light.range();
        let depth_bias = light.depth_bias();
        let depth_state = light.shadow_depth_state();

        let data = light.render_data_mut(camera, face);
        let size = (target.resolution, target.resolution);
        let uniforms = ViewUniforms::compute(&mut data.shadow_camera, size, &ctx.config.view);
        let shadow_camera = &data.shadow_camera;
        let shadow_matrix = viewport_remap(shadow_camera.rect()) * *shadow_camera.view_projection_matrix();
        let viewport = Viewport::from_normalized(shadow_camera.rect(), target.resolution, target.resolution);
        let scissor = Rect2D::from_normalized(shadow_camera.scissor_rect(), target.resolution, target.resolution);
        let clear = ClearOptions {
            color: shadow_camera.clear_color(),
            depth: shadow_camera.clear_depth(),
        };
        data.shadow_matrix = shadow_matrix;
        let casters = std::mem::take(&mut data.visible_casters);

        if light_type == LightType::Directional {
            light.set_cascade_matrix(face as usize, shadow_matrix)?;
        }

        let device = &mut *ctx.device;
        device.set_render_target(Some(target.target), target.slice)?;
        dispatch_view_uniforms(device, &uniforms)?;
        if light_type.is_local() {
            device.set_uniform("view_position", UniformValue::Vec3(position))?;
            device.set_uniform("light_radius", UniformValue::Float(range))?;
        }
        device.set_viewport(viewport)?;
        device.set_scissor(scissor)?;
        device.clear(&clear)?;

        let biased = kind.uses_depth_bias(clustered) && device.capabilities().supports_depth_bias;
        if biased {
            device.set_depth_bias(Some(depth_bias))?;
        }
        device.set_blend_state(kind.blend_state(target.hardware_pcf))?;
        device.set_depth_state(depth_state)?;

        let submitted = Self::submit_casters(
            ctx, kind.shader_pass(), &casters, instances, materials, default_material);
        light.render_data_mut(camera, face).visible_casters = casters;

        // Reset even when submission failed
        let reset = if biased { ctx.device.set_depth_bias(None) } else { Ok(()) };
        submitted?;
        reset
    }

    fn submit_casters(
        ctx: &mut ShadowPassContext,
        pass: ShaderPassId,
        casters: &[RenderInstanceKey],
        instances: &mut SlotMap<RenderInstanceKey, RenderInstance>,
        materials: &mut SlotMap<MaterialKey, Material>,
        default_material: MaterialKey,
    ) -> Result<()> {
        for &key in casters {
            let Some(instance) = instances.get_mut(key) else { continue };
            if !instance.material().is_some_and(|m| materials.contains_key(m)) {
                instance.set_material(Some(default_material));
            }
            let Some(material) = instance.material().and_then(|m| materials.get_mut(m)) else {
                continue;
            };

            ctx.device.set_cull_mode(material.cull_mode())?;
            material.update_uniforms();
            ctx.device.set_uniform_buffer(UniformBufferSlot::Material, material.uniform_data())?;
            if let Some(skin) = instance.skin() {
                ctx.device.set_uniform_buffer(UniformBufferSlot::Skin, bytemuck::cast_slice(&skin.bone_matrices))?;
            }

            let shader = match ctx.shaders.shader_for_pass(&mut *ctx.device, pass, instance, material) {
                Ok(shader) => shader,
                Err(err) => {
                    crate::engine_warn!("galaxy3d::ShadowRenderer",
                        "No shadow shader for pass {} ({}), skipping draw", pass.0, err);
                    continue;
                }
            };
            instance.shadow_key = shader.id;

            let mesh = instance.mesh();
            ctx.device.set_shader(shader.handle)?;
            ctx.device.set_vertex_buffer(Some(mesh.vertex_buffer()))?;
            ctx.device.set_index_buffer(mesh.index_buffer())?;
            ctx.device.set_uniform_buffer(UniformBufferSlot::Mesh, bytemuck::bytes_of(&instance.mesh_uniforms()))?;
            ctx.device.draw(mesh.primitive())?;
            ctx.stats.shadow_draw_calls += 1;
        }
        Ok(())
    }

    /// Blur the map of a VSM light when its kind allows it
    fn render_vsm(&mut self, light_key: LightKey, light: &Light, ctx: &mut ShadowPassContext) -> Result<()> {
        let kind = light.kind();
        if kind.is_vsm() && light.vsm_blur_size() > 1 && kind.can_blur(ctx.config.clustered_lighting) {
            self.vsm_blur.apply(ctx.device, light_key, light, ctx.stats)?;
        }
        Ok(())
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        self.vsm_blur.destroy(device);
    }
}

#[cfg(test)]
#[path = "shadow_renderer_tests.rs"]
mod tests;
