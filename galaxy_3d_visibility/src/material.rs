/// Materials and the shader-variant producer used by shadow passes.
///
/// A Material is a named list of parameters packed lazily into a uniform
/// block. Shader variants are obtained through `ShaderProvider`; the core
/// treats a failed variant as a recoverable, logged condition.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::new_key_type;
use crate::error::{Error, Result};
use crate::engine_bail;
use crate::graphics_device::{GraphicsDevice, ShaderDesc, ShaderHandle, ShaderSource, CullMode};
use crate::scene::RenderInstance;

new_key_type! {
    /// Stable key for a Material within a Scene
    pub struct MaterialKey;
}

// ===== PARAMETER VALUES =====

/// A typed parameter value for the material
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    UInt(u32),
}

impl ParamValue {
    /// Value widened to one 16-byte uniform slot
    fn to_slot(self) -> [u32; 4] {
        let f = |v: f32| v.to_bits();
        match self {
            ParamValue::Float(x) => [f(x), 0, 0, 0],
            ParamValue::Vec2([x, y]) => [f(x), f(y), 0, 0],
            ParamValue::Vec3([x, y, z]) => [f(x), f(y), f(z), 0],
            ParamValue::Vec4([x, y, z, w]) => [f(x), f(y), f(z), f(w)],
            ParamValue::Int(i) => [i as u32, 0, 0, 0],
            ParamValue::UInt(u) => [u, 0, 0, 0],
        }
    }
}

// ===== MATERIAL =====

pub struct Material {
    name: String,
    params: Vec<(String, ParamValue)>,
    param_names: FxHashMap<String, usize>,
    cull_mode: CullMode,
    /// Parameters changed since the last `update_uniforms`
    dirty: bool,
    uniform_data: Vec<u8>,
}

impl Material {
    /// Create a material, rejecting duplicate parameter names
    pub fn new(name: impl Into<String>, params: Vec<(String, ParamValue)>) -> Result<Self> {
        let name = name.into();
        let mut param_names = FxHashMap::default();
        for (index, (param_name, _)) in params.iter().enumerate() {
            if param_names.insert(param_name.clone(), index).is_some() {
                engine_bail!("galaxy3d::Material",
                    "Material '{}': duplicate parameter name '{}'", name, param_name);
            }
        }

        Ok(Self {
            name,
            params,
            param_names,
            cull_mode: CullMode::Back,
            dirty: true,
            uniform_data: Vec::new(),
        })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn cull_mode(&self) -> CullMode { self.cull_mode }
    pub fn set_cull_mode(&mut self, mode: CullMode) { self.cull_mode = mode; }
    pub fn is_dirty(&self) -> bool { self.dirty }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.param_names.get(name).map(|&i| &self.params[i].1)
    }

    /// Update an existing parameter
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let Some(&index) = self.param_names.get(name) else {
            engine_bail!("galaxy3d::Material",
                "Material '{}': unknown parameter '{}'", self.name, name);
        };
        self.params[index].1 = value;
        self.dirty = true;
        Ok(())
    }

    /// Repack the uniform block if parameters changed. Returns `true` when rebuilt.
    pub fn update_uniforms(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        let slots: Vec<[u32; 4]> = self.params.iter().map(|(_, v)| v.to_slot()).collect();
        self.uniform_data = bytemuck::cast_slice(&slots).to_vec();
        self.dirty = false;
        true
    }

    /// Packed parameters, one 16-byte slot per parameter in declaration order
    pub fn uniform_data(&self) -> &[u8] {
        &self.uniform_data
    }
}

impl Default for Material {
    /// Parameterless material used as fallback
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            params: Vec::new(),
            param_names: FxHashMap::default(),
            cull_mode: CullMode::Back,
            dirty: true,
            uniform_data: Vec::new(),
        }
    }
}

// ===== SHADER PROVIDER =====

/// Shader pass identifier (forward, shadow variants, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderPassId(pub u32);

/// A compiled shader variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderInstance {
    pub handle: ShaderHandle,
    /// Small stable identifier, used as draw sort key
    pub id: u32,
}

/// Produces shader variants for (pass, instance, material)
pub trait ShaderProvider {
    fn shader_for_pass(
        &mut self,
        device: &mut dyn GraphicsDevice,
        pass: ShaderPassId,
        instance: &RenderInstance,
        material: &Material,
    ) -> Result<ShaderInstance>;
}

/// Key of a compiled variant
type VariantKey = (ShaderPassId, bool, bool);

/// `ShaderProvider` compiling one shared source with per-variant defines.
///
/// Variants are keyed by pass and skinning/morphing. Failed variants are
/// remembered and reported again without recompiling.
pub struct ShaderVariantCache {
    source: ShaderSource,
    variants: FxHashMap<VariantKey, ShaderInstance>,
    failed: FxHashSet<VariantKey>,
    next_id: u32,
}

impl ShaderVariantCache {
    pub fn new(source: ShaderSource) -> Self {
        Self {
            source,
            variants: FxHashMap::default(),
            failed: FxHashSet::default(),
            next_id: 1,
        }
    }

    /// Number of successfully compiled variants
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}

impl ShaderProvider for ShaderVariantCache {
    fn shader_for_pass(
        &mut self,
        device: &mut dyn GraphicsDevice,
        pass: ShaderPassId,
        instance: &RenderInstance,
        _material: &Material,
    ) -> Result<ShaderInstance> {
        let key = (pass, instance.skin().is_some(), instance.morph().is_some());
        if let Some(shader) = self.variants.get(&key) {
            return Ok(*shader);
        }
        let name = format!("pass{}{}{}", pass.0,
            if key.1 { "_skin" } else { "" },
            if key.2 { "_morph" } else { "" });
        if self.failed.contains(&key) {
            return Err(Error::ShaderCompilationFailed(name));
        }

        let mut defines = vec![("PASS".to_string(), pass.0.to_string())];
        if key.1 {
            defines.push(("SKIN".to_string(), "1".to_string()));
        }
        if key.2 {
            defines.push(("MORPH".to_string(), "1".to_string()));
        }
        let desc = ShaderDesc { name, source: self.source.clone(), defines };

        match device.create_shader(&desc) {
            Ok(handle) => {
                let shader = ShaderInstance { handle, id: self.next_id };
                self.next_id += 1;
                self.variants.insert(key, shader);
                Ok(shader)
            }
            Err(err) => {
                self.failed.insert(key);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
