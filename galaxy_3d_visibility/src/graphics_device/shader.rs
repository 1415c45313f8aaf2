/// Shader handles, descriptors and uniform values

use glam::{Mat4, Vec2, Vec3, Vec4};
use slotmap::new_key_type;
use crate::graphics_device::RenderTargetHandle;

new_key_type! {
    /// Opaque handle to a compiled shader owned by the graphics device
    pub struct ShaderHandle;
}

/// Shader source code
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    Wgsl(String),
    Glsl { vertex: String, fragment: String },
}

/// Descriptor for creating a shader
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDesc {
    /// Debug name (also used by backends for pipeline caching)
    pub name: String,
    /// Shader source
    pub source: ShaderSource,
    /// Preprocessor defines, in declaration order
    pub defines: Vec<(String, String)>,
}

impl ShaderDesc {
    /// Look up a define value
    pub fn define(&self, name: &str) -> Option<&str> {
        self.defines.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Value for a named shader parameter
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Mat4Array(Vec<Mat4>),
    /// Color buffer of a render target, sampled as a texture
    Texture(RenderTargetHandle),
}

/// Uniform buffer binding slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformBufferSlot {
    /// Per-view block (camera matrices)
    View,
    /// Per-mesh block (world matrix)
    Mesh,
    /// Base material constants
    Material,
    /// Skinning bone palette
    Skin,
}
