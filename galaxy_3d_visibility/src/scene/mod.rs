//! Scene module
//!
//! Render instances, lights, layers and the scene that owns them.

mod layer;
mod light;
mod render_instance;
mod scene;

pub use layer::{Layer, LayerId, LayerComposition, SubLayer};
pub use light::{
    Light, LightKey, LightType, ShadowType, BlurMode, ShadowUpdateMode, LightMask,
    MAX_CASCADES, MAX_VSM_BLUR_SIZE, SHADOW_TYPE_COUNT,
};
pub use render_instance::{
    RenderInstance, RenderInstanceKey, InstanceFlags, Mesh, MeshUniformBlock,
    SkinInstance, MorphInstance, SplatInstance,
};
pub use scene::{Scene, CameraKey};
