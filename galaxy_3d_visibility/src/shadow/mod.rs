//! Shadow module: shadow maps, the local-light atlas, shadow cameras,
//! the shadow pass renderer and VSM blur.

mod atlas;
mod render_target_cache;
mod shadow_kind;
mod shadow_map;
mod shadow_render_data;
mod shadow_renderer;
mod vsm_blur;
pub mod cascades;
pub mod local;

pub use atlas::{face_rect, AtlasSlot, ShadowAtlas};
pub use render_target_cache::RenderTargetCache;
pub use shadow_kind::{ShadowKind, SHADER_PASS_SHADOW_BASE};
pub use shadow_map::ShadowMap;
pub use shadow_render_data::{ShadowRenderData, SHADOW_CLEAR_COLOR};
pub use shadow_renderer::{viewport_remap, ShadowPassContext, ShadowRenderer};
pub use vsm_blur::{blur_weights, VsmBlur};
