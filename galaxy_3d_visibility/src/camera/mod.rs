//! Camera module: cameras, bounding volumes, frustum tests and view uniforms.
//!
//! Scene cameras and the per-face shadow cameras share the `Camera` type.
//! Every culling stage reads the frustum refreshed by `ViewUniforms::compute`.

mod bounds;
mod camera;
mod frustum;
mod view_uniforms;

pub use bounds::{AABB, BoundingSphere};
pub use camera::{Camera, Projection, AspectRatio};
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use view_uniforms::{
    ViewUniforms, ViewUniformBlock, ViewSettings, DEPTH_RANGE_REMAP, dispatch_view_uniforms,
};
