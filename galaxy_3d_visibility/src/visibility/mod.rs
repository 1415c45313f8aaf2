//! Visibility module: camera culling, light collection, shadow caster
//! culling and the per-frame orchestration of all three.

mod cullable;
mod culled_instances;
mod culler;
mod draw_sort;
mod frame_culler;
mod light_culler;
mod shadow_culler;

pub use cullable::Cullable;
pub use culled_instances::{CulledInstances, GpuUpdateSet};
pub use culler::VisibilityCuller;
pub use draw_sort::{compare_draw_calls, sort_draw_calls, SortMode};
pub use frame_culler::FrameCuller;
pub use light_culler::{collect_lights, cull_lights, CollectedLights};
pub use shadow_culler::{gather_shadow_casters, ShadowCasterCuller};
