/*!
# Galaxy 3D Visibility

Per-frame visibility and shadow core of the Galaxy3D engine.

Each frame decides which instances every camera sees, which lights affect
the frame and cast shadows, renders the shadow maps of those lights into
their own targets or into the shared local-light atlas, and blurs variance
shadow maps. Drawing goes through the `GraphicsDevice` trait; shader
variants come from a `ShaderProvider`.

## Architecture

- **Scene**: instances, lights, cameras and materials behind slot map keys,
  grouped by an ordered `LayerComposition`
- **Visibility**: camera culling, light collection and culling, shadow
  caster culling (`FrameCuller` runs them in order)
- **Shadow**: shadow maps, atlas allocation, shadow cameras, the shadow
  pass renderer and the VSM blur
- **Renderer**: frame driver (`update`, then `render_shadows`)
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod camera;
pub mod graphics_device;
pub mod material;
pub mod scene;
pub mod shadow;
pub mod visibility;
pub mod renderer;

#[cfg(test)]
pub(crate) mod test_support;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logger)
    pub use crate::engine::Engine;

    // Frame driver
    pub use crate::renderer::Renderer;
    pub use crate::config::{FrameStats, RendererConfig};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, DedupLogger};
    }
}

// Re-export math library at crate root
pub use glam;
