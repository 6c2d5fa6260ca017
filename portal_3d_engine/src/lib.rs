/*!
# Portal 3D Engine

Core types for rendering a scene through a portal surface.

The crate is backend-agnostic: GPU work goes through the trait objects of
the `device` module, and concrete backends (Vulkan, WebGPU, ...) live
outside this crate.

## Architecture

- **OffAxisCamera**: asymmetric-frustum camera that makes a flat surface
  behave like a window into another scene
- **Composer**: ordered multi-pass compositor (render, effect and save passes)
- **PipelineRegistry**: shared slot through which one scene injects passes
  in front of another scene's composer
- **FeedbackMaterial**: surface shader sampling the previous frame of a
  save pass
- **ShaderProgram**: base shaders extended by typed, link-checked stages

## Example

```
use portal_3d_engine::portal3d::shader::*;

let linked = ShaderProgram::builder(BaseShader::fullscreen())
    .stage(ShaderStage::new("tint", InjectionPoint::ScreenColor)
        .input("color", ShaderType::Vec4)
        .output("color", ShaderType::Vec4)
        .uniform("tint", ShaderType::Vec3)
        .body("color = vec4<f32>(color.rgb * u.tint, color.a);"))
    .link()
    .unwrap();
assert!(linked.uniform_layout().slot("tint").is_some());
```
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod device;
pub mod camera;
pub mod shader;
pub mod composer;
pub mod material;
pub mod portal;
pub mod frame;

// Main portal3d namespace module
pub mod portal3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Per-frame context
    pub use crate::frame::FrameContext;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Graphics device traits and descriptors
    pub mod device {
        pub use crate::device::*;
    }

    // Cameras, portal surface and viewer rig
    pub mod camera {
        pub use crate::camera::*;
    }

    // Shader composition
    pub mod shader {
        pub use crate::shader::*;
    }

    // Passes, registry and compositor
    pub mod composer {
        pub use crate::composer::*;
    }

    // Feedback material
    pub mod material {
        pub use crate::material::*;
    }

    // Portal frame driving
    pub mod portal {
        pub use crate::portal::*;
    }
}

// Re-export math library at crate root
pub use glam;
