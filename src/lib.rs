//! A CPU-based model viewer for flat-colored triangle meshes.
//!
//! Every frame is rasterized in software: the view transform is composed
//! from yaw, pitch, roll, zoom and translation, triangles are filled through
//! a z-buffer with optional angle shading, and edge or vertex overlays are
//! drawn on top. SDL2 is used only to show the result (feature `viewer`).
//!
//! # Quick Start
//!
//! ```ignore
//! use modelview::prelude::*;
//!
//! let scene = SceneHandle::default();
//! mesh::select_model(&scene, &ObjDecoder::new(), &std::fs::read("house.obj")?)?;
//!
//! let mut controls = ViewControls::default();
//! controls.scroll(1.0);
//! let frame = render_frame(&scene.snapshot(), &controls.frame_inputs(800, 600));
//! export::export_png(&frame, "house.png")?;
//! ```

// Public API - exposed to library consumers
pub mod colors;
pub mod config;
pub mod controls;
pub mod export;
pub mod math;
pub mod mesh;
pub mod obj;
pub mod render;
pub mod scene;
pub mod store;
pub mod transform;
pub mod triangle;
#[cfg(feature = "viewer")]
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use mesh::{DecodeError, DecodedMesh, MeshDecoder};
pub use render::{render_frame, Frame, RenderFlags, RenderFrameInputs};
pub use scene::{Scene, SceneHandle};
pub use transform::Transform;
pub use triangle::Triangle;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use modelview::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::mesh::{self, DecodedMesh, MeshDecoder};
    pub use crate::scene::{Scene, SceneHandle};
    pub use crate::triangle::Triangle;

    // Sources
    pub use crate::obj::ObjDecoder;
    pub use crate::store::{Catalog, DirectoryStore, ModelStore};

    // Transform & interaction
    pub use crate::controls::{MouseButton, ViewControls};
    pub use crate::transform::Transform;

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Rendering
    pub use crate::colors::Rgb;
    pub use crate::render::{render_frame, DrawCommand, Frame, RenderFlags, RenderFrameInputs};

    // Export
    pub use crate::export;

    // Window & Input
    #[cfg(feature = "viewer")]
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{fill_triangle, render_frame, FrameBuffer, ScreenTriangle};
}
