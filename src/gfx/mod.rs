//! # Graphics Module
//!
//! Everything between a loaded asset and pixels on screen.
//!
//! - **Camera System** ([`camera`]) - Scene cameras, camera resolution and damped orbit controls
//! - **Rendering Pipeline** ([`rendering`]) - Surface, depth buffer and the lit scene pass
//! - **Scene Management** ([`scene`]) - Scene root, loaded nodes and the light rig
//! - **Resource Management** ([`resources`]) - Uniform bindings and depth textures
//!
//! [`RenderEngine`] is created once the window exists; the [`scene::Scene`]
//! lives inside the [`crate::viewer::Viewer`].

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::{OrbitControls, SceneCamera};
pub use rendering::render_engine::RenderEngine;
