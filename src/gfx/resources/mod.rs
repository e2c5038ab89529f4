// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles the depth buffer and the uniform bind groups used for rendering.

pub mod global_bindings;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use texture_resource::TextureResource;
