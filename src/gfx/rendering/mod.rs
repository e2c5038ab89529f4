// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles the render pipeline, the drawing surface, and frame rendering.

pub mod render_engine;

// Re-export main types
pub use render_engine::{FrameStatus, RenderEngine};
