// src/lib.rs
//! glbview
//!
//! A minimal GLB scene viewer built on wgpu and winit: loads one asset in the
//! background, picks its first embedded camera (or a default one) and orbits
//! it with damped mouse controls.

pub mod app;
pub mod config;
pub mod error;
pub mod frame_loop;
pub mod gfx;
pub mod loader;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{ViewerApp, ViewerEvent};
pub use config::ViewerConfig;
pub use error::AssetLoadError;
pub use frame_loop::StopHandle;
pub use viewer::Viewer;

/// Creates a viewer application with the default configuration
pub fn default() -> anyhow::Result<ViewerApp> {
    ViewerApp::new(ViewerConfig::default())
}
