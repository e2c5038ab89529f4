pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_controls;
pub mod resolver;
pub mod scene_camera;

// Re-export main types
pub use camera_controller::CameraController;
pub use camera_utils::{Camera, CameraUniform};
pub use orbit_controls::OrbitControls;
pub use resolver::{resolve_camera, CameraSource};
pub use scene_camera::{Projection, SceneCamera};
