//! Viewer configuration
//!
//! All settings are plain structs with sensible defaults. Override individual
//! fields before handing the config to [`crate::ViewerApp::new`].

use cgmath::{Deg, InnerSpace, Vector3};

/// Top-level configuration for the viewer
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Initial window size in logical pixels
    pub window_size: (u32, u32),
    /// Relative or absolute path of the single asset to display
    pub asset_path: String,
    /// Background colour (linear RGB)
    pub clear_color: [f64; 3],
    pub lighting: LightingConfig,
    pub default_camera: DefaultCameraConfig,
    pub controls: ControlsConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "glbview".to_string(),
            window_size: (1200, 800),
            asset_path: "./concrete-frameb.glb".to_string(),
            clear_color: [0.0, 0.0, 0.0],
            lighting: LightingConfig::default(),
            default_camera: DefaultCameraConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

/// Fixed scene lighting: one ambient and one directional light
#[derive(Debug, Clone, Copy)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    /// Direction the light comes from (normalized on construction)
    pub directional_direction: Vector3<f32>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: hex_to_rgb(0x404040),
            ambient_intensity: 5.0,
            directional_color: hex_to_rgb(0xffffff),
            directional_intensity: 1.0,
            directional_direction: Vector3::new(1.0, 1.0, 1.0).normalize(),
        }
    }
}

/// Parameters of the camera constructed when the asset has none
#[derive(Debug, Clone, Copy)]
pub struct DefaultCameraConfig {
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub position: Vector3<f32>,
}

impl Default for DefaultCameraConfig {
    fn default() -> Self {
        Self {
            fovy: Deg(75.0),
            znear: 0.1,
            zfar: 1000.0,
            position: Vector3::new(30.0, 0.0, 0.0),
        }
    }
}

/// Orbit control parameters
#[derive(Debug, Clone, Copy)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub screen_space_panning: bool,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub auto_rotate: bool,
    /// 2.0 completes one orbit every 30 seconds at 60 updates per second
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            screen_space_panning: false,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            min_distance: 1.0,
            max_distance: 50.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

/// Converts a 0xRRGGBB colour to normalized RGB
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
