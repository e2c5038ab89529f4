//! The viewer controller
//!
//! Owns all state shared between the load callbacks, the resize handler and
//! the frame loop: viewport, scene graph, the resolved camera (inside the
//! orbit controls) and the input controller. The window host forwards events
//! here; nothing in this module touches the GPU.

use log::{error, info, warn};
use winit::event::WindowEvent;

use crate::config::ViewerConfig;
use crate::error::AssetLoadError;
use crate::frame_loop::{FrameLoop, StopHandle, TickOutcome};
use crate::gfx::camera::{
    camera_controller::CameraController,
    camera_utils::aspect_ratio,
    orbit_controls::OrbitControls,
    resolver::{resolve_camera, CameraSource},
    scene_camera::SceneCamera,
};
use crate::gfx::scene::Scene;
use crate::loader::{LoadEvent, LoadProgress, LoadedAsset};

/// Surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.width, self.height)
    }

    /// Zero-sized viewports happen while a window is minimised
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_tuple(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Where the single asset load stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded(CameraSource),
    Failed,
}

pub struct Viewer {
    config: ViewerConfig,
    viewport: Viewport,
    scene: Scene,
    frame_loop: FrameLoop,
    controller: CameraController,
    status: LoadStatus,
    last_progress: Option<LoadProgress>,
}

impl Viewer {
    /// Creates the scene root with its light rig, sized to `viewport`
    pub fn new(config: ViewerConfig, viewport: Viewport) -> Self {
        let scene = Scene::new(&config.lighting);
        Self {
            config,
            viewport,
            scene,
            frame_loop: FrameLoop::new(),
            controller: CameraController::new(),
            status: LoadStatus::Pending,
            last_progress: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// The active camera, once a load has succeeded
    pub fn camera(&self) -> Option<&SceneCamera> {
        self.frame_loop.camera()
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.frame_loop.controls()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.frame_loop.stop_handle()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_loop.frame_count()
    }

    /// Dispatches a loader notification. Returns true if it added a node to
    /// the scene.
    pub fn handle_load_event(&mut self, event: LoadEvent) -> bool {
        match event {
            LoadEvent::Progress(progress) => {
                self.on_load_progress(progress);
                false
            }
            LoadEvent::Loaded(asset) => self.on_load_success(asset),
            LoadEvent::Failed(err) => {
                self.on_load_failure(err);
                false
            }
        }
    }

    pub fn on_load_progress(&mut self, progress: LoadProgress) {
        if self.status != LoadStatus::Pending {
            return;
        }
        match progress.percent() {
            Some(percent) => info!("{percent:.0}% loaded"),
            None => info!("{} bytes loaded", progress.loaded_bytes),
        }
        self.last_progress = Some(progress);
    }

    /// Adds the node to the scene, resolves the camera, binds controls and
    /// starts the frame loop. Only the first terminal load event counts.
    pub fn on_load_success(&mut self, asset: LoadedAsset) -> bool {
        if self.status != LoadStatus::Pending {
            warn!("Ignoring load result, load already finished: {:?}", self.status);
            return false;
        }

        let LoadedAsset { mut node, cameras } = asset;
        node.reset_transform();
        info!(
            "Model loaded: `{}` ({} meshes, {} triangles, {} embedded cameras)",
            node.name,
            node.meshes.len(),
            node.triangle_count(),
            cameras.len()
        );
        let look_at = self.scene.add(node).position;

        let (camera, source) = resolve_camera(
            cameras,
            look_at,
            self.viewport.as_tuple(),
            &self.config.default_camera,
        );
        let controls = OrbitControls::with_config(camera, &self.config.controls);

        self.status = LoadStatus::Loaded(source);
        self.frame_loop.start(controls)
    }

    /// Logs the failure. The scene stays empty and the loop never starts.
    pub fn on_load_failure(&mut self, err: AssetLoadError) {
        if self.status != LoadStatus::Pending {
            warn!("Ignoring load failure, load already finished: {err}");
            return;
        }
        error!("An error happened while loading the model: {}", err.message());
        error!("Error details: {} {:?}", err.message(), err.details());
        self.status = LoadStatus::Failed;
    }

    /// Records the new viewport and keeps the camera projection in sync.
    ///
    /// Safe before the load finishes: without a camera only the viewport is
    /// updated.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        if self.viewport.is_degenerate() {
            return;
        }
        if let Some(camera) = self.frame_loop.camera_mut() {
            camera.set_aspect(self.viewport.aspect());
            camera.update_projection_matrix();
        }
    }

    /// Routes pointer input to the orbit controls. Returns true if consumed.
    pub fn handle_input(&mut self, event: &WindowEvent) -> bool {
        let viewport = self.viewport.as_tuple();
        match self.frame_loop.controls_mut() {
            Some(controls) => self
                .controller
                .process_window_event(event, viewport, controls),
            None => false,
        }
    }

    /// One display refresh: advances controls and returns what to draw
    pub fn tick(&mut self) -> (&Scene, TickOutcome<'_>) {
        (&self.scene, self.frame_loop.tick())
    }
}
