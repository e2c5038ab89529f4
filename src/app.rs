use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Context;
use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::ViewerConfig;
use crate::error::AssetLoadError;
use crate::frame_loop::{StopHandle, TickOutcome};
use crate::gfx::rendering::{FrameStatus, RenderEngine};
use crate::loader::{AssetLoader, LoadEvent};
use crate::viewer::{Viewer, Viewport};

/// Events posted to the window thread from elsewhere
#[derive(Debug)]
pub enum ViewerEvent {
    Load(LoadEvent),
}

pub struct ViewerApp {
    event_loop: EventLoop<ViewerEvent>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    viewer: Viewer,
    proxy: EventLoopProxy<ViewerEvent>,
    loader: Option<JoinHandle<()>>,
    fatal: Option<anyhow::Error>,
}

impl ViewerApp {
    /// Create the event loop and an empty viewer. Nothing is loaded until the
    /// window exists.
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::<ViewerEvent>::with_user_event()
            .build()
            .context("Failed to create event loop")?;
        let proxy = event_loop.create_proxy();

        let (width, height) = config.window_size;
        let viewer = Viewer::new(config, Viewport::new(width, height));

        Ok(Self {
            event_loop,
            app_state: AppState {
                window: None,
                render_engine: None,
                viewer,
                proxy,
                loader: None,
                fatal: None,
            },
        })
    }

    /// Handle that ends the frame loop and closes the window
    pub fn stop_handle(&self) -> StopHandle {
        self.app_state.viewer.stop_handle()
    }

    /// Run the application (consumes self and blocks until the window closes)
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated abnormally")?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn start_loading(&mut self) {
        let loader = AssetLoader::new(&self.viewer.config().asset_path);
        let path = loader.path().to_path_buf();
        let proxy = self.proxy.clone();
        info!("Loading {}", path.display());

        let spawned = loader.spawn(move |event| {
            // the window thread may already be gone
            let _ = proxy.send_event(ViewerEvent::Load(event));
        });
        match spawned {
            Ok(handle) => self.loader = Some(handle),
            Err(err) => self.viewer.on_load_failure(AssetLoadError::io(path, err)),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.fatal = Some(err);
        self.viewer.stop_handle().stop();
        event_loop.exit();
    }
}

impl ApplicationHandler<ViewerEvent> for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.viewer.config();
        let (width, height) = config.window_size;
        let attributes = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));
        let clear_color = config.clear_color;

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, anyhow::Error::new(err).context("Failed to create window"));
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        self.viewer.resize(width, height);

        let renderer = pollster::block_on(RenderEngine::new(window, width, height, clear_color));
        match renderer {
            Ok(renderer) => self.render_engine = Some(renderer),
            Err(err) => {
                self.fail(event_loop, err);
                return;
            }
        }

        if self.loader.is_none() {
            self.start_loading();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Load(event) => {
                let terminal = event.is_terminal();
                if self.viewer.handle_load_event(event) {
                    if let Some(render_engine) = self.render_engine.as_ref() {
                        render_engine.prepare_scene(self.viewer.scene_mut());
                    }
                    let stats = self.viewer.scene().statistics();
                    info!(
                        "Scene ready: {} nodes, {} meshes, {} triangles, {} vertices",
                        stats.node_count, stats.mesh_count, stats.total_triangles, stats.total_vertices
                    );
                }
                if terminal {
                    if let Some(handle) = self.loader.take() {
                        if handle.join().is_err() {
                            warn!("Asset loader thread panicked after reporting its result");
                        }
                    }
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                self.viewer.stop_handle().stop();
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.viewer.resize(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                let (scene, outcome) = self.viewer.tick();
                let status = match outcome {
                    TickOutcome::Stopped => {
                        event_loop.exit();
                        return;
                    }
                    TickOutcome::Idle => render_engine.render(scene, None),
                    TickOutcome::Render(camera) => render_engine.render(scene, Some(camera)),
                };
                match status {
                    FrameStatus::Presented => {}
                    FrameStatus::Reconfigured => debug!("Frame dropped, surface reconfigured"),
                    FrameStatus::Skipped => {
                        if let Some(window) = self.window.as_ref() {
                            window.request_redraw();
                        }
                    }
                }
            }
            other => {
                self.viewer.handle_input(&other);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.stop_handle().is_stopped() {
            event_loop.exit();
            return;
        }
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!("Rendered {} frames", self.viewer.frame_count());
    }
}
