//! Per-frame loop state
//!
//! The loop starts `Idle`, enters `Running` exactly once when a loaded asset
//! has a camera and controls, and from then on advances the controls every
//! tick. A [`StopHandle`] checked at the top of each tick gives the host a
//! deterministic way to end it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::gfx::camera::{orbit_controls::OrbitControls, scene_camera::SceneCamera};

/// Cloneable, thread-safe request to stop the frame loop
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

enum FrameLoopState {
    /// Waiting for the asset load to finish
    Idle,
    Running(Box<OrbitControls>),
}

/// What a tick produced
pub enum TickOutcome<'a> {
    /// No camera yet, nothing to draw
    Idle,
    /// Render through this camera
    Render(&'a SceneCamera),
    /// The stop handle fired; the host should shut down
    Stopped,
}

pub struct FrameLoop {
    state: FrameLoopState,
    stop: StopHandle,
    frames: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: FrameLoopState::Idle,
            stop: StopHandle::new(),
            frames: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, FrameLoopState::Running(_))
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Frames rendered since the loop started
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Idle -> Running. Returns false, leaving the loop untouched, if it was
    /// already running.
    pub fn start(&mut self, controls: OrbitControls) -> bool {
        if self.is_running() {
            warn!("Frame loop already running, ignoring duplicate start");
            return false;
        }
        info!("Frame loop started");
        self.state = FrameLoopState::Running(Box::new(controls));
        true
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        match &self.state {
            FrameLoopState::Running(controls) => Some(&**controls),
            FrameLoopState::Idle => None,
        }
    }

    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        match &mut self.state {
            FrameLoopState::Running(controls) => Some(&mut **controls),
            FrameLoopState::Idle => None,
        }
    }

    pub fn camera(&self) -> Option<&SceneCamera> {
        self.controls().map(OrbitControls::camera)
    }

    pub fn camera_mut(&mut self) -> Option<&mut SceneCamera> {
        self.controls_mut().map(OrbitControls::camera_mut)
    }

    /// Advances controls and returns the camera to render through
    pub fn tick(&mut self) -> TickOutcome<'_> {
        if self.stop.is_stopped() {
            return TickOutcome::Stopped;
        }
        match &mut self.state {
            FrameLoopState::Idle => TickOutcome::Idle,
            FrameLoopState::Running(controls) => {
                controls.update();
                controls.camera_mut().update_view_proj();
                self.frames += 1;
                if self.frames == 1 {
                    debug!("First frame");
                }
                TickOutcome::Render(controls.camera())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlsConfig;
    use cgmath::{Deg, Vector3, Zero};

    fn controls() -> OrbitControls {
        let mut camera = SceneCamera::perspective(Deg(75.0), 1.0, 0.1, 1000.0);
        camera.position = Vector3::new(30.0, 0.0, 0.0);
        camera.look_at(Vector3::zero());
        OrbitControls::with_config(camera, &ControlsConfig::default())
    }

    #[test]
    fn test_idle_tick_renders_nothing() {
        let mut frame_loop = FrameLoop::new();
        assert!(matches!(frame_loop.tick(), TickOutcome::Idle));
        assert_eq!(frame_loop.frame_count(), 0);
    }

    #[test]
    fn test_start_only_once() {
        let mut frame_loop = FrameLoop::new();
        assert!(frame_loop.start(controls()));

        let mut other = controls();
        other.target = Vector3::new(1.0, 1.0, 1.0);
        assert!(!frame_loop.start(other));

        // the first controls survive
        let kept = frame_loop.controls().expect("running");
        assert_eq!(kept.target, Vector3::zero());
    }

    #[test]
    fn test_running_tick_counts_frames() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(controls());
        for _ in 0..3 {
            assert!(matches!(frame_loop.tick(), TickOutcome::Render(_)));
        }
        assert_eq!(frame_loop.frame_count(), 3);
    }

    #[test]
    fn test_stop_handle_ends_loop_from_another_thread() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(controls());
        let handle = frame_loop.stop_handle();

        std::thread::spawn(move || handle.stop())
            .join()
            .expect("stopper thread");

        assert!(matches!(frame_loop.tick(), TickOutcome::Stopped));
        assert_eq!(frame_loop.frame_count(), 0);
    }

    #[test]
    fn test_tick_refreshes_camera_uniform() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(controls());
        match frame_loop.tick() {
            TickOutcome::Render(camera) => {
                assert_eq!(camera.uniform.view_position[0], camera.position.x);
                assert_eq!(camera.uniform.view_position[3], 1.0);
            }
            _ => panic!("expected a render"),
        }
    }
}
