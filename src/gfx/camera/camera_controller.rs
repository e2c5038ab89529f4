use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_controls::OrbitControls;

/// Pixels per wheel line, used to tell pixel deltas from line deltas
const PIXELS_PER_LINE: f64 = 100.0;

/// What a pointer drag currently does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Dolly,
    Pan,
}

/// Translates window input into orbit control deltas.
///
/// Left drag rotates, middle drag dollies, right drag (or shift + left drag)
/// pans, the wheel zooms.
#[derive(Debug, Default)]
pub struct CameraController {
    drag: Option<DragMode>,
    last_cursor: Option<(f64, f64)>,
    is_shift_held: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        self.drag
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.drag == Some(DragMode::Pan)
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.drag == Some(DragMode::Rotate)
    }

    pub fn set_shift_held(&mut self, held: bool) {
        self.is_shift_held = held;
    }

    pub fn pointer_down(&mut self, button: MouseButton) {
        self.drag = match button {
            MouseButton::Left if self.is_shift_held => Some(DragMode::Pan),
            MouseButton::Left => Some(DragMode::Rotate),
            MouseButton::Middle => Some(DragMode::Dolly),
            MouseButton::Right => Some(DragMode::Pan),
            _ => self.drag,
        };
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Feeds a new cursor position; while dragging the movement is forwarded
    /// to `controls`
    pub fn pointer_moved(
        &mut self,
        x: f64,
        y: f64,
        viewport: (u32, u32),
        controls: &mut OrbitControls,
    ) {
        let previous = self.last_cursor.replace((x, y));
        let (Some(mode), Some((last_x, last_y))) = (self.drag, previous) else {
            return;
        };

        let dx = (x - last_x) as f32;
        let dy = (y - last_y) as f32;
        let (width, height) = (viewport.0 as f32, viewport.1 as f32);

        match mode {
            DragMode::Rotate => controls.rotate_by_pixels(dx, dy, height),
            DragMode::Pan => controls.pan_by_pixels(dx, dy, width, height),
            DragMode::Dolly => controls.wheel(-dy),
        }
    }

    pub fn wheel(&mut self, delta: MouseScrollDelta, controls: &mut OrbitControls) {
        // winit reports scrolling up as positive, the controls treat negative as zoom in
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -lines as f64 * PIXELS_PER_LINE,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => -y,
        };
        controls.wheel(delta_y as f32);
    }

    /// Handles the window events relevant to camera input.
    ///
    /// Returns true if the event was consumed.
    pub fn process_window_event(
        &mut self,
        event: &WindowEvent,
        viewport: (u32, u32),
        controls: &mut OrbitControls,
    ) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_shift_held(modifiers.state().shift_key());
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                match state {
                    ElementState::Pressed => self.pointer_down(*button),
                    ElementState::Released => self.pointer_up(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x, position.y, viewport, controls);
                self.drag.is_some()
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.wheel(*delta, controls);
                true
            }
            _ => false,
        }
    }
}
