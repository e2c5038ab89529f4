//! Damped orbit / pan / dolly controls
//!
//! The controls own the camera they drive. Input handlers only accumulate
//! deltas; [`OrbitControls::update`] applies them once per frame, which is
//! what makes damping work.

use cgmath::*;

use super::scene_camera::{Projection, SceneCamera};
use crate::config::ControlsConfig;

const EPS: f32 = 0.000001;

/// Spherical coordinates of the camera around the target, Y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from +Y
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z
    pub theta: f32,
}

impl Spherical {
    pub fn from_vector(v: Vector3<f32>) -> Self {
        let radius = v.magnitude();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keeps phi away from the poles
    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitControlsBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_azimuth_angle: Option<f32>,
    pub max_azimuth_angle: Option<f32>,
}

impl Default for OrbitControlsBounds {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI,
            min_azimuth_angle: None,
            max_azimuth_angle: None,
        }
    }
}

/// Orbit controls bound to exactly one camera
#[derive(Debug, Clone)]
pub struct OrbitControls {
    camera: SceneCamera,
    /// Point the camera orbits around
    pub target: Vector3<f32>,
    pub bounds: OrbitControlsBounds,

    pub enable_damping: bool,
    pub damping_factor: f32,
    pub screen_space_panning: bool,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,

    spherical_delta: Spherical,
    pan_offset: Vector3<f32>,
    scale: f32,
    last_position: Vector3<f32>,
    last_rotation: Quaternion<f32>,
}

impl OrbitControls {
    /// Binds controls to `camera`, orbiting around the world origin
    pub fn new(camera: SceneCamera) -> Self {
        let last_position = camera.position;
        let last_rotation = camera.rotation;
        Self {
            camera,
            target: Vector3::zero(),
            bounds: OrbitControlsBounds::default(),
            enable_damping: false,
            damping_factor: 0.05,
            screen_space_panning: true,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            spherical_delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            pan_offset: Vector3::zero(),
            scale: 1.0,
            last_position,
            last_rotation,
        }
    }

    pub fn with_config(camera: SceneCamera, config: &ControlsConfig) -> Self {
        let mut controls = Self::new(camera);
        controls.apply_config(config);
        controls
    }

    pub fn apply_config(&mut self, config: &ControlsConfig) {
        self.enable_damping = config.enable_damping;
        self.damping_factor = config.damping_factor;
        self.screen_space_panning = config.screen_space_panning;
        self.enable_rotate = config.enable_rotate;
        self.enable_pan = config.enable_pan;
        self.enable_zoom = config.enable_zoom;
        self.auto_rotate = config.auto_rotate;
        self.auto_rotate_speed = config.auto_rotate_speed;
        self.rotate_speed = config.rotate_speed;
        self.zoom_speed = config.zoom_speed;
        self.pan_speed = config.pan_speed;
        self.bounds.min_distance = config.min_distance;
        self.bounds.max_distance = config.max_distance;
    }

    pub fn camera(&self) -> &SceneCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut SceneCamera {
        &mut self.camera
    }

    /// Current distance between camera and target
    pub fn distance(&self) -> f32 {
        (self.camera.position - self.target).magnitude()
    }

    /// Queues a rotation around the up axis
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    /// Queues a rotation towards the up axis
    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Queues a rotation from a pointer drag of `(dx, dy)` pixels on a surface
    /// `client_height` pixels tall
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, client_height: f32) {
        if !self.enable_rotate || client_height <= 0.0 {
            return;
        }
        let full_turn = 2.0 * std::f32::consts::PI;
        self.rotate_left(full_turn * dx / client_height * self.rotate_speed);
        self.rotate_up(full_turn * dy / client_height * self.rotate_speed);
    }

    /// Zoom factor applied per dolly step
    pub fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Moves the camera towards the target
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        if !self.enable_zoom {
            return;
        }
        self.scale *= dolly_scale;
    }

    /// Moves the camera away from the target
    pub fn dolly_out(&mut self, dolly_scale: f32) {
        if !self.enable_zoom {
            return;
        }
        self.scale /= dolly_scale;
    }

    /// Applies one wheel notch; negative deltas zoom in
    pub fn wheel(&mut self, delta_y: f32) {
        let zoom_scale = self.zoom_scale();
        if delta_y < 0.0 {
            self.dolly_in(zoom_scale);
        } else if delta_y > 0.0 {
            self.dolly_out(zoom_scale);
        }
    }

    fn pan_left(&mut self, distance: f32) {
        let v = self.camera.right() * -distance;
        self.pan_offset += v;
    }

    fn pan_up(&mut self, distance: f32) {
        let v = if self.screen_space_panning {
            self.camera.local_up()
        } else {
            self.camera.up.cross(self.camera.right())
        };
        self.pan_offset += v * distance;
    }

    /// Queues a pan from a pointer drag of `(dx, dy)` pixels
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, client_width: f32, client_height: f32) {
        if !self.enable_pan || client_height <= 0.0 {
            return;
        }
        let dx = dx * self.pan_speed;
        let dy = dy * self.pan_speed;

        match *self.camera.projection() {
            Projection::Perspective { fovy, .. } => {
                // half of the fov is center to top of screen
                let half_fov = Rad::from(fovy) / 2.0;
                let target_distance = self.distance() * half_fov.0.tan();
                self.pan_left(2.0 * dx * target_distance / client_height);
                self.pan_up(2.0 * dy * target_distance / client_height);
            }
            Projection::Orthographic { xmag, ymag, .. } => {
                if client_width > 0.0 {
                    self.pan_left(dx * 2.0 * xmag / client_width);
                }
                self.pan_up(dy * 2.0 * ymag / client_height);
            }
        }
    }

    fn auto_rotation_angle(&self) -> f32 {
        2.0 * std::f32::consts::PI / 60.0 / 60.0 * self.auto_rotate_speed
    }

    /// Applies accumulated input and damping, re-aims the camera at the target.
    ///
    /// Returns true when the camera moved.
    pub fn update(&mut self) -> bool {
        let offset = self.camera.position - self.target;
        let mut spherical = Spherical::from_vector(offset);

        if self.auto_rotate {
            let angle = self.auto_rotation_angle();
            self.rotate_left(angle);
        }

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        if let (Some(min), Some(max)) = (
            self.bounds.min_azimuth_angle,
            self.bounds.max_azimuth_angle,
        ) {
            spherical.theta = spherical.theta.clamp(min, max);
        }

        spherical.phi = spherical
            .phi
            .clamp(self.bounds.min_polar_angle, self.bounds.max_polar_angle);
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.bounds.min_distance, self.bounds.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        self.camera.position = self.target + spherical.to_vector();
        self.camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        let moved = (self.last_position - self.camera.position).magnitude2() > EPS
            || 8.0 * (1.0 - self.last_rotation.dot(self.camera.rotation).abs()) > EPS;
        if moved {
            self.last_position = self.camera.position;
            self.last_rotation = self.camera.rotation;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    fn camera_at(position: Vector3<f32>) -> SceneCamera {
        let mut camera = SceneCamera::perspective(Deg(75.0), 1.5, 0.1, 1000.0);
        camera.position = position;
        camera.look_at(Vector3::zero());
        camera
    }

    fn default_controls(position: Vector3<f32>) -> OrbitControls {
        OrbitControls::with_config(camera_at(position), &ControlsConfig::default())
    }

    #[test]
    fn test_spherical_round_trip_of_axis_vector() {
        let s = Spherical::from_vector(Vector3::new(30.0, 0.0, 0.0));
        assert!((s.radius - 30.0).abs() < 1e-5);
        assert!((s.phi - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        let v = s.to_vector();
        assert!((v - Vector3::new(30.0, 0.0, 0.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_config_is_applied() {
        let controls = default_controls(Vector3::new(30.0, 0.0, 0.0));
        assert!(controls.enable_damping);
        assert_eq!(controls.damping_factor, 0.05);
        assert!(!controls.screen_space_panning);
        assert_eq!(controls.bounds.min_distance, 1.0);
        assert_eq!(controls.bounds.max_distance, 50.0);
        assert!(!controls.auto_rotate);
    }

    #[test]
    fn test_idle_update_keeps_camera_still() {
        let mut controls = default_controls(Vector3::new(10.0, 0.0, 0.0));
        let before = controls.camera().position;
        controls.update();
        assert!(!controls.update());
        assert!((controls.camera().position - before).magnitude() < 1e-4);
    }

    #[test]
    fn test_distance_is_clamped_to_max() {
        // 30 units out with max distance 50 is fine, 80 is not
        let mut controls = default_controls(Vector3::new(80.0, 0.0, 0.0));
        controls.update();
        assert!((controls.distance() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_dolly_in_respects_min_distance() {
        let mut controls = default_controls(Vector3::new(2.0, 0.0, 0.0));
        for _ in 0..200 {
            controls.wheel(-1.0);
            controls.update();
        }
        assert!((controls.distance() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_disabled_ignores_wheel() {
        let mut controls = default_controls(Vector3::new(10.0, 0.0, 0.0));
        controls.enable_zoom = false;
        controls.wheel(-1.0);
        controls.update();
        assert!((controls.distance() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let mut controls = default_controls(Vector3::new(0.0, 0.0, 10.0));
        controls.rotate_left(1.0);

        controls.update();
        let first = Spherical::from_vector(controls.camera().position).theta;
        // 5% of the queued angle is applied on the first frame
        assert!((first + 0.05).abs() < 1e-4);

        let moved = controls.update();
        assert!(moved);
        let second = Spherical::from_vector(controls.camera().position).theta;
        assert!(second < first);
    }

    #[test]
    fn test_damped_motion_decays_to_rest() {
        let mut controls = default_controls(Vector3::new(0.0, 0.0, 10.0));
        controls.rotate_by_pixels(100.0, 0.0, 800.0);
        let mut frames = 0;
        while controls.update() {
            frames += 1;
            assert!(frames < 2000, "damping never settled");
        }
        assert!(frames > 1);
    }

    #[test]
    fn test_undamped_rotation_applies_immediately() {
        let mut controls = default_controls(Vector3::new(0.0, 0.0, 10.0));
        controls.enable_damping = false;
        controls.rotate_left(-std::f32::consts::FRAC_PI_2);
        controls.update();
        let position = controls.camera().position;
        assert!((position - Vector3::new(10.0, 0.0, 0.0)).magnitude() < 1e-3);
    }

    #[test]
    fn test_camera_keeps_looking_at_target() {
        let mut controls = default_controls(Vector3::new(5.0, 5.0, 5.0));
        controls.rotate_by_pixels(40.0, -25.0, 600.0);
        for _ in 0..10 {
            controls.update();
        }
        let to_target = (controls.target - controls.camera().position).normalize();
        assert!((controls.camera().forward() - to_target).magnitude() < 1e-3);
    }

    #[test]
    fn test_horizontal_pan_stays_in_ground_plane() {
        let mut controls = default_controls(Vector3::new(0.0, 5.0, 10.0));
        controls.enable_damping = false;
        controls.pan_by_pixels(0.0, 50.0, 800.0, 600.0);
        controls.update();
        // screen-space panning is off, so vertical drags move along the ground
        assert!(controls.target.y.abs() < 1e-4);
        assert!(controls.target.z.abs() > 0.0);
    }

    #[test]
    fn test_pan_disabled() {
        let mut controls = default_controls(Vector3::new(0.0, 0.0, 10.0));
        controls.enable_pan = false;
        controls.pan_by_pixels(100.0, 100.0, 800.0, 600.0);
        controls.update();
        assert_eq!(controls.target, Vector3::zero());
    }

    #[test]
    fn test_auto_rotate_moves_without_input() {
        let mut controls = default_controls(Vector3::new(0.0, 0.0, 10.0));
        controls.update();
        controls.auto_rotate = true;
        assert!(controls.update());
    }
}
