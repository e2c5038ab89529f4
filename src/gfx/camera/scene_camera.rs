use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Far plane used for glTF perspective cameras that declare an infinite projection
pub const INFINITE_FAR_FALLBACK: f32 = 2_000_000.0;

/// How a camera maps view space onto the render surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fovy: Deg<f32>,
        aspect: f32,
        znear: f32,
        zfar: f32,
    },
    /// Half-extents of the view volume
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

/// A camera placed in the world, either taken from the asset or constructed
/// as a fallback.
///
/// Looks down its local -Z axis with +Y up, matching glTF conventions. The
/// projection matrix is cached and only recomputed by
/// [`update_projection_matrix`](Self::update_projection_matrix).
#[derive(Debug, Clone)]
pub struct SceneCamera {
    pub name: Option<String>,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    /// World up used when re-aiming the camera with `look_at`
    pub up: Vector3<f32>,
    projection: Projection,
    projection_matrix: Matrix4<f32>,
    pub uniform: CameraUniform,
}

impl Camera for SceneCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix * self.view_matrix()
    }
}

impl SceneCamera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            name: None,
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            up: Vector3::unit_y(),
            projection,
            projection_matrix: Matrix4::identity(),
            uniform: CameraUniform::default(),
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn perspective(fovy: Deg<f32>, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self::new(Projection::Perspective {
            fovy,
            aspect,
            znear,
            zfar,
        })
    }

    pub fn orthographic(xmag: f32, ymag: f32, znear: f32, zfar: f32) -> Self {
        Self::new(Projection::Orthographic {
            xmag,
            ymag,
            znear,
            zfar,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    /// Width over height of the view volume
    pub fn aspect(&self) -> f32 {
        match self.projection {
            Projection::Perspective { aspect, .. } => aspect,
            Projection::Orthographic { xmag, ymag, .. } => xmag / ymag,
        }
    }

    /// Sets the aspect ratio without touching the cached projection matrix.
    ///
    /// Orthographic cameras keep their vertical extent and widen or narrow
    /// horizontally.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        match &mut self.projection {
            Projection::Perspective { aspect, .. } => *aspect = new_aspect,
            Projection::Orthographic { xmag, ymag, .. } => *xmag = *ymag * new_aspect,
        }
    }

    /// Vertical field of view, `None` for orthographic cameras
    pub fn fovy(&self) -> Option<Deg<f32>> {
        match self.projection {
            Projection::Perspective { fovy, .. } => Some(fovy),
            Projection::Orthographic { .. } => None,
        }
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective {
                fovy,
                aspect,
                znear,
                zfar,
            } => perspective(fovy, aspect, znear, zfar),
            Projection::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => ortho(-xmag, xmag, -ymag, ymag, znear, zfar),
        };
    }

    /// Direction the camera looks at, in world space
    pub fn forward(&self) -> Vector3<f32> {
        (self.rotation * -Vector3::unit_z()).normalize()
    }

    /// Camera-local +X in world space
    pub fn right(&self) -> Vector3<f32> {
        (self.rotation * Vector3::unit_x()).normalize()
    }

    /// Camera-local +Y in world space
    pub fn local_up(&self) -> Vector3<f32> {
        (self.rotation * Vector3::unit_y()).normalize()
    }

    /// Rotates the camera so its -Z axis points at `target`
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let mut z = self.position - target;
        if z.magnitude2() == 0.0 {
            z = Vector3::unit_z();
        }
        z = z.normalize();

        let mut x = self.up.cross(z);
        if x.magnitude2() == 0.0 {
            // up and view direction are parallel, nudge the view direction
            if self.up.z.abs() == 1.0 {
                z.x += 0.0001;
            } else {
                z.z += 0.0001;
            }
            z = z.normalize();
            x = self.up.cross(z);
        }
        let x = x.normalize();
        let y = z.cross(x);

        self.rotation = Quaternion::from(Matrix3::from_cols(x, y, z)).normalize();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(
            Point3::from_vec(self.position),
            self.forward(),
            self.local_up(),
        )
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.position.x, self.position.y, self.position.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_near(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut camera = SceneCamera::perspective(Deg(75.0), 1.0, 0.1, 1000.0);
        camera.position = Vector3::new(30.0, 0.0, 0.0);
        camera.look_at(Vector3::new(5.0, 0.0, 0.0));

        assert_vec_near(camera.forward(), Vector3::new(-1.0, 0.0, 0.0));
        assert_vec_near(camera.local_up(), Vector3::unit_y());
    }

    #[test]
    fn test_look_at_straight_down_stays_finite() {
        let mut camera = SceneCamera::perspective(Deg(60.0), 1.0, 0.1, 100.0);
        camera.position = Vector3::new(0.0, 10.0, 0.0);
        camera.look_at(Vector3::zero());

        let forward = camera.forward();
        assert!(forward.x.is_finite() && forward.y.is_finite() && forward.z.is_finite());
        assert!(forward.y < -0.99);
    }

    #[test]
    fn test_aspect_change_needs_explicit_projection_update() {
        let mut camera = SceneCamera::perspective(Deg(75.0), 1.0, 0.1, 1000.0);
        let before = camera.projection_matrix();

        camera.set_aspect(2.0);
        assert_eq!(camera.aspect(), 2.0);
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection_matrix();
        assert_eq!(
            camera.projection_matrix(),
            perspective(Deg(75.0), 2.0, 0.1, 1000.0)
        );
    }

    #[test]
    fn test_orthographic_aspect_rescales_width() {
        let mut camera = SceneCamera::orthographic(2.0, 2.0, 0.1, 100.0);
        camera.set_aspect(1.5);
        assert_eq!(camera.aspect(), 1.5);
        assert_eq!(
            camera.projection(),
            &Projection::Orthographic {
                xmag: 3.0,
                ymag: 2.0,
                znear: 0.1,
                zfar: 100.0
            }
        );
        assert!(camera.fovy().is_none());
    }

    #[test]
    fn test_view_matrix_maps_target_onto_negative_z() {
        let mut camera = SceneCamera::perspective(Deg(45.0), 1.0, 0.1, 100.0);
        camera.position = Vector3::new(0.0, 3.0, 4.0);
        camera.look_at(Vector3::zero());

        let view_space = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(view_space.x.abs() < 1e-4);
        assert!(view_space.y.abs() < 1e-4);
        assert!((view_space.z + 5.0).abs() < 1e-4);
    }
}
