//! Picks the camera the viewer renders through

use cgmath::Vector3;
use log::{info, warn};

use super::camera_utils::aspect_ratio;
use super::scene_camera::SceneCamera;
use crate::config::DefaultCameraConfig;

/// Where the active camera came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSource {
    /// Index into the asset's camera list
    Embedded(usize),
    Default,
}

/// Resolves the active camera for a freshly loaded asset.
///
/// The first embedded camera wins. Without one, a perspective camera is built
/// from `defaults` and aimed at `look_at`. Either way the result's aspect
/// matches `viewport` and its projection matrix is current.
pub fn resolve_camera(
    embedded: Vec<SceneCamera>,
    look_at: Vector3<f32>,
    viewport: (u32, u32),
    defaults: &DefaultCameraConfig,
) -> (SceneCamera, CameraSource) {
    let aspect = aspect_ratio(viewport.0, viewport.1);

    match embedded.into_iter().next() {
        Some(mut camera) => {
            camera.set_aspect(aspect);
            camera.update_projection_matrix();
            info!("Camera from GLB file: {:?}", camera.name);
            (camera, CameraSource::Embedded(0))
        }
        None => {
            let mut camera =
                SceneCamera::perspective(defaults.fovy, aspect, defaults.znear, defaults.zfar);
            camera.position = defaults.position;
            camera.look_at(look_at);
            warn!("No camera found in GLB file. Using default camera.");
            (camera, CameraSource::Default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace};

    #[test]
    fn test_first_embedded_camera_wins() {
        let a = SceneCamera::perspective(Deg(40.0), 1.0, 0.1, 10.0).with_name("A");
        let b = SceneCamera::perspective(Deg(60.0), 1.0, 0.1, 10.0).with_name("B");

        let (camera, source) = resolve_camera(
            vec![a, b],
            Vector3::new(0.0, 0.0, 0.0),
            (1920, 1080),
            &DefaultCameraConfig::default(),
        );

        assert_eq!(source, CameraSource::Embedded(0));
        assert_eq!(camera.name.as_deref(), Some("A"));
        assert_eq!(camera.fovy(), Some(Deg(40.0)));
        assert_eq!(camera.aspect(), 1920.0 / 1080.0);
    }

    #[test]
    fn test_embedded_projection_is_recomputed() {
        let a = SceneCamera::perspective(Deg(50.0), 1.0, 0.1, 10.0);
        let (camera, _) = resolve_camera(
            vec![a],
            Vector3::new(0.0, 0.0, 0.0),
            (800, 400),
            &DefaultCameraConfig::default(),
        );
        assert_eq!(
            camera.projection_matrix(),
            cgmath::perspective(Deg(50.0), 2.0, 0.1, 10.0)
        );
    }

    #[test]
    fn test_fallback_camera_aims_at_node() {
        let (camera, source) = resolve_camera(
            Vec::new(),
            Vector3::new(5.0, 0.0, 0.0),
            (1200, 800),
            &DefaultCameraConfig::default(),
        );

        assert_eq!(source, CameraSource::Default);
        assert_eq!(camera.fovy(), Some(Deg(75.0)));
        assert_eq!(camera.position, Vector3::new(30.0, 0.0, 0.0));
        assert_eq!(camera.aspect(), 1.5);

        let expected = (Vector3::new(5.0, 0.0, 0.0) - camera.position).normalize();
        assert!((camera.forward() - expected).magnitude() < 1e-4);
    }
}
