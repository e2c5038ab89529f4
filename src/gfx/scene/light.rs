//! Scene lights
//!
//! The viewer always lights the scene with exactly one ambient and one
//! directional light.

use cgmath::{InnerSpace, Vector3};

use crate::config::LightingConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Parallel light arriving from `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    direction: Vector3<f32>,
}

impl DirectionalLight {
    pub fn new(color: [f32; 3], intensity: f32, direction: Vector3<f32>) -> Self {
        Self {
            color,
            intensity,
            direction: direction.normalize(),
        }
    }

    /// Unit vector pointing towards the light
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }
}

/// The fixed light rig added to every scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
}

impl From<&LightingConfig> for Lighting {
    fn from(config: &LightingConfig) -> Self {
        Self {
            ambient: AmbientLight {
                color: config.ambient_color,
                intensity: config.ambient_intensity,
            },
            directional: DirectionalLight::new(
                config.directional_color,
                config.directional_intensity,
                config.directional_direction,
            ),
        }
    }
}

fn scaled(color: [f32; 3], intensity: f32) -> [f32; 3] {
    [color[0] * intensity, color[1] * intensity, color[2] * intensity]
}

impl AmbientLight {
    /// Colour premultiplied by intensity, as the shader consumes it
    pub fn radiance(&self) -> [f32; 3] {
        scaled(self.color, self.intensity)
    }
}

impl DirectionalLight {
    pub fn radiance(&self) -> [f32; 3] {
        scaled(self.color, self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let light = DirectionalLight::new([1.0; 3], 1.0, Vector3::new(3.0, 0.0, 4.0));
        assert!((light.direction().magnitude() - 1.0).abs() < 1e-6);
        assert!((light.direction().x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_default_rig() {
        let lighting = Lighting::from(&LightingConfig::default());
        let ambient = lighting.ambient.radiance();
        assert!((ambient[0] - 5.0 * 64.0 / 255.0).abs() < 1e-5);
        assert_eq!(lighting.directional.radiance(), [1.0, 1.0, 1.0]);
    }
}
