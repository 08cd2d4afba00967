//! Fixed camera and perspective projection.

use glam::{Mat4, Vec3};

use crate::config::{CameraConfig, ProjectionConfig};

/// Static look-at camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position in world space.
    pub eye: Vec3,
    /// Direction the camera looks along.
    pub view_dir: Vec3,
    pub up: Vec3,
}

impl Camera {
    /// Create a camera looking down -Z from `(0, 0, 40)`.
    pub fn new() -> Self {
        Self::from_config(&CameraConfig::default())
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            eye: Vec3::from_array(config.eye),
            view_dir: Vec3::from_array(config.view_dir),
            up: Vec3::from_array(config.up),
        }
    }

    /// Point the camera looks at: one unit along the view direction.
    pub fn target(&self) -> Vec3 {
        self.eye + self.view_dir
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target(), self.up)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self {
            fov_y: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
        }
    }

    /// Projection matrix for a viewport of the given size.
    ///
    /// A zero-sized viewport (minimized window) uses an aspect of 1.
    pub fn matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::from_config(&ProjectionConfig::default())
    }
}
