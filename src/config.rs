//! Scene configuration.
//!
//! [`SceneConfig`] holds every tunable of the scene with defaults matching
//! the reference behavior. Build it with the `with_*` methods or load it from
//! JSON; missing JSON fields keep their defaults.
//!
//! ```ignore
//! let config = SceneConfig::new()
//!     .with_subdivision_depth(4)
//!     .with_max_particles(20)
//!     .with_shading(ShadingModel::Phong);
//! config.validate()?;
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::IntegrationMode;
use crate::error::{Result, SceneError};
use crate::mesh::MAX_SUBDIVISION_DEPTH;
use crate::shader::ShadingModel;

/// Ranges new particles are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Half-size of the square spawn region on the z = 0 plane.
    pub extent: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            extent: 3.0,
            min_radius: 0.75,
            max_radius: 1.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub view_dir: [f32; 3],
    pub up: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 40.0],
            view_dir: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 90.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

/// A single white point light. Intensities apply equally to R, G and B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// World-space position.
    pub position: [f32; 3],
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [20.0, 20.0, 20.0],
            ambient: 0.0,
            diffuse: 1.0,
            specular: 1.0,
        }
    }
}

/// Complete scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub subdivision_depth: u32,
    /// Walls sit at `x = ±wall_bound` and `y = ±wall_bound`.
    pub wall_bound: f32,
    /// Distance a particle moves per integration step.
    pub step_length: f32,
    pub integration: IntegrationMode,
    /// Spawn requests never grow the store past this.
    pub max_particles: usize,
    /// Particles added per spawn request.
    pub spawn_batch: usize,
    /// Particles spawned when the driver starts.
    pub initial_particles: usize,
    pub spawn: SpawnConfig,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub light: LightConfig,
    /// Phong exponent for every material.
    pub shininess: f32,
    pub shading: ShadingModel,
    pub clear_color: [f32; 4],
    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            subdivision_depth: 6,
            wall_bound: 5.0,
            step_length: 0.05,
            integration: IntegrationMode::Compounding,
            max_particles: 50,
            spawn_batch: 1,
            initial_particles: 1,
            spawn: SpawnConfig::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            light: LightConfig::default(),
            shininess: 100.0,
            shading: ShadingModel::Gouraud,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn with_subdivision_depth(mut self, depth: u32) -> Self {
        self.subdivision_depth = depth;
        self
    }

    pub fn with_wall_bound(mut self, bound: f32) -> Self {
        self.wall_bound = bound;
        self
    }

    pub fn with_step_length(mut self, step_length: f32) -> Self {
        self.step_length = step_length;
        self
    }

    pub fn with_integration(mut self, mode: IntegrationMode) -> Self {
        self.integration = mode;
        self
    }

    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.max_particles = max;
        self
    }

    pub fn with_spawn_batch(mut self, batch: usize) -> Self {
        self.spawn_batch = batch;
        self
    }

    pub fn with_initial_particles(mut self, count: usize) -> Self {
        self.initial_particles = count;
        self
    }

    pub fn with_light(mut self, light: LightConfig) -> Self {
        self.light = light;
        self
    }

    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject values outside their valid domains.
    pub fn validate(&self) -> Result<()> {
        fn invalid(message: String) -> Result<()> {
            Err(SceneError::InvalidArgument(message))
        }

        if self.subdivision_depth > MAX_SUBDIVISION_DEPTH {
            return invalid(format!(
                "subdivision_depth {} exceeds maximum {}",
                self.subdivision_depth, MAX_SUBDIVISION_DEPTH
            ));
        }
        if !(self.wall_bound > 0.0) {
            return invalid(format!("wall_bound must be positive, got {}", self.wall_bound));
        }
        if !(self.step_length > 0.0) {
            return invalid(format!("step_length must be positive, got {}", self.step_length));
        }
        if !(self.spawn.min_radius > 0.0) || self.spawn.max_radius < self.spawn.min_radius {
            return invalid(format!(
                "radius range [{}, {}] must be positive and ordered",
                self.spawn.min_radius, self.spawn.max_radius
            ));
        }
        if !(self.spawn.extent >= 0.0) {
            return invalid(format!("spawn extent must be non-negative, got {}", self.spawn.extent));
        }
        let p = &self.projection;
        if !(p.near > 0.0) || !(p.far > p.near) {
            return invalid(format!("projection planes must satisfy 0 < near < far, got {} / {}", p.near, p.far));
        }
        if !(p.fov_y_degrees > 0.0 && p.fov_y_degrees < 180.0) {
            return invalid(format!("fov_y_degrees must be in (0, 180), got {}", p.fov_y_degrees));
        }
        if self.initial_particles > self.max_particles {
            return invalid(format!(
                "initial_particles {} exceeds max_particles {}",
                self.initial_particles, self.max_particles
            ));
        }
        self.camera.validate()
    }
}

impl CameraConfig {
    /// A look-at basis needs a finite eye, a non-zero view direction and an
    /// up vector that is not parallel to it.
    pub fn validate(&self) -> Result<()> {
        let eye = Vec3::from_array(self.eye);
        let view_dir = Vec3::from_array(self.view_dir);
        let up = Vec3::from_array(self.up);

        if !eye.is_finite() {
            return Err(SceneError::InvalidArgument(format!("camera eye {:?} is not finite", self.eye)));
        }
        if !view_dir.is_finite() || view_dir.length_squared() < 1e-12 {
            return Err(SceneError::InvalidArgument(format!(
                "camera view_dir {:?} must be non-zero",
                self.view_dir
            )));
        }
        let view_dir = view_dir.normalize();
        if !up.is_finite() || view_dir.cross(up).length_squared() < 1e-12 {
            return Err(SceneError::InvalidArgument(format!(
                "camera up {:?} must not be zero or parallel to view_dir {:?}",
                self.up, self.view_dir
            )));
        }
        Ok(())
    }
}
