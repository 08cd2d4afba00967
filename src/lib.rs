//! # Sphere Bounce
//!
//! Lit spheres bouncing around a square box, rendered with `wgpu`.
//!
//! Each sphere is a particle with a position, radius, velocity and color.
//! Every frame the [`FrameDriver`] steps each particle through the walls of
//! the box, builds its transforms and hands them to a [`ShadingBackend`]
//! together with the light and the particle's material.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sphere_bounce::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = SceneConfig::new()
//!         .with_max_particles(20)
//!         .with_shading(ShadingModel::Phong);
//!     sphere_bounce::window::run(config)
//! }
//! ```
//!
//! ## Without a window
//!
//! [`HeadlessBackend`] records draws instead of rendering them, which makes
//! the whole loop testable:
//!
//! ```ignore
//! let mut driver = FrameDriver::new(SceneConfig::default(), HeadlessBackend::new())?;
//! driver.start()?;
//! driver.submit(ControlRequest::Spawn);
//! let stats = driver.tick(Viewport::new(800, 800))?;
//! assert_eq!(driver.backend().last_frame().len(), stats.draws);
//! ```
//!
//! ## Collision modes
//!
//! The default [`IntegrationMode::Compounding`] checks all four walls
//! against the position at the start of the step and moves the particle
//! once per wall check, so a particle advances four steps per frame.
//! [`IntegrationMode::SingleStep`] reflects off touched walls and advances
//! once.
//!
//! ## Shading
//!
//! [`ShadingModel::Gouraud`] lights each vertex and interpolates colors;
//! [`ShadingModel::Phong`] interpolates normals and lights each fragment.
//! Both use the Phong reflectance model with a single point light.

pub mod backend;
pub mod camera;
pub mod collision;
pub mod config;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod input;
pub mod lighting;
pub mod mesh;
pub mod particle;
pub mod shader;
pub mod spawn;
pub mod time;
pub mod transform;
pub mod uniforms;
pub mod window;

pub use backend::{HeadlessBackend, ShadingBackend, Viewport};
pub use camera::{Camera, Projection};
pub use collision::{IntegrationMode, Wall, Walls};
pub use config::SceneConfig;
pub use error::{AppError, GpuError, Result, SceneError};
pub use frame::{ControlRequest, DriverState, FrameDriver, FrameStats};
pub use glam::{Mat3, Mat4, Vec3};
pub use lighting::{Light, Material};
pub use mesh::SphereMesh;
pub use particle::{Particle, ParticleStore};
pub use shader::{ShaderSources, ShadingModel};
pub use transform::{FrameTransforms, MatrixStack, TransformSet};

/// Convenient imports for building and running a scene.
pub mod prelude {
    pub use crate::backend::{HeadlessBackend, ShadingBackend, Viewport};
    pub use crate::collision::IntegrationMode;
    pub use crate::config::{CameraConfig, LightConfig, ProjectionConfig, SceneConfig, SpawnConfig};
    pub use crate::error::{AppError, SceneError};
    pub use crate::frame::{ControlRequest, FrameDriver, FrameStats};
    pub use crate::particle::Particle;
    pub use crate::shader::ShadingModel;
    pub use crate::Vec3;
}
