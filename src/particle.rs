//! Particle records and the store that owns them.

use glam::Vec3;

use crate::config::SpawnConfig;
use crate::error::{Result, SceneError};
use crate::spawn::Spawner;

/// One bouncing sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Center in world space.
    pub position: Vec3,
    /// Sphere radius, also the uniform scale of the mesh. Always > 0.
    pub radius: f32,
    /// Per-frame displacement direction; rescaled to the step length each step.
    pub velocity: Vec3,
    /// RGB color, 0-255 per channel.
    pub color: [u8; 3],
}

impl Particle {
    /// Check the record can be transformed and drawn.
    ///
    /// The radius scales the mesh, so a zero or negative radius would make
    /// the normal matrix singular.
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(SceneError::InvalidArgument(format!(
                "particle radius must be positive, got {}",
                self.radius
            )));
        }
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(SceneError::InvalidArgument(format!(
                "particle position {} and velocity {} must be finite",
                self.position, self.velocity
            )));
        }
        Ok(())
    }

    /// Color normalized to `[0, 1]` per channel.
    pub fn color_unit(&self) -> Vec3 {
        Vec3::new(
            self.color[0] as f32,
            self.color[1] as f32,
            self.color[2] as f32,
        ) / 255.0
    }
}

/// Insertion-ordered collection of particles.
///
/// Order only decides draw order; depth testing handles visibility.
pub struct ParticleStore {
    particles: Vec<Particle>,
    spawner: Spawner,
}

impl ParticleStore {
    /// Create an empty store whose spawner draws from `config`.
    pub fn new(config: SpawnConfig) -> Self {
        Self::with_spawner(Spawner::new(config))
    }

    /// Create an empty store with a reproducible spawner.
    pub fn with_seed(config: SpawnConfig, seed: u64) -> Self {
        Self::with_spawner(Spawner::with_seed(config, seed))
    }

    fn with_spawner(spawner: Spawner) -> Self {
        Self {
            particles: Vec::new(),
            spawner,
        }
    }

    /// Append `count` randomly drawn particles.
    ///
    /// No cap is applied here; callers limit the total.
    pub fn spawn(&mut self, count: usize) {
        self.particles.reserve(count);
        for _ in 0..count {
            let p = self.spawner.spawn();
            self.particles.push(p);
        }
        log::debug!("Spawned {} particles ({} total)", count, self.particles.len());
    }

    /// Append a hand-built particle after validating it.
    pub fn push(&mut self, particle: Particle) -> Result<()> {
        particle.validate()?;
        self.particles.push(particle);
        Ok(())
    }

    /// Remove every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }
}
