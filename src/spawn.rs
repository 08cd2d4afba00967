//! Random particle spawning.
//!
//! [`Spawner`] owns the RNG and draws positions, radii, directions and
//! colors from the ranges in [`SpawnConfig`].

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SpawnConfig;
use crate::particle::Particle;

/// Draws new particles from configured ranges.
pub struct Spawner {
    config: SpawnConfig,
    rng: SmallRng,
}

impl Spawner {
    /// Create a spawner seeded from the clock, different each program execution.
    pub fn new(config: SpawnConfig) -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::with_seed(config, seed)
    }

    /// Create a spawner with a fixed seed for reproducible spawns.
    pub fn with_seed(config: SpawnConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Draw one particle.
    pub fn spawn(&mut self) -> Particle {
        Particle {
            position: self.random_position(),
            radius: self.random_radius(),
            velocity: self.random_direction(),
            color: self.random_color(),
        }
    }

    /// Random point in the spawn square on the z = 0 plane.
    pub fn random_position(&mut self) -> Vec3 {
        let e = self.config.extent;
        if e <= 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(self.rng.gen_range(-e..e), self.rng.gen_range(-e..e), 0.0)
    }

    /// Random radius in `[min_radius, max_radius)`.
    pub fn random_radius(&mut self) -> f32 {
        let (min, max) = (self.config.min_radius, self.config.max_radius);
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random unit direction in the XY plane.
    pub fn random_direction(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                0.0,
            );
            if v.length_squared() > 1e-8 {
                return v.normalize();
            }
        }
    }

    /// Random RGB color, each channel in `[0, 255)`.
    pub fn random_color(&mut self) -> [u8; 3] {
        [
            self.rng.gen_range(0..255),
            self.rng.gen_range(0..255),
            self.rng.gen_range(0..255),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawned_particles_in_range() {
        let mut spawner = Spawner::with_seed(SpawnConfig::default(), 7);
        for _ in 0..500 {
            let p = spawner.spawn();
            assert!(p.position.x >= -3.0 && p.position.x < 3.0);
            assert!(p.position.y >= -3.0 && p.position.y < 3.0);
            assert_eq!(p.position.z, 0.0);
            assert!(p.radius >= 0.75 && p.radius < 1.75);
            assert!((p.velocity.length() - 1.0).abs() < 1e-5);
            assert_eq!(p.velocity.z, 0.0);
            assert!(p.color.iter().all(|&c| c < 255));
        }
    }

    #[test]
    fn test_same_seed_same_particles() {
        let mut a = Spawner::with_seed(SpawnConfig::default(), 99);
        let mut b = Spawner::with_seed(SpawnConfig::default(), 99);
        for _ in 0..10 {
            assert_eq!(a.spawn(), b.spawn());
        }
    }

    #[test]
    fn test_degenerate_radius_range() {
        let config = SpawnConfig {
            min_radius: 1.0,
            max_radius: 1.0,
            ..SpawnConfig::default()
        };
        let mut spawner = Spawner::with_seed(config, 1);
        assert_eq!(spawner.random_radius(), 1.0);
    }
}
