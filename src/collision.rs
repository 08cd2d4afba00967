//! Wall collision and integration.
//!
//! The play area is a square with walls at `x = ±bound` and `y = ±bound`.
//! Every call to [`Walls::step`] rescales the velocity to a fixed step length
//! and advances the particle along it.
//!
//! # Integration modes
//!
//! [`IntegrationMode::Compounding`] checks the four walls in the fixed order
//! `+x, -x, +y, -y` against the position at the start of the call. Each check
//! either reflects (wall touched) or keeps the velocity, and in both cases
//! adds one step to the position, so a particle moves four steps per call.
//!
//! [`IntegrationMode::SingleStep`] reflects off every touched wall the
//! particle is moving into, then advances once.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// How the four wall checks combine into one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMode {
    /// Each wall check advances the position (four steps per call).
    #[default]
    Compounding,
    /// Reflect off all touched walls, then advance once.
    SingleStep,
}

/// One of the four boundary planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    PosX,
    NegX,
    PosY,
    NegY,
}

impl Wall {
    /// Check order used by every step.
    pub const ALL: [Wall; 4] = [Wall::PosX, Wall::NegX, Wall::PosY, Wall::NegY];

    /// Unit normal pointing back into the play area.
    pub fn inward_normal(self) -> Vec3 {
        match self {
            Wall::PosX => Vec3::NEG_X,
            Wall::NegX => Vec3::X,
            Wall::PosY => Vec3::NEG_Y,
            Wall::NegY => Vec3::Y,
        }
    }

    /// Whether a sphere at `position` with `radius` reaches this wall.
    pub fn touches(self, position: Vec3, radius: f32, bound: f32) -> bool {
        match self {
            Wall::PosX => position.x + radius >= bound,
            Wall::NegX => position.x - radius <= -bound,
            Wall::PosY => position.y + radius >= bound,
            Wall::NegY => position.y - radius <= -bound,
        }
    }
}

/// Reflect `incident` about the plane with unit `normal`: `v - 2(v·n)n`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

/// The four walls of the box plus the integration parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walls {
    /// Half-size of the square.
    pub bound: f32,
    /// Distance moved per integration step.
    pub step_length: f32,
    pub mode: IntegrationMode,
}

impl Default for Walls {
    fn default() -> Self {
        Self {
            bound: 5.0,
            step_length: 0.05,
            mode: IntegrationMode::Compounding,
        }
    }
}

impl Walls {
    /// Resolve wall contacts and advance `particle` by one frame.
    pub fn step(&self, particle: &mut Particle) {
        match self.mode {
            IntegrationMode::Compounding => self.step_compounding(particle),
            IntegrationMode::SingleStep => self.step_single(particle),
        }
    }

    fn step_compounding(&self, particle: &mut Particle) {
        // Contacts are tested against the position at entry, not the
        // position after earlier walls moved the particle.
        let start = particle.position;

        for wall in Wall::ALL {
            let direction = if wall.touches(start, particle.radius, self.bound) {
                reflect(particle.velocity, wall.inward_normal())
            } else {
                particle.velocity
            };
            particle.velocity = direction.normalize_or_zero() * self.step_length;
            particle.position += particle.velocity;
        }
    }

    fn step_single(&self, particle: &mut Particle) {
        let mut direction = particle.velocity;
        for wall in Wall::ALL {
            let normal = wall.inward_normal();
            if wall.touches(particle.position, particle.radius, self.bound)
                && direction.dot(normal) < 0.0
            {
                direction = reflect(direction, normal);
            }
        }
        particle.velocity = direction.normalize_or_zero() * self.step_length;
        particle.position += particle.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn particle(position: Vec3, radius: f32, velocity: Vec3) -> Particle {
        Particle {
            position,
            radius,
            velocity,
            color: [200, 100, 50],
        }
    }

    #[test]
    fn test_reflect_head_on() {
        let r = reflect(Vec3::X, Vec3::NEG_X);
        assert!((r - Vec3::NEG_X).length() < EPS);
    }

    #[test]
    fn test_reflect_glancing_keeps_tangent() {
        let r = reflect(Vec3::new(1.0, 1.0, 0.0), Vec3::NEG_X);
        assert!((r - Vec3::new(-1.0, 1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_wall_contact_thresholds() {
        assert!(Wall::PosX.touches(Vec3::new(4.9, 0.0, 0.0), 0.1, 5.0));
        assert!(!Wall::PosX.touches(Vec3::new(4.8, 0.0, 0.0), 0.1, 5.0));
        assert!(Wall::NegY.touches(Vec3::new(0.0, -4.0, 0.0), 1.0, 5.0));
        assert!(!Wall::NegX.touches(Vec3::new(0.0, -4.0, 0.0), 1.0, 5.0));
    }

    #[test]
    fn test_bounce_off_positive_x_wall() {
        let walls = Walls::default();
        let mut p = particle(Vec3::new(4.98, 0.0, 0.0), 0.1, Vec3::X);
        walls.step(&mut p);

        assert!((p.velocity.length() - 0.05).abs() < EPS);
        assert!(p.velocity.x < 0.0);
        assert!(p.position.x < 4.98);
        // One reflected step plus three unreflected ones.
        assert!((p.position.x - 4.78).abs() < EPS);
    }

    #[test]
    fn test_free_flight_advances_four_steps() {
        let walls = Walls::default();
        let mut p = particle(Vec3::ZERO, 1.0, Vec3::new(0.0, 3.0, 0.0));
        walls.step(&mut p);

        assert!((p.velocity - Vec3::new(0.0, 0.05, 0.0)).length() < EPS);
        assert!((p.position - Vec3::new(0.0, 0.2, 0.0)).length() < EPS);
    }

    #[test]
    fn test_speed_is_step_length_after_every_wall() {
        let walls = Walls::default();
        let cases = [
            (Vec3::new(4.95, 0.0, 0.0), Vec3::new(1.0, 0.3, 0.0)),
            (Vec3::new(-4.95, 0.0, 0.0), Vec3::new(-1.0, 0.3, 0.0)),
            (Vec3::new(0.0, 4.95, 0.0), Vec3::new(0.2, 1.0, 0.0)),
            (Vec3::new(0.0, -4.95, 0.0), Vec3::new(0.2, -1.0, 0.0)),
            (Vec3::new(1.0, 1.0, 0.0), Vec3::new(-0.7, 0.1, 0.0)),
        ];
        for (position, velocity) in cases {
            let mut p = particle(position, 0.1, velocity);
            walls.step(&mut p);
            assert!(
                (p.velocity.length() - 0.05).abs() < EPS,
                "speed {} at {:?}",
                p.velocity.length(),
                position
            );
        }
    }

    #[test]
    fn test_corner_reflects_both_axes() {
        let walls = Walls::default();
        let mut p = particle(Vec3::new(4.95, 4.95, 0.0), 0.1, Vec3::new(1.0, 1.0, 0.0));
        walls.step(&mut p);
        assert!(p.velocity.x < 0.0);
        assert!(p.velocity.y < 0.0);
    }

    #[test]
    fn test_single_step_moves_once() {
        let walls = Walls {
            mode: IntegrationMode::SingleStep,
            ..Walls::default()
        };
        let mut p = particle(Vec3::new(4.98, 0.0, 0.0), 0.1, Vec3::X);
        walls.step(&mut p);
        assert!((p.velocity - Vec3::new(-0.05, 0.0, 0.0)).length() < EPS);
        assert!((p.position.x - 4.93).abs() < EPS);
    }

    #[test]
    fn test_single_step_ignores_receding_contact() {
        let walls = Walls {
            mode: IntegrationMode::SingleStep,
            ..Walls::default()
        };
        let mut p = particle(Vec3::new(4.98, 0.0, 0.0), 0.1, Vec3::NEG_X);
        walls.step(&mut p);
        assert!(p.velocity.x < 0.0);
    }

    #[test]
    fn test_zero_velocity_stays_put() {
        let walls = Walls::default();
        let mut p = particle(Vec3::new(1.0, 2.0, 0.0), 0.5, Vec3::ZERO);
        walls.step(&mut p);
        assert_eq!(p.position, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(p.velocity, Vec3::ZERO);
    }
}
