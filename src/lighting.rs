//! Light and material parameters.

use glam::Vec3;

use crate::config::LightConfig;
use crate::particle::Particle;

/// Single point light shared by the whole scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// World-space position.
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Light {
    pub fn from_config(config: &LightConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            ambient: Vec3::splat(config.ambient),
            diffuse: Vec3::splat(config.diffuse),
            specular: Vec3::splat(config.specular),
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::from_config(&LightConfig::default())
    }
}

/// Surface reflectance for one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub ambient: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Material {
    /// Diffuse and ambient take the particle color; highlights are white.
    pub fn for_particle(particle: &Particle, shininess: f32) -> Self {
        let color = particle.color_unit();
        Self {
            diffuse: color,
            ambient: color,
            specular: Vec3::ONE,
            shininess,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_light_is_pure_diffuse_specular() {
        let light = Light::default();
        assert_eq!(light.position, Vec3::splat(20.0));
        assert_eq!(light.ambient, Vec3::ZERO);
        assert_eq!(light.diffuse, Vec3::ONE);
        assert_eq!(light.specular, Vec3::ONE);
    }

    #[test]
    fn test_material_from_particle_color() {
        let p = Particle {
            position: Vec3::ZERO,
            radius: 1.0,
            velocity: Vec3::X,
            color: [0, 255, 0],
        };
        let m = Material::for_particle(&p, 100.0);
        assert_eq!(m.diffuse, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(m.ambient, m.diffuse);
        assert_eq!(m.specular, Vec3::ONE);
        assert_eq!(m.shininess, 100.0);
    }
}
