//! Per-frame and per-particle transforms.
//!
//! The view and projection are built once per frame ([`FrameTransforms`]).
//! Each particle then composes its own model matrix on a [`MatrixStack`]
//! inside a save/restore scope, so the base view is never left modified.

use glam::{Mat3, Mat4, Vec3};

use crate::backend::Viewport;
use crate::camera::{Camera, Projection};
use crate::error::{Result, SceneError};
use crate::particle::Particle;

/// Matrices shared by every particle in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    /// Look-at view matrix, the base model-view.
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameTransforms {
    pub fn new(camera: &Camera, projection: &Projection, viewport: Viewport) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: projection.matrix(viewport.width, viewport.height),
        }
    }
}

/// Everything the shaders need to place and light one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSet {
    /// Base model-view (the frame's view matrix).
    pub model_view: Mat4,
    /// Particle model-view: view, then translate to the particle, then scale by its radius.
    pub model: Mat4,
    pub projection: Mat4,
    /// Inverse of the transposed upper 3x3 of `model`.
    pub normal: Mat3,
}

impl TransformSet {
    /// Build the transforms for `particle`, composing on `stack`.
    ///
    /// The stack's current matrix must hold the frame's base view; it is
    /// restored before returning.
    pub fn for_particle(
        stack: &mut MatrixStack,
        frame: &FrameTransforms,
        particle: &Particle,
    ) -> Result<Self> {
        stack.scoped(|stack| {
            stack.multiply(particle_local(particle));
            let model = stack.current();
            Self {
                model_view: frame.view,
                model,
                projection: frame.projection,
                normal: normal_matrix(model),
            }
        })
    }
}

/// Translate to the particle's position after scaling by its radius, so the
/// radius never scales the translation.
pub fn particle_local(particle: &Particle) -> Mat4 {
    Mat4::from_translation(particle.position) * Mat4::from_scale(Vec3::splat(particle.radius))
}

/// Normal matrix for `model_view`: `inverse(transpose(mat3(model_view)))`.
pub fn normal_matrix(model_view: Mat4) -> Mat3 {
    Mat3::from_mat4(model_view).transpose().inverse()
}

/// Model-view matrix stack with explicit save and restore.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl MatrixStack {
    pub fn new(base: Mat4) -> Self {
        Self {
            current: base,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> Mat4 {
        self.current
    }

    /// Post-multiply the current matrix by `matrix`.
    pub fn multiply(&mut self, matrix: Mat4) {
        self.current *= matrix;
    }

    /// Save a copy of the current matrix.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved matrix.
    pub fn pop(&mut self) -> Result<()> {
        self.current = self.saved.pop().ok_or(SceneError::StackUnderflow)?;
        Ok(())
    }

    /// Number of saved matrices.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Run `f` between a push and a pop.
    ///
    /// Fails with [`SceneError::StackUnderflow`] if `f` popped more than it pushed.
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Result<T> {
        self.push();
        let value = f(self);
        self.pop()?;
        Ok(value)
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn particle(position: Vec3, radius: f32) -> Particle {
        Particle {
            position,
            radius,
            velocity: Vec3::X,
            color: [255, 255, 255],
        }
    }

    fn frame() -> FrameTransforms {
        FrameTransforms::new(
            &Camera::new(),
            &Projection::default(),
            Viewport::new(800, 600),
        )
    }

    #[test]
    fn test_pop_without_push_underflows() {
        let mut stack = MatrixStack::default();
        assert!(matches!(stack.pop(), Err(SceneError::StackUnderflow)));
    }

    #[test]
    fn test_push_pop_restores() {
        let mut stack = MatrixStack::new(Mat4::from_translation(Vec3::X));
        stack.push();
        stack.multiply(Mat4::from_scale(Vec3::splat(3.0)));
        assert_ne!(stack.current(), Mat4::from_translation(Vec3::X));
        stack.pop().unwrap();
        assert_eq!(stack.current(), Mat4::from_translation(Vec3::X));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_scoped_detects_extra_pop() {
        let mut stack = MatrixStack::default();
        let result = stack.scoped(|s| s.pop());
        assert!(matches!(result, Err(SceneError::StackUnderflow)));
    }

    #[test]
    fn test_particle_transform_leaves_base_view() {
        let frame = frame();
        let mut stack = MatrixStack::new(frame.view);
        let p = particle(Vec3::new(2.0, -1.0, 0.0), 1.5);
        let set = TransformSet::for_particle(&mut stack, &frame, &p).unwrap();

        assert_eq!(stack.current(), frame.view);
        assert_eq!(set.model_view, frame.view);
        assert_eq!(set.projection, frame.projection);
    }

    #[test]
    fn test_radius_does_not_scale_translation() {
        let p = particle(Vec3::new(4.0, 1.0, 0.0), 1.5);
        let local = particle_local(&p);
        assert!((local.transform_point3(Vec3::ZERO) - p.position).length() < 1e-5);
        // A mesh vertex on the unit sphere lands one radius from the center.
        let surface = local.transform_point3(Vec3::X);
        assert!(((surface - p.position).length() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_model_places_particle_in_view_space() {
        let frame = frame();
        let mut stack = MatrixStack::new(frame.view);
        let p = particle(Vec3::new(3.0, 2.0, 0.0), 0.8);
        let set = TransformSet::for_particle(&mut stack, &frame, &p).unwrap();
        let center = set.model.transform_point3(Vec3::ZERO);
        assert!((center - frame.view.transform_point3(p.position)).length() < 1e-4);
    }

    #[test]
    fn test_uniform_scale_preserves_normal_direction() {
        let rotation = Mat4::from_quat(Quat::from_rotation_y(0.7));
        for s in [0.75_f32, 1.0, 1.75, 4.0] {
            let model_view = rotation * Mat4::from_scale(Vec3::splat(s));
            let n = normal_matrix(model_view);
            for normal in [Vec3::X, Vec3::Y, Vec3::new(1.0, 2.0, -3.0).normalize()] {
                let got = (n * normal).normalize();
                let expected = rotation.transform_vector3(normal).normalize();
                assert!((got - expected).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_normal_matrix_handles_non_uniform_scale() {
        let model_view = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(model_view);
        // Surface with normal (1,1,0) has tangent (1,-1,0).
        let normal = n * Vec3::new(1.0, 1.0, 0.0);
        let tangent = model_view.transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        assert!(normal.dot(tangent).abs() < 1e-5);
    }
}
