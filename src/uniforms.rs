//! GPU layout of the per-draw uniform block.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Vec3};

use crate::lighting::{Light, Material};
use crate::transform::TransformSet;

/// Per-draw uniforms, laid out to match `SceneUniforms` in `common.wgsl`.
///
/// WGSL aligns `vec3<f32>` and `mat3x3<f32>` columns to 16 bytes, so every
/// vec3 carries a trailing pad float except the last, which shares its
/// slot with `shininess`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub model_view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub light_position: [f32; 3],
    pub _pad0: f32,
    pub ambient_light: [f32; 3],
    pub _pad1: f32,
    pub diffuse_light: [f32; 3],
    pub _pad2: f32,
    pub specular_light: [f32; 3],
    pub _pad3: f32,
    pub diffuse_material: [f32; 3],
    pub _pad4: f32,
    pub ambient_material: [f32; 3],
    pub _pad5: f32,
    pub specular_material: [f32; 3],
    pub shininess: f32,
}

impl SceneUniforms {
    /// Byte size of the block.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(transforms: &TransformSet, light: &Light, material: &Material) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_transforms(transforms);
        uniforms.set_light(light);
        uniforms.set_material(material);
        uniforms
    }

    pub fn set_transforms(&mut self, transforms: &TransformSet) {
        self.model_view = transforms.model_view.to_cols_array_2d();
        self.model = transforms.model.to_cols_array_2d();
        self.projection = transforms.projection.to_cols_array_2d();
        self.normal = padded_mat3(transforms.normal);
    }

    pub fn set_light(&mut self, light: &Light) {
        self.light_position = light.position.to_array();
        self.ambient_light = light.ambient.to_array();
        self.diffuse_light = light.diffuse.to_array();
        self.specular_light = light.specular.to_array();
    }

    pub fn set_material(&mut self, material: &Material) {
        self.diffuse_material = material.diffuse.to_array();
        self.ambient_material = material.ambient.to_array();
        self.specular_material = material.specular.to_array();
        self.shininess = material.shininess;
    }
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self::zeroed()
    }
}

fn padded_mat3(m: Mat3) -> [[f32; 4]; 3] {
    let col = |v: Vec3| [v.x, v.y, v.z, 0.0];
    [col(m.x_axis), col(m.y_axis), col(m.z_axis)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn test_layout_matches_wgsl() {
        assert_eq!(SceneUniforms::SIZE, 352);
        assert_eq!(std::mem::offset_of!(SceneUniforms, normal), 192);
        assert_eq!(std::mem::offset_of!(SceneUniforms, light_position), 240);
        assert_eq!(std::mem::offset_of!(SceneUniforms, specular_material), 336);
        assert_eq!(std::mem::offset_of!(SceneUniforms, shininess), 348);
    }

    #[test]
    fn test_normal_columns_are_padded() {
        let transforms = TransformSet {
            model_view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            normal: Mat3::from_cols(Vec3::X, Vec3::Y * 2.0, Vec3::Z * 3.0),
        };
        let u = SceneUniforms::new(&transforms, &Light::default(), &Material {
            diffuse: Vec3::ONE,
            ambient: Vec3::ONE,
            specular: Vec3::ONE,
            shininess: 100.0,
        });
        assert_eq!(u.normal[1], [0.0, 2.0, 0.0, 0.0]);
        assert_eq!(u.normal[2], [0.0, 0.0, 3.0, 0.0]);
        assert_eq!(u.shininess, 100.0);
        assert_eq!(u.light_position, [20.0, 20.0, 20.0]);
    }
}
