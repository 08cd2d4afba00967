//! Shading models and their WGSL sources.
//!
//! Each model ships a vertex and a fragment source. Both are prefixed with
//! the shared uniform block from `shaders/common.wgsl`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const COMMON_SOURCE: &str = include_str!("shaders/common.wgsl");
const GOURAUD_VERTEX: &str = include_str!("shaders/gouraud_vertex.wgsl");
const GOURAUD_FRAGMENT: &str = include_str!("shaders/gouraud_fragment.wgsl");
const PHONG_VERTEX: &str = include_str!("shaders/phong_vertex.wgsl");
const PHONG_FRAGMENT: &str = include_str!("shaders/phong_fragment.wgsl");

/// Entry point of every vertex source.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point of every fragment source.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Attribute location of `vertex_position`.
pub const VERTEX_POSITION_LOCATION: u32 = 0;
/// Attribute location of `vertex_normal`.
pub const VERTEX_NORMAL_LOCATION: u32 = 1;

/// Where the Phong reflectance model is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingModel {
    /// Per-vertex lighting, colors interpolated.
    #[default]
    Gouraud,
    /// Per-fragment lighting from interpolated normals.
    Phong,
}

impl ShadingModel {
    pub const ALL: [ShadingModel; 2] = [ShadingModel::Gouraud, ShadingModel::Phong];

    /// Vertex and fragment WGSL for this model.
    pub fn sources(self) -> ShaderSources {
        let (vertex, fragment) = match self {
            ShadingModel::Gouraud => (GOURAUD_VERTEX, GOURAUD_FRAGMENT),
            ShadingModel::Phong => (PHONG_VERTEX, PHONG_FRAGMENT),
        };
        ShaderSources {
            vertex: format!("{}\n{}", COMMON_SOURCE, vertex),
            fragment: format!("{}\n{}", COMMON_SOURCE, fragment),
        }
    }
}

impl fmt::Display for ShadingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadingModel::Gouraud => write!(f, "Gouraud"),
            ShadingModel::Phong => write!(f, "Phong"),
        }
    }
}

/// Complete WGSL modules for one shading model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}
