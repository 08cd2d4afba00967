//! The shading back end contract.
//!
//! The frame driver never talks to a graphics API directly. It pushes
//! matrices, light and material values into a [`ShadingBackend`] and asks it
//! to draw the sphere mesh. [`crate::gpu::WgpuBackend`] renders to a window;
//! [`HeadlessBackend`] records what it was given.

use crate::error::{Result, SceneError};
use crate::lighting::{Light, Material};
use crate::mesh::SphereMesh;
use crate::shader::{ShaderSources, ShadingModel, FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::transform::TransformSet;
use crate::uniforms::SceneUniforms;

/// Size of the drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Sink for everything a frame needs to be drawn.
///
/// Uniform setters update the values used by the next [`draw_mesh`] call;
/// they persist across draws until overwritten.
///
/// [`draw_mesh`]: ShadingBackend::draw_mesh
pub trait ShadingBackend {
    /// Compile and link `sources`, making `model` the active program.
    ///
    /// Fails with [`SceneError::ConfigurationFailure`].
    fn configure(&mut self, model: ShadingModel, sources: &ShaderSources) -> Result<()>;

    /// Upload the sphere mesh used by every draw.
    fn upload_mesh(&mut self, mesh: &SphereMesh) -> Result<()>;

    fn set_clear_color(&mut self, color: [f32; 4]);

    fn enable_depth_test(&mut self);

    /// Start a frame, clearing color and depth.
    fn begin_frame(&mut self, viewport: Viewport) -> Result<()>;

    fn set_light(&mut self, light: &Light);

    fn set_material(&mut self, material: &Material);

    fn set_transforms(&mut self, transforms: &TransformSet);

    /// Draw the mesh with the current uniforms.
    fn draw_mesh(&mut self) -> Result<()>;

    /// Submit the frame.
    fn end_frame(&mut self) -> Result<()>;
}

/// Back end that records uploads and draws instead of rendering.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    active_model: Option<ShadingModel>,
    configurations: Vec<ShadingModel>,
    mesh_vertices: Option<usize>,
    clear_color: [f32; 4],
    depth_test: bool,
    current: SceneUniforms,
    in_frame: bool,
    pending: Vec<SceneUniforms>,
    last_frame: Vec<SceneUniforms>,
    last_viewport: Option<Viewport>,
    frames: u64,
    fail_configure: Option<String>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A back end whose every `configure` call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_configure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn active_model(&self) -> Option<ShadingModel> {
        self.active_model
    }

    /// Every model successfully configured, in order.
    pub fn configurations(&self) -> &[ShadingModel] {
        &self.configurations
    }

    /// Vertex count of the uploaded mesh.
    pub fn mesh_vertices(&self) -> Option<usize> {
        self.mesh_vertices
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    /// Uniforms of each draw in the last completed frame.
    pub fn last_frame(&self) -> &[SceneUniforms] {
        &self.last_frame
    }

    pub fn last_viewport(&self) -> Option<Viewport> {
        self.last_viewport
    }

    /// Completed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl ShadingBackend for HeadlessBackend {
    fn configure(&mut self, model: ShadingModel, sources: &ShaderSources) -> Result<()> {
        let failure = |message: String| SceneError::ConfigurationFailure { model, message };

        if let Some(message) = &self.fail_configure {
            return Err(failure(message.clone()));
        }
        if !sources.vertex.contains(&format!("fn {}", VERTEX_ENTRY)) {
            return Err(failure(format!("vertex source has no `{}` entry point", VERTEX_ENTRY)));
        }
        if !sources.fragment.contains(&format!("fn {}", FRAGMENT_ENTRY)) {
            return Err(failure(format!("fragment source has no `{}` entry point", FRAGMENT_ENTRY)));
        }

        self.active_model = Some(model);
        self.configurations.push(model);
        Ok(())
    }

    fn upload_mesh(&mut self, mesh: &SphereMesh) -> Result<()> {
        self.mesh_vertices = Some(mesh.vertex_count());
        Ok(())
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    fn enable_depth_test(&mut self) {
        self.depth_test = true;
    }

    fn begin_frame(&mut self, viewport: Viewport) -> Result<()> {
        if self.in_frame {
            return Err(SceneError::Render("begin_frame called twice".into()));
        }
        self.in_frame = true;
        self.pending.clear();
        self.last_viewport = Some(viewport);
        Ok(())
    }

    fn set_light(&mut self, light: &Light) {
        self.current.set_light(light);
    }

    fn set_material(&mut self, material: &Material) {
        self.current.set_material(material);
    }

    fn set_transforms(&mut self, transforms: &TransformSet) {
        self.current.set_transforms(transforms);
    }

    fn draw_mesh(&mut self) -> Result<()> {
        if !self.in_frame {
            return Err(SceneError::Render("draw outside of a frame".into()));
        }
        if self.active_model.is_none() || self.mesh_vertices.is_none() {
            return Err(SceneError::Render("draw before program and mesh are ready".into()));
        }
        self.pending.push(self.current);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if !self.in_frame {
            return Err(SceneError::Render("end_frame without begin_frame".into()));
        }
        self.in_frame = false;
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames += 1;
        Ok(())
    }
}
