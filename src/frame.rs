//! Per-frame orchestration.
//!
//! [`FrameDriver`] owns the scene state and a [`ShadingBackend`]. The host
//! calls [`FrameDriver::start`] once, then [`FrameDriver::tick`] on every
//! display refresh. Everything runs on the caller's thread; input arrives as
//! [`ControlRequest`]s queued with [`FrameDriver::submit`] and applied at the
//! end of the next tick.
//!
//! ```ignore
//! let mut driver = FrameDriver::new(SceneConfig::default(), HeadlessBackend::new())?;
//! driver.start()?;
//! driver.submit(ControlRequest::Spawn);
//! let stats = driver.tick(Viewport::new(800, 600))?;
//! ```

use std::collections::VecDeque;

use crate::backend::{ShadingBackend, Viewport};
use crate::camera::{Camera, Projection};
use crate::collision::Walls;
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::lighting::{Light, Material};
use crate::mesh::SphereMesh;
use crate::particle::{Particle, ParticleStore};
use crate::shader::ShadingModel;
use crate::transform::{FrameTransforms, MatrixStack, TransformSet};

/// Lifecycle of a [`FrameDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Created, nothing uploaded yet.
    Idle,
    /// Started; ticks draw frames.
    Running,
}

/// Requests from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Add a batch of particles, up to the configured cap.
    Spawn,
    /// Remove every particle.
    Clear,
    /// Switch the active shading model.
    SetShading(ShadingModel),
    /// Change how many particles each `Spawn` adds.
    SetSpawnBatch(usize),
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// 1-based frame number.
    pub frame: u64,
    /// Particles alive after requests were applied.
    pub particles: usize,
    /// Draw calls issued.
    pub draws: usize,
}

/// Scene state shared by every component call within a frame.
pub struct SceneContext {
    pub particles: ParticleStore,
    pub camera: Camera,
    pub projection: Projection,
    pub walls: Walls,
    pub light: Light,
    pub shininess: f32,
}

impl SceneContext {
    pub fn from_config(config: &SceneConfig) -> Self {
        let particles = match config.seed {
            Some(seed) => ParticleStore::with_seed(config.spawn, seed),
            None => ParticleStore::new(config.spawn),
        };
        Self {
            particles,
            camera: Camera::from_config(&config.camera),
            projection: Projection::from_config(&config.projection),
            walls: Walls {
                bound: config.wall_bound,
                step_length: config.step_length,
                mode: config.integration,
            },
            light: Light::from_config(&config.light),
            shininess: config.shininess,
        }
    }
}

/// Drives the simulate-and-draw loop.
pub struct FrameDriver<B: ShadingBackend> {
    config: SceneConfig,
    context: SceneContext,
    backend: B,
    state: DriverState,
    shading: ShadingModel,
    mesh: Option<SphereMesh>,
    requests: VecDeque<ControlRequest>,
    frame: u64,
}

impl<B: ShadingBackend> FrameDriver<B> {
    /// Validate `config` and create an idle driver.
    pub fn new(config: SceneConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            context: SceneContext::from_config(&config),
            shading: config.shading,
            config,
            backend,
            state: DriverState::Idle,
            mesh: None,
            requests: VecDeque::new(),
            frame: 0,
        })
    }

    /// Build and upload the mesh, configure shading and spawn the initial particles.
    pub fn start(&mut self) -> Result<()> {
        if self.state == DriverState::Running {
            log::warn!("Frame driver already running; ignoring start");
            return Ok(());
        }

        let mesh = SphereMesh::generate(self.config.subdivision_depth)?;
        self.backend.upload_mesh(&mesh)?;
        self.mesh = Some(mesh);

        self.configure_shading(self.shading)?;
        self.backend.set_clear_color(self.config.clear_color);
        self.backend.enable_depth_test();

        self.context.particles.spawn(self.config.initial_particles);
        self.state = DriverState::Running;
        log::info!(
            "Scene started: {} shading, {} particle(s)",
            self.shading,
            self.context.particles.len()
        );
        Ok(())
    }

    /// Simulate and draw one frame, then apply queued requests.
    pub fn tick(&mut self, viewport: Viewport) -> Result<FrameStats> {
        if self.state != DriverState::Running {
            return Err(SceneError::NotStarted);
        }

        self.backend.begin_frame(viewport)?;
        let frame = FrameTransforms::new(&self.context.camera, &self.context.projection, viewport);
        let drawn = self.draw_particles(&frame);
        // Submit whatever was drawn even if a particle failed.
        self.backend.end_frame()?;
        self.frame += 1;
        let draws = drawn?;

        while let Some(request) = self.requests.pop_front() {
            self.apply(request)?;
        }

        Ok(FrameStats {
            frame: self.frame,
            particles: self.context.particles.len(),
            draws,
        })
    }

    fn draw_particles(&mut self, frame: &FrameTransforms) -> Result<usize> {
        let mut stack = MatrixStack::new(frame.view);
        let ctx = &mut self.context;
        let mut draws = 0;

        for particle in ctx.particles.iter_mut() {
            ctx.walls.step(particle);

            let transforms = TransformSet::for_particle(&mut stack, frame, particle)?;
            let material = Material::for_particle(particle, ctx.shininess);

            self.backend.set_light(&ctx.light);
            self.backend.set_material(&material);
            self.backend.set_transforms(&transforms);
            self.backend.draw_mesh()?;
            draws += 1;
        }
        Ok(draws)
    }

    /// Queue a request for the end of the next tick.
    pub fn submit(&mut self, request: ControlRequest) {
        self.requests.push_back(request);
    }

    /// Apply a request immediately.
    pub fn apply(&mut self, request: ControlRequest) -> Result<()> {
        match request {
            ControlRequest::Spawn => self.spawn_requested(),
            ControlRequest::Clear => {
                self.context.particles.clear();
                log::info!("Cleared all particles");
            }
            ControlRequest::SetShading(model) => {
                if self.state == DriverState::Running {
                    self.configure_shading(model)?;
                } else {
                    self.shading = model;
                }
            }
            ControlRequest::SetSpawnBatch(0) => {
                log::warn!("Spawn batch must be at least 1; keeping {}", self.config.spawn_batch);
            }
            ControlRequest::SetSpawnBatch(batch) => {
                self.config.spawn_batch = batch;
                log::info!("Spawning {} particle(s) per request", batch);
            }
        }
        Ok(())
    }

    /// Add a hand-built particle, subject to the particle cap.
    pub fn add_particle(&mut self, particle: Particle) -> Result<()> {
        if self.context.particles.len() >= self.config.max_particles {
            return Err(SceneError::InvalidArgument(format!(
                "particle cap of {} reached",
                self.config.max_particles
            )));
        }
        self.context.particles.push(particle)
    }

    fn spawn_requested(&mut self) {
        let len = self.context.particles.len();
        let room = self.config.max_particles.saturating_sub(len);
        let count = self.config.spawn_batch.min(room);
        if count == 0 {
            log::warn!("Particle cap of {} reached; spawn ignored", self.config.max_particles);
            return;
        }
        self.context.particles.spawn(count);
        log::info!("Spawned {} particle(s), {} total", count, len + count);
    }

    fn configure_shading(&mut self, model: ShadingModel) -> Result<()> {
        let sources = model.sources();
        if let Err(e) = self.backend.configure(model, &sources) {
            log::error!("{}", e);
            return Err(e);
        }
        self.shading = model;
        log::info!("Using {} shading", model);
        Ok(())
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn shading(&self) -> ShadingModel {
        self.shading
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.context.particles
    }

    /// Particles added by each `Spawn` request.
    pub fn spawn_batch(&self) -> usize {
        self.config.spawn_batch
    }

    /// The mesh built by `start`.
    pub fn mesh(&self) -> Option<&SphereMesh> {
        self.mesh.as_ref()
    }

    /// Requests waiting for the next tick.
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    fn driver(config: SceneConfig) -> FrameDriver<HeadlessBackend> {
        FrameDriver::new(config.with_subdivision_depth(1).with_seed(11), HeadlessBackend::new())
            .unwrap()
    }

    #[test]
    fn test_tick_before_start_fails() {
        let mut d = driver(SceneConfig::default());
        assert_eq!(d.state(), DriverState::Idle);
        assert!(matches!(d.tick(Viewport::new(8, 8)), Err(SceneError::NotStarted)));
    }

    #[test]
    fn test_start_prepares_backend() {
        let mut d = driver(SceneConfig::default());
        d.start().unwrap();
        assert_eq!(d.state(), DriverState::Running);
        assert_eq!(d.particles().len(), 1);
        assert_eq!(d.backend().mesh_vertices(), Some(8 * 4 * 3));
        assert_eq!(d.backend().active_model(), Some(ShadingModel::Gouraud));
        assert!(d.backend().depth_test_enabled());
        assert_eq!(d.backend().clear_color(), [0.0, 0.0, 0.0, 1.0]);

        // A second start changes nothing.
        d.start().unwrap();
        assert_eq!(d.particles().len(), 1);
    }

    #[test]
    fn test_requests_apply_after_drawing() {
        let mut d = driver(SceneConfig::default());
        d.start().unwrap();
        d.submit(ControlRequest::Spawn);
        assert_eq!(d.pending_requests(), 1);

        let stats = d.tick(Viewport::new(64, 64)).unwrap();
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.particles, 2);
        assert_eq!(d.pending_requests(), 0);

        let stats = d.tick(Viewport::new(64, 64)).unwrap();
        assert_eq!(stats.draws, 2);
        assert_eq!(stats.frame, 2);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut d = driver(SceneConfig::default().with_max_particles(5).with_spawn_batch(3));
        d.start().unwrap();
        d.apply(ControlRequest::Spawn).unwrap();
        assert_eq!(d.particles().len(), 4);
        d.apply(ControlRequest::Spawn).unwrap();
        assert_eq!(d.particles().len(), 5);
        d.apply(ControlRequest::Spawn).unwrap();
        assert_eq!(d.particles().len(), 5);
    }

    #[test]
    fn test_clear_then_tick_draws_nothing() {
        let mut d = driver(SceneConfig::default().with_initial_particles(4));
        d.start().unwrap();
        d.apply(ControlRequest::Clear).unwrap();
        d.apply(ControlRequest::Clear).unwrap();
        let stats = d.tick(Viewport::new(64, 64)).unwrap();
        assert_eq!(stats.draws, 0);
        assert!(d.backend().last_frame().is_empty());
    }

    #[test]
    fn test_switch_shading_reconfigures() {
        let mut d = driver(SceneConfig::default());
        d.start().unwrap();
        d.submit(ControlRequest::SetShading(ShadingModel::Phong));
        d.tick(Viewport::new(64, 64)).unwrap();
        assert_eq!(d.shading(), ShadingModel::Phong);
        assert_eq!(
            d.backend().configurations(),
            &[ShadingModel::Gouraud, ShadingModel::Phong]
        );
    }

    #[test]
    fn test_shading_set_while_idle_used_at_start() {
        let mut d = driver(SceneConfig::default());
        d.apply(ControlRequest::SetShading(ShadingModel::Phong)).unwrap();
        assert!(d.backend().configurations().is_empty());
        d.start().unwrap();
        assert_eq!(d.backend().configurations(), &[ShadingModel::Phong]);
    }

    #[test]
    fn test_configuration_failure_is_fatal_to_start() {
        let config = SceneConfig::default().with_subdivision_depth(0);
        let mut d = FrameDriver::new(config, HeadlessBackend::failing("no GPU")).unwrap();
        let err = d.start().unwrap_err();
        assert!(matches!(err, SceneError::ConfigurationFailure { .. }));
        assert_eq!(d.state(), DriverState::Idle);
    }

    #[test]
    fn test_mesh_built_on_start() {
        let mut d = driver(SceneConfig::default());
        assert!(d.mesh().is_none());
        d.start().unwrap();
        assert_eq!(d.mesh().map(SphereMesh::triangle_count), Some(32));
    }

    #[test]
    fn test_spawn_batch_can_change() {
        let mut d = driver(SceneConfig::default().with_max_particles(10));
        d.start().unwrap();
        d.submit(ControlRequest::SetSpawnBatch(4));
        d.submit(ControlRequest::Spawn);
        d.tick(Viewport::new(64, 64)).unwrap();
        assert_eq!(d.spawn_batch(), 4);
        assert_eq!(d.particles().len(), 5);

        // Zero is ignored
        d.apply(ControlRequest::SetSpawnBatch(0)).unwrap();
        assert_eq!(d.spawn_batch(), 4);
        d.apply(ControlRequest::Spawn).unwrap();
        d.apply(ControlRequest::Spawn).unwrap();
        assert_eq!(d.particles().len(), 10);
    }

    fn hand_built(radius: f32) -> Particle {
        Particle {
            position: glam::Vec3::new(1.0, 1.0, 0.0),
            radius,
            velocity: glam::Vec3::X,
            color: [10, 20, 30],
        }
    }

    #[test]
    fn test_add_particle_rejects_zero_radius() {
        let mut d = driver(SceneConfig::default());
        d.start().unwrap();
        let err = d.add_particle(hand_built(0.0)).unwrap_err();
        assert!(matches!(err, SceneError::InvalidArgument(_)));
        assert_eq!(d.particles().len(), 1);

        d.add_particle(hand_built(0.5)).unwrap();
        let stats = d.tick(Viewport::new(64, 64)).unwrap();
        assert_eq!(stats.draws, 2);
        for draw in d.backend().last_frame() {
            assert!(draw.normal.iter().flatten().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_add_particle_respects_cap() {
        let mut d = driver(SceneConfig::default().with_max_particles(2));
        d.start().unwrap();
        d.add_particle(hand_built(1.0)).unwrap();
        assert!(d.add_particle(hand_built(1.0)).is_err());
        assert_eq!(d.particles().len(), 2);
    }

    #[test]
    fn test_initial_particles_over_cap_rejected() {
        let result = FrameDriver::new(
            SceneConfig::default().with_initial_particles(80),
            HeadlessBackend::new(),
        );
        assert!(matches!(result, Err(SceneError::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = FrameDriver::new(
            SceneConfig::default().with_step_length(-1.0),
            HeadlessBackend::new(),
        );
        assert!(matches!(result, Err(SceneError::InvalidArgument(_))));
    }
}
