//! Windowed host for the scene.
//!
//! [`App`] creates the window on `resumed`, builds a [`FrameDriver`] over a
//! [`WgpuBackend`] and ticks it on every redraw.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::backend::Viewport;
use crate::config::SceneConfig;
use crate::error::{AppError, SceneError};
use crate::frame::FrameDriver;
use crate::gpu::WgpuBackend;
use crate::input::{Command, Input};
use crate::time::Time;

const TITLE: &str = "Sphere Bounce";

/// Open a window and run the scene until it is closed.
pub fn run(config: SceneConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    driver: Option<FrameDriver<WgpuBackend>>,
    input: Input,
    time: Time,
    /// First fatal error; returned from [`run`] once the loop exits.
    error: Option<AppError>,
}

impl App {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            window: None,
            driver: None,
            input: Input::new(),
            time: Time::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(800, 800));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let backend = pollster::block_on(WgpuBackend::new(window.clone()))?;
        let mut driver = FrameDriver::new(self.config.clone(), backend)?;
        driver.start()?;

        window.request_redraw();
        self.window = Some(window);
        self.driver = Some(driver);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(driver)) = (&self.window, &mut self.driver) else {
            return;
        };

        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            // Minimized
            return;
        }

        match driver.tick(Viewport::new(size.width, size.height)) {
            Ok(stats) => {
                if self.time.update() {
                    window.set_title(&format!(
                        "{} - {} spheres - {} - {:.0} FPS",
                        TITLE,
                        stats.particles,
                        driver.shading(),
                        self.time.fps()
                    ));
                }
                window.request_redraw();
            }
            Err(SceneError::Render(message)) => {
                log::error!("Render error: {}", message);
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e.into()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(command) = self.input.handle_event(&event) {
            match command {
                Command::Quit => event_loop.exit(),
                Command::Scene(request) => {
                    if let Some(driver) = &mut self.driver {
                        driver.submit(request);
                    }
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed after {} frames", self.time.frame());
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(driver) = &mut self.driver {
                    driver
                        .backend_mut()
                        .resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
