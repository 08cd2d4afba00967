//! Error types for sphere-bounce.
//!
//! [`SceneError`] covers everything the simulate-and-render core can report.
//! [`GpuError`] and [`AppError`] belong to the `wgpu`/`winit` glue.

use std::path::PathBuf;

use thiserror::Error;

use crate::shader::ShadingModel;

/// Errors raised by the scene core and its shading back end.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The shading back end failed to compile or link a program.
    ///
    /// Fatal for rendering: no frame can be drawn without a valid program.
    #[error("failed to configure {model} shading: {message}")]
    ConfigurationFailure { model: ShadingModel, message: String },

    /// A saved transform was restored when none had been saved.
    #[error("matrix stack underflow: restore requested with no saved transform")]
    StackUnderflow,

    /// A parameter is outside its valid domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `tick` was called before `start`.
    #[error("frame driver has not been started")]
    NotStarted,

    /// The back end failed while submitting a frame.
    #[error("render error: {0}")]
    Render(String),

    /// A configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable texture format.
    #[error("surface has no supported texture format")]
    NoSurfaceFormat,
}

/// Errors that can occur when running the windowed application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// The scene could not be configured or started.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_failure_names_model() {
        let err = SceneError::ConfigurationFailure {
            model: ShadingModel::Phong,
            message: "bad entry point".into(),
        };
        let text = err.to_string();
        assert!(text.contains("Phong"));
        assert!(text.contains("bad entry point"));
    }

    #[test]
    fn test_scene_error_converts_into_app_error() {
        let app: AppError = SceneError::StackUnderflow.into();
        assert!(matches!(app, AppError::Scene(SceneError::StackUnderflow)));
        assert_eq!(app.to_string(), SceneError::StackUnderflow.to_string());
    }
}
