//! Bouncing spheres in a box.
//!
//! Usage: `sphere-bounce [config.json]`

use sphere_bounce::error::AppError;
use sphere_bounce::{window, SceneConfig};

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path.to_string_lossy());
            SceneConfig::from_json_file(path)?
        }
        None => SceneConfig::default(),
    };
    config.validate()?;

    window::run(config)
}
