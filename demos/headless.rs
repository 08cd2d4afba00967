//! # Headless Run
//!
//! Drives the scene without a window and prints where each sphere ends up.
//!
//! Run with: `cargo run --example headless -- [frames] [spheres]`

use sphere_bounce::prelude::*;

fn main() -> Result<(), SceneError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);
    let spheres: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(8);

    let config = SceneConfig::new()
        .with_subdivision_depth(3)
        .with_max_particles(spheres.max(50))
        .with_initial_particles(spheres)
        .with_seed(2024);
    let mut driver = FrameDriver::new(config, HeadlessBackend::new())?;
    driver.start()?;
    if let Some(mesh) = driver.mesh() {
        println!("sphere mesh: {} triangles", mesh.triangle_count());
    }

    let viewport = Viewport::new(800, 800);
    let mut draws = 0;
    for frame in 0..frames {
        // Switch to per-fragment lighting halfway through
        if frame == frames / 2 {
            driver.submit(ControlRequest::SetShading(ShadingModel::Phong));
        }
        draws += driver.tick(viewport)?.draws;
    }

    println!("{} frames, {} draws, {} shading", frames, draws, driver.shading());
    for (i, p) in driver.particles().iter().enumerate() {
        println!(
            "  #{:<2} pos ({:6.2}, {:6.2})  r {:.2}  rgb {:?}",
            i, p.position.x, p.position.y, p.radius, p.color
        );
    }
    Ok(())
}
