//! Benchmarks for mesh generation and CPU-side frame work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sphere_bounce::collision::{IntegrationMode, Walls};
use sphere_bounce::prelude::*;
use sphere_bounce::SphereMesh;

fn bench_mesh_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere_mesh");

    for depth in [2u32, 4, 6] {
        group.bench_with_input(BenchmarkId::new("generate", depth), &depth, |b, &depth| {
            b.iter(|| black_box(SphereMesh::generate(depth)))
        });
    }

    group.finish();
}

fn bench_wall_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("wall_step");

    let particle = Particle {
        position: Vec3::new(4.0, -4.0, 0.0),
        radius: 1.5,
        velocity: Vec3::new(0.6, -0.8, 0.0),
        color: [200, 40, 90],
    };

    for mode in [IntegrationMode::Compounding, IntegrationMode::SingleStep] {
        let walls = Walls {
            mode,
            ..Walls::default()
        };
        group.bench_function(format!("{:?}", mode), |b| {
            let mut p = particle;
            b.iter(|| {
                walls.step(&mut p);
                black_box(p.position)
            })
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_tick");
    let viewport = Viewport::new(800, 800);

    for count in [1usize, 10, 50] {
        let config = SceneConfig::default()
            .with_subdivision_depth(1)
            .with_initial_particles(count)
            .with_seed(42);
        let mut driver = match FrameDriver::new(config, HeadlessBackend::new()) {
            Ok(driver) => driver,
            Err(e) => panic!("invalid bench config: {}", e),
        };
        if let Err(e) = driver.start() {
            panic!("failed to start: {}", e);
        }

        group.bench_with_input(BenchmarkId::new("headless", count), &count, |b, _| {
            b.iter(|| black_box(driver.tick(viewport)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mesh_generation, bench_wall_step, bench_tick);
criterion_main!(benches);
