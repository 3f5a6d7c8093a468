//! Benchmarks for letterfall simulation.

use criterion::{criterion_group, criterion_main, Criterion};
use letterfall::*;

fn bench_world_stepping(c: &mut Criterion) {
    c.bench_function("world_20_balls_120_steps", |b| {
        b.iter(|| {
            let mut world: World<f32> = World::create(WorldConfig::new(), Viewport::new(1200.0, 800.0)).unwrap();
            world
                .add_body(
                    BodyDesc::fixed(Shape::rect(1200.0, 60.0).unwrap()).with_position(Vec2::new(600.0, 770.0)),
                )
                .unwrap();
            for i in 0..20 {
                let x = 100.0 + (i % 10) as f32 * 100.0;
                let y = 100.0 - (i / 10) as f32 * 150.0;
                world
                    .add_body(BodyDesc::dynamic(Shape::circle(35.0).unwrap()).with_position(Vec2::new(x, y)))
                    .unwrap();
            }
            for _ in 0..120 {
                world.step(&mut NoOpStepObserver);
            }
            world.step_count()
        });
    });
}

fn bench_scene_frames(c: &mut Criterion) {
    c.bench_function("scene_portfolio_60_frames", |b| {
        b.iter(|| {
            let mut handle: SimulationHandle<f32> =
                SimulationHandle::create(SceneConfig::new(), Viewport::new(1200.0, 800.0), HoverSlot::new(), None)
                    .unwrap();
            handle.frame(0.0);
            for i in 0..9 {
                handle.on_pointer_enter(HoverTarget::Letter(i));
            }
            let mut now = 0.0;
            for _ in 0..60 {
                now += 1000.0 / 60.0;
                handle.frame(now);
            }
            handle.world().step_count()
        });
    });
}

fn bench_follower(c: &mut Criterion) {
    c.bench_function("follower_with_trail_1000_frames", |b| {
        b.iter(|| {
            let config = FollowerConfig::new().with_trail(5, 0.75);
            let mut follower = CursorFollower::new(config, Vec2::new(0.0f32, 0.0)).unwrap();
            for i in 0..1000 {
                let t = i as f32 * 0.01;
                follower.on_pointer_move(Vec2::new(t.cos() * 400.0, t.sin() * 300.0));
                follower.update();
            }
            follower.position()
        });
    });
}

criterion_group!(benches, bench_world_stepping, bench_scene_frames, bench_follower);
criterion_main!(benches);
