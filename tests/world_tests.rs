use letterfall::{
    BodyDesc, NoOpStepObserver, SceneError, Shape, StepCounter, Vec2, Viewport, World, WorldConfig,
};
use letterfall::vec::Vec as _;

fn world() -> World<f64> {
    World::create(WorldConfig::new(), Viewport::new(1000.0, 1000.0)).unwrap()
}

fn ball(x: f64, y: f64, r: f64) -> BodyDesc<f64> {
    BodyDesc::dynamic(Shape::circle(r).unwrap()).with_position(Vec2::new(x, y))
}

#[test]
fn free_fall_follows_gravity() {
    let mut w = world();
    let id = w.add_body(ball(500.0, 100.0, 10.0)).unwrap();

    // half a second at 120 Hz
    for _ in 0..60 {
        w.step(&mut NoOpStepObserver);
    }

    // dv/dt = g - k v with k = -ln(damping)
    let (g, t) = (1000.0f64, 0.5f64);
    let k = -WorldConfig::<f64>::new().damping.ln();
    let expected_y = 100.0 + g / k * (t - (1.0 - (-k * t).exp()) / k);
    let expected_vy = g / k * (1.0 - (-k * t).exp());

    let y = w.body(id).unwrap().pos.y;
    let vy = w.velocity(id).unwrap().y;
    assert!((y - expected_y).abs() < 5.0, "y = {}, expected ~ {}", y, expected_y);
    assert!((vy - expected_vy).abs() < 15.0, "vy = {}, expected ~ {}", vy, expected_vy);
}

#[test]
fn damping_does_not_depend_on_sub_steps() {
    let fall = |sub_steps: usize| {
        let config = WorldConfig::new().with_sub_steps(sub_steps);
        let mut w: World<f64> = World::create(config, Viewport::new(1000.0, 5000.0)).unwrap();
        let id = w.add_body(ball(500.0, 100.0, 10.0)).unwrap();
        // two seconds
        for _ in 0..240 {
            w.step(&mut NoOpStepObserver);
        }
        (w.body(id).unwrap().pos.y, w.velocity(id).unwrap().y)
    };

    let (y1, vy1) = fall(1);
    let (y4, vy4) = fall(4);
    assert!((y1 - y4).abs() < 15.0, "y: {} vs {}", y1, y4);
    assert!((vy1 - vy4).abs() < 10.0, "vy: {} vs {}", vy1, vy4);
    // well clear of a low terminal speed
    assert!(vy4 > 1400.0, "vy = {}", vy4);
}

#[test]
fn empty_world_steps_without_panicking() {
    let mut w = world();
    for _ in 0..10 {
        w.step(&mut NoOpStepObserver);
    }
    assert_eq!(w.step_count(), 10);
    assert_eq!(w.body_count(), 0);
}

#[test]
fn static_body_ignores_gravity_and_forces() {
    let mut w = world();
    let id = w
        .add_body(BodyDesc::fixed(Shape::rect(100.0, 20.0).unwrap()).with_position(Vec2::new(300.0, 300.0)))
        .unwrap();
    w.apply_force(id, Vec2::new(1.0e6, 1.0e6)).unwrap();
    w.set_velocity(id, Vec2::new(500.0, 0.0)).unwrap();
    for _ in 0..30 {
        w.step(&mut NoOpStepObserver);
    }
    let body = w.body(id).unwrap();
    assert_eq!(body.pos, Vec2::new(300.0, 300.0));
    assert_eq!(body.angle, 0.0);
}

#[test]
fn ball_comes_to_rest_on_ground() {
    let mut w = world();
    w.add_body(BodyDesc::fixed(Shape::rect(400.0, 20.0).unwrap()).with_position(Vec2::new(500.0, 300.0)))
        .unwrap();
    let id = w.add_body(ball(500.0, 200.0, 10.0)).unwrap();

    for _ in 0..360 {
        w.step(&mut NoOpStepObserver);
    }

    let body = w.body(id).unwrap();
    assert!((body.pos.y - 280.0).abs() < 1.5, "resting y = {}", body.pos.y);
    assert!(w.velocity(id).unwrap().length() < 5.0);
}

#[test]
fn removed_id_is_stale_even_after_slot_reuse() {
    let mut w = world();
    let first = w.add_body(ball(100.0, 100.0, 5.0)).unwrap();
    w.remove_body(first).unwrap();
    let second = w.add_body(ball(200.0, 100.0, 5.0)).unwrap();

    assert_eq!(first.index(), second.index());
    assert_ne!(first.generation(), second.generation());
    assert!(!w.contains(first));
    assert!(w.body(first).is_none());
    assert_eq!(w.remove_body(first).unwrap_err(), SceneError::StaleBody { id: first });
    assert_eq!(w.set_velocity(first, Vec2::zero()), Err(SceneError::StaleBody { id: first }));
}

#[test]
fn set_velocity_is_read_back() {
    let mut w = world();
    let id = w.add_body(ball(500.0, 500.0, 5.0)).unwrap();
    w.set_velocity(id, Vec2::new(120.0, -40.0)).unwrap();
    let v = w.velocity(id).unwrap();
    assert!((v.x - 120.0).abs() < 1e-9);
    assert!((v.y + 40.0).abs() < 1e-9);
}

#[test]
fn place_stops_the_body() {
    let mut w = world();
    let id = w.add_body(ball(500.0, 100.0, 5.0).with_velocity(Vec2::new(300.0, 0.0))).unwrap();
    w.place(id, Vec2::new(50.0, 50.0)).unwrap();
    let body = w.body(id).unwrap();
    assert_eq!(body.pos, Vec2::new(50.0, 50.0));
    assert_eq!(w.velocity(id).unwrap(), Vec2::zero());
}

#[test]
fn set_position_keeps_velocity() {
    let mut w = world();
    let id = w.add_body(ball(500.0, 100.0, 5.0).with_velocity(Vec2::new(300.0, 0.0))).unwrap();
    w.set_position(id, Vec2::new(50.0, 50.0)).unwrap();
    let v = w.velocity(id).unwrap();
    assert!((v.x - 300.0).abs() < 1e-9, "v = {:?}", v);
}

#[test]
fn bounds_keep_bodies_inside_sides_and_floor() {
    let mut w = World::create(WorldConfig::new(), Viewport::new(200.0, 200.0)).unwrap();
    let id = w
        .add_body(ball(100.0, 100.0, 10.0).with_velocity(Vec2::new(2000.0, 0.0)))
        .unwrap();
    for _ in 0..240 {
        w.step(&mut NoOpStepObserver);
        let p = w.body(id).unwrap().pos;
        assert!(p.x >= 10.0 - 1e-6 && p.x <= 190.0 + 1e-6, "x escaped: {}", p.x);
        assert!(p.y <= 190.0 + 1e-6, "y escaped: {}", p.y);
    }
}

#[test]
fn shrinking_bounds_then_clamp_pulls_bodies_in() {
    let mut w = world();
    let id = w.add_body(ball(900.0, 500.0, 10.0)).unwrap();
    w.set_bounds(Viewport::new(400.0, 600.0)).unwrap();
    assert_eq!(w.clamp_to_bounds(), 1);
    assert!(w.body(id).unwrap().pos.x <= 390.0 + 1e-9);
    assert_eq!(w.clamp_to_bounds(), 0);
}

#[test]
fn drag_pulls_body_toward_pointer() {
    let mut w = World::create(
        WorldConfig::new().with_gravity(Vec2::zero()),
        Viewport::new(1000.0, 1000.0),
    )
    .unwrap();
    let id = w.add_body(ball(300.0, 300.0, 20.0)).unwrap();

    assert_eq!(w.attach_drag(Vec2::new(305.0, 300.0), u32::MAX, 0.2), Some(id));
    w.move_drag(Vec2::new(605.0, 300.0));
    for _ in 0..120 {
        w.step(&mut NoOpStepObserver);
    }
    let x = w.body(id).unwrap().pos.x;
    assert!(x > 550.0, "dragged body only reached x = {}", x);
    assert_eq!(w.release_drag(), Some(id));
    assert!(w.drag().is_none());
}

#[test]
fn drag_misses_static_and_filtered_bodies() {
    let mut w = world();
    w.add_body(BodyDesc::fixed(Shape::rect(100.0, 100.0).unwrap()).with_position(Vec2::new(100.0, 100.0)))
        .unwrap();
    assert!(w.attach_drag(Vec2::new(100.0, 100.0), u32::MAX, 0.2).is_none());

    w.add_body(ball(400.0, 400.0, 20.0)).unwrap();
    assert!(w.attach_drag(Vec2::new(400.0, 400.0), 0b10, 0.2).is_none());
}

#[test]
fn removing_dragged_body_clears_drag() {
    let mut w = world();
    let id = w.add_body(ball(300.0, 300.0, 20.0)).unwrap();
    w.attach_drag(Vec2::new(300.0, 300.0), u32::MAX, 0.2).unwrap();
    w.remove_body(id).unwrap();
    assert!(w.drag().is_none());
    w.step(&mut NoOpStepObserver);
}

#[test]
fn observer_counts_steps_and_contacts() {
    let mut w = world();
    w.add_body(BodyDesc::fixed(Shape::rect(400.0, 20.0).unwrap()).with_position(Vec2::new(500.0, 300.0)))
        .unwrap();
    w.add_body(ball(500.0, 285.0, 10.0)).unwrap();

    let mut counter = StepCounter::default();
    for _ in 0..5 {
        w.step(&mut counter);
    }
    assert_eq!(counter.steps, 5);
    assert_eq!(counter.sub_steps, 10);
    assert!(counter.contacts > 0);
}

#[test]
fn destroy_is_idempotent_and_rejects_new_work() {
    let mut w = world();
    let id = w.add_body(ball(100.0, 100.0, 5.0)).unwrap();
    w.destroy();
    w.destroy();
    assert!(w.is_destroyed());
    assert_eq!(w.body_count(), 0);
    assert!(!w.contains(id));
    assert_eq!(w.add_body(ball(0.0, 0.0, 1.0)).unwrap_err(), SceneError::Destroyed);
    w.step(&mut NoOpStepObserver);
    assert_eq!(w.step_count(), 0);
}

#[test]
fn unready_viewport_is_rejected() {
    let err = World::<f32>::create(WorldConfig::new(), Viewport::new(0.0, 600.0)).unwrap_err();
    assert!(matches!(err, SceneError::LayoutNotReady { .. }));
}
