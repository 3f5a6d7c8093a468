use letterfall::{
    EntityId, EntityMode, EntitySpec, Registry, SceneError, Shape, Vec2, Viewport, World, WorldConfig,
};
use proptest::prelude::*;

fn setup() -> (World<f64>, Registry<f64>) {
    let world = World::create(WorldConfig::new(), Viewport::new(800.0, 600.0)).unwrap();
    let mut registry = Registry::new();
    for i in 0..3 {
        registry
            .insert(EntityId::Letter(i), EntitySpec::new(Shape::rect(32.0, 48.0).unwrap()))
            .unwrap();
    }
    (world, registry)
}

#[test]
fn new_entities_start_detached() {
    let (_, registry) = setup();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.mode(EntityId::Letter(0)), Some(EntityMode::Detached));
    assert!(registry.body(EntityId::Letter(0)).is_none());
    assert!(registry.mode(EntityId::Ball(0)).is_none());
}

#[test]
fn duplicate_insert_is_rejected() {
    let (_, mut registry) = setup();
    let err = registry
        .insert(EntityId::Letter(0), EntitySpec::new(Shape::circle(5.0).unwrap()))
        .unwrap_err();
    assert!(matches!(err, SceneError::InvalidConfig(_)));
}

#[test]
fn unknown_entity_is_an_error() {
    let (mut world, mut registry) = setup();
    assert_eq!(
        registry.anchor(&mut world, EntityId::Ground, Vec2::new(0.0, 0.0)),
        Err(SceneError::UnknownEntity)
    );
}

#[test]
fn anchor_creates_static_body_at_rest() {
    let (mut world, mut registry) = setup();
    let id = EntityId::Letter(1);
    let body = registry.anchor(&mut world, id, Vec2::new(100.0, 200.0)).unwrap();

    assert_eq!(registry.mode(id), Some(EntityMode::Anchored));
    assert_eq!(registry.entity_of(body), Some(id));
    let b = world.body(body).unwrap();
    assert!(b.is_static());
    assert_eq!(b.pos, Vec2::new(100.0, 200.0));
}

#[test]
fn anchoring_twice_is_a_no_op() {
    let (mut world, mut registry) = setup();
    let id = EntityId::Letter(0);
    let first = registry.anchor(&mut world, id, Vec2::new(10.0, 20.0)).unwrap();
    let second = registry.anchor(&mut world, id, Vec2::new(10.0, 20.0)).unwrap();
    assert_eq!(first, second);
    assert_eq!(world.body_count(), 1);
}

#[test]
fn anchoring_at_new_position_moves_the_same_body() {
    let (mut world, mut registry) = setup();
    let id = EntityId::Letter(0);
    let first = registry.anchor(&mut world, id, Vec2::new(10.0, 20.0)).unwrap();
    let second = registry.anchor(&mut world, id, Vec2::new(50.0, 60.0)).unwrap();
    assert_eq!(first, second);
    assert_eq!(world.body(second).unwrap().pos, Vec2::new(50.0, 60.0));
}

#[test]
fn release_replaces_static_body_with_dynamic_one() {
    let (mut world, mut registry) = setup();
    let id = EntityId::Letter(2);
    let anchored = registry.anchor(&mut world, id, Vec2::new(100.0, 100.0)).unwrap();
    let free = registry
        .release(&mut world, id, Vec2::new(100.0, 100.0), Vec2::new(0.0, 50.0))
        .unwrap();

    assert_ne!(anchored, free);
    assert!(!world.contains(anchored));
    assert!(!world.body(free).unwrap().is_static());
    assert_eq!(world.body_count(), 1);
    assert_eq!(registry.mode(id), Some(EntityMode::Free));
    assert!((world.velocity(free).unwrap().y - 50.0).abs() < 1e-9);

    let again = registry.release(&mut world, id, Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0)).unwrap();
    assert_eq!(again, free);
}

#[test]
fn detach_removes_body() {
    let (mut world, mut registry) = setup();
    let id = EntityId::Letter(0);
    registry.release(&mut world, id, Vec2::new(100.0, 100.0), Vec2::new(0.0, 0.0)).unwrap();
    registry.detach(&mut world, id).unwrap();
    assert_eq!(registry.mode(id), Some(EntityMode::Detached));
    assert!(registry.body(id).is_none());
    assert_eq!(world.body_count(), 0);

    registry.detach(&mut world, id).unwrap();
}

#[test]
fn anchor_recovers_when_body_was_removed_behind_its_back() {
    let (mut world, mut registry) = setup();
    let id = EntityId::Letter(0);
    let body = registry.anchor(&mut world, id, Vec2::new(10.0, 10.0)).unwrap();
    world.remove_body(body).unwrap();

    let replacement = registry.anchor(&mut world, id, Vec2::new(10.0, 10.0)).unwrap();
    assert_ne!(body, replacement);
    assert!(world.contains(replacement));
    assert_eq!(world.body_count(), 1);
}

#[test]
fn free_entities_lists_only_free_ones() {
    let (mut world, mut registry) = setup();
    registry.anchor(&mut world, EntityId::Letter(0), Vec2::new(0.0, 0.0)).unwrap();
    registry.release(&mut world, EntityId::Letter(1), Vec2::new(50.0, 0.0), Vec2::new(0.0, 0.0)).unwrap();
    assert_eq!(registry.free_entities(), vec![EntityId::Letter(1)]);
}

#[test]
fn remove_forgets_entity_and_its_body() {
    let (mut world, mut registry) = setup();
    registry.anchor(&mut world, EntityId::Letter(0), Vec2::new(0.0, 0.0)).unwrap();
    registry.remove(&mut world, EntityId::Letter(0)).unwrap();
    assert!(!registry.contains(EntityId::Letter(0)));
    assert_eq!(world.body_count(), 0);
}

#[derive(Clone, Debug)]
enum Op {
    Anchor(u16, f64, f64),
    Release(u16, f64, f64),
    Detach(u16),
    Step,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u16..3, 50.0..750.0f64, 50.0..550.0f64).prop_map(|(i, x, y)| Op::Anchor(i, x, y)),
        (0u16..3, 50.0..750.0f64, 50.0..550.0f64).prop_map(|(i, x, y)| Op::Release(i, x, y)),
        (0u16..3).prop_map(Op::Detach),
        Just(Op::Step),
    ]
}

proptest! {
    #[test]
    fn at_most_one_body_per_entity(ops in proptest::collection::vec(op(), 1..60)) {
        let (mut world, mut registry) = setup();
        for op in ops {
            match op {
                Op::Anchor(i, x, y) => {
                    registry.anchor(&mut world, EntityId::Letter(i), Vec2::new(x, y)).unwrap();
                }
                Op::Release(i, x, y) => {
                    registry
                        .release(&mut world, EntityId::Letter(i), Vec2::new(x, y), Vec2::new(0.0, 0.0))
                        .unwrap();
                }
                Op::Detach(i) => registry.detach(&mut world, EntityId::Letter(i)).unwrap(),
                Op::Step => world.step(&mut letterfall::NoOpStepObserver),
            }

            let mut with_body = 0;
            for (id, mode, body) in registry.iter() {
                match mode {
                    EntityMode::Detached => prop_assert!(body.is_none()),
                    EntityMode::Anchored | EntityMode::Free => {
                        let body = body.expect("attached entity has a body");
                        prop_assert!(world.contains(body));
                        prop_assert_eq!(registry.entity_of(body), Some(id));
                        prop_assert_eq!(world.body(body).unwrap().is_static(), mode == EntityMode::Anchored);
                        with_body += 1;
                    }
                }
            }
            prop_assert_eq!(world.body_count(), with_body);
        }
    }
}
