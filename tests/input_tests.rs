use letterfall::{
    EntityId, EntityMode, EntitySpec, HoverSlot, HoverTarget, InputAdapter, InputContext, InputTuning,
    NavItem, Registry, RestLayout, Returns, SceneConfig, Shape, Vec2, Viewport, World,
};
use letterfall::vec::Vec as _;

struct Fixture {
    config: SceneConfig<f64>,
    world: World<f64>,
    registry: Registry<f64>,
    layout: RestLayout<f64>,
    returns: Returns<f64>,
    hover: HoverSlot<f64>,
    input: InputAdapter<f64>,
}

impl Fixture {
    fn new(letters: &str) -> Self {
        let config = SceneConfig::new().with_letters(letters).without_balls();
        let viewport = Viewport::new(1200.0, 800.0);
        let layout = RestLayout::compute(&config, viewport).unwrap();
        let mut world = World::create(config.world.clone(), viewport).unwrap();
        let mut registry = Registry::new();
        let size = layout.letter_size();
        for (id, rest) in layout.letters() {
            registry
                .insert(id, EntitySpec::new(Shape::rect(size.x, size.y).unwrap()))
                .unwrap();
            registry.anchor(&mut world, id, rest).unwrap();
        }
        Fixture {
            returns: Returns::new(config.fly_back_ms, config.easing),
            input: InputAdapter::new(InputTuning::from_config(&config), config.seed),
            hover: HoverSlot::new(),
            config,
            world,
            registry,
            layout,
        }
    }

    fn run<R>(&mut self, f: impl FnOnce(&mut InputAdapter<f64>, &mut InputContext<'_, f64>) -> R) -> R {
        let mut ctx = InputContext {
            world: &mut self.world,
            registry: &mut self.registry,
            layout: &self.layout,
            returns: &mut self.returns,
            hover: &self.hover,
        };
        f(&mut self.input, &mut ctx)
    }

    fn release(&mut self, index: u16) {
        assert!(self.run(|input, ctx| input.on_pointer_enter(ctx, HoverTarget::Letter(index))));
    }
}

#[test]
fn hovering_anchored_letter_releases_it_at_rest() {
    let mut fx = Fixture::new("ABC");
    let rest = fx.layout.position(EntityId::Letter(1)).unwrap();
    fx.release(1);

    assert_eq!(fx.registry.mode(EntityId::Letter(1)), Some(EntityMode::Free));
    let body = fx.registry.body(EntityId::Letter(1)).unwrap();
    assert_eq!(fx.world.body(body).unwrap().pos, rest);
    assert_eq!(fx.world.velocity(body).unwrap(), Vec2::zero());

    // a second hover on a free letter does nothing
    assert!(!fx.run(|input, ctx| input.on_pointer_enter(ctx, HoverTarget::Letter(1))));
    assert_eq!(fx.registry.body(EntityId::Letter(1)), Some(body));
}

#[test]
fn hovering_unknown_letter_is_ignored() {
    let mut fx = Fixture::new("AB");
    assert!(!fx.run(|input, ctx| input.on_pointer_enter(ctx, HoverTarget::Letter(9))));
}

#[test]
fn nav_hover_sets_and_leave_clears_the_slot() {
    let mut fx = Fixture::new("AB");
    let center = Vec2::new(600.0, 40.0);
    fx.run(|input, ctx| input.on_pointer_enter(ctx, HoverTarget::Nav { label: "About", center }));

    let state = fx.hover.get();
    assert!(state.hovered);
    assert_eq!(state.label.as_deref(), Some("About"));
    assert_eq!(state.target, Some(center));

    fx.run(|input, ctx| input.on_pointer_leave(ctx));
    assert_eq!(fx.hover.get(), Default::default());
}

#[test]
fn nav_click_clears_hover_and_requests_navigation() {
    let mut fx = Fixture::new("AB");
    fx.hover.set_hovered(true, Some("Projects"), Some(Vec2::new(1.0, 2.0)));
    let item = NavItem::new("Projects", "/projects");
    let request = fx.run(|input, ctx| input.on_nav_click(ctx, &item));

    assert_eq!(request.path, "/projects");
    assert_eq!(request.delay_ms, fx.config.nav_exit_delay_ms);
    assert!(!fx.hover.is_hovered());
}

#[test]
fn pointer_pushes_nearby_free_letters_away() {
    let mut fx = Fixture::new("ABC");
    fx.release(0);
    let body = fx.registry.body(EntityId::Letter(0)).unwrap();
    let pos = fx.world.body(body).unwrap().pos;

    let pushed = fx.run(|input, ctx| input.on_pointer_move(ctx, pos + Vec2::new(-10.0, 0.0)));
    assert_eq!(pushed, 1);
    let force = fx.world.body(body).unwrap().force;
    assert!(force.x > 0.0, "expected push to the right, got {:?}", force);
    assert!(fx.input.pointer().is_some());
}

#[test]
fn pointer_far_away_pushes_nothing() {
    let mut fx = Fixture::new("ABC");
    fx.release(0);
    let pushed = fx.run(|input, ctx| input.on_pointer_move(ctx, Vec2::new(5.0, 790.0)));
    assert_eq!(pushed, 0);
}

#[test]
fn anchored_letters_are_not_pushed() {
    let mut fx = Fixture::new("ABC");
    let rest = fx.layout.position(EntityId::Letter(1)).unwrap();
    let pushed = fx.run(|input, ctx| input.on_pointer_move(ctx, rest));
    assert_eq!(pushed, 0);
}

#[test]
fn pointer_down_grabs_free_letter_and_up_releases() {
    let mut fx = Fixture::new("ABC");
    fx.release(2);
    let rest = fx.layout.position(EntityId::Letter(2)).unwrap();

    let grabbed = fx.run(|input, ctx| input.on_pointer_down(ctx, rest));
    assert_eq!(grabbed, Some(EntityId::Letter(2)));
    assert!(fx.input.dragging().is_some());

    let released = fx.run(|input, ctx| input.on_pointer_up(ctx));
    assert_eq!(released, fx.registry.body(EntityId::Letter(2)));
    assert!(fx.input.dragging().is_none());
}

#[test]
fn pointer_down_on_anchored_letter_grabs_nothing() {
    let mut fx = Fixture::new("ABC");
    let rest = fx.layout.position(EntityId::Letter(0)).unwrap();
    assert_eq!(fx.run(|input, ctx| input.on_pointer_down(ctx, rest)), None);
}

#[test]
fn wheel_without_free_letters_does_nothing() {
    let mut fx = Fixture::new("ABC");
    assert!(!fx.run(|input, ctx| input.on_wheel(ctx, 0.0)));
    assert_eq!(fx.input.reset_cycles(), 0);
}

#[test]
fn wheel_detaches_free_letters_and_starts_fly_backs() {
    let mut fx = Fixture::new("ABC");
    fx.release(0);
    fx.release(2);

    assert!(fx.run(|input, ctx| input.on_wheel(ctx, 1000.0)));
    for i in [0, 2] {
        let id = EntityId::Letter(i);
        assert_eq!(fx.registry.mode(id), Some(EntityMode::Detached));
        assert!(fx.returns.is_returning(id));
    }
    assert_eq!(fx.registry.mode(EntityId::Letter(1)), Some(EntityMode::Anchored));
    assert_eq!(fx.returns.len(), 2);
}

#[test]
fn burst_of_wheel_events_runs_one_reset_cycle() {
    let mut fx = Fixture::new("ABC");
    fx.release(0);
    fx.release(1);

    let mut started = 0;
    for i in 0..20 {
        let now = 1000.0 + i as f64 * 30.0;
        if fx.run(|input, ctx| input.on_wheel(ctx, now)) {
            started += 1;
        }
        // a letter dropped mid-burst is not swept up by the same gesture
        if i == 5 {
            fx.release(2);
        }
    }
    assert_eq!(started, 1);
    assert_eq!(fx.input.reset_cycles(), 1);
    assert_eq!(fx.registry.mode(EntityId::Letter(2)), Some(EntityMode::Free));
}

#[test]
fn wheel_after_quiet_window_starts_new_cycle() {
    let mut fx = Fixture::new("ABC");
    fx.release(0);
    assert!(fx.run(|input, ctx| input.on_wheel(ctx, 0.0)));

    fx.release(1);
    let window = fx.config.wheel_debounce_ms;
    assert!(!fx.run(|input, ctx| input.on_wheel(ctx, window - 1.0)));
    // the event above extended the window
    assert!(!fx.run(|input, ctx| input.on_wheel(ctx, window + 100.0)));
    assert!(fx.run(|input, ctx| input.on_wheel(ctx, 3.0 * window)));
    assert_eq!(fx.input.reset_cycles(), 2);
}

#[test]
fn touch_move_resets_like_wheel() {
    let mut fx = Fixture::new("AB");
    fx.release(0);
    assert!(fx.run(|input, ctx| input.on_touch_move(ctx, 10.0)));
    assert_eq!(fx.registry.mode(EntityId::Letter(0)), Some(EntityMode::Detached));
}

#[test]
fn hovering_a_returning_letter_does_not_release_it() {
    let mut fx = Fixture::new("AB");
    fx.release(0);
    fx.run(|input, ctx| input.on_wheel(ctx, 0.0));
    assert!(!fx.run(|input, ctx| input.on_pointer_enter(ctx, HoverTarget::Letter(0))));
    assert_eq!(fx.registry.mode(EntityId::Letter(0)), Some(EntityMode::Detached));
}

#[test]
fn wheel_cancels_an_active_drag() {
    let mut fx = Fixture::new("AB");
    fx.release(0);
    let rest = fx.layout.position(EntityId::Letter(0)).unwrap();
    fx.run(|input, ctx| input.on_pointer_down(ctx, rest)).unwrap();

    assert!(fx.run(|input, ctx| input.on_wheel(ctx, 0.0)));
    assert!(fx.input.dragging().is_none());
    assert!(fx.world.drag().is_none());
}
