//! Scene lifecycle: mount, per-frame advance, resize and teardown.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::float::Float;
use crate::hover::HoverSlot;
use crate::input::{HoverTarget, InputAdapter, InputContext, InputTuning, NavItem, NavigateRequest};
use crate::layout::{RestLayout, Viewport};
use crate::observer::StepCounter;
use crate::registry::{EntityId, EntitySpec, Registry};
use crate::render::{RenderSync, Renderer};
use crate::rng::XorShift64;
use crate::runner::Runner;
use crate::shape::Shape;
use crate::tween::Returns;
use crate::vec::{Vec, Vec2};
use crate::world::{BodyId, World};

/// What one call to `frame` did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub steps: u32,
    pub contacts: u32,
    /// Entities whose fly-back finished this frame.
    pub landed: usize,
    pub drawn: usize,
}

/// Everything one mounted scene owns. Dropping it tears the scene down
/// exactly once.
pub struct SimulationHandle<F: Float + 'static> {
    config: SceneConfig<F>,
    world: World<F>,
    runner: Runner<F>,
    registry: Registry<F>,
    layout: RestLayout<F>,
    input: InputAdapter<F>,
    returns: Returns<F>,
    sync: RenderSync<F>,
    renderer: Option<Box<dyn Renderer<F>>>,
    hover: HoverSlot<F>,
    torn_down: bool,
}

impl<F: Float + 'static> SimulationHandle<F> {
    /// Builds the world and places letters, walls, ground and balls.
    pub fn create(
        config: SceneConfig<F>,
        viewport: Viewport<F>,
        hover: HoverSlot<F>,
        renderer: Option<Box<dyn Renderer<F>>>,
    ) -> Result<Self, SceneError> {
        config.validate()?;
        let layout = RestLayout::compute(&config, viewport)?;
        let mut world = World::create(config.world.clone(), viewport)?;
        let mut registry = Registry::new();

        let letter = layout.letter_size();
        for (id, rest) in layout.letters() {
            let spec = EntitySpec::new(Shape::rect(letter.x, letter.y)?).with_material(
                config.density,
                config.letter_restitution,
                config.friction,
            );
            registry.insert(id, spec)?;
            registry.anchor(&mut world, id, rest)?;
        }

        for id in [EntityId::Ground, EntityId::WallLeft, EntityId::WallRight] {
            let Some(slab) = layout.slab(id) else { continue };
            let spec = EntitySpec::new(Shape::rect(slab.size.x, slab.size.y)?)
                .with_material(config.density, F::zero(), config.friction);
            registry.insert(id, spec)?;
            registry.anchor(&mut world, id, slab.center)?;
        }

        let balls = layout.balls();
        let mut rng = XorShift64::new(config.seed.rotate_left(17) ^ 0x9e37_79b9_7f4a_7c15);
        for i in 0..balls.count {
            let id = EntityId::Ball(i);
            let spec = EntitySpec::new(Shape::circle(balls.radius)?).with_material(
                config.density,
                config.ball_restitution,
                config.friction,
            );
            registry.insert(id, spec)?;
            let (min_x, max_x, y) = layout.ball_spawn(i);
            let x = rng.range(min_x, max_x);
            registry.release(&mut world, id, Vec2::new(x, y), Vec2::zero())?;
        }

        let world_config = &config.world;
        let runner = Runner::new(
            world_config.fixed_step_ms,
            world_config.max_frame_ms,
            world_config.max_steps_per_frame,
        );
        let input = InputAdapter::new(InputTuning::from_config(&config), config.seed);
        let returns = Returns::new(config.fly_back_ms, config.easing);
        let sync = RenderSync::new(config.returning_scale);

        tracing::debug!(
            bodies = world.body_count(),
            letters = layout.letters().count(),
            balls = balls.count,
            "scene mounted"
        );

        Ok(SimulationHandle {
            config,
            world,
            runner,
            registry,
            layout,
            input,
            returns,
            sync,
            renderer,
            hover,
            torn_down: false,
        })
    }

    pub fn world(&self) -> &World<F> {
        &self.world
    }

    pub fn registry(&self) -> &Registry<F> {
        &self.registry
    }

    pub fn layout(&self) -> &RestLayout<F> {
        &self.layout
    }

    pub fn returns(&self) -> &Returns<F> {
        &self.returns
    }

    pub fn input(&self) -> &InputAdapter<F> {
        &self.input
    }

    pub fn config(&self) -> &SceneConfig<F> {
        &self.config
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Body currently representing `id`, if any.
    pub fn body_of(&self, id: EntityId) -> Option<BodyId> {
        self.registry.body(id)
    }

    /// Steps the world on its own schedule, lands finished fly-backs, then
    /// copies poses to the renderer.
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        if self.torn_down {
            return FrameReport::default();
        }
        let steps = self.runner.advance(now_ms);
        let mut counter = StepCounter::default();
        for _ in 0..steps {
            self.world.step(&mut counter);
        }

        let landed = self
            .returns
            .advance(now_ms, &self.layout, &mut self.registry, &mut self.world)
            .len();

        let drawn = match self.renderer.as_deref_mut() {
            Some(renderer) => self.sync.sync(
                &self.world,
                &self.registry,
                &self.returns,
                &self.layout,
                now_ms,
                renderer,
            ),
            None => 0,
        };

        FrameReport { steps: counter.steps, contacts: counter.contacts, landed, drawn }
    }

    /// Recomputes the rest layout, re-anchors, moves walls and ground and
    /// pulls stray bodies back inside.
    pub fn resize(&mut self, viewport: Viewport<F>) -> Result<(), SceneError> {
        if self.torn_down {
            return Err(SceneError::Destroyed);
        }
        let layout = RestLayout::compute(&self.config, viewport)?;
        self.world.set_bounds(viewport)?;
        self.registry.relayout(&mut self.world, &layout)?;
        let clamped = match layout.slab(EntityId::Ground) {
            Some(ground) => self.world.clamp_above(ground.center.y - ground.size.y * F::half()),
            None => self.world.clamp_to_bounds(),
        };
        self.layout = layout;
        tracing::debug!(
            width = viewport.width.to_f64(),
            height = viewport.height.to_f64(),
            clamped,
            "scene resized"
        );
        Ok(())
    }

    fn split(&mut self) -> (&mut InputAdapter<F>, InputContext<'_, F>) {
        (
            &mut self.input,
            InputContext {
                world: &mut self.world,
                registry: &mut self.registry,
                layout: &self.layout,
                returns: &mut self.returns,
                hover: &self.hover,
            },
        )
    }

    pub fn on_pointer_move(&mut self, pos: Vec2<F>) -> usize {
        if self.torn_down {
            return 0;
        }
        let (input, mut ctx) = self.split();
        input.on_pointer_move(&mut ctx, pos)
    }

    pub fn on_pointer_enter(&mut self, target: HoverTarget<'_, F>) -> bool {
        if self.torn_down {
            return false;
        }
        let (input, mut ctx) = self.split();
        input.on_pointer_enter(&mut ctx, target)
    }

    pub fn on_pointer_leave(&mut self) {
        if self.torn_down {
            return;
        }
        let (input, mut ctx) = self.split();
        input.on_pointer_leave(&mut ctx);
    }

    pub fn on_pointer_down(&mut self, pos: Vec2<F>) -> Option<EntityId> {
        if self.torn_down {
            return None;
        }
        let (input, mut ctx) = self.split();
        input.on_pointer_down(&mut ctx, pos)
    }

    pub fn on_pointer_up(&mut self) -> Option<BodyId> {
        if self.torn_down {
            return None;
        }
        let (input, mut ctx) = self.split();
        input.on_pointer_up(&mut ctx)
    }

    pub fn on_wheel(&mut self, now_ms: f64) -> bool {
        if self.torn_down {
            return false;
        }
        let (input, mut ctx) = self.split();
        input.on_wheel(&mut ctx, now_ms)
    }

    pub fn on_touch_move(&mut self, now_ms: f64) -> bool {
        if self.torn_down {
            return false;
        }
        let (input, mut ctx) = self.split();
        input.on_touch_move(&mut ctx, now_ms)
    }

    pub fn on_nav_click(&mut self, item: &NavItem) -> NavigateRequest<F> {
        let (input, mut ctx) = self.split();
        input.on_nav_click(&mut ctx, item)
    }

    /// Stops the runner, detaches the renderer and releases every body.
    /// Safe to call more than once; only the first call does anything.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.runner.stop();
        self.world.release_drag();
        self.returns.clear();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.detach();
        }
        self.world.destroy();
        tracing::debug!("scene torn down");
    }
}

impl<F: Float + 'static> Drop for SimulationHandle<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

enum SceneState<F: Float + 'static> {
    Unmounted,
    /// Mount was requested before layout; retried on the next resize.
    Pending { renderer: Option<Box<dyn Renderer<F>>> },
    Mounted(SimulationHandle<F>),
}

/// A mountable physics scene bound to one page's hover slot.
pub struct PhysicsScene<F: Float + 'static> {
    config: SceneConfig<F>,
    hover: HoverSlot<F>,
    state: SceneState<F>,
    mounted: Rc<Cell<bool>>,
}

impl<F: Float + 'static> PhysicsScene<F> {
    pub fn new(config: SceneConfig<F>, hover: HoverSlot<F>) -> Self {
        PhysicsScene {
            config,
            hover,
            state: SceneState::Unmounted,
            mounted: Rc::new(Cell::new(false)),
        }
    }

    /// Mounts against `viewport`. Returns `Ok(false)` when the viewport has
    /// no area yet; the mount is retried by the next `resize`.
    pub fn mount(
        &mut self,
        viewport: Viewport<F>,
        renderer: Option<Box<dyn Renderer<F>>>,
    ) -> Result<bool, SceneError> {
        self.unmount();
        if !viewport.is_ready() {
            tracing::warn!(
                width = viewport.width.to_f64(),
                height = viewport.height.to_f64(),
                "layout not ready, mount deferred"
            );
            self.state = SceneState::Pending { renderer };
            return Ok(false);
        }
        let handle =
            SimulationHandle::create(self.config.clone(), viewport, self.hover.clone(), renderer)?;
        self.state = SceneState::Mounted(handle);
        self.mounted.set(true);
        Ok(true)
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, SceneState::Mounted(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SceneState::Pending { .. })
    }

    /// Shared flag frame callbacks check before touching the scene.
    pub fn mounted_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.mounted)
    }

    pub fn hover(&self) -> &HoverSlot<F> {
        &self.hover
    }

    pub fn handle(&self) -> Option<&SimulationHandle<F>> {
        match &self.state {
            SceneState::Mounted(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn handle_mut(&mut self) -> Option<&mut SimulationHandle<F>> {
        match &mut self.state {
            SceneState::Mounted(handle) => Some(handle),
            _ => None,
        }
    }

    /// Advances one animation frame. A no-op unless mounted.
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        if !self.mounted.get() {
            return FrameReport::default();
        }
        self.handle_mut().map(|h| h.frame(now_ms)).unwrap_or_default()
    }

    /// Forwards a viewport change, or completes a deferred mount.
    pub fn resize(&mut self, viewport: Viewport<F>) -> Result<(), SceneError> {
        match &mut self.state {
            SceneState::Mounted(handle) => handle.resize(viewport),
            SceneState::Pending { renderer } => {
                let renderer = renderer.take();
                self.mount(viewport, renderer).map(|_| ())
            }
            SceneState::Unmounted => Ok(()),
        }
    }

    /// Completes a deferred mount once `viewport` has an area. Quiet while
    /// it is still empty; returns whether the scene is still waiting.
    pub fn poll_mount(&mut self, viewport: Viewport<F>) -> Result<bool, SceneError> {
        if self.is_pending() && viewport.is_ready() {
            self.resize(viewport)?;
        }
        Ok(self.is_pending())
    }

    /// Tears down the mounted scene, if any. Idempotent.
    pub fn unmount(&mut self) {
        self.mounted.set(false);
        let previous = core::mem::replace(&mut self.state, SceneState::Unmounted);
        if let SceneState::Mounted(mut handle) = previous {
            handle.teardown();
        }
    }
}

impl<F: Float + 'static> Drop for PhysicsScene<F> {
    fn drop(&mut self) {
        self.unmount();
    }
}
