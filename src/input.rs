//! Input adapter: raw pointer, wheel and touch events in, forces and entity
//! transitions out. No DOM types; every handler takes plain coordinates and
//! a caller-supplied timestamp.

use alloc::string::String;
use alloc::vec::Vec as AllocVec;

use crate::config::SceneConfig;
use crate::float::Float;
use crate::hover::HoverSlot;
use crate::layout::RestLayout;
use crate::registry::{EntityId, EntityMode, Registry};
use crate::rng::XorShift64;
use crate::tween::Returns;
use crate::vec::{Vec, Vec2};
use crate::world::{BodyId, World};

/// A navigation link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub path: String,
}

impl NavItem {
    pub fn new(label: &str, path: &str) -> Self {
        NavItem { label: String::from(label), path: String::from(path) }
    }
}

/// The site's top-level pages.
pub fn default_nav() -> AllocVec<NavItem> {
    alloc::vec![
        NavItem::new("Home", "/"),
        NavItem::new("Projects", "/projects"),
        NavItem::new("About", "/about"),
        NavItem::new("Contact", "/contact"),
    ]
}

/// Ask the router to go to `path` once the exit animation has had `delay_ms`.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigateRequest<F: Float> {
    pub path: String,
    pub delay_ms: F,
}

/// Something the pointer entered.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HoverTarget<'a, F: Float> {
    /// A nav link; the cursor follower snaps to `center`.
    Nav { label: &'a str, center: Vec2<F> },
    /// A letter of the name, by character index.
    Letter(u16),
}

/// Borrowed scene state the handlers act on.
pub struct InputContext<'a, F: Float> {
    pub world: &'a mut World<F>,
    pub registry: &'a mut Registry<F>,
    pub layout: &'a RestLayout<F>,
    pub returns: &'a mut Returns<F>,
    pub hover: &'a HoverSlot<F>,
}

/// Tuning copied out of [`SceneConfig`] at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InputTuning<F: Float> {
    pub pointer_force: F,
    pub hit_radius: F,
    pub max_spin: F,
    pub drag_stiffness: F,
    pub drag_mask: u32,
    pub wheel_debounce_ms: F,
    pub nav_exit_delay_ms: F,
}

impl<F: Float> InputTuning<F> {
    pub fn from_config(config: &SceneConfig<F>) -> Self {
        InputTuning {
            pointer_force: config.pointer_force,
            hit_radius: config.hit_radius,
            max_spin: config.max_spin,
            drag_stiffness: config.drag_stiffness,
            drag_mask: config.drag_mask,
            wheel_debounce_ms: config.wheel_debounce_ms,
            nav_exit_delay_ms: config.nav_exit_delay_ms,
        }
    }
}

pub struct InputAdapter<F: Float> {
    tuning: InputTuning<F>,
    rng: XorShift64,
    pointer: Option<Vec2<F>>,
    /// Wheel/touch events before this time belong to the current reset cycle.
    reset_window_until: Option<f64>,
    reset_cycles: u32,
    dragging: Option<BodyId>,
}

impl<F: Float> InputAdapter<F> {
    pub fn new(tuning: InputTuning<F>, seed: u64) -> Self {
        InputAdapter {
            tuning,
            rng: XorShift64::new(seed),
            pointer: None,
            reset_window_until: None,
            reset_cycles: 0,
            dragging: None,
        }
    }

    pub fn pointer(&self) -> Option<Vec2<F>> {
        self.pointer
    }

    pub fn reset_cycles(&self) -> u32 {
        self.reset_cycles
    }

    pub fn dragging(&self) -> Option<BodyId> {
        self.dragging
    }

    /// Records the pointer, moves any drag target and pushes nearby free
    /// bodies outward with a random spin. Returns how many were pushed.
    pub fn on_pointer_move(&mut self, ctx: &mut InputContext<'_, F>, pos: Vec2<F>) -> usize {
        self.pointer = Some(pos);
        ctx.world.move_drag(pos);

        let mut pushed = 0;
        for id in ctx.registry.free_entities() {
            let Some(body_id) = ctx.registry.body(id) else { continue };
            if Some(body_id) == self.dragging {
                continue;
            }
            let Some(body) = ctx.world.body(body_id) else { continue };
            let reach = body.bounding_radius() + self.tuning.hit_radius;
            let offset = body.pos - pos;
            let dist = offset.length();
            if dist >= reach {
                continue;
            }
            let dir = if dist.is_near_zero(F::from_f32(1e-6)) {
                Vec2::new(F::zero(), -F::one())
            } else {
                offset.scale(F::one() / dist)
            };
            let proximity = F::one() - dist / reach;
            let force = dir.scale(self.tuning.pointer_force * proximity);
            let spin = self.rng.signed(self.tuning.max_spin);
            let applied = ctx
                .world
                .apply_force(body_id, force)
                .and_then(|_| ctx.world.set_angular_velocity(body_id, spin));
            match applied {
                Ok(()) => pushed += 1,
                Err(e) => tracing::warn!(entity = ?id, error = %e, "pointer push skipped"),
            }
        }
        pushed
    }

    /// Hovering a nav link magnetizes the cursor; hovering an anchored
    /// letter drops it. Returns true if a letter was released.
    pub fn on_pointer_enter(&mut self, ctx: &mut InputContext<'_, F>, target: HoverTarget<'_, F>) -> bool {
        match target {
            HoverTarget::Nav { label, center } => {
                ctx.hover.set_hovered(true, Some(label), Some(center));
                false
            }
            HoverTarget::Letter(index) => {
                let id = EntityId::Letter(index);
                if ctx.registry.mode(id) != Some(EntityMode::Anchored) || ctx.returns.is_returning(id) {
                    return false;
                }
                let Some(rest) = ctx.layout.position(id) else { return false };
                match ctx.registry.release(ctx.world, id, rest, Vec2::zero()) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::warn!(entity = ?id, error = %e, "hover release failed");
                        false
                    }
                }
            }
        }
    }

    pub fn on_pointer_leave(&mut self, ctx: &mut InputContext<'_, F>) {
        ctx.hover.set_hovered(false, None, None);
    }

    /// Starts dragging the body under the pointer, if any.
    pub fn on_pointer_down(&mut self, ctx: &mut InputContext<'_, F>, pos: Vec2<F>) -> Option<EntityId> {
        self.pointer = Some(pos);
        let body = ctx
            .world
            .attach_drag(pos, self.tuning.drag_mask, self.tuning.drag_stiffness)?;
        self.dragging = Some(body);
        ctx.registry.entity_of(body)
    }

    pub fn on_pointer_up(&mut self, ctx: &mut InputContext<'_, F>) -> Option<BodyId> {
        self.dragging = None;
        ctx.world.release_drag()
    }

    /// Scroll gesture. The first event with any free letter starts one reset
    /// cycle; further events inside the debounce window only extend it.
    pub fn on_wheel(&mut self, ctx: &mut InputContext<'_, F>, now_ms: f64) -> bool {
        if let Some(until) = self.reset_window_until {
            if now_ms < until {
                self.reset_window_until = Some(now_ms + self.tuning.wheel_debounce_ms.to_f64());
                return false;
            }
            self.reset_window_until = None;
        }

        let free: AllocVec<EntityId> = ctx
            .registry
            .free_entities()
            .into_iter()
            .filter(|id| ctx.layout.position(*id).is_some())
            .collect();
        if free.is_empty() {
            return false;
        }

        if let Some(body) = self.dragging.take() {
            ctx.world.release_drag();
            tracing::debug!(body = %body, "drag cancelled by reset");
        }
        for id in free.iter() {
            let pose = ctx
                .registry
                .body(*id)
                .and_then(|b| ctx.world.body(b))
                .map(|b| (b.pos, b.angle));
            if let Err(e) = ctx.registry.detach(ctx.world, *id) {
                tracing::warn!(entity = ?id, error = %e, "detach failed during reset");
                continue;
            }
            let (from, angle) = pose
                .or_else(|| ctx.layout.position(*id).map(|p| (p, F::zero())))
                .unwrap_or((Vec2::zero(), F::zero()));
            ctx.returns.start(*id, from, angle, now_ms);
        }
        self.reset_window_until = Some(now_ms + self.tuning.wheel_debounce_ms.to_f64());
        self.reset_cycles += 1;
        tracing::debug!(count = free.len(), cycle = self.reset_cycles, "reset cycle started");
        true
    }

    /// Touch scrolling resets exactly like the wheel.
    pub fn on_touch_move(&mut self, ctx: &mut InputContext<'_, F>, now_ms: f64) -> bool {
        self.on_wheel(ctx, now_ms)
    }

    /// A nav link was clicked: clear the hover and hand the path to the router.
    pub fn on_nav_click(&mut self, ctx: &mut InputContext<'_, F>, item: &NavItem) -> NavigateRequest<F> {
        ctx.hover.set_hovered(false, None, None);
        tracing::debug!(path = %item.path, "navigate requested");
        NavigateRequest {
            path: item.path.clone(),
            delay_ms: self.tuning.nav_exit_delay_ms,
        }
    }
}
