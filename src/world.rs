//! The simulation world: body storage, stepping and body-level operations.

use alloc::vec::Vec as AllocVec;
use core::fmt;

use crate::body::{Body, BodyDesc};
use crate::collision::{self, Contact};
use crate::config::WorldConfig;
use crate::constraint::{BoundsConstraint, DragConstraint};
use crate::error::SceneError;
use crate::float::Float;
use crate::layout::Viewport;
use crate::observer::StepObserver;
use crate::shape::Shape;
use crate::vec::Vec2;

/// Generational handle to a body. A handle outlives its body safely: every
/// operation on a removed body reports `StaleBody` instead of touching a
/// different body that reused the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId {
    index: u32,
    generation: u32,
}

impl BodyId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyId({}v{})", self.index, self.generation)
    }
}

struct Slot<F: Float> {
    generation: u32,
    body: Option<Body<F>>,
}

struct PairState<F: Float> {
    a: usize,
    b: usize,
    approach_speed: F,
    contact: Option<Contact<F>>,
}

/// 2D rigid-body world with gravity, static and dynamic bodies, a pointer
/// drag constraint and open-topped viewport bounds.
pub struct World<F: Float> {
    config: WorldConfig<F>,
    slots: AllocVec<Slot<F>>,
    free: AllocVec<u32>,
    live: usize,
    bounds: BoundsConstraint<F>,
    drag: Option<DragConstraint<F>>,
    steps: u64,
    destroyed: bool,
}

impl<F: Float> core::fmt::Debug for World<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("bodies", &self.live)
            .field("steps", &self.steps)
            .field("dragging", &self.drag.map(|d| d.body))
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<F: Float> World<F> {
    /// Builds an empty world bounded by the viewport.
    ///
    /// A viewport without area yields `LayoutNotReady`; the caller retries
    /// once layout has happened.
    pub fn create(config: WorldConfig<F>, viewport: Viewport<F>) -> Result<Self, SceneError> {
        config.validate()?;
        if !viewport.is_ready() {
            tracing::warn!(
                width = viewport.width.to_f64(),
                height = viewport.height.to_f64(),
                "viewport not laid out, deferring world creation"
            );
            return Err(viewport.not_ready());
        }
        tracing::debug!(
            width = viewport.width.to_f64(),
            height = viewport.height.to_f64(),
            "world created"
        );
        Ok(World {
            config,
            slots: AllocVec::new(),
            free: AllocVec::new(),
            live: 0,
            bounds: BoundsConstraint::new(viewport.width, viewport.height, F::zero()),
            drag: None,
            steps: 0,
            destroyed: false,
        })
    }

    pub fn config(&self) -> &WorldConfig<F> {
        &self.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn body_count(&self) -> usize {
        self.live
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Sub-step length in seconds; implicit velocities are measured against it.
    pub fn dt(&self) -> F {
        self.config.sub_step_seconds()
    }

    pub fn bounds(&self) -> &BoundsConstraint<F> {
        &self.bounds
    }

    pub fn add_body(&mut self, desc: BodyDesc<F>) -> Result<BodyId, SceneError> {
        if self.destroyed {
            return Err(SceneError::Destroyed);
        }
        let body = Body::from_desc(desc, self.dt())?;
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.body = Some(body);
                BodyId { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, body: Some(body) });
                BodyId { index, generation: 0 }
            }
        };
        self.live += 1;
        tracing::trace!(id = %id, "body added");
        Ok(id)
    }

    pub fn remove_body(&mut self, id: BodyId) -> Result<Body<F>, SceneError> {
        if self.destroyed {
            return Err(SceneError::Destroyed);
        }
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation && s.body.is_some())
            .ok_or(SceneError::StaleBody { id })?;
        let body = slot.body.take().ok_or(SceneError::StaleBody { id })?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        if self.drag.map(|d| d.body) == Some(id) {
            self.drag = None;
        }
        tracing::trace!(id = %id, "body removed");
        Ok(body)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.body(id).is_some()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body<F>> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.body.as_ref())
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut Body<F>, SceneError> {
        if self.destroyed {
            return Err(SceneError::Destroyed);
        }
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.body.as_mut())
            .ok_or(SceneError::StaleBody { id })
    }

    /// All live bodies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body<F>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.body.as_ref().map(|b| {
                (BodyId { index: i as u32, generation: s.generation }, b)
            })
        })
    }

    /// Accumulates a force (mass·px/s²) for the next step. Static bodies ignore it.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2<F>) -> Result<(), SceneError> {
        self.body_mut(id)?.apply_force(force);
        Ok(())
    }

    /// Instant velocity change (px/s) on a dynamic body.
    pub fn apply_impulse(&mut self, id: BodyId, delta_v: Vec2<F>) -> Result<(), SceneError> {
        let dt = self.dt();
        let body = self.body_mut(id)?;
        if !body.is_static() {
            let v = body.velocity(dt);
            body.set_velocity(v + delta_v, dt);
        }
        Ok(())
    }

    /// Teleports a body, keeping its velocity.
    pub fn set_position(&mut self, id: BodyId, pos: Vec2<F>) -> Result<(), SceneError> {
        self.body_mut(id)?.move_to(pos);
        Ok(())
    }

    /// Teleports a body and zeroes its velocity, angle and pending forces.
    pub fn place(&mut self, id: BodyId, pos: Vec2<F>) -> Result<(), SceneError> {
        self.body_mut(id)?.place(pos, F::zero());
        Ok(())
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2<F>) -> Result<(), SceneError> {
        let dt = self.dt();
        let body = self.body_mut(id)?;
        if !body.is_static() {
            body.set_velocity(velocity, dt);
        }
        Ok(())
    }

    pub fn set_angular_velocity(&mut self, id: BodyId, angular_velocity: F) -> Result<(), SceneError> {
        let dt = self.dt();
        let body = self.body_mut(id)?;
        if !body.is_static() {
            body.set_angular_velocity(angular_velocity, dt);
        }
        Ok(())
    }

    pub fn velocity(&self, id: BodyId) -> Option<Vec2<F>> {
        let dt = self.dt();
        self.body(id).map(|b| b.velocity(dt))
    }

    /// Swaps the collision shape, recomputing mass for dynamic bodies.
    pub fn set_shape(&mut self, id: BodyId, shape: Shape<F>) -> Result<(), SceneError> {
        let body = self.body_mut(id)?;
        let previous = core::mem::replace(&mut body.shape, shape);
        if let Err(e) = body.recompute_mass() {
            body.shape = previous;
            body.recompute_mass()?;
            return Err(e);
        }
        Ok(())
    }

    /// Moves the bounds to a new viewport. Bodies are not touched; see
    /// [`World::clamp_to_bounds`].
    pub fn set_bounds(&mut self, viewport: Viewport<F>) -> Result<(), SceneError> {
        if self.destroyed {
            return Err(SceneError::Destroyed);
        }
        if !viewport.is_ready() {
            return Err(viewport.not_ready());
        }
        self.bounds = BoundsConstraint::new(viewport.width, viewport.height, self.bounds.restitution);
        Ok(())
    }

    /// Pulls every dynamic body that lies outside the bounds back in.
    /// Returns how many were moved.
    pub fn clamp_to_bounds(&mut self) -> usize {
        self.clamp_into(self.bounds)
    }

    /// Like [`World::clamp_to_bounds`] with the floor raised to `floor_y`,
    /// so bodies end up resting on top of a ground slab rather than inside it.
    pub fn clamp_above(&mut self, floor_y: F) -> usize {
        let mut bounds = self.bounds;
        bounds.max_y = bounds.max_y.min(floor_y);
        self.clamp_into(bounds)
    }

    fn clamp_into(&mut self, bounds: BoundsConstraint<F>) -> usize {
        let mut moved = 0;
        for slot in self.slots.iter_mut() {
            if let Some(body) = slot.body.as_mut() {
                if bounds.clamp(body) {
                    moved += 1;
                }
            }
        }
        if moved > 0 {
            tracing::debug!(moved, "clamped bodies into new bounds");
        }
        moved
    }

    /// Topmost dynamic body under `point` whose category intersects `mask`.
    pub fn body_at(&self, point: Vec2<F>, mask: u32) -> Option<BodyId> {
        self.iter()
            .filter(|(_, b)| !b.is_static() && (b.filter.category & mask) != 0)
            .filter(|(_, b)| b.contains(point))
            .map(|(id, _)| id)
            .last()
    }

    /// Grabs the body under the pointer with a spring constraint.
    pub fn attach_drag(&mut self, point: Vec2<F>, mask: u32, stiffness: F) -> Option<BodyId> {
        if self.destroyed {
            return None;
        }
        let id = self.body_at(point, mask)?;
        let body = self.body(id)?;
        self.drag = Some(DragConstraint::grab(id, body, point, stiffness));
        tracing::debug!(id = %id, "drag attached");
        Some(id)
    }

    pub fn move_drag(&mut self, point: Vec2<F>) {
        if let Some(drag) = self.drag.as_mut() {
            drag.target = point;
        }
    }

    pub fn release_drag(&mut self) -> Option<BodyId> {
        let id = self.drag.take().map(|d| d.body);
        if let Some(id) = id {
            tracing::debug!(id = %id, "drag released");
        }
        id
    }

    pub fn drag(&self) -> Option<&DragConstraint<F>> {
        self.drag.as_ref()
    }

    /// Advances the world by one fixed step.
    pub fn step<O: StepObserver>(&mut self, observer: &mut O) {
        if self.destroyed {
            return;
        }
        let dt = self.dt();
        let gravity = self.config.gravity;
        let retain = self.config.damping.powf(dt);

        if let Some(drag) = self.drag {
            if !self.contains(drag.body) {
                self.drag = None;
            }
        }

        for _sub in 0..self.config.sub_steps.max(1) {
            for slot in self.slots.iter_mut() {
                if let Some(body) = slot.body.as_mut() {
                    body.integrate(gravity, dt, retain);
                }
            }
            observer.on_integrate();

            if let Some(drag) = self.drag {
                if let Some(body) = self.slots[drag.body.index as usize].body.as_mut() {
                    drag.solve(body);
                }
            }

            let mut pairs = self.collect_pairs(dt);
            for i in 0..self.config.iterations {
                let mut resolved = 0;
                for pair in pairs.iter_mut() {
                    if let Some((a, b)) = pair_mut(&mut self.slots, pair.a, pair.b) {
                        if let Some(contact) = collision::detect(a, b) {
                            collision::resolve_position(a, b, &contact);
                            pair.contact = Some(contact);
                            resolved += 1;
                        }
                    }
                }
                observer.on_contact_iteration(i, resolved);
            }

            let threshold = self.config.bounce_threshold;
            for pair in pairs.iter() {
                let Some(contact) = pair.contact else { continue };
                if let Some((a, b)) = pair_mut(&mut self.slots, pair.a, pair.b) {
                    collision::resolve_velocity(a, b, &contact, pair.approach_speed, dt, threshold);
                }
            }

            let bounds = self.bounds;
            for slot in self.slots.iter_mut() {
                if let Some(body) = slot.body.as_mut() {
                    bounds.solve(body);
                }
            }
        }

        for slot in self.slots.iter_mut() {
            if let Some(body) = slot.body.as_mut() {
                body.clear_forces();
            }
        }
        self.steps += 1;
        tracing::trace!(step = self.steps, bodies = self.live, "world stepped");
        observer.on_step_complete();
    }

    fn collect_pairs(&self, dt: F) -> AllocVec<PairState<F>> {
        let live: AllocVec<(usize, &Body<F>)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.body.as_ref().map(|b| (i, b)))
            .collect();
        collision::broad_phase(&live)
            .into_iter()
            .filter_map(|(a, b)| {
                let (ba, bb) = (self.slots[a].body.as_ref()?, self.slots[b].body.as_ref()?);
                let contact = collision::detect(ba, bb)?;
                Some(PairState {
                    a,
                    b,
                    approach_speed: collision::normal_speed(ba, bb, contact.normal, dt),
                    contact: None,
                })
            })
            .collect()
    }

    /// Releases every body and the drag constraint. Idempotent; later
    /// mutations report `Destroyed`.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.drag = None;
        self.slots.clear();
        self.free.clear();
        let released = core::mem::replace(&mut self.live, 0);
        tracing::debug!(released, steps = self.steps, "world destroyed");
    }
}

fn pair_mut<F: Float>(
    slots: &mut [Slot<F>],
    a: usize,
    b: usize,
) -> Option<(&mut Body<F>, &mut Body<F>)> {
    if a == b {
        return None;
    }
    if a < b {
        let (lo, hi) = slots.split_at_mut(b);
        Some((lo[a].body.as_mut()?, hi[0].body.as_mut()?))
    } else {
        let (lo, hi) = slots.split_at_mut(a);
        Some((hi[0].body.as_mut()?, lo[b].body.as_mut()?))
    }
}
