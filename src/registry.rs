//! Maps logical entities (letters, balls, ground, walls) to world bodies.
//!
//! Every entity owns at most one body. Mode changes always remove the old
//! body before inserting the new one.

use alloc::collections::BTreeMap;
use alloc::vec::Vec as AllocVec;

use crate::body::{BodyDesc, CollisionFilter};
use crate::error::SceneError;
use crate::float::Float;
use crate::layout::RestLayout;
use crate::shape::Shape;
use crate::vec::{Vec, Vec2};
use crate::world::{BodyId, World};

/// Stable identifier for something on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityId {
    /// Character index within the name, whitespace included.
    Letter(u16),
    Ball(u16),
    Ground,
    WallLeft,
    WallRight,
}

impl EntityId {
    pub fn is_letter(&self) -> bool {
        matches!(self, EntityId::Letter(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityMode {
    /// Static body pinned at the rest position.
    Anchored,
    /// Dynamic body under simulation.
    Free,
    /// No body; visual only (e.g. mid fly-back).
    Detached,
}

/// Shape and material used whenever the entity's body is (re)created.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySpec<F: Float> {
    pub shape: Shape<F>,
    pub density: F,
    pub restitution: F,
    pub friction: F,
    pub filter: CollisionFilter,
}

impl<F: Float> EntitySpec<F> {
    pub fn new(shape: Shape<F>) -> Self {
        EntitySpec {
            shape,
            density: F::from_f32(0.001),
            restitution: F::zero(),
            friction: F::from_f32(0.1),
            filter: CollisionFilter::DEFAULT,
        }
    }

    pub fn with_material(mut self, density: F, restitution: F, friction: F) -> Self {
        self.density = density;
        self.restitution = restitution;
        self.friction = friction;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    fn desc(&self, base: BodyDesc<F>, pos: Vec2<F>) -> BodyDesc<F> {
        base.with_position(pos)
            .with_density(self.density)
            .with_restitution(self.restitution)
            .with_friction(self.friction)
            .with_filter(self.filter)
    }

    fn fixed(&self, pos: Vec2<F>) -> BodyDesc<F> {
        self.desc(BodyDesc::fixed(self.shape.clone()), pos)
    }

    fn dynamic(&self, pos: Vec2<F>) -> BodyDesc<F> {
        self.desc(BodyDesc::dynamic(self.shape.clone()), pos)
    }
}

#[derive(Clone, Debug)]
struct Entry<F: Float> {
    spec: EntitySpec<F>,
    mode: EntityMode,
    body: Option<BodyId>,
}

/// Entity table for one mounted scene.
#[derive(Clone, Debug, Default)]
pub struct Registry<F: Float> {
    entries: BTreeMap<EntityId, Entry<F>>,
}

impl<F: Float> Registry<F> {
    pub fn new() -> Self {
        Registry { entries: BTreeMap::new() }
    }

    /// Registers an entity in `Detached` mode.
    pub fn insert(&mut self, id: EntityId, spec: EntitySpec<F>) -> Result<(), SceneError> {
        if self.entries.contains_key(&id) {
            return Err(SceneError::InvalidConfig("entity already registered"));
        }
        self.entries.insert(id, Entry { spec, mode: EntityMode::Detached, body: None });
        Ok(())
    }

    /// Detaches and forgets an entity.
    pub fn remove(&mut self, world: &mut World<F>, id: EntityId) -> Result<(), SceneError> {
        self.detach(world, id)?;
        self.entries.remove(&id);
        Ok(())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mode(&self, id: EntityId) -> Option<EntityMode> {
        self.entries.get(&id).map(|e| e.mode)
    }

    pub fn body(&self, id: EntityId) -> Option<BodyId> {
        self.entries.get(&id).and_then(|e| e.body)
    }

    pub fn spec(&self, id: EntityId) -> Option<&EntitySpec<F>> {
        self.entries.get(&id).map(|e| &e.spec)
    }

    /// Entity owning `body`, if any.
    pub fn entity_of(&self, body: BodyId) -> Option<EntityId> {
        self.entries
            .iter()
            .find(|(_, e)| e.body == Some(body))
            .map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, EntityMode, Option<BodyId>)> + '_ {
        self.entries.iter().map(|(id, e)| (*id, e.mode, e.body))
    }

    pub fn free_entities(&self) -> AllocVec<EntityId> {
        self.entries
            .iter()
            .filter(|(_, e)| e.mode == EntityMode::Free)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ensures a static body at `pos`. Anchoring twice at the same position
    /// changes nothing; a different position moves the existing body.
    pub fn anchor(
        &mut self,
        world: &mut World<F>,
        id: EntityId,
        pos: Vec2<F>,
    ) -> Result<BodyId, SceneError> {
        let entry = self.entries.get_mut(&id).ok_or(SceneError::UnknownEntity)?;
        if entry.mode == EntityMode::Anchored {
            if let Some(body) = entry.body.filter(|b| world.contains(*b)) {
                let at_rest = world
                    .body(body)
                    .map(|b| b.pos.distance_sq(pos) < F::from_f32(1e-12))
                    .unwrap_or(false);
                if !at_rest {
                    world.place(body, pos)?;
                }
                return Ok(body);
            }
            tracing::warn!(entity = ?id, "anchored body went missing, recreating");
        }

        take_body(world, id, entry)?;
        let body = world.add_body(entry.spec.fixed(pos))?;
        entry.body = Some(body);
        entry.mode = EntityMode::Anchored;
        tracing::debug!(entity = ?id, body = %body, "entity anchored");
        Ok(body)
    }

    /// Ensures a dynamic body at `pos` moving with `velocity_hint`. No-op if
    /// the entity is already free.
    pub fn release(
        &mut self,
        world: &mut World<F>,
        id: EntityId,
        pos: Vec2<F>,
        velocity_hint: Vec2<F>,
    ) -> Result<BodyId, SceneError> {
        let entry = self.entries.get_mut(&id).ok_or(SceneError::UnknownEntity)?;
        if entry.mode == EntityMode::Free {
            if let Some(body) = entry.body.filter(|b| world.contains(*b)) {
                return Ok(body);
            }
            tracing::warn!(entity = ?id, "free body went missing, recreating");
        }

        take_body(world, id, entry)?;
        let body = world.add_body(entry.spec.dynamic(pos).with_velocity(velocity_hint))?;
        entry.body = Some(body);
        entry.mode = EntityMode::Free;
        tracing::debug!(entity = ?id, body = %body, "entity released");
        Ok(body)
    }

    /// Removes the entity's body without replacement.
    pub fn detach(&mut self, world: &mut World<F>, id: EntityId) -> Result<(), SceneError> {
        let entry = self.entries.get_mut(&id).ok_or(SceneError::UnknownEntity)?;
        take_body(world, id, entry)?;
        entry.mode = EntityMode::Detached;
        Ok(())
    }

    /// Moves every anchored entity to its position in `layout` with zero
    /// velocity and adopts the layout's letter and slab sizes. Free and
    /// detached bodies are left alone; their next body uses the new size.
    pub fn relayout(&mut self, world: &mut World<F>, layout: &RestLayout<F>) -> Result<usize, SceneError> {
        let letter = layout.letter_size();
        let mut moved = 0;
        for (id, entry) in self.entries.iter_mut() {
            let resized = match id {
                EntityId::Letter(_) => Some(Shape::rect(letter.x, letter.y)?),
                EntityId::Ground | EntityId::WallLeft | EntityId::WallRight => match layout.slab(*id) {
                    Some(slab) => Some(Shape::rect(slab.size.x, slab.size.y)?),
                    None => None,
                },
                EntityId::Ball(_) => None,
            };
            if let Some(shape) = resized {
                entry.spec.shape = shape;
            }

            if entry.mode != EntityMode::Anchored {
                continue;
            }
            let Some(pos) = layout.position(*id) else { continue };
            match entry.body.filter(|b| world.contains(*b)) {
                Some(body) => {
                    world.set_shape(body, entry.spec.shape.clone())?;
                    world.place(body, pos)?;
                }
                None => {
                    tracing::warn!(entity = ?id, "anchored body went missing, recreating");
                    entry.body = Some(world.add_body(entry.spec.fixed(pos))?);
                }
            }
            moved += 1;
        }
        tracing::debug!(moved, "relayout applied");
        Ok(moved)
    }
}

fn take_body<F: Float>(world: &mut World<F>, id: EntityId, entry: &mut Entry<F>) -> Result<(), SceneError> {
    if let Some(body) = entry.body.take() {
        match world.remove_body(body) {
            Ok(_) => {}
            Err(SceneError::StaleBody { id: stale }) => {
                tracing::warn!(entity = ?id, body = %stale, "body already gone");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
