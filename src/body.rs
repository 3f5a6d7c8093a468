//! Verlet rigid bodies: position-based dynamics with implicit linear and
//! angular velocity.

use crate::error::SceneError;
use crate::float::Float;
use crate::shape::Shape;
use crate::vec::{Vec, Vec2};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves under simulation; infinite mass.
    Static,
    Dynamic,
}

/// Category/mask pair. Two bodies collide when each one's mask contains the
/// other's category.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl CollisionFilter {
    pub const DEFAULT: CollisionFilter = CollisionFilter { category: 0x0001, mask: u32::MAX };

    pub fn new(category: u32, mask: u32) -> Self {
        CollisionFilter { category, mask }
    }

    pub fn collides_with(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Description of a body to insert into the world.
///
/// ```
/// use letterfall::body::BodyDesc;
/// use letterfall::shape::Shape;
/// use letterfall::vec::Vec2;
///
/// let desc = BodyDesc::dynamic(Shape::circle(35.0f32).unwrap())
///     .with_position(Vec2::new(100.0, 50.0))
///     .with_restitution(0.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDesc<F: Float> {
    pub kind: BodyKind,
    pub shape: Shape<F>,
    pub position: Vec2<F>,
    pub angle: F,
    pub velocity: Vec2<F>,
    pub angular_velocity: F,
    pub density: F,
    pub restitution: F,
    pub friction: F,
    pub filter: CollisionFilter,
}

impl<F: Float> BodyDesc<F> {
    pub fn dynamic(shape: Shape<F>) -> Self {
        BodyDesc {
            kind: BodyKind::Dynamic,
            shape,
            position: Vec2::zero(),
            angle: F::zero(),
            velocity: Vec2::zero(),
            angular_velocity: F::zero(),
            density: F::from_f32(0.001),
            restitution: F::zero(),
            friction: F::from_f32(0.1),
            filter: CollisionFilter::DEFAULT,
        }
    }

    pub fn fixed(shape: Shape<F>) -> Self {
        BodyDesc {
            kind: BodyKind::Static,
            ..Self::dynamic(shape)
        }
    }

    pub fn with_position(mut self, position: Vec2<F>) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: F) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2<F>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: F) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_density(mut self, density: F) -> Self {
        self.density = density;
        self
    }

    pub fn with_restitution(mut self, restitution: F) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: F) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// A rigid body integrated with position Verlet.
///
/// Velocity is implicit: `(pos - prev_pos) / dt`, where `dt` is the world's
/// sub-step. Writing `prev_pos` is how velocity is set.
#[derive(Clone, Debug)]
pub struct Body<F: Float> {
    pub pos: Vec2<F>,
    pub prev_pos: Vec2<F>,
    pub angle: F,
    pub prev_angle: F,
    pub force: Vec2<F>,
    pub torque: F,
    pub shape: Shape<F>,
    pub kind: BodyKind,
    pub mass: F,
    pub inv_mass: F,
    pub inv_inertia: F,
    pub density: F,
    pub restitution: F,
    pub friction: F,
    pub filter: CollisionFilter,
    pub(crate) bounding_radius: F,
}

impl<F: Float> Body<F> {
    pub(crate) fn from_desc(desc: BodyDesc<F>, dt: F) -> Result<Self, SceneError> {
        if !desc.position.is_finite() || !desc.velocity.is_finite() || !desc.angle.is_finite() {
            return Err(SceneError::InvalidShape);
        }
        let mut body = Body {
            pos: desc.position,
            prev_pos: desc.position,
            angle: desc.angle,
            prev_angle: desc.angle,
            force: Vec2::zero(),
            torque: F::zero(),
            bounding_radius: desc.shape.bounding_radius(),
            shape: desc.shape,
            kind: desc.kind,
            mass: F::zero(),
            inv_mass: F::zero(),
            inv_inertia: F::zero(),
            density: desc.density,
            restitution: desc.restitution,
            friction: desc.friction,
            filter: desc.filter,
        };
        if desc.kind == BodyKind::Dynamic {
            body.recompute_mass()?;
            body.set_velocity(desc.velocity, dt);
            body.set_angular_velocity(desc.angular_velocity, dt);
        }
        Ok(body)
    }

    pub(crate) fn recompute_mass(&mut self) -> Result<(), SceneError> {
        self.bounding_radius = self.shape.bounding_radius();
        if self.kind == BodyKind::Static {
            self.mass = F::zero();
            self.inv_mass = F::zero();
            self.inv_inertia = F::zero();
            return Ok(());
        }
        if !(self.density > F::zero()) || !self.density.is_finite() {
            return Err(SceneError::InvalidMass);
        }
        let mass = self.shape.area() * self.density;
        if !(mass > F::zero()) {
            return Err(SceneError::InvalidMass);
        }
        let inertia = self.shape.inertia(mass);
        self.mass = mass;
        self.inv_mass = F::one() / mass;
        self.inv_inertia = if inertia > F::zero() { F::one() / inertia } else { F::zero() };
        Ok(())
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    pub fn bounding_radius(&self) -> F {
        self.bounding_radius
    }

    pub fn apply_force(&mut self, force: Vec2<F>) {
        if !self.is_static() {
            self.force = self.force + force;
        }
    }

    pub fn apply_torque(&mut self, torque: F) {
        if !self.is_static() {
            self.torque = self.torque + torque;
        }
    }

    /// One Verlet step. `retain` is the velocity fraction kept over this `dt`.
    pub fn integrate(&mut self, gravity: Vec2<F>, dt: F, retain: F) {
        if self.is_static() {
            return;
        }
        let accel = gravity + self.force.scale(self.inv_mass);
        let velocity = (self.pos - self.prev_pos).scale(retain);
        let new_pos = self.pos + velocity + accel.scale(dt * dt);
        self.prev_pos = self.pos;
        self.pos = new_pos;

        let ang_accel = self.torque * self.inv_inertia;
        let spin = (self.angle - self.prev_angle) * retain;
        let new_angle = self.angle + spin + ang_accel * dt * dt;
        self.prev_angle = self.angle;
        self.angle = new_angle;
    }

    pub(crate) fn clear_forces(&mut self) {
        self.force = Vec2::zero();
        self.torque = F::zero();
    }

    pub fn velocity(&self, dt: F) -> Vec2<F> {
        if dt.is_near_zero(F::from_f32(1e-30)) {
            return Vec2::zero();
        }
        (self.pos - self.prev_pos).scale(F::one() / dt)
    }

    pub fn angular_velocity(&self, dt: F) -> F {
        if dt.is_near_zero(F::from_f32(1e-30)) {
            return F::zero();
        }
        (self.angle - self.prev_angle) / dt
    }

    pub fn set_velocity(&mut self, velocity: Vec2<F>, dt: F) {
        self.prev_pos = self.pos - velocity.scale(dt);
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: F, dt: F) {
        self.prev_angle = self.angle - angular_velocity * dt;
    }

    /// Teleport, keeping the current velocity.
    pub fn move_to(&mut self, pos: Vec2<F>) {
        let velocity = self.pos - self.prev_pos;
        self.pos = pos;
        self.prev_pos = pos - velocity;
    }

    /// Teleport and stop.
    pub fn place(&mut self, pos: Vec2<F>, angle: F) {
        self.pos = pos;
        self.prev_pos = pos;
        self.angle = angle;
        self.prev_angle = angle;
        self.clear_forces();
    }

    pub fn contains(&self, point: Vec2<F>) -> bool {
        self.shape.contains(self.pos, self.angle, point)
    }
}
