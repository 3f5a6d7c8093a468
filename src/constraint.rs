//! Position constraints applied after integration: pointer drag and viewport bounds.

use crate::body::Body;
use crate::float::Float;
use crate::vec::{Vec, Vec2};
use crate::world::BodyId;

/// Spring that pulls a body-local anchor toward the pointer.
///
/// Solved once per sub-step; `stiffness` is the fraction of the remaining
/// gap closed each time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragConstraint<F: Float> {
    pub body: BodyId,
    /// Grab point in body space.
    pub local_anchor: Vec2<F>,
    /// Pointer position in world space.
    pub target: Vec2<F>,
    pub stiffness: F,
}

impl<F: Float> DragConstraint<F> {
    /// Grab `body` at the world-space `point`.
    pub fn grab(id: BodyId, body: &Body<F>, point: Vec2<F>, stiffness: F) -> Self {
        DragConstraint {
            body: id,
            local_anchor: (point - body.pos).rotate(-body.angle),
            target: point,
            stiffness,
        }
    }

    pub fn anchor_world(&self, body: &Body<F>) -> Vec2<F> {
        body.pos + self.local_anchor.rotate(body.angle)
    }

    pub fn solve(&self, body: &mut Body<F>) {
        if body.is_static() {
            return;
        }
        let r = self.local_anchor.rotate(body.angle);
        let delta = self.target - (body.pos + r);
        let dist = delta.length();
        if dist.is_near_zero(F::from_f32(1e-6)) {
            return;
        }
        let dir = delta.scale(F::one() / dist);
        let rn = r.cross(dir);
        let w = body.inv_mass + body.inv_inertia * rn * rn;
        if w.is_near_zero(F::from_f32(1e-12)) {
            return;
        }
        let lambda = dist * self.stiffness / w;
        body.pos = body.pos + dir.scale(lambda * body.inv_mass);
        body.angle = body.angle + body.inv_inertia * rn * lambda;
    }
}

/// Keeps dynamic bodies inside the viewport. The top is open so bodies can
/// spawn above the fold and fall in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundsConstraint<F: Float> {
    pub min_x: F,
    pub max_x: F,
    pub max_y: F,
    pub restitution: F,
}

impl<F: Float> BoundsConstraint<F> {
    pub fn new(width: F, height: F, restitution: F) -> Self {
        BoundsConstraint {
            min_x: F::zero(),
            max_x: width,
            max_y: height,
            restitution,
        }
    }

    /// Center range that keeps a body with these half extents inside;
    /// bodies wider than the bounds are centered.
    fn x_range(&self, half_width: F) -> (F, F) {
        let lo = self.min_x + half_width;
        let hi = self.max_x - half_width;
        if lo > hi {
            let mid = (self.min_x + self.max_x) * F::half();
            (mid, mid)
        } else {
            (lo, hi)
        }
    }

    pub fn contains(&self, body: &Body<F>) -> bool {
        let ext = body.shape.aabb_half_extents(body.angle);
        let (lo, hi) = self.x_range(ext.x);
        let eps = F::from_f32(1e-3);
        body.pos.x >= lo - eps && body.pos.x <= hi + eps && body.pos.y + ext.y <= self.max_y + eps
    }

    /// Pushes the body back inside and reflects the offending velocity component.
    pub fn solve(&self, body: &mut Body<F>) {
        if body.is_static() {
            return;
        }
        let ext = body.shape.aabb_half_extents(body.angle);
        let (lo, hi) = self.x_range(ext.x);
        if body.pos.x < lo {
            body.pos.x = lo;
            let vel_x = body.pos.x - body.prev_pos.x;
            body.prev_pos.x = body.pos.x + vel_x * self.restitution;
        } else if body.pos.x > hi {
            body.pos.x = hi;
            let vel_x = body.pos.x - body.prev_pos.x;
            body.prev_pos.x = body.pos.x + vel_x * self.restitution;
        }
        let max_y = self.max_y - ext.y;
        if body.pos.y > max_y {
            body.pos.y = max_y;
            let vel_y = body.pos.y - body.prev_pos.y;
            body.prev_pos.y = body.pos.y + vel_y * self.restitution;
        }
    }

    /// Hard clamp with no velocity change, used after a resize.
    pub fn clamp(&self, body: &mut Body<F>) -> bool {
        if body.is_static() || self.contains(body) {
            return false;
        }
        let ext = body.shape.aabb_half_extents(body.angle);
        let (lo, hi) = self.x_range(ext.x);
        let target = Vec2::new(
            body.pos.x.clamp(lo, hi),
            body.pos.y.min(self.max_y - ext.y),
        );
        body.move_to(target);
        true
    }
}
