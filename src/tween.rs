//! Scripted fly-back of free entities to their rest positions.

use alloc::collections::BTreeMap;
use alloc::vec::Vec as AllocVec;

use crate::config::Easing;
use crate::float::Float;
use crate::layout::RestLayout;
use crate::registry::{EntityId, Registry};
use crate::vec::{Vec, Vec2};
use crate::world::World;

/// CSS-style cubic-bezier timing function through (0,0) and (1,1).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CubicBezier<F: Float> {
    x1: F,
    y1: F,
    x2: F,
    y2: F,
}

impl<F: Float> CubicBezier<F> {
    pub fn new(easing: Easing<F>) -> Self {
        CubicBezier {
            x1: easing.x1.clamp(F::zero(), F::one()),
            y1: easing.y1,
            x2: easing.x2.clamp(F::zero(), F::one()),
            y2: easing.y2,
        }
    }

    fn component(t: F, p1: F, p2: F) -> F {
        let three = F::from_f32(3.0);
        let u = F::one() - t;
        three * u * u * t * p1 + three * u * t * t * p2 + t * t * t
    }

    fn derivative(t: F, p1: F, p2: F) -> F {
        let three = F::from_f32(3.0);
        let six = F::from_f32(6.0);
        let u = F::one() - t;
        three * u * u * p1 + six * u * t * (p2 - p1) + three * t * t * (F::one() - p2)
    }

    /// Curve parameter whose x equals `x`.
    fn solve_t(&self, x: F) -> F {
        let epsilon = F::from_f32(1e-6);
        let mut t = x;
        for _ in 0..8 {
            let err = Self::component(t, self.x1, self.x2) - x;
            if err.abs() < epsilon {
                return t;
            }
            let d = Self::derivative(t, self.x1, self.x2);
            if d.abs() < epsilon {
                break;
            }
            t = t - err / d;
        }

        let (mut lo, mut hi) = (F::zero(), F::one());
        t = x;
        for _ in 0..32 {
            let value = Self::component(t, self.x1, self.x2);
            if (value - x).abs() < epsilon {
                break;
            }
            if value < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * F::half();
        }
        t
    }

    /// Eased progress for linear progress `x` in [0, 1].
    pub fn ease(&self, x: F) -> F {
        let x = x.clamp(F::zero(), F::one());
        if x <= F::zero() {
            return F::zero();
        }
        if x >= F::one() {
            return F::one();
        }
        Self::component(self.solve_t(x), self.y1, self.y2)
    }
}

/// One entity flying from where it was released back to its rest position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlyBack<F: Float> {
    pub from: Vec2<F>,
    pub from_angle: F,
    pub start_ms: f64,
}

/// Interpolated pose of a returning entity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TweenPose<F: Float> {
    pub pos: Vec2<F>,
    pub angle: F,
    /// Linear progress in [0, 1].
    pub progress: F,
}

/// All fly-backs in progress. Targets are read from the current layout on
/// every sample, so a resize mid-flight lands on the new rest position.
#[derive(Clone, Debug)]
pub struct Returns<F: Float> {
    active: BTreeMap<EntityId, FlyBack<F>>,
    duration_ms: F,
    curve: CubicBezier<F>,
}

impl<F: Float> Returns<F> {
    pub fn new(duration_ms: F, easing: Easing<F>) -> Self {
        Returns {
            active: BTreeMap::new(),
            duration_ms,
            curve: CubicBezier::new(easing),
        }
    }

    pub fn start(&mut self, id: EntityId, from: Vec2<F>, from_angle: F, now_ms: f64) {
        self.active.insert(id, FlyBack { from, from_angle, start_ms: now_ms });
    }

    pub fn is_returning(&self, id: EntityId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.keys().copied()
    }

    pub fn cancel(&mut self, id: EntityId) -> bool {
        self.active.remove(&id).is_some()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    fn progress(&self, fly: &FlyBack<F>, now_ms: f64) -> F {
        if !(self.duration_ms > F::zero()) {
            return F::one();
        }
        let elapsed = F::from_f64((now_ms - fly.start_ms).max(0.0));
        (elapsed / self.duration_ms).min(F::one())
    }

    pub fn pose(&self, id: EntityId, now_ms: f64, layout: &RestLayout<F>) -> Option<TweenPose<F>> {
        let fly = self.active.get(&id)?;
        let target = layout.position(id)?;
        let progress = self.progress(fly, now_ms);
        let eased = self.curve.ease(progress);
        Some(TweenPose {
            pos: fly.from.lerp(target, eased),
            angle: fly.from_angle * (F::one() - eased),
            progress,
        })
    }

    /// Anchors every entity whose fly-back has finished. Returns them.
    pub fn advance(
        &mut self,
        now_ms: f64,
        layout: &RestLayout<F>,
        registry: &mut Registry<F>,
        world: &mut World<F>,
    ) -> AllocVec<EntityId> {
        let done: AllocVec<EntityId> = self
            .active
            .iter()
            .filter(|(_, fly)| self.progress(fly, now_ms) >= F::one())
            .map(|(id, _)| *id)
            .collect();

        for id in done.iter() {
            self.active.remove(id);
            let Some(rest) = layout.position(*id) else {
                tracing::warn!(entity = ?id, "no rest position, dropping fly-back");
                continue;
            };
            if let Err(e) = registry.anchor(world, *id, rest) {
                tracing::warn!(entity = ?id, error = %e, "could not anchor returned entity");
            }
        }
        if !done.is_empty() {
            tracing::debug!(count = done.len(), remaining = self.active.len(), "fly-backs landed");
        }
        done
    }
}
