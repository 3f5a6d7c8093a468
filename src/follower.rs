//! Cursor follower: a first-order filter on the pointer that snaps to
//! hovered nav links, plus optional trailing blobs.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec as AllocVec;
use core::cell::RefCell;

use crate::config::FollowerConfig;
use crate::error::SceneError;
use crate::float::Float;
use crate::hover::{HoverSlot, HoverState, SubscriptionId};
use crate::vec::{Scalar, Vec, Vec2};

/// Exponential smoothing: each update covers `factor` of the remaining gap.
///
/// For `factor` in (0, 1] the value approaches the target geometrically and
/// never passes it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExpFilter<V: Vec> {
    current: V,
    target: V,
    factor: V::Scalar,
}

impl<V: Vec> ExpFilter<V> {
    pub fn new(initial: V, factor: V::Scalar) -> Self {
        ExpFilter { current: initial, target: initial, factor }
    }

    pub fn update(&mut self) {
        self.current = self.current + (self.target - self.current).scale(self.factor);
    }

    pub fn set_target(&mut self, target: V) { self.target = target; }
    pub fn set_factor(&mut self, factor: V::Scalar) { self.factor = factor; }
    pub fn value(&self) -> V { self.current }
    pub fn target(&self) -> V { self.target }
    pub fn factor(&self) -> V::Scalar { self.factor }

    pub fn is_settled(&self, eps: V::Scalar) -> bool {
        self.current.distance_sq(self.target) < eps * eps
    }

    pub fn reset(&mut self, value: V) {
        self.current = value;
        self.target = value;
    }

    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FollowMode {
    Idle,
    Magnetized,
}

/// Snapshot of the follower after a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorState<F: Float> {
    pub raw: Vec2<F>,
    pub position: Vec2<F>,
    pub scale: F,
    pub stretch: Vec2<F>,
    pub size: F,
    pub mode: FollowMode,
    pub label: Option<String>,
    pub target: Option<Vec2<F>>,
    pub trail: AllocVec<Vec2<F>>,
}

// Idle scale saturates at 1.5; x stretches by 70% of it, y squashes by all of it.
const IDLE_SCALE_CAP: f32 = 0.5;
const IDLE_STRETCH_GAIN: f32 = 0.7;

pub struct CursorFollower<F: Float> {
    config: FollowerConfig<F>,
    primary: ExpFilter<Vec2<F>>,
    size: ExpFilter<Scalar<F>>,
    trail: AllocVec<ExpFilter<Vec2<F>>>,
    raw: Vec2<F>,
    scale: F,
    stretch: Vec2<F>,
    mode: FollowMode,
    hover: Rc<RefCell<HoverState<F>>>,
    subscription: Option<(HoverSlot<F>, SubscriptionId)>,
}

impl<F: Float + 'static> CursorFollower<F> {
    /// Starts at rest at `start`, usually the viewport center.
    pub fn new(config: FollowerConfig<F>, start: Vec2<F>) -> Result<Self, SceneError> {
        config.validate()?;
        let mut factor = config.idle_factor;
        let trail = (0..config.trail_count)
            .map(|_| {
                factor = factor * config.trail_decay;
                ExpFilter::new(start, factor)
            })
            .collect();
        Ok(CursorFollower {
            primary: ExpFilter::new(start, config.idle_factor),
            size: ExpFilter::new(Scalar(config.idle_size), config.size_factor),
            trail,
            raw: start,
            scale: F::one(),
            stretch: Vec2::splat(F::one()),
            mode: FollowMode::Idle,
            hover: Rc::new(RefCell::new(HoverState::default())),
            subscription: None,
            config,
        })
    }

    /// Follows the hover slot until dropped or re-attached.
    pub fn attach(&mut self, slot: &HoverSlot<F>) {
        self.detach();
        *self.hover.borrow_mut() = slot.get();
        let mailbox = Rc::clone(&self.hover);
        let id = slot.subscribe(move |state| *mailbox.borrow_mut() = state.clone());
        self.subscription = Some((slot.clone(), id));
    }

    pub fn detach(&mut self) {
        if let Some((slot, id)) = self.subscription.take() {
            slot.unsubscribe(id);
        }
    }

    pub fn on_pointer_move(&mut self, pos: Vec2<F>) {
        self.raw = pos;
    }

    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    pub fn position(&self) -> Vec2<F> {
        self.primary.value()
    }

    /// One animation frame.
    pub fn update(&mut self) -> CursorState<F> {
        let hover = self.hover.borrow().clone();
        let one = F::one();
        let last = self.primary.value();

        match hover.target.filter(|_| hover.hovered) {
            Some(target) => {
                self.mode = FollowMode::Magnetized;
                let d = target - last;
                let cap = self.config.max_stretch - one;
                let n = self.config.distance_normalizer;
                self.stretch = Vec2::new(
                    one + (d.x.abs() / n).min(cap),
                    one + (d.y.abs() / n).min(cap),
                );
                self.primary.set_factor(self.config.magnet_factor);
                self.primary.set_target(target);
            }
            None => {
                self.mode = FollowMode::Idle;
                let speed = (self.raw - last).length();
                self.scale = one + (speed / self.config.speed_normalizer).min(F::from_f32(IDLE_SCALE_CAP));
                self.stretch = Vec2::new(
                    one + (self.scale - one) * F::from_f32(IDLE_STRETCH_GAIN),
                    F::two() - self.scale,
                );
                self.primary.set_factor(self.config.idle_factor);
                self.primary.set_target(self.raw);
            }
        }
        self.stretch = Vec2::new(
            self.stretch.x.min(self.config.max_stretch),
            self.stretch.y.min(self.config.max_stretch),
        );
        self.primary.update();

        let size = if hover.hovered { self.config.hover_size } else { self.config.idle_size };
        self.size.set_target(Scalar(size));
        self.size.update();

        let mut leader = self.primary.value();
        for blob in self.trail.iter_mut() {
            blob.set_target(leader);
            blob.update();
            leader = blob.value();
        }

        self.state_with(hover)
    }

    pub fn state(&self) -> CursorState<F> {
        let hover = self.hover.borrow().clone();
        self.state_with(hover)
    }

    fn state_with(&self, hover: HoverState<F>) -> CursorState<F> {
        CursorState {
            raw: self.raw,
            position: self.primary.value(),
            scale: self.scale,
            stretch: self.stretch,
            size: self.size.value().0,
            mode: self.mode,
            label: hover.label,
            target: hover.target,
            trail: self.trail.iter().map(|b| b.value()).collect(),
        }
    }
}

impl<F: Float> Drop for CursorFollower<F> {
    fn drop(&mut self) {
        if let Some((slot, id)) = self.subscription.take() {
            slot.unsubscribe(id);
        }
    }
}
