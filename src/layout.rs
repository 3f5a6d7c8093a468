//! Viewport geometry and the rest positions derived from it.

use alloc::collections::BTreeMap;
use alloc::vec::Vec as AllocVec;

use crate::config::{BallLayout, SceneConfig};
use crate::error::SceneError;
use crate::float::Float;
use crate::registry::EntityId;
use crate::vec::Vec2;

/// Visible area in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Viewport<F: Float> {
    pub width: F,
    pub height: F,
}

impl<F: Float> Viewport<F> {
    pub fn new(width: F, height: F) -> Self {
        Viewport { width, height }
    }

    /// A viewport with no area has not been laid out yet.
    pub fn is_ready(&self) -> bool {
        self.width > F::zero()
            && self.height > F::zero()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    pub fn is_mobile(&self, breakpoint: F) -> bool {
        self.width < breakpoint
    }

    pub fn center(&self) -> Vec2<F> {
        Vec2::new(self.width * F::half(), self.height * F::half())
    }

    pub(crate) fn not_ready(&self) -> SceneError {
        SceneError::LayoutNotReady {
            width: self.width.to_f64(),
            height: self.height.to_f64(),
        }
    }
}

/// Where a static body sits and how big it is.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Slab<F: Float> {
    pub center: Vec2<F>,
    pub size: Vec2<F>,
}

/// Rest coordinates for every entity that has one, for a single viewport.
///
/// Recomputed on every viewport change; anchored bodies always sit at the
/// positions of the current layout.
#[derive(Clone, Debug, PartialEq)]
pub struct RestLayout<F: Float> {
    viewport: Viewport<F>,
    positions: BTreeMap<EntityId, Vec2<F>>,
    letter_size: Vec2<F>,
    ground: Slab<F>,
    wall_left: Slab<F>,
    wall_right: Slab<F>,
    balls: BallLayout<F>,
}

impl<F: Float> RestLayout<F> {
    pub fn compute(config: &SceneConfig<F>, viewport: Viewport<F>) -> Result<Self, SceneError> {
        if !viewport.is_ready() {
            return Err(viewport.not_ready());
        }
        let (w, h) = (viewport.width, viewport.height);

        let slots = config.letters.chars().count();
        let natural_pitch = config.letter_width + config.letter_spacing;
        let natural_row = natural_pitch * F::from_f32(slots as f32);
        // Long names on narrow screens shrink uniformly so letters never overlap.
        let scale = if natural_row > w && natural_row > F::zero() {
            w / natural_row
        } else {
            F::one()
        };
        let pitch = natural_pitch * scale;
        let letter_size = Vec2::new(config.letter_width * scale, config.letter_height * scale);
        let start_x = w * F::half() - F::from_f32(slots as f32) * pitch * F::half();
        let row_y = h * config.row_fraction;

        let mut positions = BTreeMap::new();
        for (i, ch) in config.letters.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = start_x + F::from_f32(i as f32) * pitch + letter_size.x * F::half();
            positions.insert(EntityId::Letter(i as u16), Vec2::new(x, row_y));
        }

        let t = config.wall_thickness;
        let gh = config.ground_height;
        let ground = Slab {
            center: Vec2::new(w * F::half(), h - gh * F::half()),
            size: Vec2::new(w, gh),
        };
        let wall_left = Slab {
            center: Vec2::new(t * F::half(), h * F::half()),
            size: Vec2::new(t, h),
        };
        let wall_right = Slab {
            center: Vec2::new(w - t * F::half(), h * F::half()),
            size: Vec2::new(t, h),
        };
        positions.insert(EntityId::Ground, ground.center);
        positions.insert(EntityId::WallLeft, wall_left.center);
        positions.insert(EntityId::WallRight, wall_right.center);

        let balls = if viewport.is_mobile(config.mobile_breakpoint) {
            config.mobile_balls
        } else {
            config.desktop_balls
        };

        Ok(RestLayout {
            viewport,
            positions,
            letter_size,
            ground,
            wall_left,
            wall_right,
            balls,
        })
    }

    pub fn viewport(&self) -> Viewport<F> {
        self.viewport
    }

    /// Rest position, if the entity has one. Balls never do.
    pub fn position(&self, id: EntityId) -> Option<Vec2<F>> {
        self.positions.get(&id).copied()
    }

    pub fn letter_size(&self) -> Vec2<F> {
        self.letter_size
    }

    pub fn letters(&self) -> impl Iterator<Item = (EntityId, Vec2<F>)> + '_ {
        self.positions
            .iter()
            .filter(|(id, _)| matches!(id, EntityId::Letter(_)))
            .map(|(id, p)| (*id, *p))
    }

    /// Static geometry slab for ground and walls.
    pub fn slab(&self, id: EntityId) -> Option<Slab<F>> {
        match id {
            EntityId::Ground => Some(self.ground),
            EntityId::WallLeft => Some(self.wall_left),
            EntityId::WallRight => Some(self.wall_right),
            _ => None,
        }
    }

    pub fn balls(&self) -> BallLayout<F> {
        self.balls
    }

    /// Spawn x range and y for ball `i`: random x inside the walls, stacked
    /// upward from a quarter of the viewport height.
    pub fn ball_spawn(&self, i: u16) -> (F, F, F) {
        let r = self.balls.radius;
        let min_x = r;
        let max_x = (self.viewport.width - r).max(r);
        let y = self.viewport.height / F::from_f32(4.0) - F::from_f32(i as f32) * self.balls.offset;
        (min_x, max_x, y)
    }

    pub fn entity_ids(&self) -> AllocVec<EntityId> {
        self.positions.keys().copied().collect()
    }
}
