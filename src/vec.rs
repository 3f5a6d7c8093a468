//! Vector types shared by the physics world and the cursor follower.
//!
//! Coordinates are viewport pixels with the y axis pointing down, matching
//! the DOM. [`Vec`] is the small interface the exponential filters need, so
//! the follower smooths a 2D position and a 1D size with the same code.

use crate::float::Float;
use core::ops::{Add, Neg, Sub};

/// What a [`crate::follower::ExpFilter`] can smooth.
pub trait Vec:
    Copy + Add<Output = Self> + Sub<Output = Self> + Neg<Output = Self> + PartialEq + Default + core::fmt::Debug
{
    type Scalar: Float;

    fn zero() -> Self;
    fn splat(value: Self::Scalar) -> Self;
    fn dot(self, other: Self) -> Self::Scalar;
    fn scale(self, s: Self::Scalar) -> Self;

    fn length_sq(self) -> Self::Scalar {
        self.dot(self)
    }

    fn length(self) -> Self::Scalar {
        self.length_sq().sqrt()
    }

    /// Unit vector, or zero when the input is (nearly) zero. Contact normals
    /// rely on the zero case for coincident centres.
    fn normalize(self) -> Self {
        let len = self.length();
        if len.is_near_zero(Self::Scalar::from_f32(1e-10)) {
            Self::zero()
        } else {
            self.scale(Self::Scalar::one() / len)
        }
    }

    fn distance(self, other: Self) -> Self::Scalar {
        (self - other).length()
    }

    fn distance_sq(self, other: Self) -> Self::Scalar {
        (self - other).length_sq()
    }

    fn lerp(self, other: Self, t: Self::Scalar) -> Self {
        self + (other - self).scale(t)
    }
}

/// A single smoothed value, e.g. the cursor blob's size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Scalar<F: Float>(pub F);

/// A point or displacement in viewport pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2<F: Float> {
    pub x: F,
    pub y: F,
}

macro_rules! componentwise {
    ($ty:ident { $($field:tt),+ }) => {
        impl<F: Float> Add for $ty<F> {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                $ty { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl<F: Float> Sub for $ty<F> {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                $ty { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl<F: Float> Neg for $ty<F> {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                $ty { $($field: -self.$field),+ }
            }
        }
    };
}

componentwise!(Scalar { 0 });
componentwise!(Vec2 { x, y });

impl<F: Float> Vec for Scalar<F> {
    type Scalar = F;

    fn zero() -> Self {
        Scalar(F::zero())
    }

    fn splat(value: F) -> Self {
        Scalar(value)
    }

    fn dot(self, other: Self) -> F {
        self.0 * other.0
    }

    fn scale(self, s: F) -> Self {
        Scalar(self.0 * s)
    }
}

impl<F: Float> Vec for Vec2<F> {
    type Scalar = F;

    fn zero() -> Self {
        Self::splat(F::zero())
    }

    fn splat(value: F) -> Self {
        Vec2 { x: value, y: value }
    }

    fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y
    }

    fn scale(self, s: F) -> Self {
        Vec2 { x: self.x * s, y: self.y * s }
    }
}

impl<F: Float> Vec2<F> {
    pub const fn new(x: F, y: F) -> Self {
        Vec2 { x, y }
    }

    /// z component of the 3D cross product. Positive when `other` lies
    /// clockwise of `self` on screen (y down).
    pub fn cross(self, other: Self) -> F {
        self.x * other.y - self.y * other.x
    }

    /// Rotate by `angle` radians about the origin.
    pub fn rotate(self, angle: F) -> Self {
        let (s, c) = (angle.sin(), angle.cos());
        Vec2 {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Component-wise clamp into the box spanned by `min` and `max`.
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Vec2 {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_quarter_turn_is_clockwise_on_screen() {
        let r = Vec2::new(1.0f64, 0.0).rotate(core::f64::consts::FRAC_PI_2);
        assert!(r.x.abs() < 1e-12);
        assert!((r.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_degenerate_is_zero() {
        assert_eq!(Vec2::<f32>::zero().normalize(), Vec2::zero());
        let n = Vec2::new(0.0f32, -8.0).normalize();
        assert!((n.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_into_viewport() {
        let p = Vec2::new(-5.0f32, 900.0).clamp(Vec2::zero(), Vec2::new(1200.0, 800.0));
        assert_eq!(p, Vec2::new(0.0, 800.0));
    }

    #[test]
    fn scalar_behaves_as_one_dimensional_vector() {
        let a = Scalar(80.0f64);
        let b = Scalar(100.0f64);
        assert_eq!(a.lerp(b, 0.25), Scalar(85.0));
        assert_eq!(a.distance(b), 20.0);
    }

    #[test]
    fn nan_component_is_not_finite() {
        assert!(!Vec2::new(f32::NAN, 0.0).is_finite());
    }
}
