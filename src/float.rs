//! Floating-point abstraction so the scene runs on `f32` (browser) or `f64` (tests, tooling).

use core::cmp::PartialOrd;
use core::ops::{Add, Sub, Mul, Div, Neg};

/// Trait abstracting the floating-point operations the simulation needs.
///
/// Implemented for `f32` and `f64` on top of `libm`, so the crate stays `no_std`.
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Default
    + core::fmt::Debug
    + core::fmt::Display
{
    fn zero() -> Self;
    fn one() -> Self;
    fn half() -> Self;
    fn two() -> Self;
    fn pi() -> Self;
    fn sqrt(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn abs(self) -> Self;
    fn powf(self, exp: Self) -> Self;
    /// Smaller of the two; returns `other` when either is NaN.
    fn min(self, other: Self) -> Self;
    /// Larger of the two; returns `other` when either is NaN.
    fn max(self, other: Self) -> Self;
    /// Convert from f32 (for constants and configuration).
    fn from_f32(v: f32) -> Self;
    /// Convert from f64 (timestamps arrive as f64 milliseconds).
    fn from_f64(v: f64) -> Self;
    /// Widen to f64 for logging and host interop.
    fn to_f64(self) -> f64;
    /// True unless NaN or infinite.
    fn is_finite(self) -> bool;

    /// Clamp to `[min, max]`. Rotations and tween progress go through this.
    fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// Linear interpolation, unclamped in `t`.
    fn lerp(self, other: Self, t: Self) -> Self {
        self + (other - self) * t
    }

    /// `|self| < epsilon`. Used for settle checks on velocities.
    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }
}

macro_rules! impl_float {
    ($t:ident, $pi:expr, $sqrt:path, $sin:path, $cos:path, $abs:path, $pow:path) => {
        impl Float for $t {
            #[inline]
            fn zero() -> Self {
                0.0
            }
            #[inline]
            fn one() -> Self {
                1.0
            }
            #[inline]
            fn half() -> Self {
                0.5
            }
            #[inline]
            fn two() -> Self {
                2.0
            }
            #[inline]
            fn pi() -> Self {
                $pi
            }
            #[inline]
            fn sqrt(self) -> Self {
                $sqrt(self)
            }
            #[inline]
            fn sin(self) -> Self {
                $sin(self)
            }
            #[inline]
            fn cos(self) -> Self {
                $cos(self)
            }
            #[inline]
            fn abs(self) -> Self {
                $abs(self)
            }
            #[inline]
            fn powf(self, exp: Self) -> Self {
                $pow(self, exp)
            }
            #[inline]
            fn min(self, other: Self) -> Self {
                if self < other { self } else { other }
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                if self > other { self } else { other }
            }
            #[inline]
            fn from_f32(v: f32) -> Self {
                v as $t
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn is_finite(self) -> bool {
                $t::is_finite(self)
            }
        }
    };
}

impl_float!(f32, core::f32::consts::PI, libm::sqrtf, libm::sinf, libm::cosf, libm::fabsf, libm::powf);
impl_float!(f64, core::f64::consts::PI, libm::sqrt, libm::sin, libm::cos, libm::fabs, libm::pow);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_and_lerp() {
        assert_eq!(5.0f32.clamp(0.0, 1.0), 1.0);
        assert_eq!(Float::lerp(2.0f64, 4.0, 0.25), 2.5);
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(!<f64 as Float>::is_finite(f64::NAN));
        assert!(<f32 as Float>::is_finite(1.0));
    }
}
