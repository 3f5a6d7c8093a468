//! Collision shapes in body-local space.

use alloc::vec::Vec as AllocVec;

use crate::error::SceneError;
use crate::float::Float;
use crate::vec::{Vec, Vec2};

/// Convex collision shape, centered on the body origin.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape<F: Float> {
    Circle { radius: F },
    /// Axis-aligned in body space; rotates with the body.
    Rect { half_extents: Vec2<F> },
    /// Convex polygon with positive signed area, centered on its centroid.
    Polygon { vertices: AllocVec<Vec2<F>> },
}

impl<F: Float> Shape<F> {
    pub fn circle(radius: F) -> Result<Self, SceneError> {
        if !(radius > F::zero()) || !radius.is_finite() {
            return Err(SceneError::InvalidShape);
        }
        Ok(Shape::Circle { radius })
    }

    pub fn rect(width: F, height: F) -> Result<Self, SceneError> {
        let ok = |v: F| v > F::zero() && v.is_finite();
        if !ok(width) || !ok(height) {
            return Err(SceneError::InvalidShape);
        }
        Ok(Shape::Rect {
            half_extents: Vec2::new(width * F::half(), height * F::half()),
        })
    }

    /// Builds a convex polygon. Clockwise input is reversed and the vertices
    /// are re-centered on the centroid.
    pub fn polygon(vertices: &[Vec2<F>]) -> Result<Self, SceneError> {
        if vertices.len() < 3 || vertices.iter().any(|v| !v.is_finite()) {
            return Err(SceneError::InvalidShape);
        }
        let area = signed_area(vertices);
        if area.abs() < F::from_f32(1e-6) {
            return Err(SceneError::InvalidShape);
        }
        let mut verts: AllocVec<Vec2<F>> = vertices.to_vec();
        if area < F::zero() {
            verts.reverse();
        }
        let c = centroid(&verts);
        for v in verts.iter_mut() {
            *v = *v - c;
        }
        Ok(Shape::Polygon { vertices: verts })
    }

    pub fn area(&self) -> F {
        match self {
            Shape::Circle { radius } => F::pi() * *radius * *radius,
            Shape::Rect { half_extents } => F::from_f32(4.0) * half_extents.x * half_extents.y,
            Shape::Polygon { vertices } => signed_area(vertices).abs(),
        }
    }

    /// Moment of inertia about the origin for the given mass.
    pub fn inertia(&self, mass: F) -> F {
        match self {
            Shape::Circle { radius } => mass * *radius * *radius * F::half(),
            Shape::Rect { half_extents } => {
                let w = half_extents.x * F::two();
                let h = half_extents.y * F::two();
                mass * (w * w + h * h) / F::from_f32(12.0)
            }
            Shape::Polygon { vertices } => {
                let n = vertices.len();
                let mut num = F::zero();
                let mut den = F::zero();
                for i in 0..n {
                    let a = vertices[i];
                    let b = vertices[(i + 1) % n];
                    let cross = a.cross(b).abs();
                    num = num + cross * (a.dot(a) + a.dot(b) + b.dot(b));
                    den = den + cross;
                }
                if den.is_near_zero(F::from_f32(1e-10)) {
                    F::zero()
                } else {
                    mass * num / (F::from_f32(6.0) * den)
                }
            }
        }
    }

    /// Radius of the smallest origin-centered circle containing the shape.
    pub fn bounding_radius(&self) -> F {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Rect { half_extents } => half_extents.length(),
            Shape::Polygon { vertices } => vertices
                .iter()
                .fold(F::zero(), |acc, v| acc.max(v.length())),
        }
    }

    /// Half extents of the axis-aligned box around the shape at `angle`.
    pub fn aabb_half_extents(&self, angle: F) -> Vec2<F> {
        match self {
            Shape::Circle { radius } => Vec2::splat(*radius),
            _ => {
                let mut ext: Vec2<F> = Vec2::zero();
                for v in self.local_vertices() {
                    let r = v.rotate(angle);
                    ext.x = ext.x.max(r.x.abs());
                    ext.y = ext.y.max(r.y.abs());
                }
                ext
            }
        }
    }

    /// Polygon outline in body space; empty for circles.
    pub fn local_vertices(&self) -> AllocVec<Vec2<F>> {
        match self {
            Shape::Circle { .. } => AllocVec::new(),
            Shape::Rect { half_extents } => {
                let (hx, hy) = (half_extents.x, half_extents.y);
                alloc::vec![
                    Vec2::new(-hx, -hy),
                    Vec2::new(hx, -hy),
                    Vec2::new(hx, hy),
                    Vec2::new(-hx, hy),
                ]
            }
            Shape::Polygon { vertices } => vertices.clone(),
        }
    }

    /// Polygon outline transformed to world space.
    pub fn world_vertices(&self, pos: Vec2<F>, angle: F) -> AllocVec<Vec2<F>> {
        self.local_vertices()
            .into_iter()
            .map(|v| pos + v.rotate(angle))
            .collect()
    }

    /// Whether a world-space point lies inside the shape placed at `pos`/`angle`.
    pub fn contains(&self, pos: Vec2<F>, angle: F, point: Vec2<F>) -> bool {
        match self {
            Shape::Circle { radius } => point.distance_sq(pos) <= *radius * *radius,
            _ => {
                let local = (point - pos).rotate(-angle);
                let verts = self.local_vertices();
                let n = verts.len();
                (0..n).all(|i| {
                    let a = verts[i];
                    let b = verts[(i + 1) % n];
                    (b - a).cross(local - a) >= F::zero()
                })
            }
        }
    }
}

pub(crate) fn signed_area<F: Float>(verts: &[Vec2<F>]) -> F {
    let n = verts.len();
    let mut sum = F::zero();
    for i in 0..n {
        sum = sum + verts[i].cross(verts[(i + 1) % n]);
    }
    sum * F::half()
}

pub(crate) fn centroid<F: Float>(verts: &[Vec2<F>]) -> Vec2<F> {
    let mut sum = Vec2::zero();
    for v in verts {
        sum = sum + *v;
    }
    sum.scale(F::one() / F::from_f32(verts.len().max(1) as f32))
}
