//! Narrow-phase contact generation and position-based contact resolution.
//!
//! Circles and convex polygons (rectangles are polygons here). Contacts are
//! resolved by projecting positions apart, split by generalized inverse mass,
//! then a velocity pass applies restitution and friction by rewriting the
//! Verlet `prev_pos`.

use alloc::vec::Vec as AllocVec;

use crate::body::Body;
use crate::float::Float;
use crate::shape::{centroid, Shape};
use crate::vec::{Vec, Vec2};

/// A single penetrating contact. `normal` points from body A to body B.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact<F: Float> {
    pub normal: Vec2<F>,
    pub depth: F,
    pub point: Vec2<F>,
}

impl<F: Float> Contact<F> {
    fn flipped(self) -> Self {
        Contact { normal: -self.normal, ..self }
    }
}

/// Cheap overlap test on bounding circles.
pub fn may_collide<F: Float>(a: &Body<F>, b: &Body<F>) -> bool {
    if a.is_static() && b.is_static() {
        return false;
    }
    if !a.filter.collides_with(&b.filter) {
        return false;
    }
    let reach = a.bounding_radius() + b.bounding_radius();
    a.pos.distance_sq(b.pos) <= reach * reach
}

pub fn detect<F: Float>(a: &Body<F>, b: &Body<F>) -> Option<Contact<F>> {
    match (&a.shape, &b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_vs_circle(a.pos, *ra, b.pos, *rb)
        }
        (Shape::Circle { radius }, _) => {
            let verts = b.shape.world_vertices(b.pos, b.angle);
            circle_vs_polygon(a.pos, *radius, &verts).map(Contact::flipped)
        }
        (_, Shape::Circle { radius }) => {
            let verts = a.shape.world_vertices(a.pos, a.angle);
            circle_vs_polygon(b.pos, *radius, &verts)
        }
        _ => {
            let va = a.shape.world_vertices(a.pos, a.angle);
            let vb = b.shape.world_vertices(b.pos, b.angle);
            polygon_vs_polygon(&va, &vb)
        }
    }
}

fn circle_vs_circle<F: Float>(
    pos_a: Vec2<F>,
    radius_a: F,
    pos_b: Vec2<F>,
    radius_b: F,
) -> Option<Contact<F>> {
    let delta = pos_b - pos_a;
    let dist_sq = delta.length_sq();
    let sum_r = radius_a + radius_b;
    if dist_sq >= sum_r * sum_r {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist.is_near_zero(F::from_f32(1e-9)) {
        Vec2::new(F::zero(), F::one())
    } else {
        delta.scale(F::one() / dist)
    };
    let depth = sum_r - dist;
    let point = pos_a + normal.scale(radius_a - depth * F::half());
    Some(Contact { normal, depth, point })
}

/// Circle against a convex polygon. The normal points from the polygon
/// towards the circle.
fn circle_vs_polygon<F: Float>(
    circle_pos: Vec2<F>,
    radius: F,
    verts: &[Vec2<F>],
) -> Option<Contact<F>> {
    let n = verts.len();
    if n < 3 {
        return None;
    }

    let mut best_dist = F::from_f32(-1.0e9);
    let mut best_normal = Vec2::zero();
    let mut best_idx = 0;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let edge = b - a;
        let normal = Vec2::new(edge.y, -edge.x).normalize();
        let d = (circle_pos - a).dot(normal);
        if d > best_dist {
            best_dist = d;
            best_normal = normal;
            best_idx = i;
        }
    }

    if best_dist > radius {
        return None;
    }

    let a = verts[best_idx];
    let b = verts[(best_idx + 1) % n];
    let edge = b - a;
    let edge_len_sq = edge.length_sq();
    let t = if edge_len_sq.is_near_zero(F::from_f32(1e-12)) {
        F::zero()
    } else {
        (circle_pos - a).dot(edge) / edge_len_sq
    };

    // Center inside the polygon: always push out through the nearest face.
    if best_dist < F::zero() || (t >= F::zero() && t <= F::one()) {
        let depth = radius - best_dist;
        let point = circle_pos - best_normal.scale(best_dist);
        return Some(Contact { normal: best_normal, depth, point });
    }

    let corner = if t < F::zero() { a } else { b };
    let delta = circle_pos - corner;
    let dist = delta.length();
    if dist >= radius || dist.is_near_zero(F::from_f32(1e-9)) {
        return None;
    }
    Some(Contact {
        normal: delta.scale(F::one() / dist),
        depth: radius - dist,
        point: corner,
    })
}

/// Convex polygon against convex polygon (separating axis test).
fn polygon_vs_polygon<F: Float>(world_a: &[Vec2<F>], world_b: &[Vec2<F>]) -> Option<Contact<F>> {
    if world_a.len() < 3 || world_b.len() < 3 {
        return None;
    }

    let (depth_a, axis_a) = sat_test_axes(world_a, world_b)?;
    let (depth_b, axis_b) = sat_test_axes(world_b, world_a)?;

    // Prefer A's face on near-ties so resting contacts keep a stable normal.
    let tolerance = F::from_f32(1e-4);
    let (depth, mut normal) = if depth_b + tolerance < depth_a {
        (depth_b, axis_b)
    } else {
        (depth_a, axis_a)
    };

    let center_a = centroid(world_a);
    let center_b = centroid(world_b);
    if (center_b - center_a).dot(normal) < F::zero() {
        normal = -normal;
    }

    let point = overlap_point(world_a, world_b)
        .unwrap_or_else(|| (center_a + center_b).scale(F::half()));
    Some(Contact { normal, depth, point })
}

/// Average of the vertices of each polygon that lie inside the other one.
fn overlap_point<F: Float>(world_a: &[Vec2<F>], world_b: &[Vec2<F>]) -> Option<Vec2<F>> {
    let mut sum = Vec2::zero();
    let mut count = 0u32;
    for v in world_a.iter().filter(|v| inside_convex(world_b, **v)) {
        sum = sum + *v;
        count += 1;
    }
    for v in world_b.iter().filter(|v| inside_convex(world_a, **v)) {
        sum = sum + *v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum.scale(F::one() / F::from_f32(count as f32)))
    }
}

fn inside_convex<F: Float>(verts: &[Vec2<F>], point: Vec2<F>) -> bool {
    let n = verts.len();
    let slop = F::from_f32(-1e-6);
    (0..n).all(|i| {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        (b - a).cross(point - a) >= slop
    })
}

/// Edge normals of `poly_ref` as separating axes against `poly_test`.
/// Returns the smallest overlap and its axis, or `None` on separation.
fn sat_test_axes<F: Float>(poly_ref: &[Vec2<F>], poly_test: &[Vec2<F>]) -> Option<(F, Vec2<F>)> {
    let n = poly_ref.len();
    let mut min_depth = F::from_f32(1.0e9);
    let mut best_normal = Vec2::zero();

    for i in 0..n {
        let a = poly_ref[i];
        let b = poly_ref[(i + 1) % n];
        let edge = b - a;
        let normal = Vec2::new(edge.y, -edge.x).normalize();

        let (min_a, max_a) = project_polygon(poly_ref, normal);
        let (min_b, max_b) = project_polygon(poly_test, normal);
        if max_a <= min_b || max_b <= min_a {
            return None;
        }

        let depth = (max_a - min_b).min(max_b - min_a);
        if depth < min_depth {
            min_depth = depth;
            best_normal = normal;
        }
    }

    Some((min_depth, best_normal))
}

fn project_polygon<F: Float>(verts: &[Vec2<F>], axis: Vec2<F>) -> (F, F) {
    let mut min_proj = verts[0].dot(axis);
    let mut max_proj = min_proj;
    for v in verts.iter().skip(1) {
        let p = v.dot(axis);
        min_proj = min_proj.min(p);
        max_proj = max_proj.max(p);
    }
    (min_proj, max_proj)
}

/// Separates two bodies along the contact normal. Linear and angular
/// corrections share the depth by generalized inverse mass.
pub fn resolve_position<F: Float>(a: &mut Body<F>, b: &mut Body<F>, contact: &Contact<F>) {
    if contact.depth <= F::zero() {
        return;
    }
    let n = contact.normal;
    let r_a = contact.point - a.pos;
    let r_b = contact.point - b.pos;
    let rn_a = r_a.cross(n);
    let rn_b = r_b.cross(n);

    let w_a = a.inv_mass + a.inv_inertia * rn_a * rn_a;
    let w_b = b.inv_mass + b.inv_inertia * rn_b * rn_b;
    let w_total = w_a + w_b;
    if w_total.is_near_zero(F::from_f32(1e-12)) {
        return;
    }

    let lambda = contact.depth / w_total;
    if !a.is_static() {
        a.pos = a.pos - n.scale(lambda * a.inv_mass);
        a.angle = a.angle - a.inv_inertia * rn_a * lambda;
    }
    if !b.is_static() {
        b.pos = b.pos + n.scale(lambda * b.inv_mass);
        b.angle = b.angle + b.inv_inertia * rn_b * lambda;
    }
}

/// Normal relative velocity of B with respect to A. Negative means approaching.
pub fn normal_speed<F: Float>(a: &Body<F>, b: &Body<F>, normal: Vec2<F>, dt: F) -> F {
    (b.velocity(dt) - a.velocity(dt)).dot(normal)
}

/// Restitution and friction for a contact that was resolved this sub-step.
///
/// `approach_speed` is the normal relative velocity measured right after
/// integration, before positions were projected.
pub fn resolve_velocity<F: Float>(
    a: &mut Body<F>,
    b: &mut Body<F>,
    contact: &Contact<F>,
    approach_speed: F,
    dt: F,
    bounce_threshold: F,
) {
    let w_total = a.inv_mass + b.inv_mass;
    if w_total.is_near_zero(F::from_f32(1e-12)) || dt.is_near_zero(F::from_f32(1e-12)) {
        return;
    }
    if approach_speed >= F::zero() {
        return;
    }
    let n = contact.normal;
    let va = a.velocity(dt);
    let vb = b.velocity(dt);
    let rel = vb - va;
    let vn = rel.dot(n);

    let e = a.restitution.max(b.restitution);
    let target = if -approach_speed > bounce_threshold {
        -e * approach_speed
    } else {
        F::zero()
    };
    let dvn = target - vn;
    let mut dv = n.scale(dvn);

    let tangent_vel = rel - n.scale(vn);
    let vt = tangent_vel.length();
    if vt > F::from_f32(1e-6) {
        let mu = a.friction.min(b.friction);
        let normal_push = dvn.abs() + contact.depth / dt;
        let drop = (mu * normal_push).min(vt);
        dv = dv - tangent_vel.scale(drop / vt);
    }

    if !a.is_static() {
        a.set_velocity(va - dv.scale(a.inv_mass / w_total), dt);
    }
    if !b.is_static() {
        b.set_velocity(vb + dv.scale(b.inv_mass / w_total), dt);
    }
}

/// Candidate pairs from a list of `(slot, body)` references.
pub(crate) fn broad_phase<F: Float>(bodies: &[(usize, &Body<F>)]) -> AllocVec<(usize, usize)> {
    let mut pairs = AllocVec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (ia, a) = bodies[i];
            let (ib, b) = bodies[j];
            if may_collide(a, b) {
                pairs.push((ia, ib));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyDesc;

    fn body(desc: BodyDesc<f64>) -> Body<f64> {
        Body::from_desc(desc, 1.0 / 240.0).unwrap()
    }

    #[test]
    fn circles_overlap_normal_points_a_to_b() {
        let c = circle_vs_circle(Vec2::new(0.0, 0.0), 10.0, Vec2::new(15.0, 0.0), 10.0).unwrap();
        assert!((c.normal.x - 1.0).abs() < 1e-9);
        assert!((c.depth - 5.0).abs() < 1e-9);
    }

    #[test]
    fn separated_circles_do_not_touch() {
        assert!(circle_vs_circle(Vec2::new(0.0, 0.0), 10.0, Vec2::new(25.0, 0.0), 10.0f64).is_none());
    }

    #[test]
    fn circle_resting_on_box_gets_upward_push() {
        let ground = body(BodyDesc::fixed(Shape::rect(200.0, 20.0).unwrap())
            .with_position(Vec2::new(0.0, 100.0)));
        let ball = body(BodyDesc::dynamic(Shape::circle(10.0).unwrap())
            .with_position(Vec2::new(0.0, 82.0)));
        // ground is A, ball is B: normal from ground to ball points up (-y).
        let c = detect(&ground, &ball).unwrap();
        assert!(c.normal.y < -0.99, "normal {:?}", c.normal);
        assert!((c.depth - 2.0).abs() < 1e-9);

        let flipped = detect(&ball, &ground).unwrap();
        assert!(flipped.normal.y > 0.99);
    }

    #[test]
    fn flat_box_on_ground_has_centered_contact_point() {
        let ground = body(BodyDesc::fixed(Shape::rect(400.0, 60.0).unwrap())
            .with_position(Vec2::new(100.0, 300.0)));
        let letter = body(BodyDesc::dynamic(Shape::rect(32.0, 48.0).unwrap())
            .with_position(Vec2::new(20.0, 247.0)));
        let c = detect(&letter, &ground).unwrap();
        assert!(c.normal.y > 0.99, "normal {:?}", c.normal);
        assert!((c.depth - 1.0).abs() < 1e-9);
        assert!((c.point.x - 20.0).abs() < 1e-9, "lever arm would spin the letter: {:?}", c.point);
    }

    #[test]
    fn position_resolution_separates_dynamic_from_static() {
        let mut ground = body(BodyDesc::fixed(Shape::rect(400.0, 60.0).unwrap())
            .with_position(Vec2::new(0.0, 300.0)));
        let mut letter = body(BodyDesc::dynamic(Shape::rect(32.0, 48.0).unwrap())
            .with_position(Vec2::new(0.0, 250.0)));
        let c = detect(&letter, &ground).unwrap();
        resolve_position(&mut letter, &mut ground, &c);
        assert!(detect(&letter, &ground).is_none() || detect(&letter, &ground).unwrap().depth < 1e-6);
        assert_eq!(ground.pos, Vec2::new(0.0, 300.0));
        assert!(letter.angle.abs() < 1e-9);
    }

    #[test]
    fn filtered_pairs_are_skipped() {
        use crate::body::CollisionFilter;
        let a = body(BodyDesc::dynamic(Shape::circle(10.0).unwrap())
            .with_filter(CollisionFilter::new(0x0002, 0x0002)));
        let b = body(BodyDesc::dynamic(Shape::circle(10.0).unwrap())
            .with_position(Vec2::new(5.0, 0.0)));
        assert!(!may_collide(&a, &b));
    }

    #[test]
    fn fast_approach_bounces_with_restitution() {
        let dt = 1.0 / 240.0;
        let mut ground = body(BodyDesc::fixed(Shape::rect(400.0, 60.0).unwrap())
            .with_position(Vec2::new(0.0, 300.0)));
        let mut ball = body(BodyDesc::dynamic(Shape::circle(10.0).unwrap())
            .with_position(Vec2::new(0.0, 262.0))
            .with_restitution(0.5));
        ball.set_velocity(Vec2::new(0.0, 500.0), dt);
        let c = detect(&ground, &ball).unwrap();
        let approach = normal_speed(&ground, &ball, c.normal, dt);
        assert!(approach < -400.0);
        resolve_position(&mut ground, &mut ball, &c);
        resolve_velocity(&mut ground, &mut ball, &c, approach, dt, 60.0);
        let v = ball.velocity(dt);
        assert!((v.y + 250.0).abs() < 1e-6, "expected upward bounce, got {:?}", v);
    }
}
