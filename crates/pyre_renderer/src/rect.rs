//! Planar rectangles: axis-aligned and arbitrarily oriented.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use pyre_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// The plane an [`AxisRect`] lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectPlane {
    Xy,
    Xz,
    Yz,
}

impl RectPlane {
    /// Indices of the two in-plane axes followed by the fixed axis.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            RectPlane::Xy => (0, 1, 2),
            RectPlane::Xz => (0, 2, 1),
            RectPlane::Yz => (1, 2, 0),
        }
    }
}

/// A rectangle perpendicular to one of the principal axes.
pub struct AxisRect {
    plane: RectPlane,
    a: Interval,
    b: Interval,
    k: f32,
    material: Arc<dyn Material>,
}

impl AxisRect {
    pub fn new(plane: RectPlane, a: Interval, b: Interval, k: f32, material: Arc<dyn Material>) -> Self {
        Self {
            plane,
            a,
            b,
            k,
            material,
        }
    }

    /// `[x0, x1] x [y0, y1]` at `z = k`.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Xy, Interval::new(x0, x1), Interval::new(y0, y1), k, material)
    }

    /// `[x0, x1] x [z0, z1]` at `y = k`.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Xz, Interval::new(x0, x1), Interval::new(z0, z1), k, material)
    }

    /// `[y0, y1] x [z0, z1]` at `x = k`.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Yz, Interval::new(y0, y1), Interval::new(z0, z1), k, material)
    }
}

impl Hittable for AxisRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let (ai, bi, ki) = self.plane.axes();
        let origin = ray.origin();
        let dir = ray.direction();

        // Parallel to the plane
        if dir[ki] == 0.0 {
            return None;
        }

        let t = (self.k - origin[ki]) / dir[ki];
        if !ray_t.admits(t) {
            return None;
        }

        let a = origin[ai] + t * dir[ai];
        let b = origin[bi] + t * dir[bi];
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        let uv = (
            (a - self.a.min) / self.a.size(),
            (b - self.b.min) / self.b.size(),
        );
        let mut outward_normal = Vec3::ZERO;
        outward_normal[ki] = 1.0;

        Some(HitRecord::new(ray, t, outward_normal, uv, self.material.as_ref()))
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        let (ai, bi, ki) = self.plane.axes();
        let mut lo = Vec3::ZERO;
        let mut hi = Vec3::ZERO;
        lo[ai] = self.a.min;
        hi[ai] = self.a.max;
        lo[bi] = self.b.min;
        hi[bi] = self.b.max;
        lo[ki] = self.k;
        hi[ki] = self.k;
        // from_points pads the zero-thickness axis
        Some(Aabb::from_points(lo, hi))
    }
}

/// A rectangle (in general, a parallelogram) spanned by two edge vectors
/// from a corner.
pub struct Rect {
    origin: Vec3,
    edge_u: Vec3,
    edge_v: Vec3,
    normal: Vec3,
    d: f32,
    w: Vec3,
    material: Arc<dyn Material>,
}

impl Rect {
    /// The rectangle with corners `origin`, `origin + u`, `origin + v` and
    /// `origin + u + v`. Its front face is on the side of `u x v`.
    pub fn new(origin: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let n_len_sq = n.length_squared();
        let w = if n_len_sq > 0.0 { n / n_len_sq } else { Vec3::ZERO };

        Self {
            origin,
            edge_u: u,
            edge_v: v,
            normal,
            d: normal.dot(origin),
            w,
            material,
        }
    }
}

impl Hittable for Rect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane, or a degenerate rectangle
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.admits(t) {
            return None;
        }

        // Planar coordinates of the hit point along each edge
        let planar = ray.at(t) - self.origin;
        let alpha = self.w.dot(planar.cross(self.edge_v));
        let beta = self.w.dot(self.edge_u.cross(planar));
        if !Interval::UNIT.contains(alpha) || !Interval::UNIT.contains(beta) {
            return None;
        }

        let mut rec = HitRecord::new(ray, t, self.normal, (alpha, beta), self.material.as_ref());
        // Keep textures reading the right way round from behind
        if !rec.front_face {
            rec.u = 1.0 - rec.u;
        }
        Some(rec)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        let o = self.origin;
        Some(Aabb::enclosing(&[
            o,
            o + self.edge_u,
            o + self.edge_v,
            o + self.edge_u + self.edge_v,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use pyre_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::splat(0.5)))
    }

    fn forward() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    #[test]
    fn test_xz_rect_hit_and_uv() {
        let rect = AxisRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, gray());
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.5, 3.0, 0.0), -Vec3::Y, 0.0);
        let rec = rect.hit(&ray, forward(), &mut rng).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-5);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Y);
        assert!((rec.u - 0.75).abs() < 1e-5);
        assert!((rec.v - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_axis_rect_rejects_parallel_and_outside() {
        let rect = AxisRect::xy(0.0, 1.0, 0.0, 1.0, -2.0, gray());
        let mut rng = StdRng::seed_from_u64(0);

        let parallel = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::X, 0.0);
        assert!(rect.hit(&parallel, forward(), &mut rng).is_none());

        let outside = Ray::new(Vec3::new(3.0, 0.5, 0.0), -Vec3::Z, 0.0);
        assert!(rect.hit(&outside, forward(), &mut rng).is_none());

        let behind = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::Z, 0.0);
        assert!(rect.hit(&behind, forward(), &mut rng).is_none());
    }

    #[test]
    fn test_axis_rect_box_is_padded() {
        let rect = AxisRect::yz(0.0, 2.0, 0.0, 3.0, 5.0, gray());
        let bbox = rect.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.axis_interval(0).size() > 0.0);
        assert!(bbox.axis_interval(0).contains(5.0));
        assert!(bbox.axis_interval(2).contains(3.0));
    }

    #[test]
    fn test_oriented_rect_matches_axis_rect() {
        let oriented = Rect::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0), gray());
        let aligned = AxisRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, gray());
        let mut rng = StdRng::seed_from_u64(3);

        for i in 0..50 {
            let x = -1.5 + 3.0 * (i as f32 / 49.0);
            let ray = Ray::new(Vec3::new(x, 2.0, 0.3 * x), Vec3::new(0.1, -1.0, 0.05), 0.0);
            let a = oriented.hit(&ray, forward(), &mut rng);
            let b = aligned.hit(&ray, forward(), &mut rng);
            assert_eq!(a.is_some(), b.is_some(), "x = {}", x);
            if let (Some(a), Some(b)) = (a, b) {
                assert!((a.t - b.t).abs() < 1e-4);
                assert!((a.p - b.p).length() < 1e-4);
            }
        }
    }

    #[test]
    fn test_tilted_rect() {
        // A unit square tilted 45 degrees about X
        let v = Vec3::new(0.0, 1.0, 1.0).normalize();
        let rect = Rect::new(Vec3::ZERO, Vec3::X, v, gray());
        let mut rng = StdRng::seed_from_u64(0);

        let center = 0.5 * Vec3::X + 0.5 * v;
        let ray = Ray::new(center + Vec3::new(0.0, 0.0, 4.0), -Vec3::Z, 0.0);
        let rec = rect.hit(&ray, forward(), &mut rng).unwrap();
        assert!((rec.p - center).length() < 1e-4);
        assert!((rec.u - 0.5).abs() < 1e-4 && (rec.v - 0.5).abs() < 1e-4);

        let bbox = rect.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.axis_interval(1).contains(center.y));
    }
}
