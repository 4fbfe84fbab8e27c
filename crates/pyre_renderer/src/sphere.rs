//! Sphere primitives for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use pyre_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Smallest radius a sphere is built with. A zero radius would leave the
/// hit normal as 0/0.
const MIN_RADIUS: f32 = 1e-4;

/// A static sphere.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    visible_from_inside: bool,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius: radius.max(MIN_RADIUS),
            material,
            visible_from_inside: true,
        }
    }

    /// Reject hits on the inner surface, so the sphere is invisible to rays
    /// that start inside it. Used for large spherical lights that enclose
    /// the camera.
    pub fn outside_only(mut self) -> Self {
        self.visible_from_inside = false;
        self
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let rec = hit_sphere(self.center, self.radius, self.material.as_ref(), ray, ray_t)?;
        (self.visible_from_inside || rec.front_face).then_some(rec)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(sphere_box(self.center, self.radius))
    }
}

/// A sphere whose center moves linearly between two keyframes.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    /// Create a sphere at `center0` at `time0`, moving to `center1` at `time1`.
    pub fn new(
        (center0, time0): (Vec3, f32),
        (center1, time1): (Vec3, f32),
        radius: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(MIN_RADIUS),
            material,
        }
    }

    /// Center at `time`, extrapolated linearly outside the keyframe range.
    pub fn center(&self, time: f32) -> Vec3 {
        let span = self.time1 - self.time0;
        if span == 0.0 {
            return self.center0;
        }
        self.center0 + ((time - self.time0) / span) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(
            self.center(ray.time()),
            self.radius,
            self.material.as_ref(),
            ray,
            ray_t,
        )
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        Some(Aabb::surrounding(
            &sphere_box(self.center(time0), self.radius),
            &sphere_box(self.center(time1), self.radius),
        ))
    }
}

fn sphere_box(center: Vec3, radius: f32) -> Aabb {
    let rvec = Vec3::splat(radius);
    Aabb::from_points(center - rvec, center + rvec)
}

/// Both ray parameters where the ray crosses the sphere surface, nearest
/// first, or `None` if the discriminant is negative.
pub(crate) fn sphere_roots(center: Vec3, radius: f32, ray: &Ray) -> Option<(f32, f32)> {
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    Some(((h - sqrtd) / a, (h + sqrtd) / a))
}

fn hit_sphere<'a>(
    center: Vec3,
    radius: f32,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let (near, far) = sphere_roots(center, radius, ray)?;

    // Find the nearest root in the acceptable range
    let root = if ray_t.admits(near) {
        near
    } else if ray_t.admits(far) {
        far
    } else {
        return None;
    };

    let outward_normal = (ray.at(root) - center) / radius;
    let uv = sphere_uv(outward_normal);
    Some(HitRecord::new(ray, root, outward_normal, uv, material))
}

/// UV coordinates for a point on the unit sphere centered at the origin.
///
/// u is the angle around Y starting from -X, v the angle from -Y to +Y,
/// both scaled to [0, 1].
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;
    (phi / (2.0 * PI), theta / PI)
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
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere.hit(&ray, forward(), &mut rng).unwrap();
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!((rec.p - ray.at(rec.t)).length() < 1e-5);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_zero_radius_sphere_has_finite_normal() {
        let mut rng = StdRng::seed_from_u64(3);
        let center = Vec3::new(0.0, 0.0, -0.01);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.5);

        let sphere = Sphere::new(center, 0.0, gray());
        let rec = sphere.hit(&ray, forward(), &mut rng).unwrap();
        assert!(rec.normal.is_finite());
        assert!((rec.normal - Vec3::Z).length() < 1e-3);

        let moving = MovingSphere::new((center, 0.0), (center, 1.0), -1.0, gray());
        let rec = moving.hit(&ray, forward(), &mut rng).unwrap();
        assert!(rec.normal.is_finite());
        assert!(rec.p.is_finite());
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(sphere.hit(&ray, forward(), &mut rng).is_none());
    }

    #[test]
    fn test_roots_symmetric_about_center_distance() {
        let center = Vec3::new(1.0, 2.0, -6.0);
        let origin = Vec3::new(0.5, -1.0, 2.0);
        let ray = Ray::new(origin, center - origin, 0.0);

        let (near, far) = sphere_roots(center, 1.5, &ray).unwrap();
        // The center sits at t = 1 along this ray
        assert!(((near + far) / 2.0 - 1.0).abs() < 1e-5);
        assert!(near < far);
    }

    #[test]
    fn test_tangent_ray_has_coincident_roots() {
        let ray = Ray::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::X, 0.0);
        let (near, far) = sphere_roots(Vec3::ZERO, 1.0, &ray).unwrap();
        assert!((far - near).abs() < 1e-2);
        assert!((near - 5.0).abs() < 1e-2);
    }

    #[test]
    fn test_hit_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, gray());
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere.hit(&ray, forward(), &mut rng).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert!(!rec.front_face);
        assert!((rec.normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_outside_only_sphere_is_invisible_from_inside() {
        let light = Sphere::new(Vec3::ZERO, 20.0, gray()).outside_only();
        let mut rng = StdRng::seed_from_u64(0);

        let inside = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        assert!(light.hit(&inside, forward(), &mut rng).is_none());

        let outside = Ray::new(Vec3::new(0.0, -40.0, 0.0), Vec3::Y, 0.0);
        let rec = light.hit(&outside, forward(), &mut rng).unwrap();
        assert!((rec.t - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = sphere_uv(Vec3::X);
        assert!((u - 0.5).abs() < 1e-5 && (v - 0.5).abs() < 1e-5);
        let (_, v) = sphere_uv(Vec3::Y);
        assert!((v - 1.0).abs() < 1e-5);
        let (u, _) = sphere_uv(Vec3::Z);
        assert!((u - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_moving_sphere_follows_ray_time() {
        let sphere = MovingSphere::new(
            (Vec3::new(0.0, 0.0, -5.0), 0.0),
            (Vec3::new(4.0, 0.0, -5.0), 1.0),
            1.0,
            gray(),
        );
        let mut rng = StdRng::seed_from_u64(0);
        let dir = Vec3::new(0.0, 0.0, -1.0);

        let early = Ray::new(Vec3::ZERO, dir, 0.0);
        assert!(sphere.hit(&early, forward(), &mut rng).is_some());

        let late = Ray::new(Vec3::ZERO, dir, 1.0);
        assert!(sphere.hit(&late, forward(), &mut rng).is_none());

        let shifted = Ray::new(Vec3::new(4.0, 0.0, 0.0), dir, 1.0);
        assert!(sphere.hit(&shifted, forward(), &mut rng).is_some());

        let bbox = sphere.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.min().x <= -1.0 && bbox.max().x >= 5.0);
    }
}
