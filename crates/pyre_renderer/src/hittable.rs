//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::{Material, Primitive};
use pyre_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at parameter `t` with the given geometric
    /// (outward) normal; the stored normal is flipped to face the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        (u, v): (f32, f32),
        material: &'a dyn Material,
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            t,
            u,
            v,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        // Normal always points against the ray
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Find the nearest intersection with parameter in the open-closed
    /// interval `(ray_t.min, ray_t.max]`.
    ///
    /// The generator is only consumed by probabilistic surfaces such as
    /// participating media.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore)
        -> Option<HitRecord<'a>>;

    /// Axis-aligned bounds of this object over the time interval
    /// `[time0, time1]`, or `None` if it is unbounded or empty.
    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb>;
}

/// A list of hittable objects, scanned linearly.
#[derive(Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<Primitive>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Primitive>) {
        self.objects.push(Arc::new(object.into()));
    }

    /// Add an object that is also referenced elsewhere in the scene.
    pub fn add_shared(&mut self, object: Arc<Primitive>) {
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<Primitive>] {
        &self.objects
    }

    /// Take the objects out of the list, e.g. to build a BVH over them.
    pub fn into_objects(self) -> Vec<Arc<Primitive>> {
        self.objects
    }
}

impl FromIterator<Primitive> for HittableList {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let interval = closest.map_or(ray_t, |rec| ray_t.with_max(rec.t));
            if let Some(rec) = object.hit(ray, interval, rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let (first, rest) = self.objects.split_first()?;
        let mut bbox = first.bounding_box(time0, time1)?;
        for object in rest {
            bbox = Aabb::surrounding(&bbox, &object.bounding_box(time0, time1)?);
        }
        Some(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use pyre_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere_at(z: f32) -> Sphere {
        Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let mut list = HittableList::new();
        list.add(sphere_at(-5.0));
        list.add(sphere_at(-2.0));
        list.add(sphere_at(-8.0));
        assert_eq!(list.len(), 3);

        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = list
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 1.5).abs() < 1e-4);
        assert!(rec.front_face);
        assert!((rec.p - ray.at(rec.t)).length() < 1e-5);
    }

    #[test]
    fn test_list_respects_interval() {
        let mut list = HittableList::new();
        list.add(sphere_at(-2.0));

        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        // Near root is 1.5, far root 2.5
        let rec = list.hit(&ray, Interval::new(2.0, 10.0), &mut rng).unwrap();
        assert!((rec.t - 2.5).abs() < 1e-4);
        assert!(!rec.front_face);
        assert!(list.hit(&ray, Interval::new(0.001, 1.0), &mut rng).is_none());
    }

    #[test]
    fn test_list_bounding_box() {
        let mut list = HittableList::new();
        assert!(list.bounding_box(0.0, 1.0).is_none());

        list.add(sphere_at(-2.0));
        list.add(sphere_at(3.0));
        let bbox = list.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.min().z <= -2.5);
        assert!(bbox.max().z >= 3.5);
    }

    #[test]
    fn test_face_normal_faces_ray() {
        let mat = Lambertian::new(Color::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);

        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, (0.0, 0.0), &mat);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);

        let rec = HitRecord::new(&ray, 1.0, -Vec3::Z, (0.0, 0.0), &mat);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }
}
