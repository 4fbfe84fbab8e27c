//! Axis-aligned box built from six rectangles.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::rect::AxisRect;
use crate::Material;
use pyre_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A closed axis-aligned box.
pub struct Cuboid {
    bounds: Aabb,
    sides: HittableList,
}

impl Cuboid {
    /// The box with opposite corners `a` and `b` (in any order).
    pub fn new(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);

        let mut sides = HittableList::new();
        sides.add(AxisRect::xy(lo.x, hi.x, lo.y, hi.y, hi.z, material.clone()));
        sides.add(AxisRect::xy(lo.x, hi.x, lo.y, hi.y, lo.z, material.clone()));
        sides.add(AxisRect::xz(lo.x, hi.x, lo.z, hi.z, hi.y, material.clone()));
        sides.add(AxisRect::xz(lo.x, hi.x, lo.z, hi.z, lo.y, material.clone()));
        sides.add(AxisRect::yz(lo.y, hi.y, lo.z, hi.z, hi.x, material.clone()));
        sides.add(AxisRect::yz(lo.y, hi.y, lo.z, hi.z, lo.x, material));

        Self {
            bounds: Aabb::from_points(lo, hi),
            sides,
        }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bounds)
    }
}
