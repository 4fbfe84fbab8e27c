//! Translate and rotate decorators.
//!
//! Both move the incoming ray into the wrapped object's local space, delegate
//! the query, then move the resulting point and normal back to world space.
//! The ray parameter `t` is unchanged by a rigid transform, so the hit's `t`
//! and `front_face` pass through untouched.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Primitive;
use pyre_math::{Aabb, Axis, Interval, Mat4, Mat4Ext, Ray, Vec3};
use rand::RngCore;

/// Shutter interval the rotated bounding box is cached for.
const CACHED_TIME: (f32, f32) = (0.0, 1.0);

/// An object displaced by a fixed offset.
pub struct Translate {
    object: Arc<Primitive>,
    offset: Vec3,
}

impl Translate {
    pub fn new(object: impl Into<Arc<Primitive>>, offset: Vec3) -> Self {
        Self {
            object: object.into(),
            offset,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let mut rec = self.object.hit(&moved, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.object
            .bounding_box(time0, time1)
            .map(|bbox| bbox.translate(self.offset))
    }
}

/// An object rotated about one of the principal axes through the origin.
pub struct Rotate {
    object: Arc<Primitive>,
    to_world: Mat4,
    to_local: Mat4,
    bbox: Option<Aabb>,
}

impl Rotate {
    /// Rotate `object` by `degrees` about `axis` (right-handed).
    pub fn new(object: impl Into<Arc<Primitive>>, axis: Axis, degrees: f32) -> Self {
        let object = object.into();
        let to_world = axis.rotation(degrees.to_radians());
        let to_local = to_world.inverse();
        let bbox = object
            .bounding_box(CACHED_TIME.0, CACHED_TIME.1)
            .map(|local| to_world.transform_aabb(&local));

        Self {
            object,
            to_world,
            to_local,
            bbox,
        }
    }
}

impl Hittable for Rotate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local = Ray::new(
            self.to_local.transform_point3(ray.origin()),
            self.to_local.transform_vector3(ray.direction()),
            ray.time(),
        );

        let mut rec = self.object.hit(&local, ray_t, rng)?;
        rec.p = self.to_world.transform_point3(rec.p);
        rec.normal = self.to_world.transform_vector3(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        if (time0, time1) == CACHED_TIME {
            return self.bbox;
        }
        self.object
            .bounding_box(time0, time1)
            .map(|local| self.to_world.transform_aabb(&local))
    }
}
