//! The closed set of scene surfaces.
//!
//! Composites hold their children as `Arc<Primitive>` so one surface can
//! appear in several places at once, e.g. a sphere that is rendered directly
//! and also bounds a participating medium.

use crate::{
    AxisRect, BvhNode, ConstantMedium, Cuboid, HitRecord, Hittable, HittableList, MovingSphere,
    Rect, Rotate, Sphere, Translate,
};
use pyre_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// Any surface that can be placed in a scene.
pub enum Primitive {
    Sphere(Sphere),
    MovingSphere(MovingSphere),
    AxisRect(AxisRect),
    Rect(Rect),
    Cuboid(Cuboid),
    Translate(Translate),
    Rotate(Rotate),
    Medium(ConstantMedium),
    List(HittableList),
    Bvh(BvhNode),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Primitive::Sphere($inner) => $body,
            Primitive::MovingSphere($inner) => $body,
            Primitive::AxisRect($inner) => $body,
            Primitive::Rect($inner) => $body,
            Primitive::Cuboid($inner) => $body,
            Primitive::Translate($inner) => $body,
            Primitive::Rotate($inner) => $body,
            Primitive::Medium($inner) => $body,
            Primitive::List($inner) => $body,
            Primitive::Bvh($inner) => $body,
        }
    };
}

impl Hittable for Primitive {
    #[inline]
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        dispatch!(self, p => p.hit(ray, ray_t, rng))
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        dispatch!(self, p => p.bounding_box(time0, time1))
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Primitive {
                fn from(value: $ty) -> Self {
                    Primitive::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    Sphere(Sphere),
    MovingSphere(MovingSphere),
    AxisRect(AxisRect),
    Rect(Rect),
    Cuboid(Cuboid),
    Translate(Translate),
    Rotate(Rotate),
    Medium(ConstantMedium),
    List(HittableList),
    Bvh(BvhNode),
);
