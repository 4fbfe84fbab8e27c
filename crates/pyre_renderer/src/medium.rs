//! Homogeneous participating medium (smoke, fog).

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::material::Isotropic;
use crate::{gen_f32, Primitive, SolidColor, Texture};
use pyre_math::{Aabb, Color, Interval, Ray, Vec3};
use rand::RngCore;

/// Gap between the entry hit and the search for the exit hit.
const EXIT_EPSILON: f32 = 0.0001;

/// A volume of constant density filling a closed boundary surface.
///
/// A ray entering the boundary travels an exponentially distributed
/// distance before scattering; if that distance exceeds the chord through
/// the boundary the ray passes through untouched.
pub struct ConstantMedium {
    boundary: Arc<Primitive>,
    neg_inv_density: f32,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new(boundary: impl Into<Arc<Primitive>>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary: boundary.into(),
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::textured(albedo),
        }
    }

    pub fn with_color(boundary: impl Into<Arc<Primitive>>, density: f32, color: Color) -> Self {
        Self::new(boundary, density, Arc::new(SolidColor::new(color)))
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_EPSILON, f32::INFINITY),
            rng,
        )?;

        let t_enter = entry.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        if !ray_t.admits(t) {
            return None;
        }

        // Volumes have no surface, so the normal and face are arbitrary
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: &self.phase_function,
            t,
            u: 0.0,
            v: 0.0,
            front_face: true,
        })
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.boundary.bounding_box(time0, time1)
    }
}
