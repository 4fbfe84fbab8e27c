//! Recursive radiance estimator.
//!
//! Pure BRDF sampling: each bounce follows the material's scattered ray and
//! picks up emission where it lands. There is no explicit light sampling,
//! so small emitters need many samples to converge.

use crate::Hittable;
use pyre_math::{Color, Interval, Ray};
use rand::RngCore;

/// Nearest accepted hit distance, to avoid re-hitting the surface a ray
/// just left.
pub const T_MIN: f32 = 0.001;

/// Radiance for rays that escape the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    /// The same color in every direction.
    Solid(Color),
    /// Blend from `horizon` (pointing down) to `zenith` (pointing up).
    Gradient { horizon: Color, zenith: Color },
}

impl Background {
    pub fn radiance(&self, ray: &Ray) -> Color {
        match *self {
            Background::Solid(color) => color,
            Background::Gradient { horizon, zenith } => {
                let unit_direction = ray.direction().normalize_or_zero();
                let a = 0.5 * (unit_direction.y + 1.0);
                horizon * (1.0 - a) + zenith * a
            }
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color::ZERO)
    }
}

/// Compute the radiance arriving along `ray`, following at most `depth`
/// bounces. Depth zero contributes nothing.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    background: &Background,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY), rng) else {
        return background.radiance(ray);
    };

    // Get emission from material (for lights)
    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, background, depth - 1, rng);
            emission + result.attenuation * scattered_color
        }
        // Absorbed
        None => emission,
    }
}
