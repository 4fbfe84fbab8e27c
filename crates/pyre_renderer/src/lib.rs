//! Pyre Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer: a scene of analytic and composite surfaces,
//! routed through a bounding volume hierarchy, lit only by emissive
//! materials, and sampled in parallel into an 8-bit BGR raster.
//!
//! Every random draw goes through an explicit `&mut dyn RngCore`, so a render
//! with a fixed seed is reproducible.

mod bvh;
mod camera;
pub mod color;
mod cuboid;
mod error;
mod hittable;
mod instance;
mod integrator;
mod material;
mod medium;
mod perlin;
mod primitive;
mod rect;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod texture;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use color::{ColorGrade, ToneMap};
pub use cuboid::Cuboid;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{Rotate, Translate};
pub use integrator::{ray_color, Background, T_MIN};
pub use material::{
    Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult,
};
pub use medium::ConstantMedium;
pub use perlin::Perlin;
pub use primitive::Primitive;
pub use rect::{AxisRect, Rect, RectPlane};
pub use renderer::{
    render, render_pixel, strided_indices, ProgressSnapshot, RenderConfig, RenderProgress,
    RenderedImage,
};
pub use scene::Scene;
pub use sphere::{MovingSphere, Sphere};
pub use texture::{CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture};

/// Re-export Vec3 and common math types from pyre_math
pub use pyre_math::{Aabb, Axis, Color, Interval, Ray, Vec3};

pub(crate) use sampling::gen_f32;
