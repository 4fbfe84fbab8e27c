//! Thin-lens camera for ray generation.

use crate::sampling::{gen_range_f32, random_in_unit_disk};
use pyre_math::{Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Configure with the `with_*` builders, then call [`Camera::initialize`]
/// before generating rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,         // Vertical field of view in degrees
    aperture: f32,     // Lens diameter; zero is a pinhole
    focus_dist: f32,   // Distance from camera to plane of perfect focus
    aspect_ratio: f32, // Width over height

    // Shutter interval
    time0: f32,
    time1: f32,

    // Cached computed values (set by initialize())
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 40.0,
            aperture: 0.0,
            focus_dist: 10.0,
            aspect_ratio: 16.0 / 9.0,
            time0: 0.0,
            time1: 1.0,
            // Cached values (initialized to defaults)
            origin: Vec3::ZERO,
            lower_left_corner: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Focus on the look-at point.
    pub fn focused_on_target(mut self) -> Self {
        self.focus_dist = (self.look_at - self.look_from).length();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set the shutter interval ray times are drawn from.
    pub fn with_shutter(mut self, time0: f32, time1: f32) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    pub fn shutter(&self) -> (f32, f32) {
        (self.time0, self.time1)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        let theta = self.vfov.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = viewport_height * self.aspect_ratio;

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Viewport spans the focus plane
        self.origin = self.look_from;
        self.horizontal = self.focus_dist * viewport_width * self.u;
        self.vertical = self.focus_dist * viewport_height * self.v;
        self.lower_left_corner =
            self.origin - self.horizontal / 2.0 - self.vertical / 2.0 - self.focus_dist * self.w;

        self.lens_radius = self.aperture / 2.0;
    }

    /// Generate a ray through normalized image coordinates `(s, t)`, where
    /// (0, 0) is the lower-left corner and (1, 1) the upper-right.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        let ray_origin = self.origin + offset;
        let ray_time = if self.time1 > self.time0 {
            gen_range_f32(rng, self.time0, self.time1)
        } else {
            self.time0
        };

        Ray::new(ray_origin, target - ray_origin, ray_time)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
