//! Textures: color fields over surface coordinates and position.

use std::sync::Arc;

use crate::color::pop_filter;
use crate::perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
use pyre_core::Raster;
use pyre_math::{Color, Interval, Vec3};
use rand::RngCore;

/// Spatial frequency of the checker pattern.
const CHECKER_FREQUENCY: f32 = 10.0;

/// Returned by an image texture whose raster failed to load.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// A color that can vary over a surface.
pub trait Texture: Send + Sync {
    /// Color at surface coordinates `(u, v)` and world position `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor(pub Color);

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self(color)
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.0
    }
}

/// A 3D checkerboard alternating between two textures.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self { even, odd }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor(even)), Arc::new(SolidColor(odd)))
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let f = CHECKER_FREQUENCY;
        let sines = (f * p.x).sin() * (f * p.y).sin() * (f * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like bands: a sine along z, phase-shifted by turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let phase = self.scale * p.z + 100.0 * self.noise.turb(0.25 * p, DEFAULT_TURBULENCE_DEPTH);
        Color::ONE * 0.5 * (1.0 + phase.sin())
    }
}

/// Nearest-pixel lookup into a decoded raster.
pub struct ImageTexture {
    raster: Arc<Raster>,
    modifier: f32,
}

impl ImageTexture {
    pub fn new(raster: Arc<Raster>) -> Self {
        Self::with_modifier(raster, 0.0)
    }

    /// Apply [`pop_filter`] with strength `modifier` to every sample.
    /// Zero disables the filter.
    pub fn with_modifier(raster: Arc<Raster>, modifier: f32) -> Self {
        Self { raster, modifier }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.raster.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }

        let u = Interval::UNIT.clamp(u);
        // Raster rows run top to bottom
        let v = 1.0 - Interval::UNIT.clamp(v);

        let x = (u * self.raster.width() as f32) as usize;
        let y = (v * self.raster.height() as f32) as usize;
        let Some([r, g, b]) = self.raster.pixel(x, y) else {
            return MISSING_TEXTURE_COLOR;
        };

        let color = Color::new(r as f32, g as f32, b as f32) / 255.0;
        if self.modifier == 0.0 {
            color
        } else {
            pop_filter(color, self.modifier)
        }
    }
}
