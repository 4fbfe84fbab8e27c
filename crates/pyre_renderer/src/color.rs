//! Color pipeline: tone mapping, gamma, quantization and grading filters.
//!
//! A pixel's averaged radiance goes through [`ToneMap::apply`], then
//! [`gamma_encode`], then the optional [`ColorGrade`], and is finally
//! quantized to 8 bits per channel in B, G, R order by [`to_bgr8`].

use pyre_math::{Color, Mat3};
use serde::{Deserialize, Serialize};

/// Largest value a channel may take before quantization, so 1.0 maps to 255.
pub const MAX_CHANNEL: f32 = 0.999;

// ACES fitted transforms (sRGB -> RRT_SAT -> ODT_SAT -> sRGB). Entry [i][j]
// weighs input channel i into output channel j.
const ACES_INPUT: [[f32; 3]; 3] = [
    [0.59719, 0.35458, 0.04823],
    [0.07600, 0.90834, 0.01566],
    [0.02840, 0.13383, 0.83777],
];
const ACES_OUTPUT: [[f32; 3]; 3] = [
    [1.60475, -0.53108, -0.07367],
    [-0.10208, 1.10813, -0.00605],
    [-0.00327, -0.07276, 1.07602],
];

/// High dynamic range compression applied before gamma encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneMap {
    /// Fitted ACES reference rendering and output transforms.
    #[default]
    Aces,
    /// Narkowicz's single-curve ACES approximation.
    Filmic,
    /// Plain clamp, no compression.
    Clamp,
}

impl ToneMap {
    /// Map linear radiance into `[0, MAX_CHANNEL]`.
    pub fn apply(self, c: Color) -> Color {
        match self {
            ToneMap::Aces => aces_fitted(c),
            ToneMap::Filmic => filmic(c),
            ToneMap::Clamp => clamp_channels(c),
        }
    }
}

/// Each inner array becomes one column, so `m * c` sums `rows[i] * c[i]`.
fn channel_weights(rows: &[[f32; 3]; 3]) -> Mat3 {
    Mat3::from_cols_array_2d(rows)
}

fn rrt_and_odt_fit(v: Color) -> Color {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    a / b
}

/// Fitted ACES tone curve.
pub fn aces_fitted(c: Color) -> Color {
    let c = channel_weights(&ACES_INPUT) * c;
    let c = rrt_and_odt_fit(c);
    clamp_channels(channel_weights(&ACES_OUTPUT) * c)
}

/// Narkowicz filmic curve.
pub fn filmic(x: Color) -> Color {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;
    clamp_channels((x * (A * x + B)) / (x * (C * x + D) + E))
}

/// Clamp every channel into `[0, MAX_CHANNEL]`. NaN channels become 0.
pub fn clamp_channels(c: Color) -> Color {
    let clamp = |x: f32| if x.is_nan() { 0.0 } else { x.clamp(0.0, MAX_CHANNEL) };
    Color::new(clamp(c.x), clamp(c.y), clamp(c.z))
}

/// Gamma 2 encoding.
#[inline]
pub fn gamma_encode(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize a channel in [0, 1] to 8 bits.
#[inline]
pub fn quantize(x: f32) -> u8 {
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, MAX_CHANNEL) };
    (256.0 * x) as u8
}

/// Convert RGB to (hue, saturation, lightness), each in [0, 1].
pub fn rgb_to_hsl(c: Color) -> Color {
    let c_max = c.max_element();
    let c_min = c.min_element();
    let delta = c_max - c_min;

    let l = (c_max + c_min) / 2.0;
    if delta == 0.0 {
        return Color::new(0.0, 0.0, l);
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if c_max == c.x {
        let h = (c.y - c.z) / delta;
        if h < 0.0 {
            h + 6.0
        } else {
            h
        }
    } else if c_max == c.y {
        (c.z - c.x) / delta + 2.0
    } else {
        (c.x - c.y) / delta + 4.0
    };

    Color::new(h / 6.0, s, l)
}

/// Convert (hue, saturation, lightness) back to RGB.
pub fn hsl_to_rgb(hsl: Color) -> Color {
    let (h, s, l) = (hsl.x, hsl.y, hsl.z);
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - chroma / 2.0;

    let rgb = match (h * 6.0) as u32 {
        0 => Color::new(chroma, x, 0.0),
        1 => Color::new(x, chroma, 0.0),
        2 => Color::new(0.0, chroma, x),
        3 => Color::new(0.0, x, chroma),
        4 => Color::new(x, 0.0, chroma),
        _ => Color::new(chroma, 0.0, x),
    };

    rgb + m
}

/// Scale saturation by `s` in [-1, 1]: negative values desaturate toward
/// gray, positive values push toward full saturation.
pub fn saturate(c: Color, s: f32) -> Color {
    let s = s.clamp(-1.0, 1.0);
    let mut hsl = rgb_to_hsl(c);
    hsl.y = if s < 0.0 {
        (1.0 + s) * hsl.y
    } else {
        (1.0 - s) * hsl.y + s
    };
    hsl_to_rgb(hsl)
}

/// Contrast "pop": raise each channel to `sqrt(1 + p)` then saturate by `p`.
pub fn pop_filter(c: Color, p: f32) -> Color {
    let p = p.clamp(-1.0, 1.0);
    let c = c.max(Color::ZERO).powf((1.0 + p).sqrt());
    saturate(c, p)
}

/// Optional stylistic grading applied after gamma encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGrade {
    /// Saturation adjustment in [-1, 1].
    pub saturation: f32,
    /// Contrast pop in [-1, 1].
    pub pop: f32,
}

impl ColorGrade {
    pub fn apply(&self, c: Color) -> Color {
        let c = if self.pop != 0.0 { pop_filter(c, self.pop) } else { c };
        if self.saturation != 0.0 {
            saturate(c, self.saturation)
        } else {
            c
        }
    }
}

/// Turn averaged linear radiance into one output pixel, B, G, R order.
pub fn to_bgr8(radiance: Color, tone_map: ToneMap, grade: Option<&ColorGrade>) -> [u8; 3] {
    let mapped = tone_map.apply(radiance);
    let encoded = Color::new(
        gamma_encode(mapped.x),
        gamma_encode(mapped.y),
        gamma_encode(mapped.z),
    );
    let graded = grade.map_or(encoded, |g| g.apply(encoded));

    [quantize(graded.z), quantize(graded.y), quantize(graded.x)]
}
