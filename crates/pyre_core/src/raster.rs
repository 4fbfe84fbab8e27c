//! Decoded 8-bit raster images.

/// Number of interleaved channels per pixel (R, G, B).
pub const BYTES_PER_PIXEL: usize = 3;

/// A decoded image: `height` rows of `stride` bytes, each pixel three
/// interleaved 8-bit channels in R, G, B order, origin at the top-left.
///
/// A raster with zero width or height marks a failed decode. Consumers are
/// expected to degrade gracefully rather than fail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Create a raster from raw interleaved bytes.
    ///
    /// Returns `None` if `stride` is too small for `width` pixels or `data`
    /// does not hold `height` rows of `stride` bytes.
    pub fn new(width: usize, height: usize, stride: usize, data: Vec<u8>) -> Option<Self> {
        let fits = stride >= width * BYTES_PER_PIXEL && data.len() >= stride * height;
        fits.then_some(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Create a tightly packed raster (stride = 3 * width).
    pub fn from_rgb8(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        Self::new(width, height, width * BYTES_PER_PIXEL, data)
    }

    /// The zero-size raster reported when decoding fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// True when there are no pixels to sample.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The RGB bytes of the pixel at column `x`, row `y` (row 0 is the top).
    ///
    /// Coordinates are clamped to the raster bounds. Returns `None` only for
    /// an empty raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if self.is_empty() {
            return None;
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let offset = y * self.stride + x * BYTES_PER_PIXEL;
        let px = self.data.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2]])
    }

    /// Approximate memory footprint.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
