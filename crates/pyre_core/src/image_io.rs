//! Image file decoding and encoding.
//!
//! Decoding turns texture files into [`Raster`]s for image-sampled textures.
//! Encoding writes the renderer's output buffer, which stores each pixel in
//! B, G, R order, to any format the `image` crate can infer from the file
//! extension.

use std::path::Path;

use thiserror::Error;

use crate::raster::{Raster, BYTES_PER_PIXEL};

/// Errors that can occur while reading or writing image files.
#[derive(Error, Debug)]
pub enum ImageIoError {
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type ImageIoResult<T> = Result<T, ImageIoError>;

/// Decode an image file into a tightly packed 8-bit RGB raster.
pub fn load_raster(path: impl AsRef<Path>) -> ImageIoResult<Raster> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| ImageIoError::Decode {
        path: path.display().to_string(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (width, height) = (width as usize, height as usize);
    let data = rgb.into_raw();
    let actual = data.len();

    let raster = Raster::from_rgb8(width, height, data).ok_or(ImageIoError::BufferSize {
        width: width as u32,
        height: height as u32,
        expected: width * height * BYTES_PER_PIXEL,
        actual,
    })?;

    log::debug!(
        "Loaded raster: {} ({}x{}, {:.1} KB)",
        path.display(),
        raster.width(),
        raster.height(),
        raster.size_bytes() as f32 / 1024.0
    );

    Ok(raster)
}

/// Decode an image file, logging and substituting an empty raster on failure.
///
/// Image textures render an empty raster as a flat debug color, so a missing
/// texture never aborts a render.
pub fn load_raster_or_empty(path: impl AsRef<Path>) -> Raster {
    match load_raster(path) {
        Ok(raster) => raster,
        Err(err) => {
            log::error!("Could not load texture image: {}", err);
            Raster::empty()
        }
    }
}

/// Write a BGR8 pixel buffer (row-major, top row first) to `path`.
pub fn save_bgr8(path: impl AsRef<Path>, width: u32, height: u32, bgr: &[u8]) -> ImageIoResult<()> {
    let path = path.as_ref();
    let expected = width as usize * height as usize * BYTES_PER_PIXEL;
    if bgr.len() != expected {
        return Err(ImageIoError::BufferSize {
            width,
            height,
            expected,
            actual: bgr.len(),
        });
    }

    let rgb: Vec<u8> = bgr
        .chunks_exact(BYTES_PER_PIXEL)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();

    let image = image::RgbImage::from_raw(width, height, rgb).ok_or(ImageIoError::BufferSize {
        width,
        height,
        expected,
        actual: bgr.len(),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    image.save(path).map_err(|source| ImageIoError::Encode {
        path: path.display().to_string(),
        source,
    })?;

    log::info!("Saved {}x{} image to {}", width, height, path.display());
    Ok(())
}
