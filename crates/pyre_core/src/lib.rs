//! Pyre Core - image data shared between the renderer and the outside world.
//!
//! This crate provides:
//!
//! - **Raster**: a decoded, 8-bit-per-channel interleaved image that image
//!   textures sample from
//! - **Image I/O**: decoding texture files into rasters and encoding the
//!   renderer's BGR output buffer to disk
//!
//! # Example
//!
//! ```ignore
//! use pyre_core::{load_raster_or_empty, save_bgr8};
//!
//! // A missing file yields an empty raster instead of an error
//! let earth = load_raster_or_empty("earth.jpg");
//! println!("{}x{}", earth.width(), earth.height());
//! ```

pub mod image_io;
pub mod raster;

// Re-export commonly used types
pub use image_io::{load_raster, load_raster_or_empty, save_bgr8, ImageIoError, ImageIoResult};
pub use raster::Raster;
