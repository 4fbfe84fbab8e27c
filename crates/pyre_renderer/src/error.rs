//! Renderer error types.

use thiserror::Error;

/// Errors raised while assembling a scene or starting a render.
///
/// Per-ray outcomes (no hit, no scatter, no bounding box) are never errors;
/// they are reported as `None`.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot build a BVH over an empty primitive list")]
    EmptyBvh,

    #[error("Primitive has no bounding box and cannot be placed in a BVH")]
    MissingBoundingBox,

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type RenderResult<T> = Result<T, RenderError>;
