//! Errors surfaced by the render entry point.

use thiserror::Error;

/// Faults that stop a render before any pixel is traced.
///
/// Per-ray numeric problems never show up here; degenerate geometry simply
/// fails to intersect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Scene has no camera")]
    MissingCamera,

    #[error("Scene BVH is not built (call build_bvh after adding surfaces)")]
    BvhNotBuilt,

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
