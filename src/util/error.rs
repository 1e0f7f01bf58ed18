//! Error types for kickercheck.

use thiserror::Error;

/// Result alias for kickercheck operations.
pub type KickerResult<T> = std::result::Result<T, KickerError>;

/// Errors that can occur while loading images or classifying a frame.
///
/// `DimensionMismatch` and `Configuration` describe a setup bug and are
/// fail-fast (see [`KickerError::is_fatal`]). Every other variant aborts only
/// the image being processed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KickerError {
    /// The identifier has no backing data.
    #[error("image not found: {id}")]
    ImageNotFound { id: String },
    /// The backing bytes are truncated or malformed.
    #[error("failed to decode image: {reason}")]
    ImageDecode { reason: String },
    /// Storage failure other than a missing identifier.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
    /// A region and a template (or two grids) do not share a shape.
    #[error(
        "dimension mismatch in {context}: expected {expected_width}x{expected_height}, got {width}x{height}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
        context: &'static str,
    },
    /// Inconsistent pipeline setup (template set, label table, thresholds).
    #[error("configuration error: {reason}")]
    Configuration { reason: String },
    /// A sample is NaN, infinite or outside the canonical `[0, 1]` domain.
    #[error("sample {index} is {value}, outside [0, 1]")]
    SampleOutOfRange { index: usize, value: f32 },
    /// A sample buffer could not be allocated.
    #[error("failed to allocate {len} samples")]
    AllocationFailure { len: usize },
    /// Width or height is zero, or the element count overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The stride is smaller than the width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer is too small for the requested view.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region does not fit inside its parent grid.
    #[error("region ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
}

impl KickerError {
    /// Returns true for errors that indicate a setup bug rather than a bad image.
    ///
    /// A batch driver should stop on fatal errors and skip the current image
    /// on everything else.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KickerError::DimensionMismatch { .. } | KickerError::Configuration { .. }
        )
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        KickerError::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        KickerError::ImageDecode {
            reason: reason.into(),
        }
    }
}
