//! Distance kernels for comparing a region against a template.

use crate::ImageView;

/// Kernel trait for whole-grid distance evaluation.
pub trait Kernel {
    /// Sum of absolute per-sample differences between two views.
    ///
    /// Callers guarantee both views have the same width and height.
    fn l1(a: ImageView<'_, f32>, b: ImageView<'_, f32>) -> f32;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::L1Scalar as DefaultKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::L1Simd as DefaultKernel;
