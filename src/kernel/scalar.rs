//! Scalar reference kernel.

use crate::kernel::Kernel;
use crate::ImageView;

/// Scalar L1 kernel.
pub struct L1Scalar;

impl Kernel for L1Scalar {
    fn l1(a: ImageView<'_, f32>, b: ImageView<'_, f32>) -> f32 {
        debug_assert_eq!(a.dims(), b.dims());
        a.rows()
            .zip(b.rows())
            .map(|(row_a, row_b)| {
                row_a
                    .iter()
                    .zip(row_b)
                    .map(|(x, y)| (x - y).abs())
                    .sum::<f32>()
            })
            .sum()
    }
}
