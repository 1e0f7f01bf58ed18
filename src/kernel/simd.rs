//! SIMD L1 kernel using the `wide` crate.
//!
//! Rows are processed 8 samples at a time with `f32x8`; the remainder of each
//! row falls back to scalar accumulation. Results equal the scalar kernel up
//! to float summation order.

use crate::kernel::Kernel;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

/// SIMD-accelerated L1 kernel.
pub struct L1Simd;

impl Kernel for L1Simd {
    fn l1(a: ImageView<'_, f32>, b: ImageView<'_, f32>) -> f32 {
        debug_assert_eq!(a.dims(), b.dims());
        let simd_end = a.width() / LANES * LANES;
        let mut acc = f32x8::ZERO;
        let mut tail = 0.0f32;

        for (row_a, row_b) in a.rows().zip(b.rows()) {
            let mut x = 0;
            while x < simd_end {
                let va = load_f32x8(&row_a[x..x + LANES]);
                let vb = load_f32x8(&row_b[x..x + LANES]);
                acc += (va - vb).abs();
                x += LANES;
            }
            for (p, q) in row_a[simd_end..].iter().zip(&row_b[simd_end..]) {
                tail += (p - q).abs();
            }
        }

        hsum(acc) + tail
    }
}

#[cfg(test)]
mod tests {
    use super::L1Simd;
    use crate::kernel::scalar::L1Scalar;
    use crate::kernel::Kernel;
    use crate::ImageView;

    #[test]
    fn matches_scalar_with_remainder_columns() {
        let width = 19;
        let height = 5;
        let a: Vec<f32> = (0..width * height).map(|i| (i % 7) as f32 / 7.0).collect();
        let b: Vec<f32> = (0..width * height).map(|i| (i % 5) as f32 / 5.0).collect();
        let va = ImageView::from_slice(&a, width, height).unwrap();
        let vb = ImageView::from_slice(&b, width, height).unwrap();
        let scalar = L1Scalar::l1(va, vb);
        let simd = L1Simd::l1(va, vb);
        assert!((scalar - simd).abs() <= 1e-4 * scalar.max(1.0));
    }
}
