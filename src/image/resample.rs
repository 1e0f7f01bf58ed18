//! Bilinear resampling to a canonical resolution.
//!
//! Destination cell `(i, j)` samples the source at `x = j * src_w / dst_w`,
//! `y = i * src_h / dst_h`. The right and bottom neighbors are clamped to the
//! last valid column/row (edge duplication). No prefilter is applied when
//! downscaling, so heavy reductions alias.

use crate::image::Image;
use crate::trace::trace_event;
use crate::util::alloc::{grid_len, try_with_capacity};
use crate::util::{KickerError, KickerResult};

/// Resizes `src` to `new_width x new_height` with bilinear interpolation.
pub fn resize(src: &Image, new_width: usize, new_height: usize) -> KickerResult<Image> {
    if new_width == 0 || new_height == 0 {
        return Err(KickerError::InvalidDimensions {
            width: new_width,
            height: new_height,
        });
    }
    let (src_width, src_height) = src.dims();
    let len = grid_len(new_width, new_height)?;
    let mut out = try_with_capacity(len)?;

    let scale_x = src_width as f32 / new_width as f32;
    let scale_y = src_height as f32 / new_height as f32;
    let last_x = src_width - 1;
    let last_y = src_height - 1;
    let data = src.data();

    for i in 0..new_height {
        let y = i as f32 * scale_y;
        let y1 = (y.floor() as usize).min(last_y);
        let y2 = (y1 + 1).min(last_y);
        let dy = y - y1 as f32;
        let row1 = &data[y1 * src_width..(y1 + 1) * src_width];
        let row2 = &data[y2 * src_width..(y2 + 1) * src_width];

        for j in 0..new_width {
            let x = j as f32 * scale_x;
            let x1 = (x.floor() as usize).min(last_x);
            let x2 = (x1 + 1).min(last_x);
            let dx = x - x1 as f32;

            let value = row1[x1] * (1.0 - dx) * (1.0 - dy)
                + row1[x2] * dx * (1.0 - dy)
                + row2[x1] * (1.0 - dx) * dy
                + row2[x2] * dx * dy;
            out.push(value.clamp(0.0, 1.0));
        }
    }

    trace_event!(
        "resize",
        src_width = src_width,
        src_height = src_height,
        width = new_width,
        height = new_height
    );
    Image::new(out, new_width, new_height)
}

#[cfg(test)]
mod tests {
    use super::resize;
    use crate::image::Image;

    #[test]
    fn identity_resize_is_exact() {
        let data: Vec<f32> = (0..12).map(|v| v as f32 / 11.0).collect();
        let img = Image::new(data.clone(), 4, 3).unwrap();
        let out = resize(&img, 4, 3).unwrap();
        assert_eq!(out.data(), data.as_slice());
    }

    #[test]
    fn upscale_interpolates_and_duplicates_edges() {
        let img = Image::new(vec![0.0, 1.0], 2, 1).unwrap();
        let out = resize(&img, 4, 1).unwrap();
        // x = 0.0, 0.5, 1.0, 1.5; the last sample clamps its right neighbor.
        assert_eq!(out.data(), &[0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn downscale_samples_without_prefilter() {
        let img = Image::new(vec![0.0, 1.0, 0.0, 1.0], 4, 1).unwrap();
        let out = resize(&img, 2, 1).unwrap();
        // x = 0.0 and 2.0 land exactly on dark samples: aliasing, not averaging.
        assert_eq!(out.data(), &[0.0, 0.0]);
    }

    #[test]
    fn single_pixel_inputs_and_outputs() {
        let one = Image::new(vec![0.25], 1, 1).unwrap();
        let up = resize(&one, 3, 2).unwrap();
        assert!(up.data().iter().all(|&v| (v - 0.25).abs() < 1e-6));

        let img = Image::new(vec![0.1, 0.2, 0.3, 0.4], 2, 2).unwrap();
        let down = resize(&img, 1, 1).unwrap();
        assert_eq!(down.data(), &[0.1]);
    }

    #[test]
    fn rejects_zero_target() {
        let img = Image::new(vec![0.0; 4], 2, 2).unwrap();
        assert!(resize(&img, 0, 2).is_err());
    }
}
