//! Sample grids and borrowed views.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! `Image` is the owned grayscale grid every stage works on. Samples are `f32`
//! in the canonical `[0, 1]` domain regardless of the source bit depth.

use crate::util::alloc::{grid_len, try_with_capacity};
use crate::util::{KickerError, KickerResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod pgm;
pub mod region;
pub mod resample;

pub use region::{Region, RegionSpec};

/// Borrowed 2D view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> KickerResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> KickerResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(KickerError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Builds a view over a buffer whose length was checked by its owner.
    pub(crate) fn contiguous(data: &'a [T], width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
            stride: width,
        }
    }

    /// Returns the view width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the view height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Iterates rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy view of `region`.
    pub fn roi(&self, region: Region) -> KickerResult<ImageView<'a, T>> {
        region.check_within(self.width, self.height)?;
        let start = region.y * self.stride + region.x;
        let data = self
            .data
            .get(start..)
            .ok_or(KickerError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;
        ImageView::new(data, region.width, region.height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> KickerResult<usize> {
    if width == 0 || height == 0 {
        return Err(KickerError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(KickerError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(KickerError::InvalidDimensions { width, height })
}

/// Owned grayscale grid with samples normalized to `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl Image {
    /// Wraps normalized samples in row-major order.
    ///
    /// The buffer length must equal `width * height` and every sample must lie
    /// in `[0, 1]`; NaN and infinities are rejected with `SampleOutOfRange`.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> KickerResult<Self> {
        let needed = grid_len(width, height)?;
        if data.len() < needed {
            return Err(KickerError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(KickerError::InvalidDimensions { width, height });
        }
        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(KickerError::SampleOutOfRange { index, value });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Normalizes 8-bit samples by `max_value`.
    pub fn from_u8(data: &[u8], width: usize, height: usize, max_value: u8) -> KickerResult<Self> {
        Self::normalized(data, width, height, f32::from(max_value.max(1)))
    }

    /// Normalizes 16-bit samples by `max_value`.
    pub fn from_u16(data: &[u16], width: usize, height: usize, max_value: u16) -> KickerResult<Self> {
        Self::normalized(data, width, height, f32::from(max_value.max(1)))
    }

    fn normalized<S>(data: &[S], width: usize, height: usize, max_value: f32) -> KickerResult<Self>
    where
        S: Copy + Into<f32>,
    {
        let needed = grid_len(width, height)?;
        if data.len() != needed {
            return Err(KickerError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        let mut out = try_with_capacity(needed)?;
        out.extend(
            data.iter()
                .map(|&v| (v.into() / max_value).clamp(0.0, 1.0)),
        );
        Self::new(out, width, height)
    }

    /// Copies a view into a contiguous owned image.
    pub fn from_view(view: ImageView<'_, f32>) -> KickerResult<Self> {
        let (width, height) = view.dims();
        let mut data = try_with_capacity(grid_len(width, height)?)?;
        for row in view.rows() {
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Returns the image width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the samples in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.view().get(x, y).copied()
    }

    /// Returns a borrowed view of the whole image.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView::contiguous(&self.data, self.width, self.height)
    }

    /// Quantizes samples back to 8-bit with rounding.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Image;
    use crate::util::KickerError;

    #[test]
    fn from_u8_normalizes_by_max_value() {
        let img = Image::from_u8(&[0, 51, 255, 255], 2, 2, 255).unwrap();
        assert_eq!(img.data()[0], 0.0);
        assert!((img.data()[1] - 0.2).abs() < 1e-6);
        assert_eq!(img.data()[2], 1.0);

        let img = Image::from_u8(&[0, 50, 100], 3, 1, 100).unwrap();
        assert!((img.data()[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn from_u16_normalizes_by_max_value() {
        let img = Image::from_u16(&[0, 32768, 65535], 3, 1, 65535).unwrap();
        assert!((img.data()[1] - 0.5).abs() < 1e-4);
        assert_eq!(img.data()[2], 1.0);
    }

    #[test]
    fn new_rejects_wrong_length() {
        assert_eq!(
            Image::new(vec![0.0; 3], 2, 2).unwrap_err(),
            KickerError::BufferTooSmall { needed: 4, got: 3 }
        );
        assert_eq!(
            Image::new(vec![0.0; 5], 2, 2).unwrap_err(),
            KickerError::InvalidDimensions {
                width: 2,
                height: 2
            }
        );
    }

    #[test]
    fn new_rejects_samples_outside_unit_range() {
        assert_eq!(
            Image::new(vec![0.0, 1.5, 0.2, 0.3], 2, 2).unwrap_err(),
            KickerError::SampleOutOfRange {
                index: 1,
                value: 1.5
            }
        );
        assert!(matches!(
            Image::new(vec![0.0, 0.1, f32::NAN, 0.3], 2, 2),
            Err(KickerError::SampleOutOfRange { index: 2, .. })
        ));
        assert!(Image::new(vec![0.0, -0.01, 0.0, 0.0], 2, 2).is_err());
        assert!(Image::new(vec![0.0, 1.0, 0.0, 1.0], 2, 2).is_ok());
    }

    #[test]
    fn to_u8_rounds_and_clamps() {
        let img = Image::new(vec![0.0, 0.5, 1.0, 0.2], 2, 2).unwrap();
        assert_eq!(img.to_u8(), vec![0, 128, 255, 51]);
    }
}
