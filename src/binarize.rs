//! Threshold binarization into foreground/background cells.

use crate::image::{Image, ImageView, Region};
use crate::util::alloc::{grid_len, try_with_capacity};
use crate::util::{KickerError, KickerResult};

/// Foreground/background grid with the same dimensions as its source image.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryImage {
    cells: Vec<bool>,
    width: usize,
    height: usize,
}

impl BinaryImage {
    /// Wraps row-major cells where `true` marks foreground.
    pub fn new(cells: Vec<bool>, width: usize, height: usize) -> KickerResult<Self> {
        let needed = grid_len(width, height)?;
        if cells.len() != needed {
            return Err(KickerError::BufferTooSmall {
                needed,
                got: cells.len(),
            });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns a borrowed view of the cells.
    pub fn view(&self) -> ImageView<'_, bool> {
        ImageView::contiguous(&self.cells, self.width, self.height)
    }

    /// Counts foreground cells inside `region`.
    pub fn foreground_count(&self, region: Region) -> KickerResult<usize> {
        let roi = self.view().roi(region)?;
        Ok(roi
            .rows()
            .map(|row| row.iter().filter(|&&cell| cell).count())
            .sum())
    }

    /// Renders `region` as samples in `{0.0, 1.0}` for binary-domain matching.
    pub fn region_samples(&self, region: Region) -> KickerResult<Image> {
        let roi = self.view().roi(region)?;
        let mut data = try_with_capacity(region.area())?;
        for row in roi.rows() {
            data.extend(row.iter().map(|&cell| if cell { 1.0 } else { 0.0 }));
        }
        Image::new(data, region.width, region.height)
    }

    /// Renders the whole grid as samples in `{0.0, 1.0}`.
    pub fn to_samples(&self) -> KickerResult<Image> {
        self.region_samples(Region::new(0, 0, self.width, self.height))
    }
}

/// Classifies each sample: `sample >= threshold` is foreground.
///
/// `threshold` lives in the same `[0, 1]` domain as the image samples.
pub fn binarize(image: &Image, threshold: f32) -> KickerResult<BinaryImage> {
    check_threshold(threshold)?;
    let mut cells = try_with_capacity(image.data().len())?;
    cells.extend(image.data().iter().map(|&v| v >= threshold));
    BinaryImage::new(cells, image.width(), image.height())
}

pub(crate) fn check_threshold(threshold: f32) -> KickerResult<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(KickerError::config(format!(
            "binarization threshold {threshold} outside [0, 1]"
        )));
    }
    Ok(())
}

/// Byte threshold of the desktop deployments (127 of 255).
pub const DESKTOP_THRESHOLD: f32 = 127.0 / 255.0;

/// High-confidence threshold of the embedded deployment.
pub const EMBEDDED_THRESHOLD: f32 = 0.8;

#[cfg(test)]
mod tests {
    use super::{binarize, BinaryImage, DESKTOP_THRESHOLD};
    use crate::image::{Image, Region};

    #[test]
    fn threshold_is_inclusive() {
        let img = Image::new(vec![0.49, 0.5, 0.51, 1.0], 4, 1).unwrap();
        let bin = binarize(&img, 0.5).unwrap();
        assert_eq!(bin.view().row(0).unwrap(), &[false, true, true, true]);
    }

    #[test]
    fn desktop_threshold_matches_byte_rule() {
        let img = Image::from_u8(&[126, 127, 128], 3, 1, 255).unwrap();
        let bin = binarize(&img, DESKTOP_THRESHOLD).unwrap();
        assert_eq!(bin.view().row(0).unwrap(), &[false, true, true]);
    }

    #[test]
    fn rejects_out_of_domain_threshold() {
        let img = Image::new(vec![0.0; 4], 2, 2).unwrap();
        assert!(binarize(&img, 1.5).is_err());
        assert!(binarize(&img, f32::NAN).is_err());
    }

    #[test]
    fn counts_and_renders_regions() {
        let bin = BinaryImage::new(vec![true, false, true, true, false, false], 3, 2).unwrap();
        assert_eq!(bin.foreground_count(Region::new(0, 0, 3, 1)).unwrap(), 2);
        assert_eq!(bin.foreground_count(Region::new(1, 0, 2, 2)).unwrap(), 1);
        let samples = bin.region_samples(Region::new(1, 0, 2, 2)).unwrap();
        assert_eq!(samples.data(), &[0.0, 1.0, 0.0, 0.0]);
    }
}
