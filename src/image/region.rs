//! Rectangular regions and how they are resolved against a frame.

use crate::util::{KickerError, KickerResult};

/// Rectangular sub-view with origin `(x, y)` and extent `width x height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells covered by the region.
    pub fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Returns true when the region is non-empty and lies inside the parent grid.
    pub fn fits_within(&self, parent_width: usize, parent_height: usize) -> bool {
        self.check_within(parent_width, parent_height).is_ok()
    }

    /// Checks `x + width <= parent_width` and `y + height <= parent_height`.
    pub fn check_within(&self, parent_width: usize, parent_height: usize) -> KickerResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(KickerError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let out_of_bounds = KickerError::RoiOutOfBounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            img_width: parent_width,
            img_height: parent_height,
        };
        let end_x = self.x.checked_add(self.width).ok_or(out_of_bounds.clone())?;
        let end_y = self.y.checked_add(self.height).ok_or(out_of_bounds.clone())?;
        if end_x > parent_width || end_y > parent_height {
            return Err(out_of_bounds);
        }
        Ok(())
    }
}

/// Region expressed relative to the frame it will be applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RegionSpec {
    /// The whole frame.
    Full,
    /// Rows `[0, height / 2)` across the full width.
    #[default]
    UpperHalf,
    /// A fixed rectangle in frame coordinates.
    Rect(Region),
}

impl RegionSpec {
    /// Resolves this region against a `width x height` frame and checks the bounds.
    pub fn resolve(&self, width: usize, height: usize) -> KickerResult<Region> {
        let region = match *self {
            RegionSpec::Full => Region::new(0, 0, width, height),
            RegionSpec::UpperHalf => Region::new(0, 0, width, height / 2),
            RegionSpec::Rect(region) => region,
        };
        region.check_within(width, height)?;
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::{Region, RegionSpec};
    use crate::util::KickerError;

    #[test]
    fn upper_half_floors_odd_heights() {
        let region = RegionSpec::UpperHalf.resolve(6, 5).unwrap();
        assert_eq!(region, Region::new(0, 0, 6, 2));
    }

    #[test]
    fn upper_half_of_single_row_is_empty() {
        assert_eq!(
            RegionSpec::UpperHalf.resolve(4, 1).unwrap_err(),
            KickerError::InvalidDimensions {
                width: 4,
                height: 0
            }
        );
    }

    #[test]
    fn rect_must_fit_parent() {
        let spec = RegionSpec::Rect(Region::new(2, 1, 3, 2));
        assert!(spec.resolve(5, 3).is_ok());
        assert_eq!(
            spec.resolve(4, 3).unwrap_err(),
            KickerError::RoiOutOfBounds {
                x: 2,
                y: 1,
                width: 3,
                height: 2,
                img_width: 4,
                img_height: 3,
            }
        );
        assert!(!Region::new(usize::MAX, 0, 2, 1).fits_within(4, 4));
    }
}
