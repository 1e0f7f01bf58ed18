//! Coverage gate: a cheap presence check on the foreground fraction of a region.
//!
//! The gate only exists to skip template matching on frames that plainly lack
//! the kicker. It can be disabled without changing what a passing frame is
//! classified as.

use crate::binarize::BinaryImage;
use crate::image::{Region, RegionSpec};
use crate::trace::trace_event;
use crate::util::{KickerError, KickerResult};

/// Outcome of evaluating the gate on one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateDecision {
    /// Foreground cells as a percentage of the region area, in `[0, 100]`.
    pub percent: f64,
    /// `percent > threshold_percent`.
    pub pass: bool,
}

/// Computes the foreground percentage of `region` and compares it to
/// `threshold_percent`. A percentage exactly equal to the threshold fails.
pub fn gate(
    binary: &BinaryImage,
    region: Region,
    threshold_percent: f64,
) -> KickerResult<GateDecision> {
    let foreground = binary.foreground_count(region)?;
    let percent = 100.0 * foreground as f64 / region.area() as f64;
    let pass = percent > threshold_percent;
    trace_event!("coverage", percent = percent, pass = pass);
    Ok(GateDecision { percent, pass })
}

/// Gate configuration for a pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateConfig {
    /// Reject frames whose foreground percentage in `region` does not exceed
    /// `threshold_percent`.
    Coverage {
        region: RegionSpec,
        threshold_percent: f64,
    },
    /// Every frame proceeds to matching.
    Disabled,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig::Coverage {
            region: RegionSpec::UpperHalf,
            threshold_percent: 5.0,
        }
    }
}

impl GateConfig {
    /// Coverage gate on the upper half of the frame.
    pub fn upper_half(threshold_percent: f64) -> Self {
        GateConfig::Coverage {
            region: RegionSpec::UpperHalf,
            threshold_percent,
        }
    }

    pub(crate) fn validate(&self) -> KickerResult<()> {
        if let GateConfig::Coverage {
            threshold_percent, ..
        } = *self
        {
            if !threshold_percent.is_finite() || !(0.0..=100.0).contains(&threshold_percent) {
                return Err(KickerError::config(format!(
                    "gate threshold {threshold_percent}% outside [0, 100]"
                )));
            }
        }
        Ok(())
    }

    /// Evaluates the gate on `binary`; `None` when the gate is disabled.
    pub fn evaluate(&self, binary: &BinaryImage) -> KickerResult<Option<GateDecision>> {
        match *self {
            GateConfig::Coverage {
                region,
                threshold_percent,
            } => {
                let (width, height) = binary.dims();
                let region = region.resolve(width, height)?;
                gate(binary, region, threshold_percent).map(Some)
            }
            GateConfig::Disabled => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{gate, GateConfig};
    use crate::binarize::BinaryImage;
    use crate::image::{Region, RegionSpec};

    fn half_lit(width: usize, height: usize, lit: usize) -> BinaryImage {
        let mut cells = vec![false; width * height];
        for cell in cells.iter_mut().take(lit) {
            *cell = true;
        }
        BinaryImage::new(cells, width, height).unwrap()
    }

    #[test]
    fn equal_to_threshold_fails() {
        let bin = half_lit(4, 2, 2);
        let region = Region::new(0, 0, 4, 1);
        let at = gate(&bin, region, 50.0).unwrap();
        assert_eq!(at.percent, 50.0);
        assert!(!at.pass);

        let above = gate(&bin, region, 50.0 - 1e-9).unwrap();
        assert!(above.pass);
    }

    #[test]
    fn upper_half_only_counts_top_rows() {
        let mut cells = vec![false; 16];
        for cell in cells.iter_mut().skip(8) {
            *cell = true;
        }
        let bin = BinaryImage::new(cells, 4, 4).unwrap();
        let decision = GateConfig::upper_half(0.0).evaluate(&bin).unwrap().unwrap();
        assert_eq!(decision.percent, 0.0);
        assert!(!decision.pass);
    }

    #[test]
    fn disabled_gate_skips_evaluation() {
        let bin = half_lit(2, 2, 0);
        assert_eq!(GateConfig::Disabled.evaluate(&bin).unwrap(), None);
    }

    #[test]
    fn custom_region_is_bounds_checked() {
        let bin = half_lit(2, 2, 4);
        let cfg = GateConfig::Coverage {
            region: RegionSpec::Rect(Region::new(1, 1, 2, 2)),
            threshold_percent: 1.0,
        };
        assert!(cfg.evaluate(&bin).is_err());
    }

    #[test]
    fn threshold_range_is_validated() {
        assert!(GateConfig::upper_half(101.0).validate().is_err());
        assert!(GateConfig::upper_half(f64::NAN).validate().is_err());
        assert!(GateConfig::upper_half(2.0).validate().is_ok());
    }
}
