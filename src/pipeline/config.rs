//! Pipeline configuration and deployment presets.

use crate::binarize::{binarize, check_threshold, DESKTOP_THRESHOLD, EMBEDDED_THRESHOLD};
use crate::gate::GateConfig;
use crate::image::resample::resize;
use crate::image::{Image, RegionSpec};
use crate::util::{KickerError, KickerResult};

/// Sample domain of the region handed to the matcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchDomain {
    /// Interpolated grayscale samples in `[0, 1]`.
    #[default]
    Grayscale,
    /// Binarized cells rendered as `{0.0, 1.0}`; templates are thresholded
    /// with the same threshold when the pipeline is built.
    Binary,
}

/// Configuration for a classification pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Resolution every frame is resampled to; `None` keeps the input size.
    pub canonical_size: Option<(usize, usize)>,
    /// Foreground threshold in `[0, 1]` (`sample >= threshold`).
    pub binarize_threshold: f32,
    /// Presence gate evaluated on the binarized frame.
    pub gate: GateConfig,
    /// Region compared against the templates.
    pub roi: RegionSpec,
    /// Whether the region is taken from the grayscale or the binary frame.
    pub match_domain: MatchDomain,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

impl PipelineConfig {
    /// Flash-backed embedded deployment: 128x128 frames, 0.8 threshold, 2 %
    /// gate, whole-frame comparison.
    pub fn embedded() -> Self {
        Self {
            canonical_size: Some((128, 128)),
            binarize_threshold: EMBEDDED_THRESHOLD,
            gate: GateConfig::upper_half(2.0),
            roi: RegionSpec::Full,
            match_domain: MatchDomain::Grayscale,
        }
    }

    /// Desktop deployment: native resolution, byte threshold 127, 5 % gate,
    /// upper-half comparison.
    pub fn desktop() -> Self {
        Self {
            canonical_size: None,
            binarize_threshold: DESKTOP_THRESHOLD,
            gate: GateConfig::upper_half(5.0),
            roi: RegionSpec::UpperHalf,
            match_domain: MatchDomain::Grayscale,
        }
    }

    /// Checks value ranges and, when the frame size is fixed, the ROI bounds.
    pub fn validate(&self) -> KickerResult<()> {
        check_threshold(self.binarize_threshold)?;
        self.gate.validate()?;
        if let Some((width, height)) = self.canonical_size {
            if width == 0 || height == 0 {
                return Err(KickerError::config(format!(
                    "canonical size {width}x{height} must be positive"
                )));
            }
            self.roi
                .resolve(width, height)
                .map_err(|err| KickerError::config(format!("roi: {err}")))?;
            if let GateConfig::Coverage { region, .. } = self.gate {
                region
                    .resolve(width, height)
                    .map_err(|err| KickerError::config(format!("gate region: {err}")))?;
            }
        }
        Ok(())
    }

    /// Resamples `image` to the canonical size and copies out the ROI in the
    /// matching domain. This is how reference templates are produced.
    pub fn extract_roi(&self, image: &Image) -> KickerResult<Image> {
        let resized;
        let frame = match self.canonical_size {
            Some((width, height)) if image.dims() != (width, height) => {
                resized = resize(image, width, height)?;
                &resized
            }
            _ => image,
        };
        let (width, height) = frame.dims();
        let region = self.roi.resolve(width, height)?;
        match self.match_domain {
            MatchDomain::Grayscale => Image::from_view(frame.view().roi(region)?),
            MatchDomain::Binary => binarize(frame, self.binarize_threshold)?.region_samples(region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;
    use crate::gate::GateConfig;
    use crate::image::{Region, RegionSpec};

    #[test]
    fn extract_roi_in_binary_domain() {
        let cfg = PipelineConfig {
            canonical_size: None,
            binarize_threshold: 0.5,
            roi: RegionSpec::Rect(Region::new(1, 0, 2, 2)),
            match_domain: super::MatchDomain::Binary,
            ..PipelineConfig::desktop()
        };
        let img = crate::image::Image::new(vec![0.9, 0.2, 0.7, 0.1, 0.6, 0.4], 3, 2).unwrap();
        let roi = cfg.extract_roi(&img).unwrap();
        assert_eq!(roi.data(), &[0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn presets_validate() {
        assert!(PipelineConfig::embedded().validate().is_ok());
        assert!(PipelineConfig::desktop().validate().is_ok());
    }

    #[test]
    fn roi_outside_canonical_frame_is_fatal() {
        let cfg = PipelineConfig {
            roi: RegionSpec::Rect(Region::new(100, 0, 64, 64)),
            ..PipelineConfig::embedded()
        };
        assert!(cfg.validate().unwrap_err().is_fatal());
    }

    #[test]
    fn bad_thresholds_are_fatal() {
        let cfg = PipelineConfig {
            binarize_threshold: -0.1,
            ..PipelineConfig::desktop()
        };
        assert!(cfg.validate().unwrap_err().is_fatal());

        let cfg = PipelineConfig {
            gate: GateConfig::upper_half(250.0),
            ..PipelineConfig::desktop()
        };
        assert!(cfg.validate().unwrap_err().is_fatal());
    }
}
