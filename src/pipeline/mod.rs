//! Classification pipeline: resample, binarize, gate, match, label.
//!
//! A [`Pipeline`] is built once from a validated configuration, an ordered
//! template set and a label table, then shared read-only by any number of
//! classifications. Each call owns its transient buffers (resampled frame,
//! binary frame, extracted region) and releases them on every exit path.
//!
//! A frame either stops at the gate (`present == false`, no match computed)
//! or runs through matching and receives a label. Failing the gate is a
//! normal outcome, not an error.

mod config;
mod labels;

pub use config::{MatchDomain, PipelineConfig};
pub use labels::{Label, LabelTable};

use crate::binarize::binarize;
use crate::gate::GateDecision;
use crate::image::resample::resize;
use crate::image::{Image, Region};
use crate::matcher::{match_templates, MatchResult};
use crate::source::ImageSource;
use crate::telemetry::{stage, NoopTelemetry, StageClock, StageTimings, Telemetry};
use crate::template::TemplateSet;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{KickerError, KickerResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Outcome of classifying one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    /// True when the frame passed the gate (or the gate is disabled).
    pub present: bool,
    /// Measured foreground percentage; `None` when the gate is disabled.
    pub coverage_percent: Option<f64>,
    /// Label of the closest template; `None` when rejected by the gate.
    pub label: Option<Label>,
    /// Match details; `None` when rejected by the gate.
    pub matched: Option<MatchResult>,
}

impl ClassificationResult {
    fn rejected(gate: GateDecision) -> Self {
        Self {
            present: false,
            coverage_percent: Some(gate.percent),
            label: None,
            matched: None,
        }
    }

    /// True when the kicker is present and matched a valid template.
    pub fn is_valid(&self) -> bool {
        self.label == Some(Label::Valid)
    }
}

/// Result of one identifier in a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub id: String,
    pub outcome: KickerResult<ClassificationResult>,
    pub timings: StageTimings,
}

/// Validated classification pipeline.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    templates: TemplateSet,
    labels: LabelTable,
}

impl Pipeline {
    /// Validates the configuration against the templates and labels.
    ///
    /// Fails with `Configuration` for out-of-range thresholds or a label table
    /// that does not cover the template set, and with `DimensionMismatch` when
    /// the canonical ROI cannot have the template shape.
    pub fn new(
        config: PipelineConfig,
        templates: TemplateSet,
        labels: LabelTable,
    ) -> KickerResult<Self> {
        config.validate()?;
        let templates = prepare_templates(&config, templates, &labels)?;
        Ok(Self {
            config,
            templates,
            labels,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Templates in the matching domain (binarized for `MatchDomain::Binary`).
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Swaps in a new template set and label table as a whole.
    ///
    /// In-flight classifications on clones of this pipeline keep the old set.
    pub fn replace_templates(
        &mut self,
        templates: TemplateSet,
        labels: LabelTable,
    ) -> KickerResult<()> {
        self.templates = prepare_templates(&self.config, templates, &labels)?;
        self.labels = labels;
        Ok(())
    }

    /// Classifies one frame without telemetry.
    pub fn classify(&self, image: &Image) -> KickerResult<ClassificationResult> {
        self.classify_with(image, "", &mut NoopTelemetry)
    }

    /// Classifies one frame, tagging trace output with `tag` and reporting
    /// stage timings to `telemetry`.
    pub fn classify_with(
        &self,
        image: &Image,
        tag: &str,
        telemetry: &mut dyn Telemetry,
    ) -> KickerResult<ClassificationResult> {
        let _span = trace_span!("classify", tag = tag).entered();
        let total = StageClock::start();

        let resized;
        let frame = match self.config.canonical_size {
            Some((width, height)) if image.dims() != (width, height) => {
                let clock = StageClock::start();
                resized = resize(image, width, height)?;
                clock.finish(telemetry, stage::RESIZE);
                &resized
            }
            _ => image,
        };
        let (width, height) = frame.dims();
        let region = matched_region(&self.config, &self.templates, width, height)?;

        let clock = StageClock::start();
        let binary = binarize(frame, self.config.binarize_threshold)?;
        clock.finish(telemetry, stage::BINARIZE);

        let clock = StageClock::start();
        let decision = self.config.gate.evaluate(&binary)?;
        clock.finish(telemetry, stage::GATE);

        if let Some(decision) = decision.filter(|d| !d.pass) {
            trace_event!("absent", percent = decision.percent);
            total.finish(telemetry, stage::TOTAL);
            return Ok(ClassificationResult::rejected(decision));
        }

        let clock = StageClock::start();
        let binary_roi = match self.config.match_domain {
            MatchDomain::Binary => Some(binary.region_samples(region)?),
            MatchDomain::Grayscale => None,
        };
        drop(binary);
        let roi = match &binary_roi {
            Some(samples) => samples.view(),
            None => frame.view().roi(region)?,
        };
        let matched = match_templates(roi, &self.templates)?;
        clock.finish(telemetry, stage::MATCH);

        let label = self
            .labels
            .get(matched.best_index)
            .ok_or_else(|| {
                KickerError::config(format!(
                    "no label for template index {}",
                    matched.best_index
                ))
            })?;
        trace_event!(
            "classified",
            label = label.as_str(),
            index = matched.best_index,
            distance = matched.best_distance
        );
        total.finish(telemetry, stage::TOTAL);

        Ok(ClassificationResult {
            present: true,
            coverage_percent: decision.map(|d| d.percent),
            label: Some(label),
            matched: Some(matched),
        })
    }

    /// Copies out the ROI `classify` would match; see
    /// [`PipelineConfig::extract_roi`].
    pub fn extract_roi(&self, image: &Image) -> KickerResult<Image> {
        self.config.extract_roi(image)
    }

    /// Loads and classifies every identifier, keeping input order.
    ///
    /// Missing, undecodable or unallocatable images are reported in their
    /// item and the batch continues. A fatal error (setup bug) aborts the
    /// whole batch. With the `rayon` feature items run in parallel.
    pub fn classify_batch<S, I>(&self, source: &S, ids: &[I]) -> KickerResult<Vec<BatchItem>>
    where
        S: ImageSource + Sync,
        I: AsRef<str> + Sync,
    {
        let _span = trace_span!("classify_batch", count = ids.len()).entered();

        #[cfg(feature = "rayon")]
        let items = ids
            .par_iter()
            .map(|id| fatal_as_err(self.classify_item(source, id.as_ref())))
            .collect::<KickerResult<Vec<BatchItem>>>()?;

        #[cfg(not(feature = "rayon"))]
        let items = ids
            .iter()
            .map(|id| fatal_as_err(self.classify_item(source, id.as_ref())))
            .collect::<KickerResult<Vec<BatchItem>>>()?;

        Ok(items)
    }

    fn classify_item<S: ImageSource>(&self, source: &S, id: &str) -> BatchItem {
        let mut timings = StageTimings::new();
        let clock = StageClock::start();
        let outcome = source.get(id).and_then(|image| {
            clock.finish(&mut timings, stage::LOAD);
            self.classify_with(&image, id, &mut timings)
        });
        BatchItem {
            id: id.to_owned(),
            outcome,
            timings,
        }
    }
}

/// Lifts a fatal item error to the batch; other errors stay in the item.
fn fatal_as_err(item: BatchItem) -> KickerResult<BatchItem> {
    match &item.outcome {
        Err(err) if err.is_fatal() => Err(err.clone()),
        Err(err) => {
            trace_warn!("skipped", id = item.id.as_str(), error = err.to_string().as_str());
            Ok(item)
        }
        Ok(_) => Ok(item),
    }
}

fn prepare_templates(
    config: &PipelineConfig,
    templates: TemplateSet,
    labels: &LabelTable,
) -> KickerResult<TemplateSet> {
    labels.check_covers(templates.len())?;
    if let Some((width, height)) = config.canonical_size {
        matched_region(config, &templates, width, height)?;
    }
    let templates = match config.match_domain {
        MatchDomain::Grayscale => templates,
        MatchDomain::Binary => templates.binarized(config.binarize_threshold)?,
    };
    Ok(templates)
}

/// Resolves the ROI for a `width x height` frame and checks it has the
/// template shape.
fn matched_region(
    config: &PipelineConfig,
    templates: &TemplateSet,
    width: usize,
    height: usize,
) -> KickerResult<Region> {
    let region = config.roi.resolve(width, height)?;
    let (expected_width, expected_height) = templates.dims();
    if (region.width, region.height) != (expected_width, expected_height) {
        return Err(KickerError::DimensionMismatch {
            expected_width,
            expected_height,
            width: region.width,
            height: region.height,
            context: "roi vs templates",
        });
    }
    Ok(region)
}
