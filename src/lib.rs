//! Kickercheck classifies the presence and orientation of a kicker in a
//! single grayscale frame.
//!
//! Frames are resampled to a canonical resolution, binarized, screened by a
//! coverage gate and, when the gate passes, compared against a small ordered
//! set of reference templates by L1 distance. The closest template's index is
//! mapped to a label through an explicit decision table.
//!
//! The core is synchronous and allocation-bounded so it can run on a
//! flash-backed embedded target as well as on a desktop host. Optional
//! features add SIMD distance kernels (`simd`), parallel batches (`rayon`),
//! `image` crate decoding (`image-io`) and `tracing` output (`tracing`).

pub mod binarize;
pub mod gate;
pub mod image;
pub mod kernel;
pub mod matcher;
pub mod pipeline;
pub mod source;
pub mod telemetry;
pub mod template;
mod trace;
pub mod util;

pub use binarize::{binarize, BinaryImage};
pub use gate::{gate, GateConfig, GateDecision};
pub use crate::image::resample::resize;
pub use crate::image::{Image, ImageView, Region, RegionSpec};
pub use matcher::{match_templates, MatchResult};
pub use pipeline::{
    BatchItem, ClassificationResult, Label, LabelTable, MatchDomain, Pipeline, PipelineConfig,
};
pub use source::{DirSource, ImageSource, MemorySource, TemplateSource};
pub use telemetry::{NoopTelemetry, StageTimings, Telemetry};
pub use template::{Template, TemplateSet};
pub use util::{KickerError, KickerResult};
