//! Per-stage timing sinks.
//!
//! The pipeline reports elapsed microseconds at each stage boundary to a
//! [`Telemetry`] sink passed in by the caller. Sinks never influence the
//! classification.

use std::time::Instant;

/// Receives per-stage elapsed times.
pub trait Telemetry {
    fn record(&mut self, stage: &'static str, duration_micros: u64);
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn record(&mut self, _stage: &'static str, _duration_micros: u64) {}
}

/// Timing entry for a single stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: &'static str,
    pub micros: u64,
}

/// Ordered timing trace of one classification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub stages: Vec<StageTiming>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed time of `stage`, if it was recorded.
    pub fn get(&self, stage: &str) -> Option<u64> {
        self.stages
            .iter()
            .find(|timing| timing.stage == stage)
            .map(|timing| timing.micros)
    }

    /// Names of the recorded stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|timing| timing.stage).collect()
    }
}

impl Telemetry for StageTimings {
    fn record(&mut self, stage: &'static str, duration_micros: u64) {
        self.stages.push(StageTiming {
            stage,
            micros: duration_micros,
        });
    }
}

/// Measures a stage and reports it when finished.
pub(crate) struct StageClock {
    start: Instant,
}

impl StageClock {
    pub(crate) fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub(crate) fn finish(self, telemetry: &mut dyn Telemetry, stage: &'static str) {
        let micros = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);
        telemetry.record(stage, micros);
    }
}

/// Pipeline stage names as reported to telemetry.
pub mod stage {
    pub const LOAD: &str = "load";
    pub const RESIZE: &str = "resize";
    pub const BINARIZE: &str = "binarize";
    pub const GATE: &str = "gate";
    pub const MATCH: &str = "match";
    pub const TOTAL: &str = "total";
}

#[cfg(test)]
mod tests {
    use super::{stage, StageTimings, Telemetry};

    #[test]
    fn timings_keep_order_and_lookup() {
        let mut timings = StageTimings::new();
        timings.record(stage::RESIZE, 12);
        timings.record(stage::GATE, 3);
        assert_eq!(timings.stage_names(), vec!["resize", "gate"]);
        assert_eq!(timings.get("gate"), Some(3));
        assert_eq!(timings.get("match"), None);
    }
}
