//! Index-to-label decision table.
//!
//! Deployments disagree on which template indices mean a valid kicker
//! position, so the mapping is always supplied explicitly and checked against
//! the template set when a pipeline is built.

use crate::util::{KickerError, KickerResult};
use std::fmt;
use std::str::FromStr;

/// Decision attached to a template index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Valid,
    Invalid,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Valid => "valid",
            Label::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = KickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "valid" => Ok(Label::Valid),
            "invalid" => Ok(Label::Invalid),
            other => Err(KickerError::config(format!("unknown label {other:?}"))),
        }
    }
}

/// Dense table mapping every template index to a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    /// Builds a table where `labels[i]` is the label of template `i`.
    pub fn new(labels: Vec<Label>) -> KickerResult<Self> {
        if labels.is_empty() {
            return Err(KickerError::config("label table is empty"));
        }
        Ok(Self { labels })
    }

    /// Builds a table from `(index, label)` pairs in any order.
    ///
    /// Every index in `0..pairs.len()` must appear exactly once.
    pub fn from_pairs(pairs: &[(usize, Label)]) -> KickerResult<Self> {
        let mut labels: Vec<Option<Label>> = vec![None; pairs.len()];
        for &(index, label) in pairs {
            let slot = labels.get_mut(index).ok_or_else(|| {
                KickerError::config(format!(
                    "label index {index} leaves a gap in a table of {} entries",
                    pairs.len()
                ))
            })?;
            if slot.replace(label).is_some() {
                return Err(KickerError::config(format!(
                    "label index {index} listed twice"
                )));
            }
        }
        let labels = labels.into_iter().flatten().collect();
        Self::new(labels)
    }

    /// Table marking `valid` indices as valid and every other index invalid.
    pub fn with_valid(len: usize, valid: &[usize]) -> KickerResult<Self> {
        if let Some(&index) = valid.iter().find(|&&index| index >= len) {
            return Err(KickerError::config(format!(
                "valid index {index} out of range for {len} templates"
            )));
        }
        let labels = (0..len)
            .map(|i| {
                if valid.contains(&i) {
                    Label::Valid
                } else {
                    Label::Invalid
                }
            })
            .collect();
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Label> {
        self.labels.get(index).copied()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Checks that the table covers exactly `template_count` indices.
    pub fn check_covers(&self, template_count: usize) -> KickerResult<()> {
        if self.labels.len() != template_count {
            return Err(KickerError::config(format!(
                "label table has {} entries for {template_count} templates",
                self.labels.len()
            )));
        }
        Ok(())
    }
}
