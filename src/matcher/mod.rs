//! Nearest-neighbor comparison of a region against the template set.
//!
//! Distances are L1 sums over the canonical sample domain. The template with
//! the smallest distance wins and ties go to the lowest index.

use crate::kernel::{DefaultKernel, Kernel};
use crate::template::TemplateSet;
use crate::trace::trace_event;
use crate::util::{KickerError, KickerResult};
use crate::ImageView;
use std::cmp::Ordering;

/// Best template and the distance to every template, in set order.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// Index of the closest template.
    pub best_index: usize,
    /// L1 distance to the closest template.
    pub best_distance: f32,
    /// L1 distance to each template, indexed like the template set.
    pub distances: Vec<f32>,
}

impl MatchResult {
    /// Picks the lowest-index minimum of `distances`; NaN loses to any number.
    pub fn from_distances(distances: Vec<f32>) -> Option<Self> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &distance) in distances.iter().enumerate() {
            match best {
                Some((_, best_distance)) if distance.total_cmp(&best_distance) != Ordering::Less => {}
                _ => best = Some((idx, distance)),
            }
        }
        let (best_index, best_distance) = best?;
        Some(Self {
            best_index,
            best_distance,
            distances,
        })
    }
}

/// Fails with `DimensionMismatch` unless `roi` has the shape of every template.
pub fn check_shapes(roi: ImageView<'_, f32>, templates: &TemplateSet) -> KickerResult<()> {
    let (width, height) = roi.dims();
    for tpl in templates {
        let (expected_width, expected_height) = tpl.dims();
        if (width, height) != (expected_width, expected_height) {
            return Err(KickerError::DimensionMismatch {
                expected_width,
                expected_height,
                width,
                height,
                context: "template match",
            });
        }
    }
    Ok(())
}

/// Matches `roi` against `templates` with the default kernel.
pub fn match_templates(
    roi: ImageView<'_, f32>,
    templates: &TemplateSet,
) -> KickerResult<MatchResult> {
    match_templates_with::<DefaultKernel>(roi, templates)
}

/// Matches `roi` against `templates` with an explicit kernel.
///
/// Every shape is checked before any distance is computed.
pub fn match_templates_with<K: Kernel>(
    roi: ImageView<'_, f32>,
    templates: &TemplateSet,
) -> KickerResult<MatchResult> {
    check_shapes(roi, templates)?;
    let distances: Vec<f32> = templates.iter().map(|tpl| K::l1(roi, tpl.view())).collect();
    let result = MatchResult::from_distances(distances)
        .ok_or_else(|| KickerError::config("template set is empty"))?;
    trace_event!(
        "best_match",
        index = result.best_index,
        distance = result.best_distance
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::{match_templates, MatchResult};
    use crate::image::Image;
    use crate::template::{Template, TemplateSet};
    use crate::util::KickerError;

    fn set(grids: &[&[f32]], width: usize, height: usize) -> TemplateSet {
        let templates = grids
            .iter()
            .enumerate()
            .map(|(i, g)| Template::new(format!("t{i}"), Image::new(g.to_vec(), width, height).unwrap()))
            .collect();
        TemplateSet::new(templates).unwrap()
    }

    #[test]
    fn identical_template_wins_with_zero_distance() {
        let templates = set(&[&[1.0, 1.0], &[0.0, 1.0], &[0.0, 0.5]], 2, 1);
        let roi = Image::new(vec![0.0, 0.5], 2, 1).unwrap();
        let result = match_templates(roi.view(), &templates).unwrap();
        assert_eq!(result.best_index, 2);
        assert_eq!(result.best_distance, 0.0);
        assert_eq!(result.distances, vec![1.5, 0.5, 0.0]);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let templates = set(&[&[1.0, 0.0], &[0.0, 1.0], &[0.5, 0.5]], 2, 1);
        let roi = Image::new(vec![0.5, 0.5], 2, 1).unwrap();
        let result = match_templates(roi.view(), &templates).unwrap();
        assert_eq!(result.distances[0], result.distances[1]);
        assert_eq!(result.best_index, 2);

        let roi = Image::new(vec![0.5, 0.0], 2, 1).unwrap();
        let result = match_templates(roi.view(), &templates).unwrap();
        assert_eq!(result.distances, vec![0.5, 1.5, 0.5]);
        assert_eq!(result.best_index, 0);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let templates = set(&[&[0.0; 4]], 2, 2);
        let roi = Image::new(vec![0.0; 4], 4, 1).unwrap();
        assert_eq!(
            match_templates(roi.view(), &templates).unwrap_err(),
            KickerError::DimensionMismatch {
                expected_width: 2,
                expected_height: 2,
                width: 4,
                height: 1,
                context: "template match",
            }
        );
    }

    #[test]
    fn from_distances_handles_empty() {
        assert!(MatchResult::from_distances(Vec::new()).is_none());
    }
}
