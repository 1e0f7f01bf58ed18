//! Reference templates and the ordered, shared template set.
//!
//! Match results are addressed by template index, so the order in which the
//! set is built is part of its meaning. A set is immutable once built and is
//! shared between classifications through an `Arc`; replacing templates means
//! building a new set.

use crate::binarize::{binarize, check_threshold};
use crate::image::{Image, ImageView};
use crate::util::{KickerError, KickerResult};
use std::sync::Arc;

/// Named reference region with fixed dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    name: String,
    img: Image,
}

impl Template {
    /// Creates a template from a normalized image.
    pub fn new(name: impl Into<String>, img: Image) -> Self {
        Self {
            name: name.into(),
            img,
        }
    }

    /// Creates a template from 8-bit samples with maxval 255.
    pub fn from_u8(
        name: impl Into<String>,
        data: &[u8],
        width: usize,
        height: usize,
    ) -> KickerResult<Self> {
        Ok(Self::new(name, Image::from_u8(data, width, height, u8::MAX)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &Image {
        &self.img
    }

    /// Returns a borrowed view of the template samples.
    pub fn view(&self) -> ImageView<'_, f32> {
        self.img.view()
    }

    pub fn dims(&self) -> (usize, usize) {
        self.img.dims()
    }
}

/// Ordered, non-empty set of equally sized templates.
///
/// Cloning is cheap and shares the underlying templates.
#[derive(Clone, Debug)]
pub struct TemplateSet {
    templates: Arc<[Template]>,
}

impl TemplateSet {
    /// Builds a set, keeping the given order.
    ///
    /// Fails with `Configuration` when empty and with `DimensionMismatch` when
    /// templates differ in shape.
    pub fn new(templates: Vec<Template>) -> KickerResult<Self> {
        let first = templates
            .first()
            .ok_or_else(|| KickerError::config("template set is empty"))?;
        let (expected_width, expected_height) = first.dims();
        for tpl in &templates[1..] {
            let (width, height) = tpl.dims();
            if (width, height) != (expected_width, expected_height) {
                return Err(KickerError::DimensionMismatch {
                    expected_width,
                    expected_height,
                    width,
                    height,
                    context: "template set",
                });
            }
        }
        Ok(Self {
            templates: templates.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Shared `(width, height)` of every template.
    pub fn dims(&self) -> (usize, usize) {
        self.templates[0].dims()
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    pub fn as_slice(&self) -> &[Template] {
        &self.templates
    }

    /// Returns a new set with every template thresholded into `{0.0, 1.0}`.
    pub fn binarized(&self, threshold: f32) -> KickerResult<Self> {
        check_threshold(threshold)?;
        let mut out = Vec::with_capacity(self.len());
        for tpl in self.iter() {
            let samples = binarize(tpl.image(), threshold)?.to_samples()?;
            out.push(Template::new(tpl.name(), samples));
        }
        Self::new(out)
    }
}

impl<'a> IntoIterator for &'a TemplateSet {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
