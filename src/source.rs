//! Image and template sources.
//!
//! Sources hand the pipeline fully decoded grids; decoding, storage layout and
//! identifier schemes stay on this side of the boundary.

use crate::image::{pgm, Image};
use crate::template::{Template, TemplateSet};
use crate::util::{KickerError, KickerResult};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Supplies a normalized grayscale image for an identifier.
pub trait ImageSource {
    /// Fails with `ImageNotFound` when `id` has no backing data and with
    /// `ImageDecode` when the data is truncated or malformed.
    fn get(&self, id: &str) -> KickerResult<Image>;
}

/// Loads an ordered template set.
pub trait TemplateSource {
    /// Loads `ids` in the given order; each template is named after its id.
    fn load<I: AsRef<str>>(&self, ids: &[I]) -> KickerResult<TemplateSet>;
}

impl<S: ImageSource + ?Sized> TemplateSource for S {
    fn load<I: AsRef<str>>(&self, ids: &[I]) -> KickerResult<TemplateSet> {
        let mut templates = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            templates.push(Template::new(id, self.get(id)?));
        }
        TemplateSet::new(templates)
    }
}

/// Decodes encoded bytes: binary PGM natively, other formats via `image-io`.
pub fn decode_bytes(bytes: &[u8]) -> KickerResult<Image> {
    if bytes.starts_with(b"P5") {
        return pgm::decode(bytes);
    }
    #[cfg(feature = "image-io")]
    {
        crate::image::io::decode_image_bytes(bytes)
    }
    #[cfg(not(feature = "image-io"))]
    {
        Err(KickerError::decode(
            "unsupported format (only binary PGM without the image-io feature)",
        ))
    }
}

/// Reads identifiers as paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved path of `id`.
    pub fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

impl ImageSource for DirSource {
    fn get(&self, id: &str) -> KickerResult<Image> {
        let bytes = std::fs::read(self.path_of(id)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => KickerError::ImageNotFound { id: id.to_owned() },
            _ => KickerError::ImageIo {
                reason: format!("{id}: {err}"),
            },
        })?;
        decode_bytes(&bytes)
    }
}

/// In-memory images keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    images: HashMap<String, Image>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, image: Image) -> Option<Image> {
        self.images.insert(id.into(), image)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Image)> for MemorySource {
    fn from_iter<T: IntoIterator<Item = (K, Image)>>(iter: T) -> Self {
        Self {
            images: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl ImageSource for MemorySource {
    fn get(&self, id: &str) -> KickerResult<Image> {
        self.images
            .get(id)
            .cloned()
            .ok_or_else(|| KickerError::ImageNotFound { id: id.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_bytes, ImageSource, MemorySource, TemplateSource};
    use crate::image::Image;
    use crate::util::KickerError;

    #[test]
    fn memory_source_reports_missing_ids() {
        let source: MemorySource = [("a", Image::new(vec![0.5], 1, 1).unwrap())]
            .into_iter()
            .collect();
        assert!(source.get("a").is_ok());
        assert_eq!(
            source.get("b").unwrap_err(),
            KickerError::ImageNotFound { id: "b".into() }
        );
    }

    #[test]
    fn template_source_keeps_caller_order() {
        let source: MemorySource = [
            ("x", Image::new(vec![0.0], 1, 1).unwrap()),
            ("y", Image::new(vec![1.0], 1, 1).unwrap()),
        ]
        .into_iter()
        .collect();
        let set = source.load(&["y", "x"]).unwrap();
        assert_eq!(set.get(0).unwrap().name(), "y");
        assert_eq!(set.get(1).unwrap().name(), "x");
        assert!(source.load(&["y", "z"]).is_err());
    }

    #[test]
    fn decode_bytes_rejects_garbage() {
        assert!(matches!(
            decode_bytes(b"not an image").unwrap_err(),
            KickerError::ImageDecode { .. }
        ));
    }
}
