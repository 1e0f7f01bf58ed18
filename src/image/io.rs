//! Loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Color sources are reduced
//! to luminance; 16-bit sources keep their precision through `to_luma16`.

use crate::image::Image;
use crate::util::{KickerError, KickerResult};
use std::path::Path;

/// Converts a decoded image of any format into a normalized grayscale image.
pub fn image_from_dynamic(img: &image::DynamicImage) -> KickerResult<Image> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img.color().bytes_per_pixel() / img.color().channel_count().max(1) {
        1 => {
            let gray = img.to_luma8();
            Image::from_u8(gray.as_raw(), width, height, u8::MAX)
        }
        _ => {
            let gray = img.to_luma16();
            Image::from_u16(gray.as_raw(), width, height, u16::MAX)
        }
    }
}

/// Decodes an in-memory encoded image (PNG, JPEG, PNM, ...).
pub fn decode_image_bytes(bytes: &[u8]) -> KickerResult<Image> {
    let img = image::load_from_memory(bytes).map_err(|err| KickerError::decode(err.to_string()))?;
    image_from_dynamic(&img)
}

/// Loads an image from disk and converts it to a normalized grayscale image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> KickerResult<Image> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| match err {
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            KickerError::ImageNotFound {
                id: path.display().to_string(),
            }
        }
        image::ImageError::IoError(io) => KickerError::ImageIo {
            reason: io.to_string(),
        },
        other => KickerError::decode(other.to_string()),
    })?;
    image_from_dynamic(&img)
}

#[cfg(test)]
mod tests {
    use super::{image_from_dynamic, load_gray_image};
    use crate::util::KickerError;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

    #[test]
    fn luma8_is_normalized() {
        let gray = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let img = image_from_dynamic(&DynamicImage::ImageLuma8(gray)).unwrap();
        assert_eq!(img.data(), &[0.0, 1.0]);
    }

    #[test]
    fn luma16_keeps_precision() {
        let gray: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(2, 1, vec![0u16, 257]).unwrap();
        let img = image_from_dynamic(&DynamicImage::ImageLuma16(gray)).unwrap();
        assert!((img.data()[1] - 257.0 / 65535.0).abs() < 1e-7);
    }

    #[test]
    fn load_gray_image_reads_png_from_disk() {
        let dir = std::env::temp_dir().join(format!("kickercheck_io_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frame.png");
        GrayImage::from_raw(2, 2, vec![0, 51, 204, 255])
            .unwrap()
            .save(&path)
            .unwrap();

        let img = load_gray_image(&path).unwrap();
        assert_eq!(img.dims(), (2, 2));
        assert!((img.data()[1] - 0.2).abs() < 1e-6);
        assert_eq!(img.data()[3], 1.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_gray_image_reports_missing_file() {
        let path = std::env::temp_dir().join("kickercheck_io_missing/none.png");
        assert!(matches!(
            load_gray_image(&path),
            Err(KickerError::ImageNotFound { .. })
        ));
    }
}
