use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Longest side, in pixels, handed to the OCR engine.
pub const MAX_DIMENSION: u32 = 2800;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …) and return PNG bytes ready for OCR.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(enhance(img))
}

/// Downscale, grayscale, put dark ink on a light background, stretch contrast.
fn enhance(img: DynamicImage) -> DynamicImage {
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let mut gray = img.to_luma8();
    // Chalkboard / dark-paper photos: engines expect dark glyphs on light.
    if mean_luma(&gray) < 128 {
        image::imageops::invert(&mut gray);
    }

    DynamicImage::ImageLuma8(stretch_contrast(gray))
}

fn mean_luma(gray: &GrayImage) -> u64 {
    let count = u64::from(gray.width()) * u64::from(gray.height());
    if count == 0 {
        return 255;
    }
    gray.pixels().map(|p| u64::from(p[0])).sum::<u64>() / count
}

fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        return gray;
    }

    let range = u32::from(max_px - min_px);
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([(u32::from(p - min_px) * 255 / range) as u8])
    })
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |_, _| Luma([value])))
    }

    /// Light page with a dark vertical stroke in the middle column.
    fn stroke_on(background: u8, ink: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(9, 9, |x, _| {
            Luma([if x == 4 { ink } else { background }])
        }))
    }

    #[test]
    fn uniform_image_passes_through() {
        let result = enhance(solid_gray(10, 10, 200));
        assert_eq!(result.width(), 10);
        assert_eq!(result.height(), 10);
        assert!(result.to_luma8().pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn dark_ink_on_light_paper_is_not_inverted() {
        let gray = enhance(stroke_on(180, 40)).to_luma8();
        assert_eq!(gray.get_pixel(4, 0)[0], 0);
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn chalkboard_is_inverted_to_dark_ink() {
        let gray = enhance(stroke_on(30, 220)).to_luma8();
        // The chalk stroke becomes the darkest pixel.
        assert_eq!(gray.get_pixel(4, 0)[0], 0);
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn large_image_is_resized() {
        let result = enhance(solid_gray(3000, 1500, 200));
        assert!(result.width() <= MAX_DIMENSION && result.height() <= MAX_DIMENSION);
    }

    #[test]
    fn prepare_from_bytes_produces_png_header() {
        let mut jpeg = Vec::new();
        stroke_on(200, 20)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();
        let result = prepare_for_ocr_from_bytes(&jpeg).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        assert!(matches!(
            prepare_for_ocr_from_bytes(b"definitely not an image"),
            Err(PreprocessError::Load(_))
        ));
    }
}
