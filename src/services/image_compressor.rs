use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;

use crate::models::{CompressedImage, CompressionSettings};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to decode image data")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode compressed image: {0}")]
    Encode(String),
}

/// Downscale `bytes` to fit the configured bounds and re-encode as JPEG.
///
/// Images already inside the bounds keep their dimensions; this never
/// upscales. The caller is responsible for only passing data it believes to
/// be an image; anything that fails to decode comes back as
/// [`ImageError::Decode`].
pub fn compress(
    bytes: &[u8],
    file_name: &str,
    settings: &CompressionSettings,
) -> Result<CompressedImage, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(ImageError::Decode)?;

    let (width, height) = (decoded.width(), decoded.height());
    let (target_width, target_height) =
        calculate_dimensions(width, height, settings.max_width, settings.max_height);

    let resized = if (target_width, target_height) != (width, height) {
        decoded.resize_exact(target_width, target_height, FilterType::Triangle)
    } else {
        decoded
    };

    // JPEG carries no alpha channel.
    let rgb = resized.to_rgb8();

    let quality = (settings.quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(&rgb)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    if encoded.is_empty() {
        return Err(ImageError::Encode("encoder produced no output".to_string()));
    }

    let original_size = bytes.len() as u64;
    let compressed_size = encoded.len() as u64;
    let compression_ratio = if original_size == 0 {
        0.0
    } else {
        let raw = (original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    };

    Ok(CompressedImage {
        data_url: format!("data:image/jpeg;base64,{}", STANDARD.encode(&encoded)),
        file_name: file_name.to_string(),
        original_size,
        compressed_size,
        compression_ratio,
    })
}

/// Largest dimensions that fit inside `max_width` x `max_height` while
/// preserving aspect ratio. Returns the input unchanged when it already fits.
pub fn calculate_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    let width_ratio = max_width as f64 / width as f64;
    let height_ratio = max_height as f64 / height as f64;
    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        (width, height)
    } else {
        (
            (width as f64 * ratio).round() as u32,
            (height as f64 * ratio).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8])
        });
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encode");
        bytes
    }

    fn decode_data_url(data_url: &str) -> image::DynamicImage {
        let b64 = data_url
            .strip_prefix("data:image/jpeg;base64,")
            .expect("jpeg data url prefix");
        let bytes = STANDARD.decode(b64).expect("valid base64");
        image::load_from_memory(&bytes).expect("decodable jpeg payload")
    }

    #[test]
    fn dimensions_shrink_width_bound_case() {
        assert_eq!(calculate_dimensions(4000, 3000, 1200, 1200), (1200, 900));
    }

    #[test]
    fn dimensions_shrink_height_bound_case() {
        assert_eq!(calculate_dimensions(3000, 4000, 1200, 1200), (900, 1200));
    }

    #[test]
    fn dimensions_never_upscale() {
        assert_eq!(calculate_dimensions(800, 600, 1200, 1200), (800, 600));
        assert_eq!(calculate_dimensions(1200, 1200, 1200, 1200), (1200, 1200));
    }

    #[test]
    fn compress_downscales_past_the_bounds() {
        let bytes = png_bytes(400, 300);
        let settings = CompressionSettings {
            max_width: 120,
            max_height: 120,
            quality: 0.8,
        };

        let compressed = compress(&bytes, "site-visit.png", &settings).unwrap();
        let output = decode_data_url(&compressed.data_url);
        assert_eq!((output.width(), output.height()), (120, 90));
        assert_eq!(compressed.file_name, "site-visit.png");
        assert_eq!(compressed.original_size, bytes.len() as u64);
        assert!(compressed.compressed_size > 0);
    }

    #[test]
    fn compress_keeps_dimensions_of_small_images() {
        let bytes = png_bytes(100, 80);
        let compressed = compress(&bytes, "badge.png", &CompressionSettings::default()).unwrap();

        let output = decode_data_url(&compressed.data_url);
        assert_eq!((output.width(), output.height()), (100, 80));
    }

    #[test]
    fn compression_ratio_is_rounded_to_one_decimal() {
        let bytes = png_bytes(300, 200);
        let compressed = compress(&bytes, "yard.png", &CompressionSettings::default()).unwrap();

        let scaled = compressed.compression_ratio * 10.0;
        assert!(
            (scaled - scaled.round()).abs() < 1e-9,
            "ratio {} has more than one decimal",
            compressed.compression_ratio
        );

        let expected = ((compressed.original_size as f64 - compressed.compressed_size as f64)
            / compressed.original_size as f64
            * 1000.0)
            .round()
            / 10.0;
        assert!((compressed.compression_ratio - expected).abs() < 1e-9);
    }

    #[test]
    fn compress_rejects_undecodable_input() {
        let err = compress(b"definitely not pixels", "notes.txt", &CompressionSettings::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
