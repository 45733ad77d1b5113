//! Image preprocessing for bulge detection model inference.
//!
//! This module turns raw uploaded image bytes into the fixed-shape float
//! tensor the model was trained on: decode, convert to RGB, resize to
//! 224x224, scale each channel byte into [0, 1].

use image::imageops::FilterType;

use crate::error::PipelineError;

/// Model input height in pixels
pub const INPUT_HEIGHT: u32 = 224;
/// Model input width in pixels
pub const INPUT_WIDTH: u32 = 224;
/// Model input channels (RGB)
pub const INPUT_CHANNELS: u32 = 3;

/// Total number of f32 values in one normalized image
pub const TENSOR_ELEMENTS: usize =
    (INPUT_HEIGHT * INPUT_WIDTH * INPUT_CHANNELS) as usize;

/// Resampling filter used for the resize step.
///
/// Fixed so that identical input bytes always produce a bit-identical tensor
/// on the same platform.
const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Fixed-shape normalized image tensor (224x224x3, row-major HWC).
///
/// Values are in [0, 1]; the buffer is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Vec<f32>,
}

impl NormalizedTensor {
    /// Wrap a raw buffer, checking that it holds exactly one image.
    pub fn from_vec(data: Vec<f32>) -> Result<Self, PipelineError> {
        if data.len() != TENSOR_ELEMENTS {
            return Err(PipelineError::Internal(format!(
                "tensor buffer has {} values, expected {}",
                data.len(),
                TENSOR_ELEMENTS
            )));
        }
        Ok(Self { data })
    }

    /// Borrow the underlying buffer
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Number of f32 values in the tensor
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Preprocessor that transforms encoded image bytes into model input.
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Create a new image preprocessor.
    pub fn new() -> Self {
        Self
    }

    /// Decode, resize and normalize one image.
    ///
    /// Any decodable mode (grayscale, RGBA, palette) is converted to
    /// 3-channel RGB; alpha and palette information is discarded. Bytes that
    /// are not a supported image encoding fail with a decode error.
    pub fn prepare(&self, image_bytes: &[u8]) -> Result<NormalizedTensor, PipelineError> {
        let rgb = image::load_from_memory(image_bytes)?.to_rgb8();

        let resized = image::imageops::resize(&rgb, INPUT_WIDTH, INPUT_HEIGHT, RESIZE_FILTER);

        let mut data = Vec::with_capacity(TENSOR_ELEMENTS);
        for value in resized.into_raw() {
            data.push(value as f32 / 255.0);
        }

        NormalizedTensor::from_vec(data)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode png");
        buf.into_inner()
    }

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_prepare_shape_and_range() {
        let bytes = png_bytes(gradient_image(64, 48));
        let tensor = ImagePreprocessor::new().prepare(&bytes).unwrap();

        assert_eq!(tensor.len(), TENSOR_ELEMENTS);
        assert!(tensor.data().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let bytes = png_bytes(gradient_image(100, 80));
        let preprocessor = ImagePreprocessor::new();

        let first = preprocessor.prepare(&bytes).unwrap();
        let second = preprocessor.prepare(&bytes).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_white_image_normalizes_to_ones() {
        let white = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let bytes = png_bytes(DynamicImage::ImageRgb8(white));

        let tensor = ImagePreprocessor::new().prepare(&bytes).unwrap();
        assert!(tensor.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_rgba_and_grayscale_convert_to_rgb() {
        let rgba = RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 128]));
        let tensor = ImagePreprocessor::new()
            .prepare(&png_bytes(DynamicImage::ImageRgba8(rgba)))
            .unwrap();
        assert_eq!(tensor.len(), TENSOR_ELEMENTS);

        let gray = image::GrayImage::from_pixel(20, 20, image::Luma([77]));
        let tensor = ImagePreprocessor::new()
            .prepare(&png_bytes(DynamicImage::ImageLuma8(gray)))
            .unwrap();
        assert_eq!(tensor.len(), TENSOR_ELEMENTS);
        // Gray replicates into all three channels
        assert!(tensor.data().iter().all(|&v| (v - 77.0 / 255.0).abs() < 1e-6));
    }

    #[test]
    fn test_non_image_bytes_fail_to_decode() {
        let result = ImagePreprocessor::new().prepare(b"definitely not an image");
        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_truncated_image_fails_to_decode() {
        let bytes = png_bytes(gradient_image(32, 32));
        let result = ImagePreprocessor::new().prepare(&bytes[..bytes.len() / 2]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_vec_rejects_wrong_size() {
        assert!(NormalizedTensor::from_vec(vec![0.5; 10]).is_err());
        assert!(NormalizedTensor::from_vec(vec![0.5; TENSOR_ELEMENTS]).is_ok());
    }
}
