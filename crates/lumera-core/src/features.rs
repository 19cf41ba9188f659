//! Image statistics for the rule-based classifier.
//!
//! Brightness and variance come from a central crop that stands in for the
//! facial skin region (no face detector). Saturation is averaged over the
//! whole frame.

use image::RgbImage;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Central crop bounds as fractions of width/height: [0.3, 0.7).
const CROP_START: f64 = 0.3;
const CROP_END: f64 = 0.7;
const HSV_SHIFT: u32 = 12;

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("feature extraction failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("feature extraction failed: {width}x{height} image has an empty skin region")]
    EmptyRegion { width: u32, height: u32 },
}

/// Scalar statistics consumed by [`crate::rules::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageFeatures {
    /// Mean of all channel values in the crop (0–255).
    pub brightness: f64,
    /// Population variance of all channel values in the crop.
    pub variance: f64,
    /// Mean HSV saturation of the full image, 8-bit scale (0–255).
    pub saturation: f64,
}

impl ImageFeatures {
    /// Decode an image file and compute its features.
    pub fn extract(path: &Path) -> Result<Self, FeatureError> {
        let rgb = image::open(path)?.to_rgb8();
        Self::from_rgb(&rgb)
    }

    /// Compute features from an already decoded RGB image.
    pub fn from_rgb(rgb: &RgbImage) -> Result<Self, FeatureError> {
        let (width, height) = rgb.dimensions();
        let (x0, x1) = crop_range(width);
        let (y0, y1) = crop_range(height);

        if x0 >= x1 || y0 >= y1 {
            return Err(FeatureError::EmptyRegion { width, height });
        }

        // Two passes over the crop: mean, then squared deviations.
        let crop_values = || {
            (y0..y1).flat_map(move |y| {
                (x0..x1).flat_map(move |x| rgb.get_pixel(x, y).0)
            })
        };

        let count = ((x1 - x0) as u64 * (y1 - y0) as u64 * 3) as f64;
        let brightness = crop_values().map(f64::from).sum::<f64>() / count;
        let variance = crop_values()
            .map(|v| (f64::from(v) - brightness).powi(2))
            .sum::<f64>()
            / count;

        let pixels = f64::from(width) * f64::from(height);
        let saturation = rgb
            .pixels()
            .map(|p| f64::from(hsv_saturation(p.0)))
            .sum::<f64>()
            / pixels;

        Ok(Self {
            brightness,
            variance,
            saturation,
        })
    }
}

/// Pixel index range [floor(len*0.3), floor(len*0.7)).
fn crop_range(len: u32) -> (u32, u32) {
    let len = f64::from(len);
    ((len * CROP_START) as u32, (len * CROP_END) as u32)
}

/// HSV saturation on the 8-bit scale, 255 * (max - min) / max.
///
/// Uses the same 12-bit fixed-point reciprocal as OpenCV's `RGB2HSV` so
/// ties such as 127.5 land on the same integer.
pub fn hsv_saturation([r, g, b]: [u8; 3]) -> u8 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        return 0;
    }
    let reciprocal = (f64::from(255u32 << HSV_SHIFT) / f64::from(max)).round() as u32;
    ((u32::from(max - min) * reciprocal + (1 << (HSV_SHIFT - 1))) >> HSV_SHIFT) as u8
}
