//! Rule-based skin type classification over [`ImageFeatures`].
//!
//! Used whenever no trained classifier is loaded. The thresholds are
//! empirical and unvalidated; they are kept exactly so that results stay
//! comparable with earlier deployments.

use crate::features::ImageFeatures;
use crate::types::{round2, SkinType};

// --- Thresholds (first match wins, in this order) ---
const OILY_VARIANCE: f64 = 1500.0;
const DRY_BRIGHTNESS: f64 = 100.0;
const SENSITIVE_SATURATION: f64 = 100.0;
const COMBINATION_VARIANCE: f64 = 800.0;
const COMBINATION_BRIGHTNESS: f64 = 120.0;

// --- Confidence ceilings (percent) ---
pub const OILY_MAX: f64 = 95.0;
pub const DRY_MAX: f64 = 93.0;
pub const SENSITIVE_MAX: f64 = 92.0;
pub const COMBINATION_MAX: f64 = 94.0;
pub const NORMAL_MAX: f64 = 96.0;

/// Classify features into a skin type and a confidence percentage
/// rounded to two decimals.
pub fn classify(features: &ImageFeatures) -> (SkinType, f64) {
    let ImageFeatures {
        brightness,
        variance,
        saturation,
    } = *features;

    let (skin_type, confidence) = if variance > OILY_VARIANCE {
        (
            SkinType::Oily,
            (75.0 + (variance - OILY_VARIANCE) / 50.0).min(OILY_MAX),
        )
    } else if brightness < DRY_BRIGHTNESS {
        (
            SkinType::Dry,
            (70.0 + (DRY_BRIGHTNESS - brightness) / 2.0).min(DRY_MAX),
        )
    } else if saturation > SENSITIVE_SATURATION {
        (
            SkinType::Sensitive,
            (72.0 + (saturation - SENSITIVE_SATURATION) / 3.0).min(SENSITIVE_MAX),
        )
    } else if variance > COMBINATION_VARIANCE && brightness > COMBINATION_BRIGHTNESS {
        (
            SkinType::Combination,
            (78.0 + variance / 100.0).min(COMBINATION_MAX),
        )
    } else {
        (SkinType::Normal, (80.0 + brightness / 10.0).min(NORMAL_MAX))
    };

    (skin_type, round2(confidence))
}

/// Confidence range [floor, ceiling] each rule can produce.
///
/// A heuristic result always falls inside the envelope of its skin type.
pub fn confidence_envelope(skin_type: SkinType) -> (f64, f64) {
    match skin_type {
        SkinType::Oily => (75.0, OILY_MAX),
        SkinType::Dry => (70.0, DRY_MAX),
        SkinType::Sensitive => (72.0, SENSITIVE_MAX),
        SkinType::Combination => (78.0, COMBINATION_MAX),
        SkinType::Normal => (80.0, NORMAL_MAX),
    }
}
