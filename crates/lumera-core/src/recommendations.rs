//! Static skincare advice per skin type.

use crate::types::SkinType;
use std::str::FromStr;

/// Number of entries returned alongside an analysis.
pub const RECOMMENDATIONS_PER_RESULT: usize = 2;

const NORMAL: &[&str] = &[
    "Maintain your routine with a gentle cleanser twice daily",
    "Use a lightweight moisturizer with SPF 30+ during the day",
    "Incorporate antioxidant serums like Vitamin C for protection",
];

const OILY: &[&str] = &[
    "Use oil-free, non-comedogenic products to prevent clogged pores",
    "Try salicylic acid cleansers to control excess sebum production",
    "Apply a mattifying moisturizer and use blotting papers throughout the day",
    "Consider niacinamide serums to regulate oil production",
];

const DRY: &[&str] = &[
    "Use a rich, hydrating moisturizer with hyaluronic acid or ceramides",
    "Avoid harsh soaps and hot water that strip natural oils",
    "Apply a nourishing night cream before bed",
    "Use a gentle, creamy cleanser instead of foaming formulas",
];

const COMBINATION: &[&str] = &[
    "Use different products for T-zone and cheek areas if needed",
    "Balance with a pH-balanced cleanser suitable for all areas",
    "Try lightweight gel moisturizers that won't clog pores",
    "Use targeted treatments: mattifying for oily areas, hydrating for dry patches",
];

const SENSITIVE: &[&str] = &[
    "Choose fragrance-free, hypoallergenic products designed for sensitive skin",
    "Patch test all new products before full application",
    "Avoid harsh exfoliants and use gentle, soothing ingredients like aloe vera",
    "Look for products with centella asiatica or colloidal oatmeal to calm irritation",
];

/// Full advice list for a skin type.
pub fn all_for(skin_type: SkinType) -> &'static [&'static str] {
    match skin_type {
        SkinType::Normal => NORMAL,
        SkinType::Oily => OILY,
        SkinType::Dry => DRY,
        SkinType::Combination => COMBINATION,
        SkinType::Sensitive => SENSITIVE,
    }
}

/// The leading entries returned with an analysis result.
pub fn top_for(skin_type: SkinType) -> Vec<String> {
    all_for(skin_type)
        .iter()
        .take(RECOMMENDATIONS_PER_RESULT)
        .map(|s| s.to_string())
        .collect()
}

/// Lookup by free-form label. Unknown labels get the `Normal` advice.
pub fn for_label(label: &str) -> Vec<String> {
    let skin_type = SkinType::from_str(label).unwrap_or_else(|_| {
        tracing::debug!(label, "unknown skin type label, using Normal recommendations");
        SkinType::Normal
    });
    top_for(skin_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_three_or_four_entries() {
        for t in SkinType::ALL {
            let n = all_for(t).len();
            assert!((3..=4).contains(&n), "{t} has {n} entries");
        }
    }

    #[test]
    fn test_top_is_prefix_of_full_list() {
        for t in SkinType::ALL {
            let top = top_for(t);
            assert_eq!(top.len(), RECOMMENDATIONS_PER_RESULT);
            assert_eq!(top[0], all_for(t)[0]);
            assert_eq!(top[1], all_for(t)[1]);
        }
    }

    #[test]
    fn test_dry_content() {
        assert_eq!(
            top_for(SkinType::Dry),
            vec![
                "Use a rich, hydrating moisturizer with hyaluronic acid or ceramides",
                "Avoid harsh soaps and hot water that strip natural oils",
            ]
        );
    }

    #[test]
    fn test_unknown_label_falls_back_to_normal() {
        assert_eq!(for_label("acne-prone"), top_for(SkinType::Normal));
        assert_eq!(for_label("sensitive"), top_for(SkinType::Sensitive));
    }
}
