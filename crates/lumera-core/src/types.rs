use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Skin type predicted by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinType {
    Normal,
    Oily,
    Dry,
    Combination,
    Sensitive,
}

impl SkinType {
    /// Class order the bundled training script produces (v1 label contract).
    pub const ALL: [SkinType; 5] = [
        SkinType::Normal,
        SkinType::Oily,
        SkinType::Dry,
        SkinType::Combination,
        SkinType::Sensitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Normal => "Normal",
            SkinType::Oily => "Oily",
            SkinType::Dry => "Dry",
            SkinType::Combination => "Combination",
            SkinType::Sensitive => "Sensitive",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown skin type: {0:?}")]
pub struct UnknownSkinType(pub String);

impl FromStr for SkinType {
    type Err = UnknownSkinType;

    /// Case-insensitive: training directories are lowercase ("oily"),
    /// API payloads are capitalized ("Oily").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkinType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSkinType(s.to_string()))
    }
}

/// Outcome of a single analysis. Persisting it is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub skin_type: SkinType,
    /// Percent in [0, 100], rounded to two decimals.
    pub confidence: f64,
    /// At most two entries, in the order of the static recommendation list.
    pub recommendations: Vec<String>,
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("oily".parse::<SkinType>().unwrap(), SkinType::Oily);
        assert_eq!("Combination".parse::<SkinType>().unwrap(), SkinType::Combination);
        assert_eq!(" SENSITIVE ".parse::<SkinType>().unwrap(), SkinType::Sensitive);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "acne".parse::<SkinType>().unwrap_err();
        assert_eq!(err, UnknownSkinType("acne".into()));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for t in SkinType::ALL {
            assert_eq!(t.to_string().parse::<SkinType>().unwrap(), t);
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(89.444_444), 89.44);
        assert_eq!(round2(93.0), 93.0);
        assert_eq!(round2(87.005_1), 87.01);
    }

    #[test]
    fn test_result_json_shape() {
        let result = AnalysisResult {
            skin_type: SkinType::Dry,
            confidence: 93.0,
            recommendations: vec!["a".into(), "b".into()],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["skin_type"], "Dry");
        assert_eq!(json["confidence"], 93.0);
        assert_eq!(json["recommendations"][1], "b");
    }
}
