//! Label contract between a trained artifact and inference.
//!
//! The classifier's output vector is positional, so the artifact ships a
//! JSON sidecar naming the class at each index. Two shapes are accepted:
//!
//! ```text
//! {"version": 1, "labels": ["Normal", "Oily", "Dry", "Combination", "Sensitive"], "layout": "nhwc"}
//! {"combination": 0, "dry": 1, "normal": 2, "oily": 3, "sensitive": 4}
//! ```
//!
//! The second is the `class_indices.json` written by the Keras training
//! script. Both are validated before a model is accepted.

use crate::types::{SkinType, UnknownSkinType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub const MANIFEST_VERSION: u32 = 1;
pub const DEFAULT_INPUT_SIZE: u32 = 224;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("cannot read label manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed label manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported label manifest version {0} (expected 1)")]
    UnsupportedVersion(u32),
    #[error("expected {expected} labels, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error(transparent)]
    Unknown(#[from] UnknownSkinType),
    #[error("label {0} appears more than once")]
    Duplicate(SkinType),
    #[error("class indices must run from 0 without gaps or repeats (position {0})")]
    BadIndex(usize),
    #[error("input size must be positive")]
    ZeroInputSize,
}

/// Memory layout of the input tensor the artifact expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, H, W, 3]`, the Keras default.
    #[default]
    Nhwc,
    /// `[1, 3, H, W]`.
    Nchw,
}

#[derive(Deserialize)]
struct Manifest {
    version: u32,
    labels: Vec<String>,
    #[serde(default)]
    layout: TensorLayout,
    #[serde(default = "default_input_size")]
    input_size: u32,
}

fn default_input_size() -> u32 {
    DEFAULT_INPUT_SIZE
}

/// Validated class order plus input geometry for a trained artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSet {
    labels: Vec<SkinType>,
    layout: TensorLayout,
    input_size: u32,
}

impl Default for LabelSet {
    /// The v1 contract: canonical order, NHWC, 224×224.
    fn default() -> Self {
        Self {
            labels: SkinType::ALL.to_vec(),
            layout: TensorLayout::Nhwc,
            input_size: DEFAULT_INPUT_SIZE,
        }
    }
}

impl LabelSet {
    /// Read and validate a sidecar file.
    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate either accepted sidecar shape.
    pub fn from_json(raw: &str) -> Result<Self, LabelError> {
        // A `version` key marks the manifest shape; anything else is read as
        // class indices.
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if value.get("version").is_some() {
            Self::from_manifest(serde_json::from_value(value)?)
        } else {
            Self::from_class_indices(serde_json::from_value(value)?)
        }
    }

    fn from_manifest(manifest: Manifest) -> Result<Self, LabelError> {
        if manifest.version != MANIFEST_VERSION {
            return Err(LabelError::UnsupportedVersion(manifest.version));
        }
        if manifest.input_size == 0 {
            return Err(LabelError::ZeroInputSize);
        }
        let labels = manifest
            .labels
            .iter()
            .map(|l| l.parse::<SkinType>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::validated(labels, manifest.layout, manifest.input_size)
    }

    fn from_class_indices(indices: BTreeMap<String, usize>) -> Result<Self, LabelError> {
        let mut entries: Vec<(usize, &String)> =
            indices.iter().map(|(name, &idx)| (idx, name)).collect();
        entries.sort();
        if let Some(pos) = entries.iter().enumerate().position(|(pos, (idx, _))| pos != *idx) {
            return Err(LabelError::BadIndex(pos));
        }
        let labels = entries
            .iter()
            .map(|(_, name)| name.parse::<SkinType>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::validated(labels, TensorLayout::default(), DEFAULT_INPUT_SIZE)
    }

    fn validated(
        labels: Vec<SkinType>,
        layout: TensorLayout,
        input_size: u32,
    ) -> Result<Self, LabelError> {
        if labels.len() != SkinType::ALL.len() {
            return Err(LabelError::WrongCount {
                expected: SkinType::ALL.len(),
                actual: labels.len(),
            });
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(LabelError::Duplicate(*label));
            }
        }
        Ok(Self {
            labels,
            layout,
            input_size,
        })
    }

    /// Skin type at a given output index.
    pub fn get(&self, index: usize) -> Option<SkinType> {
        self.labels.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[SkinType] {
        &self.labels
    }

    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }
}
