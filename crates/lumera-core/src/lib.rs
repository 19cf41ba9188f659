//! lumera-core — Skin type analysis engine.
//!
//! Classifies a photo into one of five skin types, either with a trained
//! ONNX classifier or, when no artifact is available, with rule-based
//! thresholds over simple image statistics.

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod features;
pub mod labels;
pub mod recommendations;
pub mod rules;
pub mod types;

pub use analyzer::{AnalyzeError, AnalyzerStatus, LazyAnalyzer, SkinAnalyzer, Strategy};
pub use classifier::{OnnxPredictor, Predictor, SkinClassifier};
pub use config::{default_model_dir, AnalyzerConfig};
pub use features::ImageFeatures;
pub use labels::{LabelSet, TensorLayout};
pub use types::{AnalysisResult, SkinType};
