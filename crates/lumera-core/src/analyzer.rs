//! Analysis orchestration: trained model when available, rules otherwise.
//!
//! The strategy is chosen once, when the analyzer is built. A request that
//! fails on the model path fails outright; it never retries on the rules.

use crate::classifier::{ClassifierError, SkinClassifier};
use crate::config::AnalyzerConfig;
use crate::features::{FeatureError, ImageFeatures};
use crate::types::{AnalysisResult, SkinType};
use crate::{recommendations, rules};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("analysis failed: {0}")]
    Features(#[from] FeatureError),
    #[error("analysis failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// How an analyzer turns an image into a skin type.
pub enum Strategy {
    /// Trained classifier inference.
    Model(SkinClassifier),
    /// Rule-based classification over image statistics.
    Heuristic,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Model(_) => "model",
            Strategy::Heuristic => "heuristic",
        }
    }
}

/// Snapshot of what an analyzer loaded, for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerStatus {
    pub strategy: &'static str,
    pub model_path: Option<PathBuf>,
    pub labels: Option<Vec<SkinType>>,
}

/// Skin analyzer. Build one at startup and share it by reference.
pub struct SkinAnalyzer {
    strategy: Strategy,
    model_path: Option<PathBuf>,
}

impl SkinAnalyzer {
    /// Load the trained model if present, otherwise fall back to rules.
    ///
    /// Never fails: a missing artifact is logged at info, a broken one at
    /// warn, and both select [`Strategy::Heuristic`].
    pub fn load(config: &AnalyzerConfig) -> Self {
        let model_path = config.model_path();

        if !model_path.exists() {
            tracing::info!(
                path = %model_path.display(),
                "model file not found; using feature-based analysis"
            );
            return Self::heuristic();
        }

        match SkinClassifier::load(&model_path, config.intra_threads) {
            Ok(classifier) => {
                tracing::info!(path = %model_path.display(), "skin type model ready");
                Self {
                    strategy: Strategy::Model(classifier),
                    model_path: Some(model_path),
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %model_path.display(),
                    error = %e,
                    "failed to load model; using feature-based analysis"
                );
                Self::heuristic()
            }
        }
    }

    /// Analyzer that always uses the rule-based path.
    pub fn heuristic() -> Self {
        Self {
            strategy: Strategy::Heuristic,
            model_path: None,
        }
    }

    /// Analyzer around an already constructed classifier.
    pub fn with_classifier(classifier: SkinClassifier) -> Self {
        Self {
            strategy: Strategy::Model(classifier),
            model_path: None,
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn uses_model(&self) -> bool {
        matches!(self.strategy, Strategy::Model(_))
    }

    pub fn status(&self) -> AnalyzerStatus {
        AnalyzerStatus {
            strategy: self.strategy.name(),
            model_path: self.model_path.clone(),
            labels: match &self.strategy {
                Strategy::Model(c) => Some(c.labels().labels().to_vec()),
                Strategy::Heuristic => None,
            },
        }
    }

    /// Analyze the image at `path`.
    ///
    /// The caller is expected to have validated and stored the file; no
    /// extension or MIME checks happen here.
    pub fn analyze(&self, path: &Path) -> Result<AnalysisResult, AnalyzeError> {
        let (skin_type, confidence) = match &self.strategy {
            Strategy::Model(classifier) => classifier.classify(path)?,
            Strategy::Heuristic => {
                let features = ImageFeatures::extract(path)?;
                tracing::debug!(?features, "extracted image features");
                rules::classify(&features)
            }
        };

        tracing::info!(
            path = %path.display(),
            strategy = self.strategy.name(),
            %skin_type,
            confidence,
            "skin analysis complete"
        );

        Ok(AnalysisResult {
            skin_type,
            confidence,
            recommendations: recommendations::top_for(skin_type),
        })
    }
}

/// Analyzer that loads on first use.
///
/// Concurrent first callers block until the single load finishes; later
/// calls only read.
pub struct LazyAnalyzer {
    loader: Box<dyn Fn() -> SkinAnalyzer + Send + Sync>,
    cell: OnceLock<SkinAnalyzer>,
}

impl LazyAnalyzer {
    /// Load with [`SkinAnalyzer::load`] on first use.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_loader(move || SkinAnalyzer::load(&config))
    }

    /// Build the analyzer with `loader` on first use. The loader runs at
    /// most once.
    pub fn with_loader(loader: impl Fn() -> SkinAnalyzer + Send + Sync + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &SkinAnalyzer {
        self.cell.get_or_init(|| (self.loader)())
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn analyze(&self, path: &Path) -> Result<AnalysisResult, AnalyzeError> {
        self.get().analyze(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names() {
        assert_eq!(SkinAnalyzer::heuristic().strategy().name(), "heuristic");
        assert!(!SkinAnalyzer::heuristic().uses_model());
    }

    #[test]
    fn test_heuristic_status() {
        let status = SkinAnalyzer::heuristic().status();
        assert_eq!(status.strategy, "heuristic");
        assert!(status.model_path.is_none());
        assert!(status.labels.is_none());
    }

    #[test]
    fn test_error_message_keeps_root_cause() {
        let err = SkinAnalyzer::heuristic()
            .analyze(Path::new("/nonexistent/face.jpg"))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("analysis failed: feature extraction failed"), "{msg}");
    }

    #[test]
    fn test_lazy_analyzer_defers_load() {
        let lazy = LazyAnalyzer::new(AnalyzerConfig {
            model_dir: PathBuf::from("/nonexistent/models"),
            intra_threads: 1,
        });
        assert!(!lazy.is_loaded());
        assert!(!lazy.get().uses_model());
        assert!(lazy.is_loaded());
    }

    #[test]
    fn test_lazy_analyzer_loads_once_across_calls() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let lazy = LazyAnalyzer::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            SkinAnalyzer::heuristic()
        });

        assert_eq!(loads.load(Ordering::SeqCst), 0);
        lazy.get();
        lazy.get();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
