//! Trained skin type classifier via ONNX Runtime.
//!
//! Takes a whole photo, stretches it to the artifact's square input size,
//! scales pixels to [0, 1] and reads back one probability per class. The
//! class at each output index comes from the artifact's [`LabelSet`].

use crate::labels::{LabelSet, TensorLayout};
use crate::types::{round2, SkinType};
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Extension of the label sidecar, replacing the model's own (`.onnx`).
pub const LABELS_EXTENSION: &str = "labels.json";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("label manifest: {0}")]
    Labels(#[from] crate::labels::LabelError),
    #[error("image preprocessing failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("inference session poisoned by an earlier panic")]
    SessionPoisoned,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Produces class probabilities for one preprocessed image batch.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

/// ONNX Runtime session behind a mutex; `Session::run` needs `&mut`.
pub struct OnnxPredictor {
    session: Mutex<Session>,
}

impl OnnxPredictor {
    /// Load an ONNX model from the given path. A missing file surfaces as
    /// the ort error.
    pub fn load(model_path: &Path, intra_threads: usize) -> Result<Self, ClassifierError> {
        let session = Session::builder()?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = %model_path.display(),
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded skin type model"
        );

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::SessionPoisoned)?;

        let outputs = session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, probs) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::InferenceFailed(format!("probability extraction: {e}")))?;

        Ok(probs.to_vec())
    }
}

/// A trained classifier paired with the label order it was trained with.
pub struct SkinClassifier {
    predictor: Box<dyn Predictor>,
    labels: LabelSet,
}

impl SkinClassifier {
    /// Load the ONNX artifact and its label sidecar.
    ///
    /// The sidecar is `<model stem>.labels.json` next to the model. Without
    /// one the v1 label order is assumed; an invalid one fails the load.
    pub fn load(model_path: &Path, intra_threads: usize) -> Result<Self, ClassifierError> {
        let labels_path = labels_path(model_path);
        let labels = if labels_path.exists() {
            let labels = LabelSet::load(&labels_path)?;
            tracing::info!(path = %labels_path.display(), labels = ?labels.labels(), "label manifest loaded");
            labels
        } else {
            tracing::warn!(
                path = %labels_path.display(),
                "no label manifest next to model; assuming v1 order [Normal, Oily, Dry, Combination, Sensitive]"
            );
            LabelSet::default()
        };

        let predictor = OnnxPredictor::load(model_path, intra_threads)?;
        Ok(Self::with_predictor(predictor, labels))
    }

    /// Build a classifier around any predictor.
    pub fn with_predictor(predictor: impl Predictor + 'static, labels: LabelSet) -> Self {
        Self {
            predictor: Box::new(predictor),
            labels,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Classify the image at `path`. Returns the arg-max class and its
    /// probability as a percentage rounded to two decimals.
    pub fn classify(&self, path: &Path) -> Result<(SkinType, f64), ClassifierError> {
        let rgb = image::open(path)?.to_rgb8();
        let input = preprocess(&rgb, &self.labels);
        let probs = self.predictor.predict(&input)?;
        interpret(&probs, &self.labels)
    }
}

/// Sidecar path for a model file: `skin_type_model.onnx` → `skin_type_model.labels.json`.
pub fn labels_path(model_path: &Path) -> PathBuf {
    model_path.with_extension(LABELS_EXTENSION)
}

/// Stretch to the square input size and scale to [0, 1] in the artifact's layout.
fn preprocess(rgb: &RgbImage, labels: &LabelSet) -> Array4<f32> {
    let size = labels.input_size();
    let resized = imageops::resize(rgb, size, size, FilterType::CatmullRom);
    let size = size as usize;

    let mut tensor = match labels.layout() {
        TensorLayout::Nhwc => Array4::<f32>::zeros((1, size, size, 3)),
        TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, size, size)),
    };

    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for (c, &value) in pixel.0.iter().enumerate() {
            let scaled = f32::from(value) / 255.0;
            match labels.layout() {
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = scaled,
                TensorLayout::Nchw => tensor[[0, c, y, x]] = scaled,
            }
        }
    }

    tensor
}

/// Arg-max over the probability vector. First maximum wins on ties.
fn interpret(probs: &[f32], labels: &LabelSet) -> Result<(SkinType, f64), ClassifierError> {
    if probs.len() != labels.len() {
        return Err(ClassifierError::InferenceFailed(format!(
            "expected {} class probabilities, got {}",
            labels.len(),
            probs.len()
        )));
    }

    if let Some(bad) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(ClassifierError::InferenceFailed(format!(
            "output {bad} is not a probability; the model must end in softmax"
        )));
    }

    let (index, &prob) = probs
        .iter()
        .enumerate()
        .fold(None::<(usize, &f32)>, |best, (i, p)| match best {
            Some((_, b)) if *p <= *b => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| ClassifierError::InferenceFailed("empty output".into()))?;

    let skin_type = labels
        .get(index)
        .ok_or_else(|| ClassifierError::InferenceFailed(format!("no label for class {index}")))?;

    Ok((skin_type, round2(f64::from(prob) * 100.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    struct FixedPredictor(Vec<f32>);

    impl Predictor for FixedPredictor {
        fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            assert_eq!(input.shape(), &[1, 224, 224, 3]);
            Ok(self.0.clone())
        }
    }

    fn write_png(dir: &Path, color: [u8; 3]) -> PathBuf {
        let path = dir.join("face.png");
        RgbImage::from_pixel(64, 48, Rgb(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn test_preprocess_nhwc_shape_and_scale() {
        let img = RgbImage::from_pixel(300, 100, Rgb([255, 0, 51]));
        let tensor = preprocess(&img, &LabelSet::default());
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!((tensor[[0, 10, 200, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 10, 200, 1]].abs() < 1e-6);
        assert!((tensor[[0, 10, 200, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_nchw_shape() {
        let labels = LabelSet::from_json(
            r#"{"version": 1, "labels": ["Normal", "Oily", "Dry", "Combination", "Sensitive"], "layout": "nchw", "input_size": 32}"#,
        )
        .unwrap();
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 255, 0]));
        let tensor = preprocess(&img, &labels);
        assert_eq!(tensor.shape(), &[1, 3, 32, 32]);
        assert!((tensor[[0, 1, 5, 5]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 0, 5, 5]].abs() < 1e-6);
    }

    #[test]
    fn test_interpret_argmax() {
        let (t, c) = interpret(&[0.05, 0.1, 0.7, 0.1, 0.05], &LabelSet::default()).unwrap();
        assert_eq!(t, SkinType::Dry);
        assert_eq!(c, 70.0);
    }

    #[test]
    fn test_interpret_first_max_wins() {
        let (t, c) = interpret(&[0.1, 0.4, 0.4, 0.05, 0.05], &LabelSet::default()).unwrap();
        assert_eq!(t, SkinType::Oily);
        assert_eq!(c, 40.0);
    }

    #[test]
    fn test_interpret_uses_label_order() {
        let labels = LabelSet::from_json(
            r#"{"combination": 0, "dry": 1, "normal": 2, "oily": 3, "sensitive": 4}"#,
        )
        .unwrap();
        let (t, c) = interpret(&[0.9, 0.025, 0.025, 0.025, 0.025], &labels).unwrap();
        assert_eq!(t, SkinType::Combination);
        assert_eq!(c, 90.0);
    }

    #[test]
    fn test_interpret_shape_mismatch() {
        let err = interpret(&[0.5, 0.5], &LabelSet::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::InferenceFailed(_)));
        assert!(err.to_string().contains("expected 5 class probabilities, got 2"));
    }

    #[test]
    fn test_interpret_rejects_logits() {
        let err = interpret(&[3.2, -1.0, 0.1, 0.0, 0.0], &LabelSet::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::InferenceFailed(_)));
    }

    #[test]
    fn test_interpret_rejects_nan() {
        let err = interpret(&[f32::NAN, 0.2, 0.2, 0.2, 0.2], &LabelSet::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::InferenceFailed(_)));
    }

    #[test]
    fn test_classify_with_fixed_predictor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), [120, 90, 80]);
        let classifier = SkinClassifier::with_predictor(
            FixedPredictor(vec![0.02, 0.03, 0.05, 0.1, 0.8]),
            LabelSet::default(),
        );
        let (t, c) = classifier.classify(&path).unwrap();
        assert_eq!(t, SkinType::Sensitive);
        assert_eq!(c, 80.0);
    }

    #[test]
    fn test_classify_unreadable_image() {
        let classifier =
            SkinClassifier::with_predictor(FixedPredictor(vec![1.0, 0.0, 0.0, 0.0, 0.0]), LabelSet::default());
        let err = classifier.classify(Path::new("/nonexistent/face.png")).unwrap_err();
        assert!(matches!(err, ClassifierError::Decode(_)));
    }

    #[test]
    fn test_labels_path() {
        assert_eq!(
            labels_path(Path::new("ml_model/skin_type_model.onnx")),
            PathBuf::from("ml_model/skin_type_model.labels.json")
        );
    }

    #[test]
    fn test_load_reads_sidecar_before_model() {
        // No model file on disk: the sidecar is still validated first.
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("skin_type_model.onnx");
        std::fs::write(labels_path(&model), r#"{"version": 3, "labels": []}"#).unwrap();
        let err = SkinClassifier::load(&model, 1).err().unwrap();
        assert!(matches!(
            err,
            ClassifierError::Labels(crate::labels::LabelError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("skin_type_model.onnx");
        std::fs::write(&model, b"not a model").unwrap();
        std::fs::write(labels_path(&model), r#"{"version": 1, "labels": ["Oily"]}"#).unwrap();
        let err = SkinClassifier::load(&model, 1).err().unwrap();
        assert!(matches!(err, ClassifierError::Labels(_)));
    }
}
