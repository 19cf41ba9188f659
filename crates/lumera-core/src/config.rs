use std::path::{Path, PathBuf};

/// File name of the trained artifact inside the model directory.
pub const MODEL_FILE_NAME: &str = "skin_type_model.onnx";

/// Name of the default model directory, installed beside the binary.
pub const MODEL_DIR_NAME: &str = "ml_model";

/// Analyzer configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Directory containing the ONNX artifact and its label sidecar.
    pub model_dir: PathBuf,
    /// ONNX Runtime intra-op thread count.
    pub intra_threads: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            intra_threads: 2,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from `LUMERA_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_dir: std::env::var("LUMERA_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            intra_threads: env_usize("LUMERA_INTRA_THREADS", defaults.intra_threads),
        }
    }

    /// Path to the trained skin type model.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE_NAME)
    }
}

/// `ml_model/` next to the running executable, so the selected strategy
/// does not depend on the directory the process was started from.
pub fn default_model_dir() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("/"));
    base.join(MODEL_DIR_NAME)
}

pub fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_path() {
        let config = AnalyzerConfig {
            model_dir: PathBuf::from("/srv/lumera/models"),
            intra_threads: 1,
        };
        assert_eq!(
            config.model_path(),
            PathBuf::from("/srv/lumera/models/skin_type_model.onnx")
        );
    }

    #[test]
    fn test_default_model_dir_is_absolute() {
        let dir = default_model_dir();
        assert!(dir.is_absolute(), "{}", dir.display());
        assert!(dir.ends_with(MODEL_DIR_NAME));

        let exe = std::env::current_exe().unwrap();
        assert_eq!(dir.parent(), exe.parent());
    }

    #[test]
    fn test_default_model_dir_ignores_working_directory() {
        let before = default_model_dir();
        let elsewhere = tempfile::tempdir().unwrap();
        let cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(elsewhere.path()).unwrap();
        let after = default_model_dir();
        std::env::set_current_dir(cwd).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_env_usize_falls_back_on_garbage() {
        std::env::set_var("LUMERA_TEST_ENV_USIZE", "many");
        assert_eq!(env_usize("LUMERA_TEST_ENV_USIZE", 7), 7);
        std::env::set_var("LUMERA_TEST_ENV_USIZE", "3");
        assert_eq!(env_usize("LUMERA_TEST_ENV_USIZE", 7), 3);
        assert_eq!(env_usize("LUMERA_TEST_ENV_UNSET", 4), 4);
    }
}
