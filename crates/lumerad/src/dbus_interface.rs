use crate::engine::EngineHandle;
use std::path::PathBuf;
use zbus::interface;

pub const BUS_NAME: &str = "org.lumera.Analyzer1";
pub const OBJECT_PATH: &str = "/org/lumera/Analyzer1";

/// D-Bus interface for the Lumera analysis daemon.
///
/// Bus name: org.lumera.Analyzer1
/// Object path: /org/lumera/Analyzer1
pub struct AnalyzerService {
    engine: EngineHandle,
}

impl AnalyzerService {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

#[interface(name = "org.lumera.Analyzer1")]
impl AnalyzerService {
    /// Analyze a stored image. Returns the result as JSON.
    async fn analyze(&self, path: &str) -> zbus::fdo::Result<String> {
        tracing::info!(path, "analyze requested");
        let result = self
            .engine
            .analyze(PathBuf::from(path))
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        serde_json::to_string(&result).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Return daemon status information.
    async fn status(&self) -> zbus::fdo::Result<String> {
        let status = self
            .engine
            .status()
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "strategy": status.strategy,
            "model_path": status.model_path.map(|p| p.display().to_string()),
            "labels": status.labels,
        })
        .to_string())
    }
}
