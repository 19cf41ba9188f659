use lumera_core::{AnalysisResult, AnalyzeError, AnalyzerStatus, SkinAnalyzer};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Messages sent from D-Bus handlers to the engine thread.
enum EngineRequest {
    Analyze {
        path: PathBuf,
        reply: oneshot::Sender<Result<AnalysisResult, AnalyzeError>>,
    },
    Status {
        reply: oneshot::Sender<AnalyzerStatus>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Request analysis of a stored image.
    pub async fn analyze(&self, path: PathBuf) -> Result<AnalysisResult, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Analyze {
                path,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        Ok(reply_rx.await.map_err(|_| EngineError::ChannelClosed)??)
    }

    /// Report which strategy the engine's analyzer loaded.
    pub async fn status(&self) -> Result<AnalyzerStatus, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Status { reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// The analyzer is loaded by the caller before any request is accepted and
/// is owned by the engine thread for the life of the process. Image decode
/// and inference block, so they stay off the async runtime.
pub fn spawn_engine(analyzer: SkinAnalyzer, queue_depth: usize) -> Result<EngineHandle, EngineError> {
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(queue_depth);

    std::thread::Builder::new()
        .name("lumera-engine".into())
        .spawn(move || {
            tracing::info!(strategy = analyzer.strategy().name(), "engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Analyze { path, reply } => {
                        let result = analyzer.analyze(&path);
                        if let Err(e) = &result {
                            tracing::warn!(path = %path.display(), error = %e, "analysis failed");
                        }
                        let _ = reply.send(result);
                    }
                    EngineRequest::Status { reply } => {
                        let _ = reply.send(analyzer.status());
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .map_err(EngineError::Spawn)?;

    Ok(EngineHandle { tx })
}
