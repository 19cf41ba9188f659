use lumera_core::config::env_usize;
use lumera_core::AnalyzerConfig;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Model location and inference settings.
    pub analyzer: AnalyzerConfig,
    /// Capacity of the request queue in front of the engine thread.
    pub queue_depth: usize,
    /// Connect to the system bus instead of the session bus.
    pub system_bus: bool,
}

impl Config {
    /// Load configuration from `LUMERA_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            analyzer: AnalyzerConfig::from_env(),
            queue_depth: env_usize("LUMERA_QUEUE_DEPTH", 16).max(1),
            system_bus: std::env::var("LUMERA_SYSTEM_BUS")
                .map(|v| v != "0")
                .unwrap_or(false),
        }
    }
}
