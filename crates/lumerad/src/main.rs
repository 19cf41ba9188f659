use anyhow::Result;
use lumera_core::SkinAnalyzer;
use tracing_subscriber::EnvFilter;

mod config;
mod dbus_interface;
mod engine;

use config::Config;
use dbus_interface::{AnalyzerService, BUS_NAME, OBJECT_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("lumerad starting");

    let config = Config::from_env();

    // Load once, before serving; a missing or broken model is not fatal.
    let analyzer = SkinAnalyzer::load(&config.analyzer);
    tracing::info!(
        strategy = analyzer.strategy().name(),
        model_dir = %config.analyzer.model_dir.display(),
        "analyzer ready"
    );

    let engine = engine::spawn_engine(analyzer, config.queue_depth)?;

    let builder = if config.system_bus {
        zbus::connection::Builder::system()?
    } else {
        zbus::connection::Builder::session()?
    };
    let _connection = builder
        .name(BUS_NAME)?
        .serve_at(OBJECT_PATH, AnalyzerService::new(engine))?
        .build()
        .await?;

    tracing::info!(
        bus = if config.system_bus { "system" } else { "session" },
        name = BUS_NAME,
        "lumerad ready"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("lumerad shutting down");

    Ok(())
}
