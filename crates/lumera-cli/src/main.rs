use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumera_core::classifier::labels_path;
use lumera_core::{rules, AnalysisResult, AnalyzerConfig, ImageFeatures, SkinAnalyzer};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lumera", about = "Lumera skin analysis CLI")]
struct Cli {
    /// Directory holding skin_type_model.onnx (overrides LUMERA_MODEL_DIR)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photo and print skin type, confidence and advice
    Analyze {
        /// Image file to analyze
        path: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Ask a running lumerad instead of analyzing in-process
        #[arg(long)]
        daemon: bool,
    },
    /// Print the image statistics used by the rule-based classifier
    Features {
        /// Image file to inspect
        path: PathBuf,
    },
    /// Report whether the trained model loads or the fallback is in use
    Status {
        /// Query a running lumerad instead of loading locally
        #[arg(long)]
        daemon: bool,
    },
}

#[zbus::proxy(
    interface = "org.lumera.Analyzer1",
    default_service = "org.lumera.Analyzer1",
    default_path = "/org/lumera/Analyzer1"
)]
trait Analyzer {
    async fn analyze(&self, path: &str) -> zbus::Result<String>;
    async fn status(&self) -> zbus::Result<String>;
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = AnalyzerConfig::from_env();
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }

    match cli.command {
        Commands::Analyze { path, json, daemon } => {
            let result = if daemon {
                analyze_remote(&path).await?
            } else {
                SkinAnalyzer::load(&config).analyze(&path)?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Commands::Features { path } => {
            let features = ImageFeatures::extract(&path)?;
            let (skin_type, confidence) = rules::classify(&features);
            println!("brightness: {:.2}", features.brightness);
            println!("variance:   {:.2}", features.variance);
            println!("saturation: {:.2}", features.saturation);
            println!("rules:      {skin_type} ({confidence:.2}%)");
        }
        Commands::Status { daemon } => {
            if daemon {
                let proxy = connect().await?;
                println!("{}", proxy.status().await.context("lumerad Status() failed")?);
            } else {
                print_local_status(&config);
            }
        }
    }

    Ok(())
}

async fn connect() -> Result<AnalyzerProxy<'static>> {
    let connection = zbus::Connection::session()
        .await
        .context("cannot connect to the session bus")?;
    AnalyzerProxy::new(&connection)
        .await
        .context("lumerad is not reachable")
}

async fn analyze_remote(path: &Path) -> Result<AnalysisResult> {
    // The daemon resolves paths against its own working directory.
    let path = std::fs::canonicalize(path)
        .with_context(|| format!("cannot resolve {}", path.display()))?;
    let proxy = connect().await?;
    let raw = proxy
        .analyze(&path.to_string_lossy())
        .await
        .context("lumerad Analyze() failed")?;
    serde_json::from_str(&raw).context("unexpected reply from lumerad")
}

fn print_result(result: &AnalysisResult) {
    println!("Skin type:  {}", result.skin_type);
    println!("Confidence: {:.2}%", result.confidence);
    println!("Recommendations:");
    for advice in &result.recommendations {
        println!("  - {advice}");
    }
}

fn print_local_status(config: &AnalyzerConfig) {
    let model_path = config.model_path();
    let sidecar = labels_path(&model_path);
    println!("model:     {} ({})", model_path.display(), presence(&model_path));
    println!("labels:    {} ({})", sidecar.display(), presence(&sidecar));

    let analyzer = SkinAnalyzer::load(config);
    let status = analyzer.status();
    println!("strategy:  {}", status.strategy);
    if let Some(labels) = status.labels {
        let names: Vec<_> = labels.iter().map(|l| l.as_str()).collect();
        println!("classes:   {}", names.join(", "));
    } else {
        println!("classes:   (rule-based fallback; set RUST_LOG=info for the reason)");
    }
}

fn presence(path: &Path) -> &'static str {
    if path.exists() {
        "found"
    } else {
        "missing"
    }
}
