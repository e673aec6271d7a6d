mod api;
mod config;
mod doctor_cmd;
mod parse_cmd;
mod scan_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rxscan_config::ScanConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use api::AppState;

#[derive(Parser)]
#[command(name = "rxscan")]
#[command(about = "rxscan: read prescription labels from QR codes, with OCR as a fallback")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.rxscan/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a prescription label from an image file
    Scan {
        /// Image to analyze
        #[arg(short, long)]
        image: PathBuf,
        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Parse and validate decoded label text (argument, --file, or stdin)
    Parse {
        text: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP API
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show which decoding capabilities are available
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref()).await?;
    rxscan_logging::init_logger(&config::log_settings(&config));

    match cli.command {
        Commands::Scan { image, json } => {
            if !scan_cmd::run(&config, &image, json).await? {
                std::process::exit(1);
            }
        }
        Commands::Parse { text, file, json } => parse_cmd::run(text, file, json).await?,
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Doctor => doctor_cmd::run(&config)?,
    }

    Ok(())
}

async fn run_server(config: ScanConfig) -> Result<()> {
    info!(
        port = config.server.port,
        bind = %config.server.bind_address,
        "Starting rxscan API"
    );

    let scanner = Arc::new(config::build_scanner(&config));
    let env = scanner.environment();
    if env.is_degraded() {
        tracing::warn!(missing = ?env.missing(), "Environment degraded");
    }

    let app_state = Arc::new(AppState {
        scanner,
        max_upload_bytes: config.server.max_upload_bytes,
    });
    let app = api::build_router(app_state).layer(CorsLayer::permissive());
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
