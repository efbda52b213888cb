use driver_location::adapters::inbound::LocationApi;
use driver_location::application::build_service;
use driver_location::Config;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration (missing file falls back to defaults plus env overrides)
    let config = Config::load(Some(Path::new(&config_path)))?;

    // Initialize tracing; RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting driver location service");
    info!(
        backend = ?config.index.backend,
        ladder = ?config.location.radius_ladder_km,
        max_radius_km = config.location.max_search_radius_km,
        required = config.location.required_result_count,
        "Configuration loaded"
    );

    let service = Arc::new(build_service(&config).await?);
    let api = LocationApi::new(service);

    // One JSON request per stdin line, one JSON reply per stdout line
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = api.handle_line(&line).await;
                stdout.write_all(reply.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                break;
            }
        }
    }

    info!("Shutting down driver location service");
    Ok(())
}
