use anyhow::Result;
use flipclock::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging on stderr; stdout belongs to the clock.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // 2. Load startup settings from an optional TOML file and the environment.
    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = FlipClockSettings::load(settings_path.as_deref())?;

    // 3. Create the engine.
    let engine = FlipClockEngine::with_settings(
        &settings,
        Arc::new(SystemWallClock),
        Arc::new(TerminalRenderer::new()),
    )
    .await;

    // 4. Listen for host property updates on stdin.
    spawn_host_listener(engine.config_adapter());

    // 5. Run until Ctrl+C.
    engine.run().await?;
    println!();
    Ok(())
}

/// Reads `<key> <value>` or `<key>=<value>` lines from stdin and applies them.
fn spawn_host_listener(adapter: ConfigAdapter) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(property) = adapter.apply_line(&line).await {
                        info!("Host set {}.", property.key());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Host channel closed: {}", e);
                    break;
                }
            }
        }
    });
}
