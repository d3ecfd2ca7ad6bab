use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod controller;
mod events;
mod flight;
mod overlay;
mod pipeline;
mod profile;
mod state;
mod status;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "babel-gate", about = "Screen OCR and translation backend")]
struct Args {
    /// Profile name under the BabelGate profiles directory
    #[arg(short, long, default_value = "main")]
    profile: String,

    /// WebSocket listen address, overrides the profile
    #[arg(long)]
    listen: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    profile::init_user_config()?;
    let mut config = profile::load_user_profile(&args.profile)?;
    config.apply_env();
    if let Some(listen) = args.listen {
        config.network.listen_addr = listen;
    }

    let listener = babel_io::bind(&config.network.listen_addr).await?;
    let state = Arc::new(AppState::new(config).context("Failed to initialize app state")?);
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(listener);

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for ctrl+c: {e}");
            }
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("Task exited"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown().await;
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::warn!("Task ended with error during shutdown: {e:#}");
        }
    }
    tracing::info!("Bye");
    Ok(())
}
