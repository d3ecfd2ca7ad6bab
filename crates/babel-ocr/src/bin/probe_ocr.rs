//! Capture the primary screen and OCR it once: cargo run -p babel-ocr --bin probe_ocr -- [lang]

use std::time::Instant;

use anyhow::Result;
use babel_config::Config;
use babel_ocr::{RecognitionLifecycle, XcapScreen, factory_from_config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let lang = std::env::args().nth(1).unwrap_or_else(|| "eng".to_string());
    let config = Config::new();

    tracing::info!("Capturing primary screen...");
    let start = Instant::now();
    let png = XcapScreen::new(config.overlay.work_area).capture_full()?;
    tracing::info!("{} bytes in {:?}", png.len(), start.elapsed());

    std::fs::write("probe_capture.png", &png)?;
    tracing::info!("Saved to probe_capture.png");

    let lifecycle = RecognitionLifecycle::new(
        factory_from_config(&config.ocr),
        config.ocr.resolved_cache_dir(),
    );

    tracing::info!("Running OCR ({lang}) with {}", lifecycle.engine_name());
    let start = Instant::now();
    match lifecycle.recognize_once(&lang, &png).await {
        Ok(text) => {
            tracing::info!("{:?} - {} chars", start.elapsed(), text.chars().count());
            for line in text.lines().take(5) {
                tracing::info!("> {line}");
            }
        }
        Err(e) => tracing::error!("Failed: {e}"),
    }

    Ok(())
}
