mod capture;
#[cfg(windows)]
mod com;
mod engine;
mod lifecycle;
mod models;
mod tesseract;
#[cfg(windows)]
mod winrt;

use std::sync::Arc;

use babel_config::ocr::{OcrBackend, OcrConfig};

pub use capture::{ScreenSource, XcapScreen};
#[cfg(windows)]
pub use com::ComGuard;
pub use engine::{EngineFactory, RecognitionEngine, RecognitionError};
pub use lifecycle::{RecognitionLifecycle, WorkerState};
pub use models::ModelCache;
pub use tesseract::{TesseractFactory, TesseractWorker};
#[cfg(windows)]
pub use winrt::{WindowsOcrFactory, WindowsOcrWorker};

/// Engine factory for the configured backend.
///
/// The Windows backend falls back to tesseract on other platforms.
pub fn factory_from_config(config: &OcrConfig) -> Arc<dyn EngineFactory> {
    let tesseract = || -> Arc<dyn EngineFactory> {
        Arc::new(TesseractFactory::new(
            config.tesseract_binary.clone(),
            ModelCache::new(config.tessdata_url.clone()),
        ))
    };

    match config.backend {
        OcrBackend::Tesseract => tesseract(),
        #[cfg(windows)]
        OcrBackend::Windows => Arc::new(WindowsOcrFactory),
        #[cfg(not(windows))]
        OcrBackend::Windows => {
            tracing::warn!("Windows OCR backend unavailable on this platform, using tesseract");
            tesseract()
        }
    }
}
