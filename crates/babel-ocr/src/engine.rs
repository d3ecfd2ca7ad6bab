use std::path::Path;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("Malformed image data: {0}")]
    MalformedImage(String),

    #[error("Unsupported OCR language: {0}")]
    UnsupportedLanguage(String),

    #[error("Model for '{lang}' unavailable: {reason}")]
    ModelUnavailable { lang: String, reason: String },

    #[error("OCR engine fault: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One OCR engine instance, bound to a single language.
#[async_trait]
pub trait RecognitionEngine: Send {
    /// Recognize text from encoded image bytes (PNG, BMP, ...)
    async fn recognize(&mut self, image: &[u8]) -> Result<String, RecognitionError>;

    /// Release engine resources. Called exactly once, after `recognize`.
    async fn terminate(self: Box<Self>) -> Result<(), RecognitionError>;
}

/// Creates engines bound to a language and a persistent model cache directory.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(
        &self,
        lang: &str,
        cache_dir: &Path,
    ) -> Result<Box<dyn RecognitionEngine>, RecognitionError>;

    fn name(&self) -> &'static str;
}
