use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use babel_core::language::ocr_language;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::engine::{EngineFactory, RecognitionEngine, RecognitionError};
use crate::models::ModelCache;

/// Runs the `tesseract` executable against models kept in the cache directory.
pub struct TesseractFactory {
    binary: String,
    models: ModelCache,
}

impl TesseractFactory {
    pub fn new(binary: impl Into<String>, models: ModelCache) -> Self {
        Self {
            binary: binary.into(),
            models,
        }
    }
}

#[async_trait]
impl EngineFactory for TesseractFactory {
    async fn create(
        &self,
        lang: &str,
        cache_dir: &Path,
    ) -> Result<Box<dyn RecognitionEngine>, RecognitionError> {
        if ocr_language(lang).is_none() {
            return Err(RecognitionError::UnsupportedLanguage(lang.to_string()));
        }

        self.models.ensure(lang, cache_dir).await?;

        Ok(Box::new(TesseractWorker {
            binary: self.binary.clone(),
            lang: lang.to_string(),
            tessdata_dir: cache_dir.to_path_buf(),
        }))
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

pub struct TesseractWorker {
    binary: String,
    lang: String,
    tessdata_dir: PathBuf,
}

#[async_trait]
impl RecognitionEngine for TesseractWorker {
    async fn recognize(&mut self, image: &[u8]) -> Result<String, RecognitionError> {
        image::guess_format(image).map_err(|e| RecognitionError::MalformedImage(e.to_string()))?;

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("--tessdata-dir")
            .arg(&self.tessdata_dir)
            .arg("-l")
            .arg(&self.lang)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RecognitionError::Engine(format!("failed to start {}: {e}", self.binary))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecognitionError::Engine("tesseract stdin unavailable".into()))?;
        stdin.write_all(image).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn terminate(self: Box<Self>) -> Result<(), RecognitionError> {
        // Each recognition is its own process and has already exited
        tracing::debug!(lang = %self.lang, "tesseract worker dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unknown_language_before_touching_cache() {
        let factory = TesseractFactory::new("tesseract", ModelCache::new("http://127.0.0.1:9"));
        let result = factory
            .create("klingon", Path::new("/nonexistent/models"))
            .await;
        assert!(matches!(result, Err(RecognitionError::UnsupportedLanguage(_))));
    }

    #[tokio::test]
    async fn rejects_malformed_image_without_spawning() {
        let mut worker = TesseractWorker {
            binary: "/nonexistent/tesseract".into(),
            lang: "eng".into(),
            tessdata_dir: PathBuf::from("/nonexistent/models"),
        };
        let result = worker.recognize(b"definitely not an image").await;
        assert!(matches!(result, Err(RecognitionError::MalformedImage(_))));
    }

    #[tokio::test]
    async fn missing_binary_is_an_engine_fault() {
        let mut worker = TesseractWorker {
            binary: "/nonexistent/tesseract".into(),
            lang: "eng".into(),
            tessdata_dir: PathBuf::from("/nonexistent/models"),
        };
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        let result = worker.recognize(png).await;
        assert!(matches!(result, Err(RecognitionError::Engine(_))));
    }
}
