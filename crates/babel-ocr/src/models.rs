use std::path::{Path, PathBuf};

use crate::engine::RecognitionError;

/// Read-through cache of `<lang>.traineddata` files.
///
/// A model is downloaded the first time its language is used and kept in the
/// cache directory for later runs.
#[derive(Clone)]
pub struct ModelCache {
    client: reqwest::Client,
    base_url: String,
}

impl ModelCache {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn model_path(dir: &Path, lang: &str) -> PathBuf {
        dir.join(format!("{lang}.traineddata"))
    }

    /// Path of the model for `lang`, downloading it first when missing.
    pub async fn ensure(&self, lang: &str, dir: &Path) -> Result<PathBuf, RecognitionError> {
        let path = Self::model_path(dir, lang);
        if tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }

        tokio::fs::create_dir_all(dir).await?;

        let url = format!(
            "{}/{lang}.traineddata",
            self.base_url.trim_end_matches('/')
        );
        tracing::info!("Downloading OCR model {lang} from {url}");

        let unavailable = |reason: String| RecognitionError::ModelUnavailable {
            lang: lang.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        // Write aside and rename so an interrupted download never looks cached
        let partial = dir.join(format!("{lang}.traineddata.part"));
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &path).await?;

        tracing::info!("Cached OCR model {lang} ({} bytes)", bytes.len());
        Ok(path)
    }
}
