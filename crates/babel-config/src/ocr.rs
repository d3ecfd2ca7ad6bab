use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    #[default]
    Tesseract,
    /// Windows.Media.Ocr, only available on Windows builds
    Windows,
}

fn default_tesseract_binary() -> String {
    "tesseract".to_string()
}

fn default_tessdata_url() -> String {
    "https://github.com/tesseract-ocr/tessdata_fast/raw/main".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    pub backend: OcrBackend,
    #[serde(default = "default_tesseract_binary")]
    pub tesseract_binary: String,
    /// Where `<lang>.traineddata` files are kept between runs
    pub model_cache_dir: Option<PathBuf>,
    /// Base URL missing models are downloaded from
    #[serde(default = "default_tessdata_url")]
    pub tessdata_url: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            tesseract_binary: default_tesseract_binary(),
            model_cache_dir: None,
            tessdata_url: default_tessdata_url(),
        }
    }
}

impl OcrConfig {
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.model_cache_dir
            .clone()
            .unwrap_or_else(|| crate::data_dir().join("tesseract-cache"))
    }
}
