use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use self::database::DatabaseConfig;
use self::network::NetworkConfig;
use self::ocr::OcrConfig;
use self::overlay::OverlayConfig;
use self::pipeline::PipelineConfig;
use self::translator::TranslatorConfig;

pub mod database;
pub mod network;
pub mod ocr;
pub mod overlay;
pub mod pipeline;
pub mod translator;

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub ocr: OcrConfig,
    pub translator: TranslatorConfig,
    pub database: DatabaseConfig,
    pub overlay: OverlayConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment wins over profile values, so secrets never need to live in a profile.
    pub fn apply_env(&mut self) {
        if let Ok(key) = env::var("DEEPL_API_KEY") {
            self.translator.api_key = key;
        }

        if let Ok(url) = env::var("DEEPL_API_URL") {
            self.translator.api_url = Some(url);
        }

        if let Ok(addr) = env::var("BABEL_LISTEN_ADDR") {
            self.network.listen_addr = addr;
        }

        if let Some(timeout) = env::var("WRITE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.database.write_timeout_ms = timeout;
        }

        if let Ok(url) = env::var("TESSDATA_URL") {
            self.ocr.tessdata_url = url;
        }
    }
}

/// Per-user application directory, e.g. `~/.local/share/BabelGate`.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("BabelGate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.database.write_timeout_ms, 5000);
        assert_eq!(config.network.listen_addr, "127.0.0.1:7878");
        assert!(!config.pipeline.auto_save);
        assert!(config.translator.api_url.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "database": { "write_timeout_ms": 250 } }"#).unwrap();
        assert_eq!(config.database.write_timeout_ms, 250);
        assert!(config.database.path.is_none());
        assert_eq!(config.ocr.tesseract_binary, "tesseract");
    }

    #[test]
    fn resolved_paths_fall_back_to_data_dir() {
        let config = Config::default();
        assert_eq!(
            config.database.resolved_path(),
            data_dir().join("translations.db")
        );
        assert_eq!(
            config.ocr.resolved_cache_dir(),
            data_dir().join("tesseract-cache")
        );
    }
}
