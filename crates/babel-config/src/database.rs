use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_write_timeout_ms() -> u64 {
    5000
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, defaults to `<data dir>/translations.db`
    pub path: Option<PathBuf>,
    /// Per-job limit for queued writes
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            write_timeout_ms: default_write_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| crate::data_dir().join("translations.db"))
    }
}
