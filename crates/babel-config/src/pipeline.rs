use serde::{Deserialize, Serialize};

fn default_auto_save() -> bool {
    false
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Store every successful take-shot in the session's folder
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            auto_save: default_auto_save(),
        }
    }
}
