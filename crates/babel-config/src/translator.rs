use serde::{Deserialize, Serialize};

fn default_provider() -> String {
    "deepl".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Usually supplied through `DEEPL_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Explicit endpoint; picked from the key type when unset
    pub api_url: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            api_url: None,
        }
    }
}
