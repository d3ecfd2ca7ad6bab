use async_trait::async_trait;
use babel_config::translator::TranslatorConfig;
use reqwest::StatusCode;

use crate::{LanguageCode, ProviderMetadata, TranslateError, Translation, Translator};

pub const DEEPL_FREE_URL: &str = "https://api-free.deepl.com/v2/translate";
pub const DEEPL_PRO_URL: &str = "https://api.deepl.com/v2/translate";

#[derive(Clone)]
pub struct DeepLTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl DeepLTranslator {
    pub fn new(api_key: String, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| endpoint_for_key(&api_key).to_string());
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
        }
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.api_key.clone(), config.api_url.clone())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Free-tier keys end in `:fx` and only work against the free endpoint.
fn endpoint_for_key(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        DEEPL_FREE_URL
    } else {
        DEEPL_PRO_URL
    }
}

fn status_error(status: StatusCode) -> Option<TranslateError> {
    match status.as_u16() {
        403 => Some(TranslateError::AuthenticationError),
        429 => Some(TranslateError::RateLimitExceeded),
        456 => Some(TranslateError::QuotaExceeded),
        _ if !status.is_success() => Some(TranslateError::ApiError(format!("HTTP {status}"))),
        _ => None,
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        if self.api_key.is_empty() {
            return Err(TranslateError::AuthenticationError);
        }
        if to.is_empty() {
            return Err(TranslateError::UnsupportedLanguagePair { from, to });
        }

        let source = from.to_uppercase();
        let target = to.to_uppercase();
        let mut params = vec![("text", text), ("target_lang", target.as_str())];
        if !source.is_empty() {
            params.push(("source_lang", source.as_str()));
        }

        tracing::debug!(from = %source, to = %target, chars = text.chars().count(), "DeepL request");

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
            .send()
            .await?;

        if let Some(err) = status_error(response.status()) {
            return Err(err);
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        let first = json["translations"]
            .get(0)
            .ok_or_else(|| TranslateError::ApiError("No translation in response".to_string()))?;
        let translated_text = first["text"]
            .as_str()
            .ok_or_else(|| TranslateError::ApiError("No translation in response".to_string()))?;
        let detected_source = first["detected_source_language"]
            .as_str()
            .map(str::to_lowercase);

        Ok(Translation {
            text: translated_text.to_string(),
            from,
            to,
            provider: "deepl".to_string(),
            detected_source,
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "DeepL".to_string(),
            requires_api_key: true,
            free_tier_available: true,
        }
    }
}
