use std::sync::Arc;

use serde_json::Value;

use crate::events::CommandResult;
use crate::state::AppState;

pub async fn handle_translate(
    state: Arc<AppState>,
    text: String,
    source_tag: String,
    target_tag: String,
) -> CommandResult {
    let translation = state
        .translator
        .translate(&text, source_tag, target_tag)
        .await?;
    tracing::debug!(
        provider = %translation.provider,
        from = %translation.from,
        to = %translation.to,
        detected = ?translation.detected_source,
        "translate command answered"
    );
    Ok(Value::String(translation.text))
}
