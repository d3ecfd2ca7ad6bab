use serde_json::Value;

use crate::events::CommandResult;
use crate::state::AppState;

pub async fn handle_get_info(state: &AppState) -> CommandResult {
    let summary = state.overlay().summary();
    let status = state.status.snapshot().await;
    Ok(Value::String(format!("{summary}\n{}", status.summary())))
}
