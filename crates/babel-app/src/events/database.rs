use std::future::Future;
use std::sync::Arc;

use babel_types::{ReadMode, SqlParams};
use serde_json::json;

use crate::events::CommandResult;
use crate::state::AppState;

/// Queue the write now; the returned future only waits for its turn.
pub fn handle_db_write(
    state: &AppState,
    sql: String,
    params: SqlParams,
) -> impl Future<Output = CommandResult> + Send + 'static {
    let pending = state.store.write(sql, params);
    async move {
        let outcome = pending.await?;
        Ok(json!({
            "changes": outcome.changes,
            "lastInsertRowid": outcome.last_insert_rowid,
        }))
    }
}

pub async fn handle_db_read(
    state: Arc<AppState>,
    mode: ReadMode,
    sql: String,
    params: SqlParams,
) -> CommandResult {
    Ok(state.store.read(mode, sql, params).await?)
}
