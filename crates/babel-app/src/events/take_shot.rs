use std::sync::Arc;

use babel_types::{AppEvent, CaptureRegion, OverlaySession};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::events::CommandResult;
use crate::flight::Ticket;
use crate::pipeline::{self, PipelineError};
use crate::state::AppState;

/// `session` is the overlay as it was when the command was read, so a close
/// arriving later does not affect this shot.
pub async fn handle_take_shot(
    state: Arc<AppState>,
    events: broadcast::Sender<AppEvent>,
    session: Option<OverlaySession>,
    ticket: Ticket,
    region: CaptureRegion,
) -> CommandResult {
    let session = session.ok_or(PipelineError::NoSession)?;
    let _flight = ticket.wait().await;
    tracing::debug!(">>> [SHOT] {:?}", region);

    let translated = pipeline::take_shot(&state, &events, &session, region).await?;
    Ok(Value::String(translated))
}
