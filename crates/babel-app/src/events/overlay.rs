use std::sync::Arc;

use babel_types::{AppEvent, OverlaySession, Rect, ShapePart};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::events::CommandResult;
use crate::flight::Ticket;
use crate::pipeline::PipelineError;
use crate::state::AppState;

pub fn handle_new_overlay(
    state: &AppState,
    events: &broadcast::Sender<AppEvent>,
    session: OverlaySession,
) -> CommandResult {
    let work_area = state.screen.work_area().map_err(PipelineError::from)?;

    let (previous, work_area) = {
        let mut overlay = state.overlay();
        let previous = overlay.open(session.clone(), work_area);
        (previous, overlay.work_area().unwrap_or(work_area))
    };
    tracing::info!(
        "Overlay opened: {} -> {}, folder {}",
        session.source_tag_ocr,
        session.target_tag_translate,
        session.folder_id
    );

    let fresh = previous.is_none();
    if let Some(previous) = previous {
        tracing::info!(
            "Overlay already open, replaced session for folder {}",
            previous.folder_id
        );
    }

    let _ = events.send(AppEvent::OverlayOpened { work_area, session });
    if fresh {
        // Fully click-through until the controls report their bounds
        let _ = events.send(AppEvent::OverlayShape { region: Vec::new() });
    }
    Ok(Value::Null)
}

/// Drop the session and tell clients right away; the worker is released once
/// the shots already queued have drained.
pub fn begin_close_overlay(state: &AppState, events: &broadcast::Sender<AppEvent>) -> Ticket {
    if state.overlay().close() {
        tracing::info!("Overlay closed");
        let _ = events.send(AppEvent::OverlayClosed);
    } else {
        tracing::debug!("close-overlay with no overlay open");
    }
    state.shots.enter()
}

pub async fn finish_close_overlay(state: Arc<AppState>, ticket: Ticket) -> CommandResult {
    let _flight = ticket.wait().await;
    if state.ocr.release().await {
        tracing::info!("OCR worker released after overlay close");
    }
    Ok(Value::Null)
}

pub fn handle_shape_update(
    state: &AppState,
    events: &broadcast::Sender<AppEvent>,
    part: ShapePart,
    rect: Rect,
) {
    let region = state.overlay().update_bounds(part, rect);
    if let Some(region) = region {
        let _ = events.send(AppEvent::OverlayShape { region });
    }
}
