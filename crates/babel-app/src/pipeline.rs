//! Take-shot: capture, recognize, normalize, translate, deliver.

use std::sync::Arc;

use babel_core::CaptureError;
use babel_core::geometry::to_screen;
use babel_ocr::RecognitionError;
use babel_translator::TranslateError;
use babel_types::{AppEvent, CaptureRegion, OverlaySession, SqlParams};
use serde_json::json;
use tokio::sync::broadcast;

use crate::state::AppState;

const AUTO_SAVE_SQL: &str =
    "INSERT INTO translations (folder_id, source_text, deepl_translated) VALUES (?, ?, ?)";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No overlay open")]
    NoSession,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error("Translation failed: {source}")]
    Translation {
        recognized: String,
        #[source]
        source: TranslateError,
    },
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NoSession => "no-session",
            PipelineError::Capture(_) => "capture",
            PipelineError::Recognition(_) => "recognition",
            PipelineError::Translation { .. } => "translation",
        }
    }

    /// Text recognized before the failing stage, if any.
    pub fn recognized(&self) -> Option<&str> {
        match self {
            PipelineError::Translation { recognized, .. } => Some(recognized),
            _ => None,
        }
    }
}

/// Run one take-shot for `session`. Callers hold the shot queue's flight guard.
///
/// The main window always hears about recognized text: on translation failure
/// a `captured-text` event without translation goes out before the error.
pub async fn take_shot(
    state: &AppState,
    events: &broadcast::Sender<AppEvent>,
    session: &OverlaySession,
    region: CaptureRegion,
) -> Result<String, PipelineError> {
    state.status.begin_capture().await;
    let _ = events.send(AppEvent::ShotStatus {
        status: "Capturing".to_string(),
        capturing: true,
    });

    let result = run_stages(state, events, session, region).await;

    let (message, failed) = match &result {
        Ok(translated) if translated.is_empty() => ("No text found".to_string(), false),
        Ok(_) => ("Ready".to_string(), false),
        Err(e) => (format!("Failed: {e}"), true),
    };
    if failed {
        tracing::warn!("Take-shot failed: {message}");
    }
    state.status.finish_capture(message.clone(), failed).await;
    let _ = events.send(AppEvent::ShotStatus {
        status: message,
        capturing: false,
    });

    result
}

async fn run_stages(
    state: &AppState,
    events: &broadcast::Sender<AppEvent>,
    session: &OverlaySession,
    region: CaptureRegion,
) -> Result<String, PipelineError> {
    let work_area = state.screen.work_area()?;
    let screen_region = to_screen(region, work_area)?;
    tracing::debug!(?region, ?screen_region, "capture region mapped");

    let screen = Arc::clone(&state.screen);
    let image = tokio::task::spawn_blocking(move || screen.capture(screen_region))
        .await
        .map_err(|e| CaptureError::Capture(format!("Capture task failed: {e}")))??;
    tracing::debug!(bytes = image.len(), "screen captured");

    let raw = state
        .ocr
        .recognize_once(&session.source_tag_ocr, &image)
        .await?;
    let text = state.normalizer.normalize(&raw, &session.source_tag_ocr);
    tracing::debug!(chars = text.chars().count(), "text recognized");

    if text.trim().is_empty() {
        let _ = events.send(AppEvent::CapturedText {
            text,
            translated: Some(String::new()),
        });
        return Ok(String::new());
    }

    let translation = state
        .translator
        .translate(
            &text,
            session.source_tag_translate.clone(),
            session.target_tag_translate.clone(),
        )
        .await;

    let translated = match translation {
        Ok(translation) => {
            tracing::debug!(
                provider = %translation.provider,
                from = %translation.from,
                to = %translation.to,
                detected = ?translation.detected_source,
                "text translated"
            );
            translation.text
        }
        Err(source) => {
            let _ = events.send(AppEvent::CapturedText {
                text: text.clone(),
                translated: None,
            });
            return Err(PipelineError::Translation {
                recognized: text,
                source,
            });
        }
    };

    let _ = events.send(AppEvent::CapturedText {
        text: text.clone(),
        translated: Some(translated.clone()),
    });

    let auto_save = state.config.read().await.pipeline.auto_save;
    if auto_save {
        let pending = state.store.write(
            AUTO_SAVE_SQL,
            SqlParams::Positional(vec![
                json!(session.folder_id),
                json!(text),
                json!(translated),
            ]),
        );
        tokio::spawn(async move {
            match pending.await {
                Ok(outcome) => tracing::debug!("Auto-saved translation {}", outcome.last_insert_rowid),
                Err(e) => tracing::warn!("Auto-save failed: {e}"),
            }
        });
    }

    Ok(translated)
}
