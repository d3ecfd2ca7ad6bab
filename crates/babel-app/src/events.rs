use std::future::Future;
use std::sync::Arc;

use babel_io::Inbound;
use babel_store::StoreError;
use babel_translator::TranslateError;
use babel_types::{AppEvent, Command, ErrorPayload, ServerMessage, ShapePart};
use kanal::{AsyncReceiver, AsyncSender};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::pipeline::PipelineError;
use crate::state::AppState;

pub mod database;
pub mod info;
pub mod overlay;
pub mod take_shot;
pub mod translate;

use database::{handle_db_read, handle_db_write};
use info::handle_get_info;
use overlay::{begin_close_overlay, finish_close_overlay, handle_new_overlay, handle_shape_update};
use take_shot::handle_take_shot;
use translate::handle_translate;

/// Failure of a single command, reported back to the requesting client.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Translation failed: {0}")]
    Translate(#[from] TranslateError),
}

impl CommandError {
    pub fn payload(&self) -> ErrorPayload {
        let kind = match self {
            CommandError::Pipeline(e) => e.kind(),
            CommandError::Store(e) => e.kind(),
            CommandError::Translate(_) => "translation",
        };
        let recognized = match self {
            CommandError::Pipeline(e) => e.recognized().map(str::to_string),
            _ => None,
        };
        ErrorPayload {
            kind: kind.to_string(),
            message: self.to_string(),
            recognized,
        }
    }
}

pub type CommandResult = Result<Value, CommandError>;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    inbound_rx: AsyncReceiver<Inbound>,
    events: broadcast::Sender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("Event loop started");
    loop {
        let inbound = tokio::select! {
            _ = cancel.cancelled() => break,
            inbound = inbound_rx.recv() => inbound?,
        };
        handle_command(&state, &events, inbound).await;
    }
    tracing::info!("Event loop stopped");
    Ok(())
}

/// Dispatch one command.
///
/// Anything that must be ordered (queue positions, session changes) happens
/// here before the next command is read; slow work is spawned.
async fn handle_command(state: &Arc<AppState>, events: &broadcast::Sender<AppEvent>, inbound: Inbound) {
    let Inbound { request, reply } = inbound;
    let id = request.id;
    tracing::debug!("Command received: {:?}", request.command);

    match request.command {
        Command::TakeShot(region) => {
            let session = state.overlay().session();
            let ticket = state.shots.enter();
            spawn_reply(
                reply,
                id,
                handle_take_shot(state.clone(), events.clone(), session, ticket, region),
            );
        }
        Command::NewOverlay(session) => {
            let result = handle_new_overlay(state, events, session);
            send_reply(&reply, id, result).await;
        }
        Command::CloseOverlay => {
            let ticket = begin_close_overlay(state, events);
            spawn_reply(reply, id, finish_close_overlay(state.clone(), ticket));
        }
        Command::UpdateMenuBounds(rect) => handle_shape_update(state, events, ShapePart::Menu, rect),
        Command::UpdateSelectionBounds(rect) => {
            handle_shape_update(state, events, ShapePart::Selection, rect)
        }
        Command::UpdateTextBoxBounds(rect) => {
            handle_shape_update(state, events, ShapePart::TextBox, rect)
        }
        Command::DbWrite { sql, params } => {
            spawn_reply(reply, id, handle_db_write(state, sql, params));
        }
        Command::DbRead { mode, sql, params } => {
            spawn_reply(reply, id, handle_db_read(state.clone(), mode, sql, params));
        }
        Command::Translate {
            text,
            source_tag,
            target_tag,
        } => {
            spawn_reply(
                reply,
                id,
                handle_translate(state.clone(), text, source_tag, target_tag),
            );
        }
        Command::GetInfo => {
            let result = handle_get_info(state).await;
            send_reply(&reply, id, result).await;
        }
    }
}

async fn send_reply(reply: &AsyncSender<ServerMessage>, id: Option<u64>, result: CommandResult) {
    let message = match result {
        Ok(value) => ServerMessage::ok(id, value),
        Err(e) => {
            tracing::debug!("Command {id:?} failed: {e}");
            ServerMessage::err(id, e.payload())
        }
    };
    if reply.send(message).await.is_err() {
        tracing::debug!("Client gone before reply {id:?}");
    }
}

fn spawn_reply<F>(reply: AsyncSender<ServerMessage>, id: Option<u64>, task: F)
where
    F: Future<Output = CommandResult> + Send + 'static,
{
    tokio::spawn(async move {
        let result = task.await;
        send_reply(&reply, id, result).await;
    });
}
