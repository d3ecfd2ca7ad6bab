use std::sync::Arc;

use babel_io::Inbound;
use babel_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::events::overlay::{begin_close_overlay, finish_close_overlay};
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub inbound: (AsyncSender<Inbound>, AsyncReceiver<Inbound>),
    pub events: broadcast::Sender<AppEvent>,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            inbound: kanal::bounded_async(64),   // client commands
            events: broadcast::channel(256).0, // OCR burst capacity
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    #[cfg(test)]
    pub fn inbound(&self) -> AsyncSender<Inbound> {
        self.channels.inbound.0.clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.channels.events.subscribe()
    }

    pub fn spawn_event_loop(&self, tasks: &mut JoinSet<anyhow::Result<()>>) {
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.inbound.1.clone(),
            self.channels.events.clone(),
            self.cancel_token.child_token(),
        ));
    }

    pub fn spawn_tasks(&self, listener: TcpListener) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        self.spawn_event_loop(&mut tasks);

        // WebSocket bridge
        tasks.spawn(babel_io::serve(
            listener,
            self.channels.inbound.0.clone(),
            self.channels.events.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    /// Close the overlay, stop the tasks, then drain and close the database.
    pub async fn shutdown(&self) {
        let ticket = begin_close_overlay(&self.state, &self.channels.events);
        if let Err(e) = finish_close_overlay(self.state.clone(), ticket).await {
            tracing::warn!("Overlay close during shutdown failed: {e}");
        }

        self.cancel_token.cancel();
        self.state.store.shutdown().await;
    }
}
