//! Local WebSocket bridge between UI clients and the app event loop.
//!
//! Every text frame is a JSON [`Request`]. Requests are forwarded to the app as
//! [`Inbound`] together with a reply channel for the originating connection.
//! App events are broadcast to all connected clients.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use babel_types::{AppEvent, ErrorPayload, Request, ServerMessage};
use futures_util::{SinkExt, Stream, StreamExt};
use kanal::AsyncSender;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

/// A client request plus the way back to the client that sent it.
pub struct Inbound {
    pub request: Request,
    pub reply: AsyncSender<ServerMessage>,
}

pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind WebSocket listener on {addr}"))
}

/// Accept clients until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    inbound_tx: AsyncSender<Inbound>,
    events: broadcast::Sender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("WebSocket bridge listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted.context("Failed to accept client")?,
        };

        let inbound_tx = inbound_tx.clone();
        let events = events.subscribe();
        let cancel = cancel.child_token();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, peer, inbound_tx, events, cancel).await {
                tracing::warn!("Client {peer} disconnected with error: {e}");
            }
        });
    }

    tracing::info!("WebSocket bridge stopped");
    Ok(())
}

/// How long a closing connection waits for replies still being computed.
const FLUSH_GRACE: Duration = Duration::from_secs(2);

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    inbound_tx: AsyncSender<Inbound>,
    mut events: broadcast::Receiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream)
        .await
        .context("WebSocket handshake failed")?;
    let (mut write, mut read) = ws_stream.split();
    tracing::info!("Client connected: {peer}");

    let (reply_tx, reply_rx) = kanal::bounded_async::<ServerMessage>(64);

    // Separate from `cancel` so shutdown still lets pending replies out
    let writer_stop = CancellationToken::new();
    let stop = writer_stop.clone();
    let mut writer = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                _ = stop.cancelled() => break,
                reply = reply_rx.recv() => match reply {
                    Ok(reply) => reply,
                    Err(_) => break,
                },
                event = events.recv() => match event {
                    Ok(event) => ServerMessage::Event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Client {peer} lagging, dropped {skipped} events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to encode message: {e}");
                    continue;
                }
            };
            if write.send(Message::text(text)).await.is_err() {
                break;
            }
        }
        let _ = write.close().await;
    });

    let result = read_requests(&mut read, peer, &inbound_tx, &reply_tx, &cancel).await;

    // The writer ends once every in-flight command has answered and dropped its
    // reply sender; after the grace period it is stopped regardless.
    drop(reply_tx);
    if tokio::time::timeout(FLUSH_GRACE, &mut writer).await.is_err() {
        tracing::debug!("Client {peer} still had replies pending, dropping them");
        writer_stop.cancel();
        let _ = writer.await;
    }
    cancel.cancel();
    tracing::info!("Client disconnected: {peer}");
    result
}

/// Forward requests until the client closes, `cancel` fires or the app is gone.
async fn read_requests<S>(
    read: &mut S,
    peer: SocketAddr,
    inbound_tx: &AsyncSender<Inbound>,
    reply_tx: &AsyncSender<ServerMessage>,
    cancel: &CancellationToken,
) -> anyhow::Result<()>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(frame) = tokio::select! {
        _ = cancel.cancelled() => None,
        frame = read.next() => frame,
    } {
        let frame = frame.context("Failed to read frame")?;
        if frame.is_close() {
            break;
        }
        if !frame.is_text() {
            continue;
        }

        let text = frame.to_text().context("Frame is not UTF-8")?;
        match serde_json::from_str::<Request>(text) {
            Ok(request) => {
                tracing::debug!("Request from {peer}: {:?}", request.command);
                inbound_tx
                    .send(Inbound {
                        request,
                        reply: reply_tx.clone(),
                    })
                    .await
                    .context("App event loop is gone")?;
            }
            Err(e) => {
                let id = serde_json::from_str::<serde_json::Value>(text)
                    .ok()
                    .and_then(|v| v.get("id").and_then(serde_json::Value::as_u64));
                let _ = reply_tx
                    .send(ServerMessage::err(
                        id,
                        ErrorPayload {
                            kind: "bad-request".into(),
                            message: e.to_string(),
                            recognized: None,
                        },
                    ))
                    .await;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use babel_types::{Command, ReadMode};
    use serde_json::json;
    use tokio::time::timeout;
    use tokio_tungstenite::connect_async;

    use super::*;

    async fn start() -> (
        String,
        kanal::AsyncReceiver<Inbound>,
        broadcast::Sender<AppEvent>,
        CancellationToken,
    ) {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (inbound_tx, inbound_rx) = kanal::bounded_async(16);
        let (events, _) = broadcast::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(serve(listener, inbound_tx, events.clone(), cancel.clone()));
        (url, inbound_rx, events, cancel)
    }

    async fn next_json<S>(read: &mut S) -> serde_json::Value
    where
        S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        let frame = timeout(Duration::from_secs(2), read.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        serde_json::from_str(frame.to_text().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn forwards_requests_and_returns_replies() {
        let (url, inbound_rx, _events, cancel) = start().await;
        let (ws, _) = connect_async(&url).await.unwrap();
        let (mut write, mut read) = ws.split();

        let request = json!({
            "id": 3,
            "command": { "type": "db-read", "payload": { "mode": "all", "sql": "SELECT 1" } }
        });
        write.send(Message::text(request.to_string())).await.unwrap();

        let inbound = timeout(Duration::from_secs(2), inbound_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inbound.request.id, Some(3));
        assert!(matches!(
            inbound.request.command,
            Command::DbRead { mode: ReadMode::All, .. }
        ));

        inbound
            .reply
            .send(ServerMessage::ok(Some(3), json!([{ "1": 1 }])))
            .await
            .unwrap();

        let reply = next_json(&mut read).await;
        assert_eq!(reply["kind"], "response");
        assert_eq!(reply["id"], 3);
        assert_eq!(reply["result"], json!([{ "1": 1 }]));

        cancel.cancel();
    }

    #[tokio::test]
    async fn broadcasts_events_to_clients() {
        let (url, _inbound_rx, events, cancel) = start().await;
        let (ws, _) = connect_async(&url).await.unwrap();
        let (_write, mut read) = ws.split();

        // Subscription happens on accept; wait for it before sending
        timeout(Duration::from_secs(2), async {
            while events.receiver_count() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        events.send(AppEvent::OverlayClosed).unwrap();

        let message = next_json(&mut read).await;
        assert_eq!(message["kind"], "event");
        assert_eq!(message["event"], "overlay-closed");

        cancel.cancel();
    }

    #[tokio::test]
    async fn malformed_request_gets_error_reply() {
        let (url, _inbound_rx, _events, cancel) = start().await;
        let (ws, _) = connect_async(&url).await.unwrap();
        let (mut write, mut read) = ws.split();

        write
            .send(Message::text(
                r#"{"id": 9, "command": {"type": "launch-rockets"}}"#.to_string(),
            ))
            .await
            .unwrap();

        let reply = next_json(&mut read).await;
        assert_eq!(reply["id"], 9);
        assert_eq!(reply["error"]["kind"], "bad-request");

        cancel.cancel();
    }

    #[tokio::test]
    async fn pending_reply_is_delivered_after_shutdown() {
        let (url, inbound_rx, _events, cancel) = start().await;
        let (ws, _) = connect_async(&url).await.unwrap();
        let (mut write, mut read) = ws.split();

        let request = json!({ "id": 4, "command": { "type": "get-info" } });
        write.send(Message::text(request.to_string())).await.unwrap();
        let inbound = timeout(Duration::from_secs(2), inbound_rx.recv())
            .await
            .unwrap()
            .unwrap();

        // The reader stops here, while the command is still being answered
        cancel.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;

        inbound
            .reply
            .send(ServerMessage::ok(Some(4), json!("late answer")))
            .await
            .unwrap();
        drop(inbound);

        let reply = next_json(&mut read).await;
        assert_eq!(reply["id"], 4);
        assert_eq!(reply["result"], "late answer");

        // Then the connection closes
        let closed = timeout(Duration::from_secs(2), async {
            while let Some(Ok(frame)) = read.next().await {
                if frame.is_close() {
                    break;
                }
            }
        })
        .await;
        assert!(closed.is_ok());
    }
}
