use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, warn};

use super::frame;
use crate::hub::{ClientId, HubHandle};
use crate::message::MessageService;

/// Interval between keepalive pings on an otherwise idle connection
///
/// Pings double as a deadness probe: a client that never sends is only
/// detected when a ping write fails.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(50);

/// Reads frames from the peer until the connection dies
///
/// Each decoded message is submitted to the hub for fan-out and,
/// independently, to the message store; a persistence failure is logged and
/// never blocks or fails delivery. Every exit path requests unregister,
/// which closes the outbound queue and lets the write pump follow.
pub async fn read_pump<S, E>(
    mut stream: S,
    client_id: ClientId,
    room_id: String,
    hub: HubHandle,
    messages: Arc<MessageService>,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(received) = stream.next().await {
        let message = match received {
            Ok(Message::Text(text)) => match frame::parse_frame(&text, &room_id) {
                Ok(message) => message,
                Err(e) => {
                    warn!(
                        client_id = %client_id,
                        room_id = %room_id,
                        error = %e,
                        "Protocol error, terminating connection"
                    );
                    break;
                }
            },
            Ok(Message::Close(_)) => {
                debug!(client_id = %client_id, "Peer closed connection");
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!(client_id = %client_id, "Unexpected binary frame, terminating connection");
                break;
            }
            // Pings are answered by the transport; pongs need no handling
            Ok(_) => continue,
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "Read error, terminating connection");
                break;
            }
        };

        // Durability is independent of delivery: fire and forget, log failures
        let store = Arc::clone(&messages);
        let to_store = message.clone();
        tokio::spawn(async move {
            if let Err(e) = store.store_message(&to_store).await {
                warn!(
                    room_id = %to_store.room_id,
                    user_id = %to_store.user_id,
                    error = %e,
                    "Failed to persist chat message"
                );
            }
        });

        if let Err(e) = hub.broadcast(message).await {
            error!(client_id = %client_id, error = %e, "Hub gone, terminating connection");
            break;
        }
    }

    // No-op if the write pump requested unregister first
    if let Err(e) = hub.unregister(room_id, client_id).await {
        error!(client_id = %client_id, error = %e, "Hub gone during teardown");
    }
}

/// Flushes the client's outbound queue to the transport
///
/// Waits on whichever comes first, a queued message or the keepalive timer,
/// and writes it out. Exits when the queue closes (the hub dropped this
/// client) or a write fails; either way it starts the close handshake so the
/// read pump unblocks, and requests unregister for the write-failure case
/// the read pump cannot see.
pub async fn write_pump<S, E>(
    mut sink: S,
    mut outbound: mpsc::Receiver<String>,
    client_id: ClientId,
    room_id: String,
    hub: HubHandle,
    keepalive: Duration,
) where
    S: Sink<Message, Error = E> + Unpin,
    E: std::fmt::Display,
{
    let mut ping_timer = interval_at(Instant::now() + keepalive, keepalive);

    loop {
        tokio::select! {
            queued = outbound.recv() => {
                match queued {
                    Some(payload) => {
                        if let Err(e) = sink.send(Message::Text(payload)).await {
                            warn!(client_id = %client_id, error = %e, "Write error, terminating connection");
                            break;
                        }
                    }
                    None => {
                        debug!(client_id = %client_id, "Outbound queue closed");
                        break;
                    }
                }
            }
            _ = ping_timer.tick() => {
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    warn!(client_id = %client_id, error = %e, "Keepalive failed, terminating connection");
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;

    if let Err(e) = hub.unregister(room_id, client_id).await {
        error!(client_id = %client_id, error = %e, "Hub gone during teardown");
    }
}
