use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use super::client::{ClientHandle, ClientId, ClientState};
use crate::message::models::ChatMessage;

/// Capacity of each of the hub's three intake queues
const INTAKE_QUEUE_CAPACITY: usize = 64;

/// Error returned when an intake queue is gone
///
/// The hub runs for the life of the process, so a closed intake queue means
/// the hub task itself has died. There is no in-process recovery; callers
/// surface the error and abandon the connection.
#[derive(Debug, Error)]
#[error("hub intake queue closed: {0}")]
pub struct HubError(&'static str);

/// Request to remove a client from its room
#[derive(Debug)]
pub struct Deregistration {
    pub room_id: String,
    pub client_id: ClientId,
}

/// The connection registry and broadcast dispatcher
///
/// One instance per process, constructed at startup and driven by [`Hub::run`]
/// until shutdown. The room index is owned exclusively by the run loop; every
/// actor that wants a mutation submits an event through the [`HubHandle`] and
/// the loop applies events one at a time, so membership changes never race.
pub struct Hub {
    /// room id -> members, keyed by client id
    rooms: HashMap<String, HashMap<ClientId, ClientHandle>>,
    register_rx: mpsc::Receiver<ClientHandle>,
    unregister_rx: mpsc::Receiver<Deregistration>,
    broadcast_rx: mpsc::Receiver<ChatMessage>,
}

/// Cloneable submission side of the hub's intake queues
#[derive(Debug, Clone)]
pub struct HubHandle {
    register_tx: mpsc::Sender<ClientHandle>,
    unregister_tx: mpsc::Sender<Deregistration>,
    broadcast_tx: mpsc::Sender<ChatMessage>,
}

impl HubHandle {
    /// Adds a client to its room's member set
    pub async fn register(&self, client: ClientHandle) -> Result<(), HubError> {
        self.register_tx
            .send(client)
            .await
            .map_err(|_| HubError("register"))
    }

    /// Removes a client from its room; a no-op if it is already gone
    pub async fn unregister(&self, room_id: String, client_id: ClientId) -> Result<(), HubError> {
        self.unregister_tx
            .send(Deregistration { room_id, client_id })
            .await
            .map_err(|_| HubError("unregister"))
    }

    /// Fans a message out to every current member of its room
    pub async fn broadcast(&self, message: ChatMessage) -> Result<(), HubError> {
        self.broadcast_tx
            .send(message)
            .await
            .map_err(|_| HubError("broadcast"))
    }
}

impl Hub {
    /// Creates the hub and its submission handle
    pub fn new() -> (Self, HubHandle) {
        let (register_tx, register_rx) = mpsc::channel(INTAKE_QUEUE_CAPACITY);
        let (unregister_tx, unregister_rx) = mpsc::channel(INTAKE_QUEUE_CAPACITY);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(INTAKE_QUEUE_CAPACITY);

        let hub = Self {
            rooms: HashMap::new(),
            register_rx,
            unregister_rx,
            broadcast_rx,
        };
        let handle = HubHandle {
            register_tx,
            unregister_tx,
            broadcast_tx,
        };

        (hub, handle)
    }

    /// Drives the hub until every handle is dropped
    ///
    /// Processes exactly one event to completion before taking the next;
    /// this serialization is what makes room-index mutation race-free. The
    /// loop never touches the network, so no single connection can stall it.
    pub async fn run(mut self) {
        info!("Hub started");

        loop {
            tokio::select! {
                Some(client) = self.register_rx.recv() => self.register(client),
                Some(request) = self.unregister_rx.recv() => self.unregister(request),
                Some(message) = self.broadcast_rx.recv() => self.broadcast(message),
                else => break,
            }
        }

        info!("Hub stopped");
    }

    fn register(&mut self, mut client: ClientHandle) {
        client.state = ClientState::Active;

        info!(
            client_id = %client.id,
            user_id = %client.user_id,
            username = %client.username,
            room_id = %client.room_id,
            "Client registered"
        );

        self.rooms
            .entry(client.room_id.clone())
            .or_default()
            .insert(client.id, client);
    }

    fn unregister(&mut self, request: Deregistration) {
        let Some(members) = self.rooms.get_mut(&request.room_id) else {
            debug!(
                client_id = %request.client_id,
                room_id = %request.room_id,
                "Unregister for unknown room ignored"
            );
            return;
        };

        // Idempotent: both pumps request unregister on teardown and the
        // second request finds the client already gone.
        match members.remove(&request.client_id) {
            Some(mut client) => {
                client.state = ClientState::Closing;
                info!(
                    client_id = %client.id,
                    username = %client.username,
                    room_id = %request.room_id,
                    state = ?client.state,
                    "Client unregistered"
                );
                // Dropping the handle closes the outbound queue, which lets
                // the write pump terminate.
            }
            None => {
                debug!(
                    client_id = %request.client_id,
                    room_id = %request.room_id,
                    "Unregister for absent client ignored"
                );
            }
        }

        if members.is_empty() {
            self.rooms.remove(&request.room_id);
        }
    }

    fn broadcast(&mut self, message: ChatMessage) {
        let Some(members) = self.rooms.get_mut(&message.room_id) else {
            // Benign: the last member may have left while the message was in
            // the intake queue.
            debug!(room_id = %message.room_id, "Broadcast to room with no members dropped");
            return;
        };

        let payload = match serde_json::to_string(&message) {
            Ok(payload) => payload,
            Err(e) => {
                error!(room_id = %message.room_id, error = %e, "Failed to encode broadcast");
                return;
            }
        };

        let mut stale: Vec<ClientId> = Vec::new();
        for member in members.values_mut() {
            if member.state != ClientState::Active {
                continue;
            }

            match member.try_deliver(payload.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        client_id = %member.id,
                        username = %member.username,
                        room_id = %message.room_id,
                        "Outbound queue saturated, disconnecting slow consumer"
                    );
                    member.state = ClientState::Closing;
                    stale.push(member.id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(
                        client_id = %member.id,
                        room_id = %message.room_id,
                        "Outbound queue already closed, dropping client"
                    );
                    member.state = ClientState::Closing;
                    stale.push(member.id);
                }
            }
        }

        // Evict after the delivery sweep so the iteration above never
        // observes a half-removed member set.
        for client_id in stale {
            members.remove(&client_id);
        }
        if members.is_empty() {
            self.rooms.remove(&message.room_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use tokio::time::timeout;

    const RECV_TIMEOUT: Duration = Duration::from_secs(1);

    /// Test helper functions for driving the hub without real sockets
    mod helpers {
        use super::*;

        pub fn spawn_hub() -> HubHandle {
            let (hub, handle) = Hub::new();
            tokio::spawn(hub.run());
            handle
        }

        /// Creates a client handle whose outbound queue the test consumes directly
        pub fn test_client(
            username: &str,
            room_id: &str,
            capacity: usize,
        ) -> (ClientHandle, mpsc::Receiver<String>) {
            let (sender, receiver) = mpsc::channel(capacity);
            let client = ClientHandle::new(
                format!("user-{}", username),
                username.to_string(),
                "http://localhost/avatar.png".to_string(),
                room_id.to_string(),
                sender,
            );
            (client, receiver)
        }

        pub fn test_message(room_id: &str, text: &str) -> ChatMessage {
            ChatMessage {
                message: text.to_string(),
                user_id: "user-alice".to_string(),
                username: "alice".to_string(),
                user_image: "http://localhost/avatar.png".to_string(),
                room_id: room_id.to_string(),
                timestamp: Utc::now(),
            }
        }

        pub async fn recv_chat(receiver: &mut mpsc::Receiver<String>) -> ChatMessage {
            let payload = timeout(RECV_TIMEOUT, receiver.recv())
                .await
                .expect("timed out waiting for delivery")
                .expect("queue closed unexpectedly");
            serde_json::from_str(&payload).expect("delivered payload is not a chat message")
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn test_broadcast_reaches_all_room_members() {
        let hub = spawn_hub();

        let (alice, mut alice_rx) = test_client("alice", "r1", 8);
        let (bob, mut bob_rx) = test_client("bob", "r1", 8);
        hub.register(alice).await.unwrap();
        hub.register(bob).await.unwrap();

        hub.broadcast(test_message("r1", "hello")).await.unwrap();

        assert_eq!(recv_chat(&mut alice_rx).await.message, "hello");
        assert_eq!(recv_chat(&mut bob_rx).await.message, "hello");
    }

    #[tokio::test]
    async fn test_no_cross_room_leakage() {
        let hub = spawn_hub();

        let (x, mut x_rx) = test_client("x", "r1", 8);
        let (y, mut y_rx) = test_client("y", "r2", 8);
        let (z, mut z_rx) = test_client("z", "r1", 8);
        hub.register(x).await.unwrap();
        hub.register(y).await.unwrap();
        hub.register(z).await.unwrap();

        hub.broadcast(test_message("r1", "hello")).await.unwrap();

        // Delivery to the r1 members proves the event was fully processed,
        // so the absence check on r2 is not racing the hub loop.
        assert_eq!(recv_chat(&mut x_rx).await.message, "hello");
        assert_eq!(recv_chat(&mut z_rx).await.message, "hello");
        assert!(y_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregistered_client_receives_nothing() {
        let hub = spawn_hub();

        let (alice, mut alice_rx) = test_client("alice", "r1", 8);
        let (bob, mut bob_rx) = test_client("bob", "r1", 8);
        let alice_id = alice.id;
        hub.register(alice).await.unwrap();
        hub.register(bob).await.unwrap();

        hub.unregister("r1".to_string(), alice_id).await.unwrap();
        hub.broadcast(test_message("r1", "after-leave")).await.unwrap();

        assert_eq!(recv_chat(&mut bob_rx).await.message, "after-leave");

        // The handle was dropped on unregister, so the queue closes without
        // ever carrying the broadcast.
        let leftover = timeout(RECV_TIMEOUT, alice_rx.recv()).await.unwrap();
        assert!(leftover.is_none());
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let hub = spawn_hub();

        let (alice, _alice_rx) = test_client("alice", "r1", 8);
        let (bob, mut bob_rx) = test_client("bob", "r1", 8);
        let alice_id = alice.id;
        hub.register(alice).await.unwrap();
        hub.register(bob).await.unwrap();

        // Both pumps racing to unregister, plus a request for a room that
        // never existed; none of these may disturb the remaining member.
        hub.unregister("r1".to_string(), alice_id).await.unwrap();
        hub.unregister("r1".to_string(), alice_id).await.unwrap();
        hub.unregister("ghost-room".to_string(), alice_id).await.unwrap();

        hub.broadcast(test_message("r1", "still-here")).await.unwrap();
        assert_eq!(recv_chat(&mut bob_rx).await.message, "still-here");
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_room_is_a_noop() {
        let hub = spawn_hub();

        let (alice, mut alice_rx) = test_client("alice", "r1", 8);
        hub.register(alice).await.unwrap();

        hub.broadcast(test_message("ghost-room", "lost")).await.unwrap();
        hub.broadcast(test_message("r1", "marker")).await.unwrap();

        // Only the marker arrives; the unknown-room broadcast vanished.
        assert_eq!(recv_chat(&mut alice_rx).await.message, "marker");
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_slow_consumer_is_evicted_and_others_unaffected() {
        let hub = spawn_hub();

        // Slow client with a single-slot queue that nothing ever drains.
        let (slow, mut slow_rx) = test_client("slow", "r1", 1);
        let (fast, mut fast_rx) = test_client("fast", "r1", 8);
        hub.register(slow).await.unwrap();
        hub.register(fast).await.unwrap();

        // First broadcast fills the slow queue; second overflows it and
        // evicts the client.
        hub.broadcast(test_message("r1", "one")).await.unwrap();
        hub.broadcast(test_message("r1", "two")).await.unwrap();
        hub.broadcast(test_message("r1", "three")).await.unwrap();

        // The fast member sees every message regardless.
        assert_eq!(recv_chat(&mut fast_rx).await.message, "one");
        assert_eq!(recv_chat(&mut fast_rx).await.message, "two");
        assert_eq!(recv_chat(&mut fast_rx).await.message, "three");

        // The slow member got the one message that fit, then its queue was
        // closed by eviction.
        assert_eq!(recv_chat(&mut slow_rx).await.message, "one");
        let leftover = timeout(RECV_TIMEOUT, slow_rx.recv()).await.unwrap();
        assert!(leftover.is_none());
    }

    #[tokio::test]
    async fn test_per_client_delivery_is_fifo() {
        let hub = spawn_hub();

        let (alice, mut alice_rx) = test_client("alice", "r1", 16);
        hub.register(alice).await.unwrap();

        for i in 0..10 {
            hub.broadcast(test_message("r1", &format!("msg-{}", i)))
                .await
                .unwrap();
        }

        for i in 0..10 {
            assert_eq!(recv_chat(&mut alice_rx).await.message, format!("msg-{}", i));
        }
    }

    #[tokio::test]
    async fn test_relayed_fields_are_unmodified() {
        let hub = spawn_hub();

        let (bob, mut bob_rx) = test_client("bob", "r1", 8);
        hub.register(bob).await.unwrap();

        let sent = test_message("r1", "hi");
        hub.broadcast(sent.clone()).await.unwrap();

        let received = recv_chat(&mut bob_rx).await;
        assert_eq!(received, sent);
    }
}
