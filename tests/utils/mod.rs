use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use chathub::{ChatMessage, ClientHandle, Hub, HubHandle};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);

// ============================================================================
// Hub test harness: channel-backed clients, no sockets
// ============================================================================

/// A registered test client: its id plus the receiving end of its outbound queue
pub struct TestClient {
    pub id: chathub::ClientId,
    pub receiver: mpsc::Receiver<String>,
}

impl TestClient {
    /// Receives the next delivery, decoded; panics after `RECV_TIMEOUT`
    pub async fn recv(&mut self) -> ChatMessage {
        let payload = timeout(RECV_TIMEOUT, self.receiver.recv())
            .await
            .expect("timed out waiting for delivery")
            .expect("outbound queue closed unexpectedly");
        serde_json::from_str(&payload).expect("delivered payload is not a chat message")
    }

    /// True once the hub has dropped this client's handle
    pub async fn queue_closed(&mut self) -> bool {
        // Drain whatever was delivered before the close
        loop {
            match timeout(RECV_TIMEOUT, self.receiver.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => return true,
                Err(_) => return false,
            }
        }
    }

    pub fn no_pending_delivery(&mut self) -> bool {
        self.receiver.try_recv().is_err()
    }
}

pub fn spawn_hub() -> HubHandle {
    let (hub, handle) = Hub::new();
    tokio::spawn(hub.run());
    handle
}

/// Registers a client with a queue of the given capacity and hands back the
/// consuming side
pub async fn join_room(
    hub: &HubHandle,
    username: &str,
    room_id: &str,
    capacity: usize,
) -> TestClient {
    let (sender, receiver) = mpsc::channel(capacity);
    let client = ClientHandle::new(
        format!("user-{}", username),
        username.to_string(),
        "http://localhost/avatar.png".to_string(),
        room_id.to_string(),
        sender,
    );
    let id = client.id;
    hub.register(client).await.expect("hub is gone");

    TestClient { id, receiver }
}

pub fn chat(room_id: &str, username: &str, text: &str) -> ChatMessage {
    ChatMessage {
        message: text.to_string(),
        user_id: format!("user-{}", username),
        username: username.to_string(),
        user_image: "http://localhost/avatar.png".to_string(),
        room_id: room_id.to_string(),
        timestamp: Utc::now(),
    }
}
