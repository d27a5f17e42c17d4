use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Identifier for one live connection
///
/// Distinct from the user id: the same user may hold several connections,
/// each with its own client id, queue and room binding.
pub type ClientId = Uuid;

/// Capacity of each client's outbound queue
///
/// Bounds the memory a slow consumer can pin; overflow disconnects the
/// client instead of growing the queue or blocking the hub.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Liveness of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Created, registration not yet processed by the hub
    Connecting,
    /// Member of its room, receiving broadcasts
    Active,
    /// Removal in progress; receives no further broadcasts
    Closing,
    /// Both pumps have exited and the hub has dropped the handle
    Closed,
}

/// The hub's handle to one connection
///
/// Holds the identity snapshot resolved at upgrade time and the sending end
/// of the client's outbound queue. The handle lives in the room index and is
/// dropped on unregister, which closes the queue and lets the write pump
/// terminate.
#[derive(Debug)]
pub struct ClientHandle {
    pub id: ClientId,
    pub user_id: String,
    pub username: String,
    pub user_image: String,
    pub room_id: String,
    pub state: ClientState,
    sender: mpsc::Sender<String>,
}

impl ClientHandle {
    pub fn new(
        user_id: String,
        username: String,
        user_image: String,
        room_id: String,
        sender: mpsc::Sender<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            username,
            user_image,
            room_id,
            state: ClientState::Connecting,
            sender,
        }
    }

    /// Non-blocking enqueue onto the client's outbound queue
    ///
    /// Never awaits: a full queue is the caller's signal to disconnect this
    /// client rather than stall.
    pub(crate) fn try_deliver(&self, payload: String) -> Result<(), TrySendError<String>> {
        self.sender.try_send(payload)
    }
}
