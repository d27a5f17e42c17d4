use axum::{
    extract::{ws::WebSocket, Query, State, WebSocketUpgrade},
    response::Response,
};
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use super::pump::{self, KEEPALIVE_INTERVAL};
use crate::hub::{ClientHandle, ClientState, OUTBOUND_QUEUE_CAPACITY};
use crate::message::MessageService;
use crate::room::RoomService;
use crate::shared::{AppError, AppState};
use crate::user::{models::UserModel, UserService};

/// Query parameters carried by the upgrade request
///
/// Identity is resolved by the REST layer before the client connects; the
/// upgrade only names the already-known user and the room to join.
#[derive(Debug, Deserialize)]
pub struct WebsocketQuery {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub user_id: String,
}

/// WebSocket endpoint binding one connection to one room
///
/// GET /websocket?room_id={room_id}&user_id={user_id}
/// A client wanting a different room disconnects and reconnects.
#[instrument(name = "websocket_handler", skip(ws, state))]
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WebsocketQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if query.room_id.is_empty() || query.user_id.is_empty() {
        return Err(AppError::BadRequest(
            "missing room_id or user_id query parameter".to_string(),
        ));
    }

    let user = UserService::new(Arc::clone(&state.user_repository))
        .get_user(&query.user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let room = RoomService::new(Arc::clone(&state.room_repository))
        .get_room(&query.room_id)
        .await?
        .ok_or(AppError::NotFound("Room not found".to_string()))?;

    info!(
        room_id = %room.id,
        user_id = %user.id,
        username = %user.username,
        "WebSocket connection accepted"
    );

    Ok(ws.on_upgrade(move |socket| handle_connection(socket, room.id, user, state)))
}

/// Runs one upgraded connection to completion
///
/// Registers a client handle with the hub, splits the socket, and spawns the
/// two pumps. Teardown cascades on its own: whichever pump dies first
/// requests unregister, the closed queue or close handshake takes the other
/// pump down, and the second unregister is a no-op.
async fn handle_connection(socket: WebSocket, room_id: String, user: UserModel, state: AppState) {
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    let client = ClientHandle::new(
        user.id.clone(),
        user.username.clone(),
        user.user_image.clone(),
        room_id.clone(),
        outbound_tx,
    );
    let client_id = client.id;

    if let Err(e) = state.hub.register(client).await {
        error!(error = %e, "Hub gone, dropping fresh connection");
        return;
    }

    let messages = Arc::new(MessageService::new(Arc::clone(&state.message_repository)));
    let (ws_sink, ws_stream) = socket.split();

    let write = tokio::spawn(pump::write_pump(
        ws_sink,
        outbound_rx,
        client_id,
        room_id.clone(),
        state.hub.clone(),
        KEEPALIVE_INTERVAL,
    ));
    let read = tokio::spawn(pump::read_pump(
        ws_stream,
        client_id,
        room_id.clone(),
        state.hub.clone(),
        messages,
    ));

    let _ = tokio::join!(read, write);

    info!(
        client_id = %client_id,
        user_id = %user.id,
        room_id = %room_id,
        state = ?ClientState::Closed,
        "Connection torn down"
    );
}
