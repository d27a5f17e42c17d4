use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::RoomService,
    types::{RoomCreateRequest, RoomResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new room
///
/// POST /room
/// Returns room information with generated id
#[instrument(name = "create_room", skip(state))]
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<RoomCreateRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    info!(room_name = %request.name, "Creating new room");

    let service = RoomService::new(Arc::clone(&state.room_repository));
    let room = service.create_room(request).await?;

    Ok(Json(room))
}

/// HTTP handler for listing all rooms
///
/// GET /rooms
/// Returns array of all available rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let service = RoomService::new(Arc::clone(&state.room_repository));
    let rooms = service.list_rooms().await?;

    info!(room_count = rooms.len(), "Rooms listed successfully");

    Ok(Json(rooms))
}

/// HTTP handler for fetching an arbitrary room
///
/// GET /room
/// Frontends use this to pick a default room; 404 when no rooms exist
#[instrument(name = "get_any_room", skip(state))]
pub async fn get_any_room(State(state): State<AppState>) -> Result<Json<RoomResponse>, AppError> {
    let service = RoomService::new(Arc::clone(&state.room_repository));
    let room = service.get_any_room().await?;

    info!(room_id = %room.id, "Default room served");

    Ok(Json(room))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::repository::InMemoryRoomRepository;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn room_app(state: AppState) -> Router {
        Router::new()
            .route("/rooms", axum::routing::get(list_rooms))
            .route("/room", axum::routing::post(create_room))
            .route("/room", axum::routing::get(get_any_room))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_create_room_handler() {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository)
            .build();
        let app = room_app(app_state);

        let request_body = r#"{"name": "general"}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/room")
            .header("content-type", "application/json")
            .body(Body::from(request_body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let room_response: RoomResponse = serde_json::from_slice(&body).unwrap();

        assert!(!room_response.id.is_empty());
        assert_eq!(room_response.name, "general");
    }

    #[tokio::test]
    async fn test_create_room_handler_invalid_json() {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository)
            .build();
        let app = room_app(app_state);

        let request_body = r#"{"invalid": "json"}"#; // Missing name field
        let request = Request::builder()
            .method("POST")
            .uri("/room")
            .header("content-type", "application/json")
            .body(Body::from(request_body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        // 422 Unprocessable Entity for a structurally invalid body
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_room_handler_malformed_json() {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository)
            .build();
        let app = room_app(app_state);

        let request_body = r#"{"name": "gene"#; // Malformed JSON
        let request = Request::builder()
            .method("POST")
            .uri("/room")
            .header("content-type", "application/json")
            .body(Body::from(request_body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rooms_handler_empty() {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository)
            .build();
        let app = room_app(app_state);

        let request = Request::builder()
            .method("GET")
            .uri("/rooms")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let rooms: Vec<RoomResponse> = serde_json::from_slice(&body).unwrap();
        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn test_list_rooms_handler_with_rooms() {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository.clone())
            .build();

        // Create some rooms first using the service directly
        let service = RoomService::new(room_repository);
        let created_room1 = service
            .create_room(RoomCreateRequest {
                name: "room-1".to_string(),
            })
            .await
            .unwrap();
        let created_room2 = service
            .create_room(RoomCreateRequest {
                name: "room-2".to_string(),
            })
            .await
            .unwrap();

        let app = room_app(app_state);

        let request = Request::builder()
            .method("GET")
            .uri("/rooms")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let rooms: Vec<RoomResponse> = serde_json::from_slice(&body).unwrap();

        assert_eq!(rooms.len(), 2);

        // Verify both rooms are present (order may vary)
        let room_ids: std::collections::HashSet<String> =
            rooms.iter().map(|r| r.id.clone()).collect();
        assert!(room_ids.contains(&created_room1.id));
        assert!(room_ids.contains(&created_room2.id));
    }

    #[tokio::test]
    async fn test_get_any_room_handler_empty() {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository)
            .build();
        let app = room_app(app_state);

        let request = Request::builder()
            .method("GET")
            .uri("/room")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_any_room_handler_returns_room() {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository.clone())
            .build();

        let service = RoomService::new(room_repository);
        let created = service
            .create_room(RoomCreateRequest {
                name: "general".to_string(),
            })
            .await
            .unwrap();

        let app = room_app(app_state);

        let request = Request::builder()
            .method("GET")
            .uri("/room")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let room: RoomResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(room.id, created.id);
    }
}
