use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chathub::config::AppConfig;
use chathub::email::{EmailService, HttpEmailService, NoopEmailService};
use chathub::hub::Hub;
use chathub::message::repository::{
    InMemoryMessageRepository, MessageRepository, PostgresMessageRepository,
};
use chathub::room::repository::{InMemoryRoomRepository, PostgresRoomRepository, RoomRepository};
use chathub::shared::AppState;
use chathub::user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
use chathub::{email, message, room, user, ws};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chathub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting chat relay server");

    let config = AppConfig::from_env();

    // Repositories: Postgres when configured, in-memory otherwise
    let message_repository: Arc<dyn MessageRepository + Send + Sync>;
    let room_repository: Arc<dyn RoomRepository + Send + Sync>;
    let user_repository: Arc<dyn UserRepository + Send + Sync>;
    match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url)
                .await
                .expect("Failed to connect to database");
            info!("Database connection established");

            message_repository = Arc::new(PostgresMessageRepository::new(pool.clone()));
            room_repository = Arc::new(PostgresRoomRepository::new(pool.clone()));
            user_repository = Arc::new(PostgresUserRepository::new(pool));
        }
        None => {
            info!("DATABASE_URL not set, using in-memory storage");

            message_repository = Arc::new(InMemoryMessageRepository::new());
            room_repository = Arc::new(InMemoryRoomRepository::new());
            user_repository = Arc::new(InMemoryUserRepository::new());
        }
    }

    let email_service: Arc<dyn EmailService + Send + Sync> = match &config.mail_api_url {
        Some(mail_api_url) => Arc::new(HttpEmailService::new(mail_api_url.clone())),
        None => {
            info!("MAIL_API_URL not set, email notifications disabled");
            Arc::new(NoopEmailService)
        }
    };

    // One hub per process: it owns the room index for the life of the server
    // and every connection talks to it through this handle.
    let (hub, hub_handle) = Hub::new();
    tokio::spawn(hub.run());

    let app_state = AppState::new(
        hub_handle,
        message_repository,
        room_repository,
        user_repository,
        email_service,
    );

    let app = Router::new()
        .route("/rooms", get(room::list_rooms))
        .route("/room", post(room::create_room).get(room::get_any_room))
        .route("/messages", get(message::get_messages))
        .route("/userByEmail", get(user::get_user_by_email))
        .route("/userAuth", post(user::auth_user))
        .route("/userRooms", put(user::update_user_rooms))
        .route("/mailChat", post(email::mail_chat))
        .route("/websocket", get(ws::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap();
    info!(port = config.port, "Server running");
    axum::serve(listener, app).await.unwrap();
}
