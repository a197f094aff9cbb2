//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    BroadcastEventUseCase, CheckHealthUseCase, JoinRoomUseCase, LeaveRoomUseCase,
};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_room_usecase,
///     leave_room_usecase,
///     broadcast_event_usecase,
///     check_health_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// BroadcastEventUseCase（イベントブロードキャストのユースケース）
    broadcast_event_usecase: Arc<BroadcastEventUseCase>,
    /// CheckHealthUseCase（ヘルスチェックのユースケース）
    check_health_usecase: Arc<CheckHealthUseCase>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        broadcast_event_usecase: Arc<BroadcastEventUseCase>,
        check_health_usecase: Arc<CheckHealthUseCase>,
    ) -> Self {
        Self {
            join_room_usecase,
            leave_room_usecase,
            broadcast_event_usecase,
            check_health_usecase,
        }
    }

    /// Build the router serving `/chat` and `/health`
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            join_room_usecase: self.join_room_usecase,
            leave_room_usecase: self.leave_room_usecase,
            broadcast_event_usecase: self.broadcast_event_usecase,
            check_health_usecase: self.check_health_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/chat", get(websocket_handler))
            // HTTP エンドポイント
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket chat relay server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "WebSocket chat relay listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/chat?chat_id=<room>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
