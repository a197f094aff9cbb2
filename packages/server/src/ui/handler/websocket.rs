//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{ChatId, ConnectionId, ConnectionIdFactory},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub chat_id: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    // Convert Option<String> -> ChatId (Domain Model)
    let chat_id = match query.chat_id.map(ChatId::new) {
        Some(Ok(chat_id)) => chat_id,
        Some(Err(_)) | None => {
            tracing::warn!("Rejected connection without chat_id");
            return (StatusCode::BAD_REQUEST, "chat_id is required").into_response();
        }
    };

    ws.on_failed_upgrade(|e| tracing::warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, state, chat_id))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Every frame addressed to this connection (history replay and room broadcasts)
/// goes through this single writer, so frames are written in the order they were queued.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Spawns a task that reads frames from this connection and broadcasts them to the room.
///
/// `stop` only interrupts the wait for the next frame. An event already handed to
/// the broadcast engine is always stored and fanned out before the task exits.
fn receive_loop<S>(
    mut receiver: S,
    state: Arc<AppState>,
    chat_id: ChatId,
    connection_id: ConnectionId,
    mut stop: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                _ = &mut stop => {
                    tracing::debug!("Stopped reading from connection '{}'", connection_id);
                    break;
                }
                msg = receiver.next() => msg,
            };

            let msg = match msg {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
                None => break,
            };

            let text = match msg {
                Message::Text(text) => text.as_str().to_owned(),
                Message::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            match state
                .broadcast_event_usecase
                .execute(&chat_id, &text)
                .await
            {
                Ok(report) => {
                    tracing::debug!(
                        "Broadcasted event in room '{}' to {} connections",
                        chat_id,
                        report.delivered
                    );
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Dropped event from '{}': {}", connection_id, e);
                }
                Err(e) => {
                    tracing::error!(
                        "Closing connection '{}' in room '{}': {}",
                        connection_id,
                        chat_id,
                        e
                    );
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, chat_id: ChatId) {
    let connection_id = ConnectionIdFactory::generate();
    let (sender, receiver) = socket.split();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    // Register to the room and replay its history
    match state
        .join_room_usecase
        .execute(&chat_id, connection_id.clone(), tx)
        .await
    {
        Ok(replayed) => {
            tracing::info!(
                "Connection '{}' joined room '{}' ({} history frames)",
                connection_id,
                chat_id,
                replayed
            );
        }
        Err(e) => {
            tracing::warn!(
                "Connection '{}' joined room '{}' without full history: {}",
                connection_id,
                chat_id,
                e
            );
        }
    }

    let (stop_tx, stop_rx) = oneshot::channel();
    let mut recv_task = receive_loop(
        receiver,
        state.clone(),
        chat_id.clone(),
        connection_id.clone(),
        stop_rx,
    );

    // The reader is only stopped between frames; an event in flight is fanned out before leave.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            let _ = stop_tx.send(());
            if let Err(e) = recv_task.await {
                tracing::warn!("Reader task for '{}' failed: {}", connection_id, e);
            }
        }
    };

    state
        .leave_room_usecase
        .execute(&chat_id, &connection_id)
        .await;
    tracing::info!("Connection '{}' left room '{}'", connection_id, chat_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures_util::stream;
    use hiroba_shared::time::FixedClock;

    use crate::{
        domain::{ChatMessage, MessagePusher, MessageRepository, RepositoryError},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryMessageRepository,
        },
        usecase::{
            BroadcastEventUseCase, CheckHealthUseCase, JoinRoomUseCase, LeaveRoomUseCase,
            RoomSequencer,
        },
    };

    /// ストアへの書き込みは即座に確定し、応答だけが遅れるリポジトリ
    struct SlowAckRepository {
        inner: InMemoryMessageRepository,
        ack_delay: Duration,
    }

    #[async_trait]
    impl MessageRepository for SlowAckRepository {
        async fn append_message(
            &self,
            chat_id: &ChatId,
            message: ChatMessage,
        ) -> Result<ChatMessage, RepositoryError> {
            let stored = self.inner.append_message(chat_id, message).await?;
            tokio::time::sleep(self.ack_delay).await;
            Ok(stored)
        }

        async fn list_messages(
            &self,
            chat_id: &ChatId,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            self.inner.list_messages(chat_id).await
        }

        async fn replace_messages(
            &self,
            chat_id: &ChatId,
            messages: Vec<ChatMessage>,
        ) -> Result<(), RepositoryError> {
            self.inner.replace_messages(chat_id, messages).await
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            self.inner.ping().await
        }
    }

    fn create_state(
        repository: Arc<dyn MessageRepository>,
        pusher: Arc<WebSocketMessagePusher>,
    ) -> Arc<AppState> {
        let sequencer = Arc::new(RoomSequencer::new());
        Arc::new(AppState {
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                pusher.clone(),
                sequencer.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(pusher.clone())),
            broadcast_event_usecase: Arc::new(BroadcastEventUseCase::new(
                repository.clone(),
                pusher,
                sequencer,
                Arc::new(FixedClock::new(1_700_000_000)),
            )),
            check_health_usecase: Arc::new(CheckHealthUseCase::new(repository)),
        })
    }

    #[tokio::test]
    async fn test_stopping_reader_mid_event_still_fans_out() {
        // テスト項目: 保存の応答待ちの間に読み取りを止めても、保存済みのイベントはルームに届く
        // given (前提条件):
        let repository = Arc::new(SlowAckRepository {
            inner: InMemoryMessageRepository::new(),
            ack_delay: Duration::from_millis(300),
        });
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let state = create_state(repository.clone(), pusher.clone());
        let room = ChatId::new("room1".to_string()).unwrap();
        let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
        pusher
            .register_client(&room, ConnectionId::new("bob".to_string()), bob_tx)
            .await;

        let frames = stream::iter(vec![Ok(Message::Text(
            r#"{"sender":"alice","content":"hi"}"#.into(),
        ))])
        .chain(stream::pending());
        let (stop_tx, stop_rx) = oneshot::channel();
        let recv_task = receive_loop(
            frames,
            state,
            room.clone(),
            ConnectionId::new("alice".to_string()),
            stop_rx,
        );

        // when (操作):
        tokio::time::sleep(Duration::from_millis(100)).await;
        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), recv_task)
            .await
            .expect("reader did not stop")
            .unwrap();

        // then (期待する結果):
        assert_eq!(repository.list_messages(&room).await.unwrap().len(), 1);
        assert_eq!(
            bob_rx.try_recv().ok(),
            Some(r#"{"sender":"alice","content":"hi","type":"message"}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_stop_interrupts_idle_reader() {
        // テスト項目: フレーム待ちの読み取りタスクは停止の合図ですぐに終了する
        // given (前提条件):
        let state = create_state(
            Arc::new(InMemoryMessageRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
        );
        let frames = stream::pending::<Result<Message, axum::Error>>();
        let (stop_tx, stop_rx) = oneshot::channel();
        let recv_task = receive_loop(
            frames,
            state,
            ChatId::new("room1".to_string()).unwrap(),
            ConnectionId::new("alice".to_string()),
            stop_rx,
        );

        // when (操作):
        stop_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), recv_task).await;

        // then (期待する結果):
        assert!(matches!(result, Ok(Ok(()))));
    }
}
