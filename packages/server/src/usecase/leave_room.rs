//! UseCase: ルームからの退出処理

use std::sync::Arc;

use crate::domain::{ChatId, ConnectionId, MessagePusher};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続をルームから削除（既に取り除かれていても何もしない）
    pub async fn execute(&self, chat_id: &ChatId, connection_id: &ConnectionId) {
        self.message_pusher
            .unregister_client(chat_id, connection_id)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_leave_room_unregisters_connection() {
        // テスト項目: 退出した接続はブロードキャスト対象から外れる
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = LeaveRoomUseCase::new(pusher.clone());
        let room = ChatId::new("room1".to_string()).unwrap();
        let alice = ConnectionId::new("alice".to_string());
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_client(&room, alice.clone(), tx).await;

        // when (操作):
        usecase.execute(&room, &alice).await;
        usecase.execute(&room, &alice).await;

        // then (期待する結果):
        assert_eq!(pusher.count_connections(&room).await, 0);
        assert_eq!(pusher.broadcast(&room, "hi").await.delivered, 0);
    }
}
