//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続中のクライアントの `UnboundedSender` をルームごとに管理（Room Registry）
//! - クライアントへのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信は接続ごとの書き込みタスクへのチャンネル送信なので、ロックを保持したまま
//! ブロックすることはありません。
//!
//! レジストリは 1 つの Mutex で守られ、ルーム（chat_id）ごとに分割されています。
//! ブロードキャストは対象ルームの接続だけを走査します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastReport, ChatId, ConnectionId, MessagePushError, MessagePusher, PusherChannel,
};

/// ルーム内の接続
type RoomMembers = HashMap<ConnectionId, PusherChannel>;

/// WebSocket を使った MessagePusher 実装
///
/// ## フィールド
///
/// - `rooms`: chat_id ごとの接続と対応する WebSocket sender のマップ
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(&chat_id, connection_id, tx).await;
///
/// // ルーム全体に送信
/// let report = pusher.broadcast(&chat_id, "{\"type\":\"message\"}").await;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// Key: chat_id, Value: そのルームの接続
    rooms: Mutex<HashMap<ChatId, RoomMembers>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        chat_id: &ChatId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) {
        let mut rooms = self.rooms.lock().await;
        tracing::debug!(
            "Connection '{}' registered to room '{}'",
            connection_id,
            chat_id
        );
        rooms
            .entry(chat_id.clone())
            .or_default()
            .insert(connection_id, sender);
    }

    async fn unregister_client(&self, chat_id: &ChatId, connection_id: &ConnectionId) {
        let mut rooms = self.rooms.lock().await;
        if let Some(members) = rooms.get_mut(chat_id) {
            members.remove(connection_id);
            if members.is_empty() {
                rooms.remove(chat_id);
            }
        }
        tracing::debug!(
            "Connection '{}' unregistered from room '{}'",
            connection_id,
            chat_id
        );
    }

    async fn push_to(
        &self,
        chat_id: &ChatId,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let rooms = self.rooms.lock().await;

        let sender = rooms
            .get(chat_id)
            .and_then(|members| members.get(connection_id))
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;

        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(&self, chat_id: &ChatId, content: &str) -> BroadcastReport {
        let mut rooms = self.rooms.lock().await;
        let mut report = BroadcastReport::default();

        let Some(members) = rooms.get_mut(chat_id) else {
            return report;
        };

        // 送信に失敗した接続は取り除き、残りへの送信は続ける
        members.retain(|connection_id, sender| match sender.send(content.to_string()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to push message to connection '{}', dropping it: {}",
                    connection_id,
                    e
                );
                report.dropped.push(connection_id.clone());
                false
            }
        });

        if members.is_empty() {
            rooms.remove(chat_id);
        }

        report
    }

    async fn count_connections(&self, chat_id: &ChatId) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(chat_id).map(HashMap::len).unwrap_or(0)
    }
}
