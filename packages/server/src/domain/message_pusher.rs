//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ送信（通知）のインターフェースを定義します。
//! 接続はルーム（chat_id）ごとに登録され、ブロードキャストはそのルームの中だけに届く。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ChatId, ConnectionId, MessagePushError};

/// クライアントへのメッセージ送信用チャンネル
///
/// 受信側は接続ごとの書き込みタスクが保持し、WebSocket に書き出す。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// ブロードキャストの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 配送できた接続数
    pub delivered: usize,
    /// 書き込みに失敗してレジストリから取り除かれた接続
    pub dropped: Vec<ConnectionId>,
}

/// MessagePusher trait
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続をルームに登録（同じ接続の再登録は置き換え）
    async fn register_client(
        &self,
        chat_id: &ChatId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    );

    /// 接続をルームから削除（未登録なら何もしない）
    async fn unregister_client(&self, chat_id: &ChatId, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        chat_id: &ChatId,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// ルームの全接続にメッセージを送信
    ///
    /// 書き込みに失敗した接続はレジストリから取り除き、残りの接続への送信を続ける。
    async fn broadcast(&self, chat_id: &ChatId, content: &str) -> BroadcastReport;

    /// ルームに登録されている接続数
    async fn count_connections(&self, chat_id: &ChatId) -> usize;
}
