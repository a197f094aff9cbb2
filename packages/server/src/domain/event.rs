//! クライアントから届くイベント
//!
//! ワイヤー形式（JSON）から復元された、ルームに投稿される出来事を表します。

use super::value_object::Sender;

/// ルームに投稿されたイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// 通常のチャットメッセージ
    Message { sender: Sender, content: String },
    /// 既存メッセージへの絵文字リアクション
    Reaction(ReactionEvent),
}

/// 絵文字リアクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    /// リアクションしたユーザー
    pub sender: Sender,
    /// 対象メッセージのキー（`"{sender}-{content}"`）
    pub message_key: String,
    pub emoji: String,
}
