//! チャットドキュメントの DTO
//!
//! メッセージストアには chat_id ごとに 1 つのドキュメントを保存し、
//! その中にメッセージ一覧を到着順で持つ。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::websocket::MessageType;

/// 保存されるメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: u64,
    pub sender: String,
    pub content: String,
    pub timestamp: i64,
    #[serde(default = "default_message_type")]
    pub r#type: MessageType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reactions: BTreeMap<String, Vec<String>>,
}

fn default_message_type() -> MessageType {
    MessageType::Message
}
