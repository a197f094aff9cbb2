//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。プロセスが終了すると履歴は失われます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatId, ChatMessage, MessageRepository, RepositoryError};

/// インメモリ Message Repository 実装
///
/// chat_id ごとのメッセージ一覧（チャットドキュメント）を保持し、
/// ドメイン層の MessageRepository trait を実装します（依存性の逆転）。
#[derive(Default)]
pub struct InMemoryMessageRepository {
    /// Key: chat_id, Value: 到着順のメッセージ一覧
    chats: Mutex<HashMap<ChatId, Vec<ChatMessage>>>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append_message(
        &self,
        chat_id: &ChatId,
        mut message: ChatMessage,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut chats = self.chats.lock().await;
        let messages = chats.entry(chat_id.clone()).or_default();
        message.id = messages.len() as u64 + 1;
        messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let chats = self.chats.lock().await;
        Ok(chats.get(chat_id).cloned().unwrap_or_default())
    }

    async fn replace_messages(
        &self,
        chat_id: &ChatId,
        messages: Vec<ChatMessage>,
    ) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().await;
        chats.insert(chat_id.clone(), messages);
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
