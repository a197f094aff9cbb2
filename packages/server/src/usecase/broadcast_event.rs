//! UseCase: イベントのブロードキャスト（Broadcast Engine）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastEventUseCase::execute() メソッド
//! - 受信フレームのデコード、保存、ルーム内へのファンアウト
//!
//! ### なぜこのテストが必要か
//! - 保存してからブロードキャストする順序を保証する（保存失敗時は配送しない）
//! - リアクションの冪等性と、対象が見つからない場合に何も変更しないことを保証する
//! - 不正なフレームが正規化された形で保存・配送されることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：チャットメッセージ、リアクション
//! - 異常系：リアクション対象なし、ストアの一時的・恒久的な失敗
//! - エッジケース：JSON でないフレーム、同じリアクションの二重送信

use std::sync::Arc;

use hiroba_shared::time::{Clock, timestamp_to_rfc3339};

use crate::{
    domain::{
        BroadcastReport, ChatEvent, ChatId, ChatMessage, MessagePusher, MessageRepository,
        ReactionEvent, RepositoryError, Sender, Timestamp, find_message_index,
    },
    infrastructure::dto::websocket::{OutboundFrame, decode_inbound},
};

use super::{error::BroadcastError, retry::RetryPolicy, sequencer::RoomSequencer};

/// イベントのブロードキャストのユースケース
pub struct BroadcastEventUseCase {
    /// Repository（メッセージストアの抽象化）
    repository: Arc<dyn MessageRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルームごとの直列化
    sequencer: Arc<RoomSequencer>,
    /// 保存時刻の取得元
    clock: Arc<dyn Clock>,
    retry_policy: RetryPolicy,
}

impl BroadcastEventUseCase {
    /// 新しい BroadcastEventUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
            clock,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// 保存の再試行ポリシーを指定
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// 受信フレームを保存し、ルームの全接続にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `chat_id` - 投稿先のルーム
    /// * `raw_frame` - クライアントから届いたフレーム（JSON でなくてもよい）
    ///
    /// # Returns
    ///
    /// * `Ok(BroadcastReport)` - 保存に成功し、全接続への送信を試みた
    /// * `Err(BroadcastError)` - 保存に失敗した（ブロードキャストは行われない）
    pub async fn execute(
        &self,
        chat_id: &ChatId,
        raw_frame: &str,
    ) -> Result<BroadcastReport, BroadcastError> {
        // 1. デコードし、送信フレームを正規形で作り直す
        let event = decode_inbound(raw_frame);
        let outbound = OutboundFrame::from(&event)
            .to_json()
            .map_err(|e| BroadcastError::EncodeFailed(e.to_string()))?;

        // 2. 同じルームの他のブロードキャスト・参加処理と直列化
        let _turn = self.sequencer.acquire(chat_id).await;

        // 3. 保存
        match &event {
            ChatEvent::Message { sender, content } => {
                self.persist_message(chat_id, sender, content).await?;
            }
            ChatEvent::Reaction(reaction) => {
                self.persist_reaction(chat_id, reaction).await?;
            }
        }

        // 4. ルーム内の全接続に送信
        let report = self.message_pusher.broadcast(chat_id, &outbound).await;
        tracing::debug!(
            "Broadcasted to {} connection(s) in room '{}' ({} dropped)",
            report.delivered,
            chat_id,
            report.dropped.len()
        );

        Ok(report)
    }

    async fn persist_message(
        &self,
        chat_id: &ChatId,
        sender: &Sender,
        content: &str,
    ) -> Result<ChatMessage, BroadcastError> {
        let timestamp = Timestamp::new(self.clock.now_unix_seconds());
        let message = ChatMessage::new(sender.clone(), content.to_string(), timestamp);
        let repository = &self.repository;

        let stored = self
            .retry_policy
            .run(
                "Saving message",
                move || repository.append_message(chat_id, message.clone()),
                RepositoryError::is_transient,
            )
            .await?;

        tracing::debug!(
            "Saved message #{} from '{}' in room '{}' at {}",
            stored.id,
            stored.sender,
            chat_id,
            timestamp_to_rfc3339(stored.timestamp.value())
        );
        Ok(stored)
    }

    async fn persist_reaction(
        &self,
        chat_id: &ChatId,
        reaction: &ReactionEvent,
    ) -> Result<(), BroadcastError> {
        self.retry_policy
            .run(
                "Saving reaction",
                move || self.apply_reaction(chat_id, reaction),
                BroadcastError::is_transient,
            )
            .await
    }

    /// 対象メッセージにリアクションを追加して、メッセージ一覧を書き戻す
    async fn apply_reaction(
        &self,
        chat_id: &ChatId,
        reaction: &ReactionEvent,
    ) -> Result<(), BroadcastError> {
        let mut messages = self.repository.list_messages(chat_id).await?;

        let index = find_message_index(&messages, &reaction.message_key)
            .ok_or_else(|| BroadcastError::TargetNotFound(reaction.message_key.clone()))?;

        if !messages[index].add_reaction(&reaction.emoji, reaction.sender.clone()) {
            tracing::debug!(
                "'{}' already reacted with {} to '{}'",
                reaction.sender,
                reaction.emoji,
                reaction.message_key
            );
            return Ok(());
        }

        self.repository.replace_messages(chat_id, messages).await?;
        Ok(())
    }
}
