//! UseCase: ルームへの参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 接続の登録と、ルームの履歴（メッセージとリアクション）の再生
//!
//! ### なぜこのテストが必要か
//! - 参加したクライアントが保存済みのメッセージをちょうど 1 回受け取ることを保証する
//! - 履歴の取得・再生に失敗しても接続の登録が残ることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルーム、メッセージとリアクションのあるルーム
//! - 異常系：履歴の取得失敗、再生中の書き込み失敗

use std::sync::Arc;

use crate::{
    domain::{ChatId, ConnectionId, MessagePusher, MessageRepository, PusherChannel},
    infrastructure::dto::websocket::history_frames,
};

use super::{error::JoinError, sequencer::RoomSequencer};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（メッセージストアの抽象化）
    repository: Arc<dyn MessageRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルームごとの直列化
    sequencer: Arc<RoomSequencer>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
        }
    }

    /// 接続をルームに登録し、履歴を再生する
    ///
    /// 登録から再生フレームの送信までは同じルームのブロードキャストと直列化されるため、
    /// 同じメッセージが履歴とライブ配送の両方で届くことはない。
    ///
    /// # Arguments
    ///
    /// * `chat_id` - 参加するルーム
    /// * `connection_id` - 接続のハンドル
    /// * `sender` - 接続へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 再生したフレーム数
    /// * `Err(JoinError)` - 再生を中断した（接続の登録は残る）
    pub async fn execute(
        &self,
        chat_id: &ChatId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<usize, JoinError> {
        let _turn = self.sequencer.acquire(chat_id).await;

        // 1. MessagePusher に接続を登録
        self.message_pusher
            .register_client(chat_id, connection_id.clone(), sender)
            .await;

        // 2. 履歴を取得
        let messages = self
            .repository
            .list_messages(chat_id)
            .await
            .map_err(JoinError::HistoryUnavailable)?;

        // 3. メッセージごとにチャットフレームとリアクションフレームを送信
        let mut sent = 0;
        for frame in history_frames(&messages) {
            let json = match frame.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!("Failed to encode history frame: {}", e);
                    continue;
                }
            };
            if let Err(e) = self
                .message_pusher
                .push_to(chat_id, &connection_id, &json)
                .await
            {
                tracing::warn!(
                    "Failed to replay history to connection '{}': {}",
                    connection_id,
                    e
                );
                return Err(JoinError::ReplayAborted { sent });
            }
            sent += 1;
        }

        Ok(sent)
    }
}
