//! ルームごとの直列化
//!
//! 同じルームに対する「保存 + ブロードキャスト」と「登録 + 履歴再生」を
//! 1 つずつ順番に実行するためのロックを提供します。
//!
//! これにより、参加したクライアントは各メッセージを履歴再生かライブ配送の
//! どちらか一方で、ちょうど 1 回だけ受け取ります。保存順と配送順も一致します。

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ChatId;

/// ルームごとの非同期ロックの集合
#[derive(Default)]
pub struct RoomSequencer {
    turns: Mutex<HashMap<ChatId, Arc<Mutex<()>>>>,
}

impl RoomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームの順番を取得（ガードを drop するまで同じルームの他の処理は待つ）
    pub async fn acquire(&self, chat_id: &ChatId) -> OwnedMutexGuard<()> {
        let turn = {
            let mut turns = self.turns.lock().await;
            // 誰も保持・待機していないルームのロックは片付ける
            turns.retain(|id, turn| id == chat_id || Arc::strong_count(turn) > 1);
            turns.entry(chat_id.clone()).or_default().clone()
        };
        turn.lock_owned().await
    }

    /// 管理しているルーム数
    pub async fn active_rooms(&self) -> usize {
        self.turns.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn chat_id(value: &str) -> ChatId {
        ChatId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_same_room_is_serialized() {
        // テスト項目: 同じルームの 2 つ目の取得は 1 つ目の解放まで待たされる
        // given (前提条件):
        let sequencer = Arc::new(RoomSequencer::new());
        let guard = sequencer.acquire(&chat_id("room1")).await;

        // when (操作):
        let waiter = {
            let sequencer = sequencer.clone();
            tokio::spawn(async move {
                let _guard = sequencer.acquire(&chat_id("room1")).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // then (期待する結果):
        assert!(!waiter.is_finished());
        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_rooms_do_not_block_each_other() {
        // テスト項目: 別のルームの取得は待たされない
        // given (前提条件):
        let sequencer = RoomSequencer::new();
        let _guard = sequencer.acquire(&chat_id("a")).await;

        // when (操作):
        let result =
            tokio::time::timeout(Duration::from_millis(200), sequencer.acquire(&chat_id("b")))
                .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_released_rooms_are_pruned() {
        // テスト項目: 解放済みのルームのロックは次の取得時に片付けられる
        // given (前提条件):
        let sequencer = RoomSequencer::new();
        drop(sequencer.acquire(&chat_id("a")).await);
        drop(sequencer.acquire(&chat_id("b")).await);

        // when (操作):
        let _guard = sequencer.acquire(&chat_id("c")).await;

        // then (期待する結果):
        assert_eq!(sequencer.active_rooms().await, 1);
    }
}
