//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::RepositoryError;

/// イベントのブロードキャスト失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// リアクション対象のメッセージがルームに存在しない
    #[error("reaction target '{0}' not found")]
    TargetNotFound(String),

    /// メッセージストアへの保存に失敗（ブロードキャストは行われない）
    #[error("failed to persist event: {0}")]
    Persistence(#[from] RepositoryError),

    /// 送信フレームのエンコードに失敗
    #[error("failed to encode outbound frame: {0}")]
    EncodeFailed(String),
}

impl BroadcastError {
    /// セッションを継続してよいエラーかどうか
    ///
    /// 保存失敗だけはセッションを終了させる。
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }

    pub(crate) fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence(e) if e.is_transient())
    }
}

/// ルーム参加時の履歴再生の失敗
///
/// いずれの場合も接続の登録は完了しており、セッションは継続する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("failed to load room history: {0}")]
    HistoryUnavailable(RepositoryError),

    #[error("history replay aborted after {sent} frames")]
    ReplayAborted { sent: usize },
}
