//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("chat_id must not be empty")]
    EmptyChatId,
}

/// メッセージストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// ストアに到達できない、または一時的にビジー（再試行の対象）
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    /// ストアが書き込みを拒否した（再試行しても成功しない）
    #[error("message store rejected the operation: {0}")]
    Rejected(String),

    /// 保存済みドキュメントが復元できない
    #[error("stored chat document is corrupted: {0}")]
    Corrupted(String),
}

impl RepositoryError {
    /// 再試行で回復しうるエラーかどうか
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// メッセージ送信（プッシュ）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
