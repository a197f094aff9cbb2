//! 値オブジェクト
//!
//! チャット ID、接続 ID、送信者名、タイムスタンプを表す不変の値を定義します。

use std::fmt;

use super::error::ValueObjectError;

/// 送信者が省略された場合に使われる既定の送信者名
pub const ANONYMOUS_SENDER: &str = "anonymous";

/// チャットルームの識別子
///
/// クライアントが接続時に `chat_id` クエリパラメータで指定する不透明な文字列。
/// 空文字列は許容しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(String);

impl ChatId {
    /// 新しい ChatId を作成
    ///
    /// # Errors
    ///
    /// 空文字列の場合は `ValueObjectError::EmptyChatId` を返す
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyChatId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// WebSocket 接続のハンドル
///
/// 接続ごとに一度だけ生成され、再利用されない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージの送信者（リアクションの場合はリアクションしたユーザー）
///
/// 常に空でない。空または省略時は `"anonymous"` になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sender(String);

impl Sender {
    /// 新しい Sender を作成（空文字列は `"anonymous"` に置き換える）
    pub fn new(value: String) -> Self {
        if value.is_empty() {
            Self::anonymous()
        } else {
            Self(value)
        }
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_SENDER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl From<Option<String>> for Sender {
    fn from(value: Option<String>) -> Self {
        value.map(Self::new).unwrap_or_else(Self::anonymous)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix タイムスタンプ（秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
