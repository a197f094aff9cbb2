//! SQLite Message Repository 実装
//!
//! chat_id ごとに 1 行のチャットドキュメントを保存します。
//! メッセージ一覧は `StoredMessage` の JSON 配列として `messages` 列に入ります。
//!
//! rusqlite は同期 API のため、接続を `Arc<Mutex>` で共有し、
//! すべての DB 操作を `tokio::task::spawn_blocking` 上で実行します。

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};

use crate::domain::{ChatId, ChatMessage, MessageRepository, RepositoryError};
use crate::infrastructure::dto::document::StoredMessage;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS chats (
    chat_id  TEXT PRIMARY KEY NOT NULL,
    messages TEXT NOT NULL DEFAULT '[]'
);
";

/// SQLite Message Repository 実装
pub struct SqliteMessageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageRepository {
    /// データベースファイルを開く（存在しなければ作成する）
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(map_sqlite_error)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(map_sqlite_error)?;
        tracing::info!("SQLite message store opened at {}", path.display());

        Self::with_connection(conn)
    }

    /// メモリ上のデータベースを開く
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA).map_err(map_sqlite_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// ブロッキングスレッドで DB 操作を実行
    async fn run<T, F>(&self, operation: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, RepositoryError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| RepositoryError::Rejected("connection lock poisoned".to_string()))?;
            operation(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::Unavailable(e.to_string()))?
    }
}

fn map_sqlite_error(e: rusqlite::Error) -> RepositoryError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen) => {
            RepositoryError::Unavailable(e.to_string())
        }
        _ => RepositoryError::Rejected(e.to_string()),
    }
}

fn load_messages(conn: &Connection, chat_id: &str) -> Result<Vec<StoredMessage>, RepositoryError> {
    let document: Option<String> = conn
        .query_row(
            "SELECT messages FROM chats WHERE chat_id = ?1",
            params![chat_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(map_sqlite_error)?;

    match document {
        Some(json) => {
            serde_json::from_str(&json).map_err(|e| RepositoryError::Corrupted(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

fn store_messages(
    conn: &Connection,
    chat_id: &str,
    messages: &[StoredMessage],
) -> Result<(), RepositoryError> {
    let json =
        serde_json::to_string(messages).map_err(|e| RepositoryError::Rejected(e.to_string()))?;
    conn.execute(
        "INSERT INTO chats (chat_id, messages) VALUES (?1, ?2)
         ON CONFLICT(chat_id) DO UPDATE SET messages = excluded.messages",
        params![chat_id, json],
    )
    .map_err(map_sqlite_error)?;
    Ok(())
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn append_message(
        &self,
        chat_id: &ChatId,
        message: ChatMessage,
    ) -> Result<ChatMessage, RepositoryError> {
        let chat_id = chat_id.as_str().to_string();
        self.run(move |conn| {
            let tx = conn.transaction().map_err(map_sqlite_error)?;
            let mut messages = load_messages(&tx, &chat_id)?;

            let mut message = message;
            message.id = messages.len() as u64 + 1;
            messages.push(StoredMessage::from(&message));

            store_messages(&tx, &chat_id, &messages)?;
            tx.commit().map_err(map_sqlite_error)?;
            Ok(message)
        })
        .await
    }

    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let chat_id = chat_id.as_str().to_string();
        self.run(move |conn| {
            let messages = load_messages(conn, &chat_id)?;
            Ok(messages.into_iter().map(ChatMessage::from).collect())
        })
        .await
    }

    async fn replace_messages(
        &self,
        chat_id: &ChatId,
        messages: Vec<ChatMessage>,
    ) -> Result<(), RepositoryError> {
        let chat_id = chat_id.as_str().to_string();
        let documents: Vec<StoredMessage> = messages.iter().map(StoredMessage::from).collect();
        self.run(move |conn| store_messages(conn, &chat_id, &documents))
            .await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(map_sqlite_error)?;
            Ok(())
        })
        .await
    }
}
