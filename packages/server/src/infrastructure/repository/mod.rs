//! Repository 実装
//!
//! - `inmemory`: HashMap をインメモリ DB として使う実装
//! - `sqlite`: SQLite にチャットドキュメントを JSON として保存する実装

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryMessageRepository;
pub use sqlite::SqliteMessageRepository;
