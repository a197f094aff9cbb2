//! ドメイン層
//!
//! チャットリレーのビジネスルール（値オブジェクト、エンティティ、イベント）と、
//! ドメイン層が必要とするインターフェース（Repository, MessagePusher）を定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, Reactions, find_message_index};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event::{ChatEvent, ReactionEvent};
pub use factory::ConnectionIdFactory;
pub use message_pusher::{BroadcastReport, MessagePusher, PusherChannel};
pub use repository::MessageRepository;
pub use value_object::{ANONYMOUS_SENDER, ChatId, ConnectionId, Sender, Timestamp};
