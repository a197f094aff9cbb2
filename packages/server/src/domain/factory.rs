//! ドメインオブジェクトの生成

use uuid::Uuid;

use super::value_object::ConnectionId;

/// ConnectionId の生成器
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// UUID v4 による新しい ConnectionId を生成
    pub fn generate() -> ConnectionId {
        ConnectionId::new(Uuid::new_v4().to_string())
    }
}
