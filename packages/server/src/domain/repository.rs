//! Repository trait 定義
//!
//! ドメイン層が必要とするメッセージストアのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ChatId, ChatMessage, RepositoryError};

/// Message Repository trait
///
/// ルーム（chat_id）ごとのメッセージ一覧を保存するドキュメントストアへのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// ## 依存性の逆転（DIP）
///
/// - ドメイン層が必要とするインターフェースをドメイン層自身が定義
/// - Infrastructure 層がドメイン層のインターフェースに依存
/// - ドメイン層は Infrastructure 層に依存しない
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージをルームの末尾に追加（ルームが存在しなければ作成する）
    ///
    /// ストアが採番した `id` を含む保存済みメッセージを返す。
    async fn append_message(
        &self,
        chat_id: &ChatId,
        message: ChatMessage,
    ) -> Result<ChatMessage, RepositoryError>;

    /// ルームのメッセージ一覧を到着順で取得（ルームが存在しなければ空）
    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// ルームのメッセージ一覧を丸ごと置き換える（ルームが存在しなければ作成する）
    async fn replace_messages(
        &self,
        chat_id: &ChatId,
        messages: Vec<ChatMessage>,
    ) -> Result<(), RepositoryError>;

    /// ストアへの疎通確認
    async fn ping(&self) -> Result<(), RepositoryError>;
}
