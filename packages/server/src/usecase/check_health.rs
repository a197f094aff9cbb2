//! UseCase: ヘルスチェック

use std::sync::Arc;

use crate::domain::{MessageRepository, RepositoryError};

/// メッセージストアへの疎通確認のユースケース
pub struct CheckHealthUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl CheckHealthUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<(), RepositoryError> {
        self.repository.ping().await
    }
}
