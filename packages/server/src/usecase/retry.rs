//! 永続化の再試行ポリシー

use std::{fmt::Display, future::Future, time::Duration};

/// 一時的な失敗に対する有限回の再試行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

impl RetryPolicy {
    /// `max_attempts` は最初の試行を含む回数（0 は 1 として扱う）
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 操作を実行し、`is_transient` が真を返すエラーの間だけ再試行する
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        mut attempt_fn: F,
        is_transient: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && is_transient(&e) => {
                    tracing::warn!(
                        "{} failed (attempt {}/{}), retrying: {}",
                        operation,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
