//! 线性退避重试

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{AppError, AppResult};

/// 线性退避策略：第 n 次失败后等待 `base_delay × n`
#[derive(Debug, Clone, Copy)]
pub struct LinearBackoff {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl LinearBackoff {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// 第 `attempt` 次（从 1 开始）失败后的等待时间
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// 按策略重试，只有 `should_retry` 返回 true 的错误才会重试
///
/// `op` 收到当前尝试次数（从 1 开始）。
pub async fn retry_with_backoff<T, F, Fut, P>(
    policy: LinearBackoff,
    should_retry: P,
    mut op: F,
) -> AppResult<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = AppResult<T>>,
    P: Fn(&AppError) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "请求失败 (尝试 {}/{}): {}，{}ms 后重试...",
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
