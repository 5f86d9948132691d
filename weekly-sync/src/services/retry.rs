//! Rate-limit retry
//!
//! The catalog answers HTTP 429 when throttling. Every remote call goes
//! through [`retry_while_rate_limited`], so `Error::RateLimited` never
//! leaves the services layer.

use std::future::Future;
use std::time::Duration;

use weekly_common::Result;

/// Fixed delay between rate-limited attempts
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(1);

/// Run `operation` until it returns anything other than `Error::RateLimited`,
/// sleeping `backoff` between attempts.
///
/// **Algorithm:**
/// 1. Attempt operation
/// 2. If successful, return result
/// 3. If rate limited: log WARN, sleep `backoff`, retry (no attempt cap)
/// 4. If other error: return error immediately
pub async fn retry_while_rate_limited<F, Fut, T>(
    operation_name: &str,
    backoff: Duration,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Succeeded after throttling"
                    );
                }
                return Ok(result);
            }
            Err(err) if err.is_rate_limited() => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "Throttled, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}
