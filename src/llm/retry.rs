use std::time::{Duration, Instant};

use rand::Rng;
use reqwest::StatusCode;
use tracing::debug;

use crate::utils::toml_config::RetryConfig;

/// Check if an upstream HTTP status code indicates a transient failure
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Computes exponential backoff with optional jitter.
#[derive(Debug, Clone)]
pub struct BackoffCalculator;

impl BackoffCalculator {
    /// Calculate backoff delay for a given attempt index (0-based).
    pub fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
        let pow = config.backoff_multiplier.powi(attempt as i32);
        let delay_ms =
            ((config.initial_backoff_ms as f32 * pow) as u64).min(config.max_backoff_ms);

        let jitter = config.jitter_factor.clamp(0.0, 1.0);
        if jitter > 0.0 {
            let mut rng = rand::rng();
            let jitter_scale: f32 = rng.random_range(-jitter..=jitter);
            let jitter_ms = (delay_ms as f32 * jitter_scale).round();
            let adjusted = (delay_ms as i64 + jitter_ms as i64).max(0) as u64;
            return Duration::from_millis(adjusted);
        }

        Duration::from_millis(delay_ms)
    }
}

/// A thin async retry executor bounded by attempt count and a time budget.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor;

impl RetryExecutor {
    /// Run `operation(attempt)` until `should_retry` rejects the output, the
    /// attempts are exhausted, or the next sleep would overrun the budget.
    /// The last output is returned in every case.
    pub async fn execute<Op, Fut, T, ShouldRetry>(
        config: &RetryConfig,
        mut operation: Op,
        should_retry: ShouldRetry,
    ) -> T
    where
        Op: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = T>,
        ShouldRetry: Fn(&T) -> bool,
    {
        let max = config.max_attempts.max(1);
        let budget = Duration::from_millis(config.budget_ms);
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let output = operation(attempt).await;

            if attempt + 1 >= max || !should_retry(&output) {
                return output;
            }

            let delay = BackoffCalculator::calculate_delay(config, attempt);
            if started.elapsed() + delay > budget {
                debug!(
                    attempt = attempt,
                    budget_ms = config.budget_ms,
                    "Retry budget exhausted"
                );
                return output;
            }

            debug!(
                attempt = attempt,
                next_attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Retry backoff"
            );
            tokio::time::sleep(delay).await;

            attempt += 1;
        }
    }
}
