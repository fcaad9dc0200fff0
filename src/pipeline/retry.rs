use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;

use crate::warning;

/// How often and how patiently a failing operation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
    /// When set, the n-th retry waits `delay * n` instead of `delay`.
    pub linear: bool,
}

impl RetryPolicy {
    pub const fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            linear: false,
        }
    }

    pub const fn linear(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            linear: true,
        }
    }

    /// Wait before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.linear {
            self.delay * attempt
        } else {
            self.delay
        }
    }

    /// Runs `op` until it succeeds or the attempts are used up, logging every
    /// failure. The error of the last attempt is returned.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warning!(
                        "[Retry] Attempt {}/{} failed for {}: {}",
                        attempt,
                        attempts,
                        label,
                        e
                    );
                    if attempt >= attempts {
                        return Err(e);
                    }
                    sleep(self.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
