//! Bounded fixed-delay retry for whole pipeline stages.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; always at least 1.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// Two retries, ten seconds apart.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Invoke `stage` until it succeeds or attempts run out; the last error is returned.
    pub fn run<T, E, F>(&self, name: &str, mut stage: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match stage() {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(stage = name, attempt, "stage succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        stage = name,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "stage failed, retrying in {:?}",
                        self.delay
                    );
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(stage = name, attempt, error = %e, "stage failed");
                    return Err(e);
                }
            }
        }
    }
}
