use crate::clock::Clock;
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Spaces requests to one upstream at least `interval` apart.
pub struct RateLimiter {
    interval: Duration,
    clock: Arc<dyn Clock>,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            interval,
            clock,
            last: Mutex::new(None),
        }
    }

    /// Time left before the next request may go out.
    pub fn wait_time(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
        let Some(last) = last else {
            return Duration::ZERO;
        };
        let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
        self.interval.saturating_sub(elapsed)
    }

    /// Waits for the slot of the next request and claims it.
    pub async fn acquire(&self) -> Duration {
        let mut last = self.last.lock().await;
        let now = self.clock.now();
        let wait = self.wait_time(*last, now);
        if !wait.is_zero() {
            tracing::debug!("rate limited, sleeping {} ms", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
        let delay = chrono::Duration::from_std(wait).unwrap_or_else(|_| chrono::Duration::zero());
        *last = Some(now + delay);

        wait
    }
}
