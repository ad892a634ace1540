use std::time::Duration;

use tokio::time::{Instant, sleep};

/// Global throttle: consecutive [`RateLimiter::acquire`] calls return at least
/// `min_interval` apart.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_start: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: None,
        }
    }

    /// Sleeps until a new send may start, without claiming the slot.
    pub async fn wait_turn(&self) {
        if let Some(last) = self.last_start {
            let since_last = last.elapsed();
            if since_last < self.min_interval {
                sleep(self.min_interval - since_last).await;
            }
        }
    }

    pub fn mark_start(&mut self) -> Instant {
        let now = Instant::now();
        self.last_start = Some(now);
        now
    }

    /// Waits for the next slot and claims it.
    pub async fn acquire(&mut self) -> Instant {
        self.wait_turn().await;
        self.mark_start()
    }
}
