//! Fixed politeness delay between requests
//!
//! The crawl is strictly sequential, so a fixed pause between successive
//! feed pages (and between redo batches) is enough to bound the request
//! rate against the remote site. The delay has no effect on what is
//! collected.

use std::time::Duration;

/// Sleeps for a fixed delay between requests
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A throttle that never sleeps
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        tracing::trace!("Sleeping {:?} before next request", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
