use std::{
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

/// Serializes callers so that consecutive requests are at least `min_interval` apart
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Blocks until the next request is allowed, then claims the slot
    pub fn wait(&self) {
        // the stored instant stays valid after a panicking caller
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                log::debug!("Rate limiting: waiting {wait_time:?}");
                thread::sleep(wait_time);
            }
        }

        *last = Some(Instant::now());
    }
}
