use std::{thread, time::Duration};

use super::error::ProviderError;

/// How many times a request is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// delay after the first failure, grows linearly with each attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Runs `op` until it succeeds, fails with a non transient error, or attempts run out
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Result<T, ProviderError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_after(attempt);
                    log::warn!(
                        "{what} failed (attempt {attempt}/{max_attempts}): {err}, retrying in {delay:?}"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, time::Duration};

    use super::RetryPolicy;
    use crate::providers::error::ProviderError;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    fn unavailable() -> ProviderError {
        ProviderError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[test]
    fn retries_transient_errors_until_success() {
        let calls = Cell::new(0);
        let result = fast_policy(3).run("list tracks", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(unavailable())
            } else {
                Ok(42)
            }
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast_policy(3).run("list tracks", || {
            calls.set(calls.get() + 1);
            Err(unavailable())
        });

        assert!(matches!(result, Err(ProviderError::Api { status: 503, .. })));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn does_not_retry_business_errors() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast_policy(3).run("fetch tt0000000", || {
            calls.set(calls.get() + 1);
            Err(ProviderError::NotFound("tt0000000".into()))
        });

        assert!(matches!(result, Err(ProviderError::NotFound(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn backoff_grows_with_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
    }
}
