//! Opt-in retries layered over any [`RangeFetcher`].
use super::RangeFetcher;
use crate::error::Result;
use crate::plan::{ObjectLocator, Part};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Delay before retry number `retry` (0-based): `base * 2^retry`.
pub fn retry_delay(retry: u32, base: Duration) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(retry))
}

/// Retries failed range fetches with exponential backoff.
///
/// The coordinator itself never retries; wrap a fetcher in this to opt in.
/// Only fetch-side failures (`RangeFetch`, `ShortRead`) are retried.
pub struct RetryingFetcher<F> {
    inner: F,
    max_retries: u32,
    base_delay: Duration,
}

impl<F: RangeFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }
}

#[async_trait]
impl<F: RangeFetcher> RangeFetcher for RetryingFetcher<F> {
    async fn fetch_range(&self, locator: &ObjectLocator, part: Part) -> Result<Bytes> {
        let mut retry = 0;
        loop {
            match self.inner.fetch_range(locator, part).await {
                Err(e) if e.is_retryable() && retry < self.max_retries => {
                    let delay = retry_delay(retry, self.base_delay);
                    warn!(%part, attempt = retry + 1, ?delay, error = %e, "retrying part");
                    sleep(delay).await;
                    retry += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransferError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl RangeFetcher for Flaky {
        async fn fetch_range(&self, _locator: &ObjectLocator, part: Part) -> Result<Bytes> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(TransferError::RangeFetch {
                    part,
                    message: "connection reset".into(),
                });
            }
            Ok(Bytes::from(vec![7; part.len as usize]))
        }
    }

    fn flaky(failures: u32) -> Flaky {
        Flaky {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    const PART: Part = Part { index: 0, start: 0, len: 4 };

    #[test]
    fn test_retry_delay_doubles() {
        let base = Duration::from_millis(100);
        assert_eq!(retry_delay(0, base), Duration::from_millis(100));
        assert_eq!(retry_delay(1, base), Duration::from_millis(200));
        assert_eq!(retry_delay(3, base), Duration::from_millis(800));
    }

    #[test]
    fn test_retry_delay_saturates() {
        let delay = retry_delay(40, Duration::from_secs(u64::MAX / 2));
        assert!(delay > Duration::ZERO);
    }

    #[tokio::test]
    async fn recovers_within_budget() {
        let fetcher = RetryingFetcher::new(flaky(2), 2, Duration::ZERO);
        let locator = ObjectLocator::new("b", "k");
        let data = fetcher.fetch_range(&locator, PART).await.unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let fetcher = RetryingFetcher::new(flaky(5), 2, Duration::ZERO);
        let locator = ObjectLocator::new("b", "k");
        let err = fetcher.fetch_range(&locator, PART).await.unwrap_err();
        assert!(matches!(err, TransferError::RangeFetch { .. }));
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_is_single_attempt() {
        let fetcher = RetryingFetcher::new(flaky(1), 0, Duration::ZERO);
        let locator = ObjectLocator::new("b", "k");
        assert!(fetcher.fetch_range(&locator, PART).await.is_err());
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 1);
    }
}
