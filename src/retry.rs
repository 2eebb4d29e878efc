use crate::error::FixtureError;
use std::future::Future;
use std::time::Duration;

/// The backoff schedule used by the readiness probe embedded in
/// [`MockServerFixture::start`].
///
/// An operation is attempted once and then retried up to `max_retries` times;
/// the delay before retry `n` (zero-based) is `initial_delay * multiplier^n`.
/// The default budget - 7 retries, 1 second initial delay, doubling each time -
/// waits roughly two minutes in total before giving up.
///
/// [`MockServerFixture::start`]: crate::MockServerFixture::start
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 7,
            initial_delay: Duration::from_millis(1000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// The delay preceding the `n`-th retry (zero-based).
    pub(crate) fn delay(&self, retry: u32) -> Duration {
        self.initial_delay * self.multiplier.pow(retry)
    }
}

/// Run `operation` until it succeeds or the policy's retry budget is exhausted.
///
/// The sleep between attempts suspends the calling task; it never blocks a
/// worker thread. On exhaustion the *last* underlying error is returned, so
/// callers can wrap it without losing the cause.
pub(crate) async fn with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, FixtureError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FixtureError>>,
{
    let mut retries = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if retries == policy.max_retries {
                    return Err(error);
                }
                tokio::time::sleep(policy.delay(retries)).await;
                retries += 1;
            }
        }
    }
}
