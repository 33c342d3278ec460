use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Global request pacing shared by every fetch in a run.
///
/// Enforces a minimum interval between request starts so a batch does not
/// hammer hosts (candidate probing can issue a dozen requests per entry).
/// A rate of 0 disables pacing entirely.
pub struct RateLimiter {
    interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `requests_per_second` request starts per
    /// second across all tasks. Non-positive rates disable the limiter.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = (requests_per_second > 0.0)
            .then(|| Duration::from_secs_f64(1.0 / requests_per_second));
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the next request slot is available, then claims it.
    pub async fn acquire(&self) {
        let Some(interval) = self.interval else {
            return;
        };

        // The lock is held across the sleep so concurrent callers queue up
        // and each claims a distinct slot.
        let mut last = self.last_request.lock().await;
        let now = Instant::now();
        if let Some(prev) = *last {
            let ready_at = prev + interval;
            if ready_at > now {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_spacing_enforced() {
        let limiter = RateLimiter::new(2.0); // 500ms interval

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Two intervals must have elapsed for three acquisitions.
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_never_waits() {
        let limiter = RateLimiter::new(0.0);

        let start = Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_limiter_does_not_wait() {
        let limiter = RateLimiter::new(2.0);
        limiter.acquire().await;

        // After the interval has passed, the next acquire is immediate.
        tokio::time::sleep(Duration::from_secs(5)).await;
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
