use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces request starts across all workers of a run.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until `spacing` has passed since the previously granted slot.
    /// The first caller passes immediately.
    pub async fn acquire(&self, spacing: Duration) {
        let slot = {
            let mut last_slot = self.last_slot.lock().await;
            let now = Instant::now();
            let slot = last_slot.map_or(now, |prev| (prev + spacing).max(now));
            *last_slot = Some(slot);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::Instant;

    use crate::processing::processor::RateLimiter;

    #[tokio::test(start_paused = true)]
    async fn test_sequential_spacing() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        limiter.acquire(Duration::from_millis(500)).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        limiter.acquire(Duration::from_millis(500)).await;
        limiter.acquire(Duration::from_millis(500)).await;
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_budget_across_tasks() {
        let limiter = Arc::new(RateLimiter::new());
        let start = Instant::now();
        let handles: Vec<_> = (0..4).map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move {
                limiter.acquire(Duration::from_secs(1)).await;
                Instant::now()
            })
        }).collect();
        let mut granted = vec![];
        for handle in handles {
            granted.push(handle.await.unwrap().duration_since(start));
        }
        granted.sort();
        assert_eq!(granted, vec![Duration::ZERO, Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(3)]);
    }
}
