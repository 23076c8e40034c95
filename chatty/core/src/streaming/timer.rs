//! Pacing Timer
//!
//! The delay between reveals goes through [`RevealTimer`] so tests can swap
//! in a recording timer or run the tokio timer on a paused clock.

use std::time::Duration;

use async_trait::async_trait;

/// Source of the pacing delay between two reveals
#[async_trait]
pub trait RevealTimer: Send + Sync {
    /// Wait for `interval` to elapse
    async fn pause(&self, interval: Duration);
}

/// Timer backed by `tokio::time`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

#[async_trait]
impl RevealTimer for TokioTimer {
    async fn pause(&self, interval: Duration) {
        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_waits_full_interval() {
        let start = tokio::time::Instant::now();
        TokioTimer.pause(Duration::from_millis(50)).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_does_not_advance_clock() {
        let start = tokio::time::Instant::now();
        TokioTimer.pause(Duration::ZERO).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
