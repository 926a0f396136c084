use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Spaces outbound requests at least `interval` apart, measured from the
/// completion of the previous request rather than its start. This is
/// backpressure against upstream throttling, not fairness: when the floor is
/// violated the pacer sleeps a full interval, it does not try to shave the
/// wait down to the remainder.
#[derive(Debug)]
pub struct RequestPacer {
    interval: Duration,
    last_execution: Option<Instant>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_execution: None,
        }
    }

    /// Block until the next request is allowed to go out.
    pub async fn await_slot(&mut self) {
        if self.interval.is_zero() {
            return;
        }
        if let Some(last) = self.last_execution {
            if last.elapsed() < self.interval {
                debug!(
                    "Pacing: sleeping {:.2}s before the next request",
                    self.interval.as_secs_f64()
                );
                tokio::time::sleep(self.interval).await;
            }
        }
    }

    /// Stamp the completion time of the request that just finished.
    pub fn mark_executed(&mut self) {
        self.last_execution = Some(Instant::now());
    }

    /// Time since the previous request completed, if there was one.
    pub fn elapsed_since_last(&self) -> Option<Duration> {
        self.last_execution.map(|t| t.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_goes_out_immediately() {
        let mut pacer = RequestPacer::new(Duration::from_millis(500));
        let start = Instant::now();
        pacer.await_slot().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn enforces_minimum_spacing_between_requests() {
        let mut pacer = RequestPacer::new(Duration::from_millis(500));
        let start = Instant::now();

        pacer.await_slot().await;
        pacer.mark_executed();
        pacer.await_slot().await;

        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_is_anchored_at_request_completion() {
        let mut pacer = RequestPacer::new(Duration::from_millis(500));

        pacer.await_slot().await;
        // Simulate a slow in-flight request; the clock starts when it ends.
        tokio::time::sleep(Duration::from_millis(300)).await;
        pacer.mark_executed();

        let before = Instant::now();
        pacer.await_slot().await;
        assert!(before.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_periods_do_not_accrue_a_wait() {
        let mut pacer = RequestPacer::new(Duration::from_millis(500));

        pacer.mark_executed();
        tokio::time::sleep(Duration::from_millis(600)).await;

        let before = Instant::now();
        pacer.await_slot().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_sleeps() {
        let mut pacer = RequestPacer::new(Duration::ZERO);
        pacer.mark_executed();

        let before = Instant::now();
        pacer.await_slot().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
