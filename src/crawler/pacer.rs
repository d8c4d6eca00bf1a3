//! Request pacing
//!
//! The catalog is someone else's server. Every request waits out a minimum
//! delay since the previous one, plus a random jitter so the traffic does
//! not arrive on a metronome.

use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct Pacer {
    base: Duration,
    jitter_ms: u64,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            jitter_ms,
            last: Mutex::new(None),
        }
    }

    /// Waits until at least the base delay plus jitter has elapsed since
    /// the previous call. The first call returns immediately.
    ///
    /// Callers sharing one `Pacer` are serialized through its clock, so a
    /// pool of detail workers collectively respects the delay rather than
    /// each worker pacing itself independently.
    pub async fn wait(&self) {
        // thread_rng is not Send; draw the jitter before taking the lock.
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        let delay = self.base + Duration::from_millis(jitter);

        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let due = prev + delay;
            let now = Instant::now();
            if due > now {
                tokio::time::sleep(due - now).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_wait_is_immediate() {
        let pacer = Pacer::new(5_000, 0);
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_second_wait_observes_delay() {
        let pacer = Pacer::new(50, 0);
        pacer.wait().await;
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_zero_delay_does_not_block() {
        let pacer = Pacer::new(0, 0);
        let start = Instant::now();
        for _ in 0..5 {
            pacer.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
