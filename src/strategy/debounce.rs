//! Quiet-period strategy.

use std::time::Duration;

use tokio::time::Instant;

use super::ChunkStrategy;

/// Emit once no fragment has arrived for `delay`.
///
/// Each fragment pushes the deadline out; the processor waits on
/// [`deadline`](ChunkStrategy::deadline) alongside the chunk stream. A
/// deadline still pending when the stream ends is dropped with the run and
/// replaced by the processor's final flush.
#[derive(Debug, Clone)]
pub struct DebounceStrategy {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceStrategy {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl ChunkStrategy for DebounceStrategy {
    fn should_emit(&mut self, _fragment: &str, _accumulated: &str) -> bool {
        self.deadline = Some(Instant::now() + self.delay);
        false
    }

    fn reset(&mut self) {
        self.deadline = None;
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn on_deadline(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if at <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
