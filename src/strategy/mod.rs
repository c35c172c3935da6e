//! Chunk emission strategies.
//!
//! A strategy decides when accumulated text is worth a UI notification. It
//! never changes what is accumulated, only how often `on_text_update` fires.

mod debounce;

pub use debounce::DebounceStrategy;

use tokio::time::Instant;

/// Policy deciding whether to notify after a text fragment.
///
/// Strategies are stateful and owned by a single processor; the processor
/// calls [`reset`](Self::reset) at the start of every run.
pub trait ChunkStrategy: Send {
    /// Called for every text fragment. `accumulated` already includes it.
    fn should_emit(&mut self, fragment: &str, accumulated: &str) -> bool;

    /// Clear per-run state.
    fn reset(&mut self) {}

    /// When a deferred emission is pending, the instant it becomes due.
    fn deadline(&self) -> Option<Instant> {
        None
    }

    /// The deadline passed with no new fragment. Returns whether to emit.
    fn on_deadline(&mut self, _now: Instant) -> bool {
        false
    }
}

impl<S: ChunkStrategy + ?Sized> ChunkStrategy for Box<S> {
    fn should_emit(&mut self, fragment: &str, accumulated: &str) -> bool {
        (**self).should_emit(fragment, accumulated)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn deadline(&self) -> Option<Instant> {
        (**self).deadline()
    }

    fn on_deadline(&mut self, now: Instant) -> bool {
        (**self).on_deadline(now)
    }
}

/// Emit on every fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateStrategy;

impl ChunkStrategy for ImmediateStrategy {
    fn should_emit(&mut self, _fragment: &str, _accumulated: &str) -> bool {
        true
    }
}

/// Emit when a fragment closes a sentence (`.`, `!` or `?`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationStrategy;

impl ChunkStrategy for PunctuationStrategy {
    fn should_emit(&mut self, fragment: &str, _accumulated: &str) -> bool {
        matches!(fragment.trim_end().chars().last(), Some('.' | '!' | '?'))
    }
}

/// Emit every `size` fragments.
#[derive(Debug, Clone)]
pub struct BatchStrategy {
    size: usize,
    seen: usize,
}

impl BatchStrategy {
    /// A size of zero is treated as one.
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            seen: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl ChunkStrategy for BatchStrategy {
    fn should_emit(&mut self, _fragment: &str, _accumulated: &str) -> bool {
        self.seen += 1;
        if self.seen >= self.size {
            self.seen = 0;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.seen = 0;
    }
}

/// Emit when a fragment ends on whitespace, so words are never shown cut.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBoundaryStrategy;

impl ChunkStrategy for WordBoundaryStrategy {
    fn should_emit(&mut self, fragment: &str, _accumulated: &str) -> bool {
        fragment.chars().last().is_some_and(char::is_whitespace)
    }
}

/// Emit when any inner strategy wants to.
///
/// Every inner strategy sees every fragment, so counters and timers stay
/// consistent regardless of which one fired.
#[derive(Default)]
pub struct CompositeStrategy {
    strategies: Vec<Box<dyn ChunkStrategy>>,
}

impl CompositeStrategy {
    pub fn new(strategies: Vec<Box<dyn ChunkStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn with<S: ChunkStrategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for CompositeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeStrategy")
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

impl ChunkStrategy for CompositeStrategy {
    fn should_emit(&mut self, fragment: &str, accumulated: &str) -> bool {
        self.strategies
            .iter_mut()
            .fold(false, |emit, s| s.should_emit(fragment, accumulated) || emit)
    }

    fn reset(&mut self) {
        for strategy in &mut self.strategies {
            strategy.reset();
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.strategies.iter().filter_map(|s| s.deadline()).min()
    }

    fn on_deadline(&mut self, now: Instant) -> bool {
        let mut emit = false;
        for strategy in &mut self.strategies {
            if strategy.deadline().is_some_and(|at| at <= now) {
                emit |= strategy.on_deadline(now);
            }
        }
        emit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisions<S: ChunkStrategy>(strategy: &mut S, fragments: &[&str]) -> Vec<bool> {
        let mut acc = String::new();
        fragments
            .iter()
            .map(|f| {
                acc.push_str(f);
                strategy.should_emit(f, &acc)
            })
            .collect()
    }

    #[test]
    fn immediate_always_emits() {
        assert_eq!(
            decisions(&mut ImmediateStrategy, &["a", "", "b"]),
            vec![true, true, true]
        );
    }

    #[test]
    fn punctuation_emits_on_sentence_end() {
        let got = decisions(
            &mut PunctuationStrategy,
            &["Hello", " world", "!", " How", " are", " you?", " ok. ", "e.g"],
        );
        assert_eq!(got, vec![false, false, true, false, false, true, true, false]);
    }

    #[test]
    fn batch_counts_fragments_not_characters() {
        let mut batch = BatchStrategy::new(3);
        let got = decisions(&mut batch, &["1", "22222", "3", "4", "5", "6"]);
        assert_eq!(got, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn batch_reset_clears_count() {
        let mut batch = BatchStrategy::new(2);
        assert!(!batch.should_emit("a", "a"));
        batch.reset();
        assert!(!batch.should_emit("b", "b"));
        assert!(batch.should_emit("c", "bc"));
        assert_eq!(BatchStrategy::new(0).size(), 1);
    }

    #[test]
    fn word_boundary_waits_for_whitespace() {
        let got = decisions(&mut WordBoundaryStrategy, &["Hel", "lo ", "wor", "ld\n", ""]);
        assert_eq!(got, vec![false, true, false, true, false]);
    }

    #[test]
    fn composite_is_logical_or_and_feeds_every_member() {
        let mut composite = CompositeStrategy::default()
            .with(PunctuationStrategy)
            .with(BatchStrategy::new(3));
        // "b." fires punctuation; batch still counts it and fires at "c".
        let got = decisions(&mut composite, &["a", "b.", "c", "d", "e"]);
        assert_eq!(got, vec![false, true, true, false, false]);
        assert_eq!(composite.len(), 2);
    }

    #[test]
    fn empty_composite_never_emits() {
        let mut composite = CompositeStrategy::default();
        assert!(composite.is_empty());
        assert!(!composite.should_emit("x.", "x."));
        assert!(composite.deadline().is_none());
    }
}
