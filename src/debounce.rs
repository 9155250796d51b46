//! Trailing-edge debounce bookkeeping.
//!
//! The browser owns the actual timers; this type only decides which timer
//! firing is allowed to run. Every call replaces the pending arguments and
//! bumps a generation counter, and a firing only yields arguments when it
//! carries the newest generation. A burst of calls therefore collapses into
//! one execution with the last call's arguments.

#[derive(Debug)]
pub struct Debouncer<A> {
    generation: u64,
    pending: Option<A>,
}

impl<A> Default for Debouncer<A> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: None,
        }
    }
}

impl<A> Debouncer<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call. The returned generation must be handed back to
    /// [`Debouncer::fire`] when the delay elapses.
    pub fn call(&mut self, args: A) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.pending = Some(args);
        self.generation
    }

    /// Timer callback. Returns the arguments to run with, or `None` when a
    /// newer call superseded this firing.
    pub fn fire(&mut self, generation: u64) -> Option<A> {
        if generation != self.generation {
            return None;
        }
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
