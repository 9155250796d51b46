//! One-shot reveal bookkeeping for observed elements.
//!
//! Elements are identified by the index they were registered under. Once an
//! element has been reported it is never reported again, whatever the
//! observer says afterwards.
//!
//! The observer's own threshold decides when a report is delivered; only the
//! `intersecting` flag is consulted here, so elements taller than
//! `viewport / threshold` still reveal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealAction {
    /// Add the visible class and stop observing.
    Reveal,
    /// Swap in the deferred image source, add the visible class, stop
    /// observing.
    LoadImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealKind {
    Section,
    LazyImage,
}

#[derive(Debug, Clone)]
pub struct RevealTracker {
    kind: RevealKind,
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(kind: RevealKind) -> Self {
        Self {
            kind,
            revealed: Vec::new(),
        }
    }

    /// Registers an element and returns its id.
    pub fn track(&mut self) -> usize {
        self.revealed.push(false);
        self.revealed.len() - 1
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    pub fn is_revealed(&self, id: usize) -> bool {
        self.revealed.get(id).copied().unwrap_or(false)
    }

    /// Feeds one intersection report. Unknown ids are ignored.
    pub fn observe(&mut self, id: usize, intersecting: bool) -> Option<RevealAction> {
        let seen = self.revealed.get_mut(id)?;
        if *seen || !intersecting {
            return None;
        }
        *seen = true;
        Some(match self.kind {
            RevealKind::Section => RevealAction::Reveal,
            RevealKind::LazyImage => RevealAction::LoadImage,
        })
    }
}
