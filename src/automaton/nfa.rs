//! NFA simulation.
//!
//! The simulator tracks the set of every state the automaton could be in at
//! the current text offset. Each input byte costs one predicate test per
//! active state and one epsilon-closure, so a run is O(text × pattern) with
//! no backtracking.

use super::{closure_into, Automaton, SparseSet, StateId};

/// Working sets for one simulation at a time.
///
/// Keep one per thread and pass it to [`traverse_nfa`] repeatedly to avoid
/// allocating on every match. Buffers adapt themselves when used with an
/// automaton of a different size.
#[derive(Clone, Debug)]
pub struct NfaBuffers {
    /// Epsilon-closed states live at the current offset.
    active: SparseSet,
    /// Targets of the match transitions taken on the current byte.
    matched: SparseSet,
    /// Scratch stack for the closure traversal.
    stack: Vec<StateId>,
}

impl NfaBuffers {
    pub fn new(automaton: &Automaton) -> Self {
        NfaBuffers {
            active: SparseSet::new(automaton.len()),
            matched: SparseSet::new(automaton.len()),
            stack: Vec::with_capacity(16),
        }
    }

    /// Sizes the working sets for `automaton`, emptying them.
    pub fn resize(&mut self, automaton: &Automaton) {
        self.active.resize(automaton.len());
        self.matched.resize(automaton.len());
        self.stack.clear();
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.matched.clear();
        self.stack.clear();
    }

    /// The active set left by the last run. Empty if the run died before
    /// consuming the whole text.
    pub fn active(&self) -> &SparseSet {
        &self.active
    }
}

/// Runs `automaton` over `text` and reports whether the whole text is
/// accepted.
pub fn traverse_nfa(automaton: &Automaton, text: &[u8], bufs: &mut NfaBuffers) -> bool {
    if bufs.active.capacity() != automaton.len() {
        bufs.resize(automaton);
    }

    bufs.matched.clear();
    bufs.matched.insert(automaton.start().index());
    closure_into(automaton, &bufs.matched, &mut bufs.active, &mut bufs.stack);

    for &byte in text {
        bufs.matched.clear();
        for k in bufs.active.iter() {
            if let Some(t) = automaton.transition(StateId::new(k)) {
                if t.predicate.matches(byte) {
                    bufs.matched.insert(t.target.index());
                }
            }
        }

        // Nothing can re-seed an empty set, so the rest of the text is moot.
        if bufs.matched.is_empty() {
            bufs.active.clear();
            return false;
        }

        closure_into(automaton, &bufs.matched, &mut bufs.active, &mut bufs.stack);
    }

    bufs.active.contains(automaton.accept().index())
}
