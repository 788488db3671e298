//! A compiled pattern shared between threads.
//!
//! `SharedRegex` keeps the current automaton behind an [`ArcSwap`], so
//! matching never takes a lock and [`replace`](SharedRegex::replace) swaps in
//! a new pattern without disturbing matches already running against the old
//! one. Working sets come from a small pool guarded by a `parking_lot`
//! mutex; a thread holds one only for the length of a single match.

use std::sync::Arc;

use arc_swap::ArcSwap;
use log::debug;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::automaton::{traverse_nfa, Automaton, NfaBuffers};
use crate::Regex;

pub struct SharedRegex {
    current: ArcSwap<Automaton>,
    pool: Mutex<Vec<NfaBuffers>>,
}

impl SharedRegex {
    pub fn new(regex: &Regex) -> Self {
        SharedRegex {
            current: ArcSwap::new(Arc::clone(&regex.automaton)),
            pool: Mutex::new(Vec::new()),
        }
    }

    /// Returns true if `text` is in the current pattern's language.
    pub fn matches(&self, text: impl AsRef<[u8]>) -> bool {
        let automaton = self.current.load();
        let mut bufs = self
            .pool
            .lock()
            .pop()
            .unwrap_or_else(|| NfaBuffers::new(&automaton));
        let hit = traverse_nfa(&automaton, text.as_ref(), &mut bufs);
        self.pool.lock().push(bufs);
        hit
    }

    /// Makes `regex` the pattern for every later match.
    pub fn replace(&self, regex: &Regex) {
        let old = self.current.swap(Arc::clone(&regex.automaton));
        debug!(
            "replaced pattern {:?} with {:?}",
            old.pattern(),
            regex.as_str()
        );
    }

    /// A snapshot of the current pattern.
    pub fn regex(&self) -> Regex {
        Regex {
            automaton: self.current.load_full(),
        }
    }

    /// The matching lines, in input order, tested in parallel. Every line
    /// is tested against the pattern current when the call began.
    pub fn filter_lines_par<'a>(&self, lines: &[&'a str]) -> Vec<&'a str> {
        let automaton = self.current.load_full();
        lines
            .par_iter()
            .map_init(
                || NfaBuffers::new(&automaton),
                |bufs, line| traverse_nfa(&automaton, line.as_bytes(), bufs).then_some(*line),
            )
            .flatten()
            .collect()
    }
}

impl From<Regex> for SharedRegex {
    fn from(regex: Regex) -> Self {
        SharedRegex::new(&regex)
    }
}
