//! Epsilon-closure: every state reachable from a seed set through epsilon
//! edges alone.
//!
//! `*` and `+` put cycles in the epsilon graph, so the traversal marks each
//! state in a [`SparseSet`] the first time it is reached and never expands it
//! again. An explicit stack keeps deeply nested patterns off the call stack.

use super::{Automaton, SparseSet, StateId};

/// Computes the epsilon-closure of `seeds`. The seeds are part of the result.
pub fn epsilon_closure(
    automaton: &Automaton,
    seeds: impl IntoIterator<Item = StateId>,
) -> SparseSet {
    let mut seed_set = SparseSet::new(automaton.len());
    seed_set.extend(seeds.into_iter().map(StateId::index));
    let mut closure = SparseSet::new(automaton.len());
    let mut stack = Vec::new();
    closure_into(automaton, &seed_set, &mut closure, &mut stack);
    closure
}

/// Replaces the contents of `closure` with the epsilon-closure of `seeds`.
///
/// `closure` doubles as the visited marking. `stack` is scratch space; both
/// must have been sized for `automaton`.
pub(crate) fn closure_into(
    automaton: &Automaton,
    seeds: &SparseSet,
    closure: &mut SparseSet,
    stack: &mut Vec<StateId>,
) {
    closure.clear();
    stack.clear();
    for seed in seeds {
        if closure.insert(seed) {
            stack.push(StateId::new(seed));
        }
    }
    while let Some(id) = stack.pop() {
        for &next in automaton.epsilons(id) {
            if closure.insert(next.index()) {
                stack.push(next);
            }
        }
    }
}
