//! Position-indexed nondeterministic finite automaton.
//!
//! A pattern of `M` bytes compiles to `M + 1` states, one per pattern byte
//! plus the accept state `M`. Edges come in two kinds:
//!
//! - epsilon edges, followed without consuming input. Only states that hold
//!   a metacharacter (`( ) | [ ] * + ?`) have them.
//! - match transitions, followed when the current input byte satisfies the
//!   state's [`Predicate`]. Each consuming state has exactly one.
//!
//! ```text
//!  pattern  ( A | B ) C
//!  state    0 1 2 3 4 5 6=accept
//!
//!  0 -ε-> 1   0 -ε-> 3   2 -ε-> 4   4 -ε-> 5
//!  1 -A-> 2   3 -B-> 4   5 -C-> 6
//! ```
//!
//! # Module Organization
//!
//! - `sparse_set`: bounded-domain set used for every working set
//! - `closure`: epsilon-closure over the epsilon graph
//! - `nfa`: the byte-at-a-time simulation and its reusable buffers

mod closure;
mod nfa;
mod sparse_set;

use std::fmt;

use smallvec::SmallVec;

pub use closure::epsilon_closure;
pub(crate) use closure::closure_into;
pub use nfa::{traverse_nfa, NfaBuffers};
pub use sparse_set::SparseSet;

/// A state identifier: an index into the automaton's state table.
///
/// For states below [`Automaton::accept`] this is also the offset of the
/// pattern byte the state stands for.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(u32);

impl StateId {
    /// The compiler bounds pattern length so every position fits in `u32`.
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        StateId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Membership test for a whole bracket expression.
///
/// Used for negated classes, where the inversion has to apply to the union
/// of all members at once. Positive classes are instead flattened into one
/// [`Predicate::Byte`] or [`Predicate::Range`] per member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteClass {
    bytes: SmallVec<[u8; 8]>,
    ranges: SmallVec<[(u8, u8); 4]>,
    negated: bool,
}

impl ByteClass {
    pub(crate) fn new(negated: bool) -> Self {
        ByteClass {
            negated,
            ..Default::default()
        }
    }

    pub(crate) fn push_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    pub(crate) fn push_range(&mut self, lo: u8, hi: u8) {
        self.ranges.push((lo, hi));
    }

    #[inline]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns true if `b` is a listed byte or inside a listed range,
    /// inverted when the class is negated.
    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        let listed = self.bytes.contains(&b)
            || self.ranges.iter().any(|&(lo, hi)| lo <= b && b <= hi);
        listed != self.negated
    }
}

impl fmt::Display for ByteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if self.negated {
            f.write_str("^")?;
        }
        for &b in &self.bytes {
            write!(f, "{}", b.escape_ascii())?;
        }
        for &(lo, hi) in &self.ranges {
            write!(f, "{}-{}", lo.escape_ascii(), hi.escape_ascii())?;
        }
        f.write_str("]")
    }
}

/// The input test attached to a consuming state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// Matches exactly this byte.
    Byte(u8),
    /// `.`: matches any byte.
    Any,
    /// `lo-hi` inside a bracket expression, inclusive on both ends.
    Range { lo: u8, hi: u8 },
    /// A negated bracket expression tested as a whole.
    Class(Box<ByteClass>),
}

impl Predicate {
    #[inline]
    pub fn matches(&self, b: u8) -> bool {
        match self {
            Predicate::Byte(expected) => *expected == b,
            Predicate::Any => true,
            Predicate::Range { lo, hi } => *lo <= b && b <= *hi,
            Predicate::Class(class) => class.contains(b),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Byte(b) => write!(f, "{}", b.escape_ascii()),
            Predicate::Any => f.write_str("."),
            Predicate::Range { lo, hi } => {
                write!(f, "[{}-{}]", lo.escape_ascii(), hi.escape_ascii())
            }
            Predicate::Class(class) => write!(f, "{}", class),
        }
    }
}

/// A match transition: the predicate and the state it resumes at.
///
/// The target is the next position for literals and `.`, and the closing
/// `]` for members of a bracket expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub predicate: Predicate,
    pub target: StateId,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    pub(crate) epsilons: SmallVec<[StateId; 2]>,
    pub(crate) transition: Option<Transition>,
}

/// A compiled pattern. Immutable once built and freely shared across
/// threads; each simulation brings its own [`NfaBuffers`].
#[derive(Clone, Debug)]
pub struct Automaton {
    pattern: Box<str>,
    states: Box<[State]>,
    start: StateId,
    accept: StateId,
}

impl Automaton {
    pub(crate) fn from_parts(pattern: &str, states: Vec<State>, start: StateId) -> Self {
        Automaton {
            accept: StateId::new(pattern.len()),
            pattern: pattern.into(),
            states: states.into_boxed_slice(),
            start,
        }
    }

    /// The pattern this automaton was compiled from.
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of states, including the accept state and the virtual start
    /// state, if any.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false: the accept state exists even for the empty pattern.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The state simulation starts from. This is position 0 unless the
    /// pattern has top-level alternatives, in which case it is an extra
    /// state after the accept state that branches into each of them.
    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    #[inline]
    pub fn accept(&self) -> StateId {
        self.accept
    }

    #[inline]
    pub fn epsilons(&self, id: StateId) -> &[StateId] {
        &self.states[id.index()].epsilons
    }

    #[inline]
    pub fn transition(&self, id: StateId) -> Option<&Transition> {
        self.states[id.index()].transition.as_ref()
    }

    /// Total number of epsilon edges.
    pub fn edge_count(&self) -> usize {
        self.states.iter().map(|s| s.epsilons.len()).sum()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId::new)
    }

    /// Returns true if the whole of `text` is in the pattern's language.
    ///
    /// Allocates fresh working sets; use [`traverse_nfa`] with a kept
    /// [`NfaBuffers`] to match many texts.
    pub fn matches(&self, text: impl AsRef<[u8]>) -> bool {
        let mut bufs = NfaBuffers::new(self);
        traverse_nfa(self, text.as_ref(), &mut bufs)
    }

    /// Graphviz rendering: epsilon edges dashed, match edges labelled with
    /// their predicate.
    pub fn dot(&self) -> Dot<'_> {
        Dot(self)
    }
}

/// Displays an [`Automaton`] in Graphviz DOT syntax.
pub struct Dot<'a>(&'a Automaton);

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nfa = self.0;
        writeln!(f, "digraph nfa {{")?;
        writeln!(f, "    rankdir=LR;")?;
        writeln!(f, "    node [shape=circle];")?;
        writeln!(f, "    {} [shape=doublecircle];", nfa.accept)?;
        if nfa.start != StateId::new(0) {
            writeln!(f, "    {} [shape=point];", nfa.start)?;
        }
        for id in nfa.state_ids() {
            for target in nfa.epsilons(id) {
                writeln!(f, "    {} -> {} [style=dashed];", id, target)?;
            }
            if let Some(t) = nfa.transition(id) {
                // escape_ascii already backslash-escapes quotes.
                writeln!(f, "    {} -> {} [label=\"{}\"];", id, t.target, t.predicate)?;
            }
        }
        writeln!(f, "}}")
    }
}
