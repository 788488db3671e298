//! Single-pass compiler from pattern text to [`Automaton`].
//!
//! Grammar:
//!
//! ```text
//! pattern     := alternation
//! alternation := concat ('|' concat)*
//! concat      := repeat*
//! repeat      := atom ('*' | '+' | '?')*
//! atom        := literal | '.' | '(' alternation ')' | class
//! class       := '[' '^'? classitem+ ']'
//! classitem   := literal | literal '-' literal
//! ```
//!
//! The pattern is scanned once, left to right. Open `(` and `|` positions
//! wait on a stack until the `)` that closes them, at which point the
//! alternation edges are wired. A repetition operator is wired when the
//! atom before it finishes:
//!
//! | operator | edges                          |
//! |----------|--------------------------------|
//! | `*`      | `lp -> op`, `op -> lp`         |
//! | `+`      | `op -> lp`                     |
//! | `?`      | `lp -> op`                     |
//!
//! where `lp` is the first position of the atom (the `(` or `[` of a group
//! or class) and `op` is the operator's position. Operators may be stacked;
//! each one applies to the same atom, so `a+?` means `(a+)?`.

use log::debug;
use smallvec::SmallVec;
use thiserror::Error;

use crate::automaton::{Automaton, ByteClass, Predicate, State, StateId, Transition};

use super::class::{scan_class, ClassItem};

/// Longest pattern the position encoding can address. One id is reserved
/// for the accept state and one for the virtual start state.
pub const MAX_PATTERN_LEN: usize = u32::MAX as usize - 2;

/// Reasons a pattern is rejected. Offsets are byte offsets into the pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A `)` with no open group, or a `(` never closed.
    #[error("unbalanced parenthesis at offset {offset}")]
    UnbalancedGroup { offset: usize },

    /// A `]` with no open class, or a `[` never closed.
    #[error("unbalanced bracket at offset {offset}")]
    UnbalancedClass { offset: usize },

    #[error("empty character class at offset {offset}")]
    EmptyClass { offset: usize },

    #[error("invalid range `{lo}-{hi}` at offset {offset}")]
    InvalidRange { offset: usize, lo: char, hi: char },

    /// A `*`, `+` or `?` with no atom before it.
    #[error("`{op}` at offset {offset} has nothing to repeat")]
    DanglingRepetition { offset: usize, op: char },

    #[error("pattern is {len} bytes long, the limit is {limit}")]
    PatternTooLarge { len: usize, limit: usize },
}

impl CompileError {
    /// The pattern offset the error points at, if it points at one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::UnbalancedGroup { offset }
            | CompileError::UnbalancedClass { offset }
            | CompileError::EmptyClass { offset }
            | CompileError::InvalidRange { offset, .. }
            | CompileError::DanglingRepetition { offset, .. } => Some(*offset),
            CompileError::PatternTooLarge { .. } => None,
        }
    }
}

/// A position waiting on the `)` that closes its group.
#[derive(Clone, Copy, Debug)]
enum Pending {
    Group(usize),
    Alternate(usize),
}

struct Compiler<'p> {
    re: &'p [u8],
    states: Vec<State>,
    pending: Vec<Pending>,
}

/// Compiles `pattern` into an automaton.
///
/// The empty pattern is valid and accepts only the empty string.
pub fn compile(pattern: &str) -> Result<Automaton, CompileError> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(CompileError::PatternTooLarge {
            len: pattern.len(),
            limit: MAX_PATTERN_LEN,
        });
    }

    let re = pattern.as_bytes();
    let mut c = Compiler {
        re,
        states: vec![State::default(); re.len() + 1],
        pending: Vec::new(),
    };

    let mut i = 0;
    let mut prev_lp = 0;
    while i < re.len() {
        // First position of the atom that ends at `i`.
        let mut lp = i;
        match re[i] {
            b'(' => c.pending.push(Pending::Group(i)),
            b'|' => c.pending.push(Pending::Alternate(i)),
            b')' => lp = c.close_group(i)?,
            // The class ends at its `]`; `lp` stays on the `[`.
            b'[' => i = c.class(i)?,
            b']' => return Err(CompileError::UnbalancedClass { offset: i }),
            op @ (b'*' | b'+' | b'?') => {
                if i == 0 || matches!(re[i - 1], b'(' | b'|') {
                    return Err(CompileError::DanglingRepetition {
                        offset: i,
                        op: char::from(op),
                    });
                }
                // A stacked operator repeats the same atom again.
                lp = prev_lp;
            }
            b'.' => c.consume(i, Predicate::Any, i + 1),
            b => c.consume(i, Predicate::Byte(b), i + 1),
        }

        match re.get(i + 1) {
            Some(b'*') => {
                c.add_edge(lp, i + 1);
                c.add_edge(i + 1, lp);
            }
            Some(b'+') => c.add_edge(i + 1, lp),
            Some(b'?') => c.add_edge(lp, i + 1),
            _ => {}
        }

        if falls_through(re[i]) {
            c.add_edge(i, i + 1);
        }
        prev_lp = lp;
        i += 1;
    }

    let start = c.finish()?;
    let automaton = Automaton::from_parts(pattern, c.states, start);
    debug!(
        "compiled {:?}: {} states, {} epsilon edges",
        pattern,
        automaton.len(),
        automaton.edge_count()
    );
    Ok(automaton)
}

/// Metacharacters that pass control to the next position when no other
/// edge applies. `|` is excluded: the end of one alternative must not run
/// into the start of the next.
#[inline]
fn falls_through(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'[' | b']' | b'*' | b'+' | b'?')
}

impl Compiler<'_> {
    fn add_edge(&mut self, from: usize, to: usize) {
        let to = StateId::new(to);
        let epsilons = &mut self.states[from].epsilons;
        if !epsilons.contains(&to) {
            epsilons.push(to);
        }
    }

    fn consume(&mut self, at: usize, predicate: Predicate, target: usize) {
        self.states[at].transition = Some(Transition {
            predicate,
            target: StateId::new(target),
        });
    }

    /// Wires the group closed by the `)` at `close` and returns the
    /// position of its `(`.
    fn close_group(&mut self, close: usize) -> Result<usize, CompileError> {
        let mut alternates: SmallVec<[usize; 4]> = SmallVec::new();
        loop {
            match self.pending.pop() {
                Some(Pending::Alternate(bar)) => alternates.push(bar),
                Some(Pending::Group(open)) => {
                    for bar in alternates {
                        // Branch exit converges on `)`, branch entry
                        // fans out from `(`.
                        self.add_edge(bar, close);
                        self.add_edge(open, bar + 1);
                    }
                    return Ok(open);
                }
                None => return Err(CompileError::UnbalancedGroup { offset: close }),
            }
        }
    }

    /// Wires the bracket expression opened at `open` and returns the
    /// position of its `]`.
    fn class(&mut self, open: usize) -> Result<usize, CompileError> {
        let class = scan_class(self.re, open)?;
        let close = class.close;

        if class.negated {
            // The `^` position tests the whole class at once.
            let mut set = ByteClass::new(true);
            for item in &class.items {
                match *item {
                    ClassItem::Byte { b, .. } => set.push_byte(b),
                    ClassItem::Range { lo, hi, .. } => set.push_range(lo, hi),
                }
            }
            self.consume(open + 1, Predicate::Class(Box::new(set)), close);
        } else {
            for item in &class.items {
                let predicate = match *item {
                    ClassItem::Byte { b, .. } => Predicate::Byte(b),
                    ClassItem::Range { lo, hi, .. } => Predicate::Range { lo, hi },
                };
                self.consume(item.pos(), predicate, close);
                self.add_edge(open, item.pos());
            }
        }

        // `[` falls through to its first member, or to the `^`.
        self.add_edge(open, open + 1);
        Ok(close)
    }

    /// Resolves whatever is left on the stack once the pattern is consumed
    /// and returns the start state.
    fn finish(&mut self) -> Result<StateId, CompileError> {
        let accept = self.re.len();
        let mut alternates: SmallVec<[usize; 4]> = SmallVec::new();
        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::Alternate(bar) => alternates.push(bar),
                Pending::Group(open) => {
                    return Err(CompileError::UnbalancedGroup { offset: open })
                }
            }
        }

        if alternates.is_empty() {
            return Ok(StateId::new(0));
        }

        // Top-level alternatives have no `(` to fan out from, and position 0
        // may be a loop target, so they get a start state of their own.
        let start = self.states.len();
        self.states.push(State::default());
        self.add_edge(start, 0);
        for bar in alternates {
            self.add_edge(bar, accept);
            self.add_edge(start, bar + 1);
        }
        Ok(StateId::new(start))
    }
}
