//! nfa-regex: regular expression matching by NFA simulation.
//!
//! A pattern compiles to a position-indexed nondeterministic finite
//! automaton, and matching walks the set of every state the automaton could
//! be in, one input byte at a time. Run time is O(text × pattern) for every
//! pattern; there is no backtracking.
//!
//! ```
//! use nfa_regex::Regex;
//!
//! let re = Regex::new("(0|1(01*0)*1)*").unwrap();
//! assert!(re.matches("1001")); // 9
//! assert!(!re.matches("10")); // 2
//!
//! // Unanchored search, grep style.
//! let re = Regex::substring("cat").unwrap();
//! assert!(re.matches("concatenate"));
//! ```
//!
//! A [`Regex`] is cheap to clone and can be shared across threads. For a
//! pattern that is matched from many threads and replaced at run time, see
//! [`SharedRegex`].

mod automaton;
mod regexp;
mod thread_safe;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use automaton::{
    epsilon_closure, traverse_nfa, Automaton, ByteClass, Dot, NfaBuffers, Predicate, SparseSet,
    StateId, Transition,
};
pub use regexp::{compile, CompileError, MAX_PATTERN_LEN};
pub use thread_safe::SharedRegex;

/// Default cap on pattern length accepted by [`RegexBuilder`].
pub const DEFAULT_SIZE_LIMIT: usize = 1 << 20;

/// Compile options.
#[derive(Clone, Debug)]
pub struct RegexBuilder {
    substring: bool,
    size_limit: usize,
}

impl Default for RegexBuilder {
    fn default() -> Self {
        RegexBuilder {
            substring: false,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl RegexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match the pattern anywhere in the text rather than against the whole
    /// text, by compiling it as `.*(pattern).*`.
    pub fn substring(&mut self, yes: bool) -> &mut Self {
        self.substring = yes;
        self
    }

    /// Reject patterns longer than `bytes`.
    pub fn size_limit(&mut self, bytes: usize) -> &mut Self {
        self.size_limit = bytes;
        self
    }

    pub fn build(&self, pattern: &str) -> Result<Regex, CompileError> {
        if pattern.len() > self.size_limit {
            return Err(CompileError::PatternTooLarge {
                len: pattern.len(),
                limit: self.size_limit,
            });
        }

        // Errors are reported against the caller's pattern, so it is
        // compiled on its own first. The wrapped form can't fail after that.
        let mut automaton = compile(pattern)?;
        if self.substring {
            automaton = compile(&format!(".*({}).*", pattern))?;
        }
        Ok(Regex {
            automaton: Arc::new(automaton),
        })
    }
}

/// A compiled pattern.
#[derive(Clone, Debug)]
pub struct Regex {
    automaton: Arc<Automaton>,
}

impl Regex {
    /// Compiles `pattern` for whole-text matching.
    pub fn new(pattern: &str) -> Result<Regex, CompileError> {
        RegexBuilder::new().build(pattern)
    }

    /// Compiles `pattern` to match anywhere in the text.
    pub fn substring(pattern: &str) -> Result<Regex, CompileError> {
        RegexBuilder::new().substring(true).build(pattern)
    }

    /// Returns true if `text` is in the pattern's language.
    pub fn matches(&self, text: impl AsRef<[u8]>) -> bool {
        self.automaton.matches(text)
    }

    /// Like [`matches`](Self::matches), reusing `bufs` instead of
    /// allocating working sets.
    pub fn matches_with(&self, bufs: &mut NfaBuffers, text: impl AsRef<[u8]>) -> bool {
        traverse_nfa(&self.automaton, text.as_ref(), bufs)
    }

    /// The matching lines, in input order.
    pub fn filter_lines<'a, I>(&self, lines: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut bufs = NfaBuffers::new(&self.automaton);
        lines
            .into_iter()
            .filter(|line| traverse_nfa(&self.automaton, line.as_bytes(), &mut bufs))
            .collect()
    }

    /// The pattern as compiled, including the substring wrapper if any.
    pub fn as_str(&self) -> &str {
        self.automaton.pattern()
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }
}

impl FromStr for Regex {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Regex, CompileError> {
        Regex::new(s)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
