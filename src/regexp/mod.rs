//! Pattern compilation.
//!
//! Supports:
//! - literal bytes, matched exactly
//! - `.` matches any byte
//! - `|` alternation
//! - `(...)` grouping
//! - `*`, `+`, `?` repetition of the preceding atom or group
//! - `[...]` character classes with `a-z` ranges and `[^...]` negation
//!
//! There is no escape character: every byte that is not one of
//! `( ) | * + ? [ ] .` is a literal.

mod class;
mod compiler;

pub use compiler::{compile, CompileError, MAX_PATTERN_LEN};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::automaton::{Predicate, StateId};

    fn edges(pattern: &str) -> Vec<(usize, usize)> {
        let nfa = compile(pattern).unwrap();
        let mut out: Vec<(usize, usize)> = nfa
            .state_ids()
            .flat_map(|id| nfa.epsilons(id).iter().map(move |t| (id.index(), t.index())))
            .collect();
        out.sort_unstable();
        out
    }

    fn accepts(pattern: &str, text: &str) -> bool {
        compile(pattern).unwrap().matches(text)
    }

    #[test]
    fn test_empty_pattern() {
        let nfa = compile("").unwrap();
        assert_eq!(nfa.len(), 1);
        assert_eq!(nfa.start(), StateId::new(0));
        assert_eq!(nfa.accept(), StateId::new(0));
        assert!(nfa.matches(""));
        assert!(!nfa.matches("a"));
    }

    #[test]
    fn test_literal_has_no_epsilons() {
        let nfa = compile("ab").unwrap();
        assert_eq!(nfa.len(), 3);
        assert_eq!(nfa.edge_count(), 0);
        let t = nfa.transition(StateId::new(0)).unwrap();
        assert_eq!(t.predicate, Predicate::Byte(b'a'));
        assert_eq!(t.target, StateId::new(1));
    }

    #[test]
    fn test_group_alternation_edges() {
        // ( A | B ) C
        // 0 1 2 3 4 5
        assert_eq!(edges("(A|B)C"), vec![(0, 1), (0, 3), (2, 4), (4, 5)]);
    }

    #[test]
    fn test_star_edges() {
        // A B * C
        // 0 1 2 3
        assert_eq!(edges("AB*C"), vec![(1, 2), (2, 1), (2, 3)]);
    }

    #[test]
    fn test_plus_and_question_edges() {
        assert_eq!(edges("A+"), vec![(1, 0), (1, 2)]);
        assert_eq!(edges("A?"), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_group_repetition_targets_open_paren() {
        // ( A B ) *
        // 0 1 2 3 4
        assert_eq!(edges("(AB)*"), vec![(0, 1), (0, 4), (3, 4), (4, 0), (4, 5)]);
    }

    #[test]
    fn test_class_members_resume_at_close() {
        // [ a x - z ]
        // 0 1 2 3 4 5
        let nfa = compile("[ax-z]").unwrap();
        assert_eq!(edges("[ax-z]"), vec![(0, 1), (0, 2), (5, 6)]);

        let a = nfa.transition(StateId::new(1)).unwrap();
        assert_eq!(a.predicate, Predicate::Byte(b'a'));
        assert_eq!(a.target, StateId::new(5));

        let range = nfa.transition(StateId::new(2)).unwrap();
        assert_eq!(range.predicate, Predicate::Range { lo: b'x', hi: b'z' });
        assert_eq!(range.target, StateId::new(5));

        // The `-` and the range end carry nothing.
        assert!(nfa.transition(StateId::new(3)).is_none());
        assert!(nfa.transition(StateId::new(4)).is_none());
    }

    #[test]
    fn test_negated_class_is_one_predicate() {
        let nfa = compile("[^ab]").unwrap();
        assert_eq!(edges("[^ab]"), vec![(0, 1), (4, 5)]);
        let t = nfa.transition(StateId::new(1)).unwrap();
        assert!(matches!(t.predicate, Predicate::Class(ref c) if c.is_negated()));
        assert_eq!(t.target, StateId::new(4));
        assert!(nfa.transition(StateId::new(2)).is_none());
    }

    #[test]
    fn test_top_level_alternation_gets_start_state() {
        let nfa = compile("ab|c").unwrap();
        assert_eq!(nfa.len(), 6);
        assert_eq!(nfa.start(), StateId::new(5));
        assert_eq!(nfa.epsilons(StateId::new(5)), &[StateId::new(0), StateId::new(3)]);
        assert_eq!(nfa.epsilons(StateId::new(2)), &[StateId::new(4)]);

        assert!(accepts("ab|c", "ab"));
        assert!(accepts("ab|c", "c"));
        assert!(!accepts("ab|c", "abc"));
        assert!(!accepts("ab|c", "a"));
    }

    #[test]
    fn test_top_level_alternation_after_loop() {
        // The loop on `a` must not leak into the second branch.
        assert!(accepts("a*|b", "aaa"));
        assert!(accepts("a*|b", "b"));
        assert!(accepts("a*|b", ""));
        assert!(!accepts("a*|b", "ab"));
        assert!(!accepts("a*|b", "bb"));
    }

    #[test]
    fn test_alternation_does_not_fall_through() {
        assert!(!accepts("(A|B)C", "ABC"));
        assert!(!accepts("(A|B|C)", "AB"));
        assert!(accepts("(A|B|C)", "C"));
    }

    #[test]
    fn test_empty_alternatives() {
        assert!(accepts("(|a)b", "b"));
        assert!(accepts("(|a)b", "ab"));
        assert!(accepts("(a|)b", "b"));
        assert!(accepts("a|", ""));
        assert!(accepts("|", ""));
        assert!(!accepts("|", "a"));
        assert!(accepts("()", ""));
        assert!(accepts("()*x", "x"));
    }

    #[test]
    fn test_nested_groups() {
        assert!(accepts("((a|b)(c|d))+", "acbdad"));
        assert!(!accepts("((a|b)(c|d))+", "acb"));
        assert!(accepts("(a(b(c)?)?)?", ""));
        assert!(accepts("(a(b(c)?)?)?", "ab"));
        assert!(!accepts("(a(b(c)?)?)?", "ac"));
    }

    #[test]
    fn test_stacked_repetition() {
        assert!(accepts("a**", ""));
        assert!(accepts("a**", "aaaa"));
        assert!(accepts("a+?", ""));
        assert!(accepts("a+?", "aa"));
        assert!(accepts("a+?b", "b"));
        assert!(accepts("a+?b", "aab"));
        assert!(!accepts("a+?b", "abab"));
    }

    #[test]
    fn test_metachars_literal_in_class() {
        assert!(accepts("[(*)]+", "(*)"));
        assert!(accepts("[.]", "."));
        assert!(!accepts("[.]", "x"));
        assert!(accepts("[|]", "|"));
    }

    #[test]
    fn test_non_meta_bytes_are_literal() {
        assert!(accepts("a{2}", "a{2}"));
        assert!(accepts("^a$", "^a$"));
        assert!(accepts(r"\d", r"\d"));
        assert!(accepts("a-b", "a-b"));
    }

    #[test]
    fn test_unbalanced_group() {
        assert_eq!(
            compile("a)").unwrap_err(),
            CompileError::UnbalancedGroup { offset: 1 }
        );
        assert_eq!(
            compile("(a").unwrap_err(),
            CompileError::UnbalancedGroup { offset: 0 }
        );
        assert_eq!(
            compile("a|b)").unwrap_err(),
            CompileError::UnbalancedGroup { offset: 3 }
        );
        assert_eq!(
            compile("((a)").unwrap_err(),
            CompileError::UnbalancedGroup { offset: 0 }
        );
    }

    #[test]
    fn test_unbalanced_class() {
        assert_eq!(
            compile("a]").unwrap_err(),
            CompileError::UnbalancedClass { offset: 1 }
        );
        assert_eq!(
            compile("x[ab").unwrap_err(),
            CompileError::UnbalancedClass { offset: 1 }
        );
        assert_eq!(
            compile("[").unwrap_err(),
            CompileError::UnbalancedClass { offset: 0 }
        );
    }

    #[test]
    fn test_empty_class() {
        assert_eq!(
            compile("a[]").unwrap_err(),
            CompileError::EmptyClass { offset: 1 }
        );
        assert_eq!(
            compile("[^]").unwrap_err(),
            CompileError::EmptyClass { offset: 0 }
        );
    }

    #[test]
    fn test_invalid_range() {
        let err = compile("[a-cz-x]").unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidRange {
                offset: 4,
                lo: 'z',
                hi: 'x'
            }
        );
        assert_eq!(err.to_string(), "invalid range `z-x` at offset 4");
    }

    #[test]
    fn test_dangling_repetition() {
        for (pattern, offset, op) in [
            ("*a", 0, '*'),
            ("+", 0, '+'),
            ("(?a)", 1, '?'),
            ("a|*b", 2, '*'),
            ("(a|+)", 3, '+'),
        ] {
            assert_eq!(
                compile(pattern).unwrap_err(),
                CompileError::DanglingRepetition { offset, op },
                "pattern {:?}",
                pattern
            );
        }
    }

    #[test]
    fn test_error_offset_and_display() {
        let err = compile("ab(").unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert_eq!(err.to_string(), "unbalanced parenthesis at offset 2");

        let err = compile("?").unwrap_err();
        assert_eq!(err.to_string(), "`?` at offset 0 has nothing to repeat");
    }

    #[test]
    fn test_malformed_patterns_never_panic() {
        let alphabet = [b'a', b'(', b')', b'|', b'[', b']', b'^', b'-', b'*', b'+', b'?', b'.'];
        let mut pattern = Vec::new();
        // Every pattern of up to four bytes over the alphabet.
        fn walk(alphabet: &[u8], pattern: &mut Vec<u8>, depth: usize) {
            let text = std::str::from_utf8(pattern).unwrap();
            if let Ok(nfa) = compile(text) {
                for t in ["", "a", "aa", "-", "()"] {
                    let _ = nfa.matches(t);
                }
            }
            if depth == 0 {
                return;
            }
            for &b in alphabet {
                pattern.push(b);
                walk(alphabet, pattern, depth - 1);
                pattern.pop();
            }
        }
        walk(&alphabet, &mut pattern, 4);
    }
}
