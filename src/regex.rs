// Copyright (c) 2018 Fabian Schuiki

//! Compilation of regular expressions into automata.
//!
//! Patterns are written as a linear string with `|` for union, `*` for
//! zero-or-more repetition, parentheses for grouping, and juxtaposition for
//! concatenation. A `/` marks the following character as a literal, so `/(`
//! matches an opening parenthesis and `//` matches a slash.
//!
//! The compiler works directly on slices of the pattern without building a
//! parse tree. Each step splits off the first operand (a single character or
//! a parenthesized group), looks at the operator that follows, and recurses on
//! the rest. Consequently union and concatenation associate to the right:
//! `ab|c` is read as `a(b|c)`. A `*` applies to the operand right before it.

use crate::error::PatternError;
use crate::nfa::Nfa;

/// The escape character.
pub const ESCAPE: char = '/';

/// A character of a pattern, after escapes have been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom {
    Literal(char),
    Open,
    Close,
    Union,
    Star,
}

impl Atom {
    /// The character this atom matches when it appears as an operand.
    fn as_literal(self) -> char {
        match self {
            Atom::Literal(c) => c,
            Atom::Open => '(',
            Atom::Close => ')',
            Atom::Union => '|',
            Atom::Star => '*',
        }
    }
}

/// Compile a pattern into an NFA fragment.
pub fn compile(pattern: &str) -> Result<Nfa, PatternError> {
    let atoms = atomize(pattern)?;
    validate(pattern, &atoms)?;
    Ok(compile_atoms(&atoms))
}

/// Check whether a pattern is well-formed.
pub fn is_valid(pattern: &str) -> bool {
    atomize(pattern)
        .and_then(|atoms| validate(pattern, &atoms))
        .is_ok()
}

/// Split a pattern into atoms, resolving escapes.
fn atomize(pattern: &str) -> Result<Vec<Atom>, PatternError> {
    let mut atoms = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let atom = match c {
            ESCAPE => match chars.next() {
                Some(escaped) => Atom::Literal(escaped),
                None => {
                    return Err(PatternError::DanglingEscape {
                        pattern: pattern.into(),
                    })
                }
            },
            '(' => Atom::Open,
            ')' => Atom::Close,
            '|' => Atom::Union,
            '*' => Atom::Star,
            c => Atom::Literal(c),
        };
        atoms.push(atom);
    }
    Ok(atoms)
}

/// Ensure that the parentheses balance.
fn validate(pattern: &str, atoms: &[Atom]) -> Result<(), PatternError> {
    let mut depth = 0usize;
    for &atom in atoms {
        match atom {
            Atom::Open => depth += 1,
            Atom::Close if depth == 0 => {
                return Err(PatternError::Unbalanced {
                    pattern: pattern.into(),
                })
            }
            Atom::Close => depth -= 1,
            _ => (),
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(PatternError::Unbalanced {
            pattern: pattern.into(),
        })
    }
}

/// Find the index of the parenthesis closing the group opened at index 0.
fn matching_close(atoms: &[Atom]) -> Option<usize> {
    if atoms.first() != Some(&Atom::Open) {
        return None;
    }
    let mut depth = 0usize;
    for (index, &atom) in atoms.iter().enumerate() {
        match atom {
            Atom::Open => depth += 1,
            Atom::Close => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => (),
        }
    }
    None
}

/// The number of atoms making up the first operand of an expression.
fn first_operand_len(atoms: &[Atom]) -> usize {
    match matching_close(atoms) {
        Some(close) => close + 1,
        None => 1,
    }
}

/// Compile an operand: a single character or a parenthesized group.
fn compile_operand(operand: &[Atom]) -> Nfa {
    if operand.len() == 1 {
        Nfa::symbol(operand[0].as_literal())
    } else {
        compile_atoms(&operand[1..operand.len() - 1])
    }
}

/// Compile a balanced sequence of atoms.
///
/// The operands are collected left to right and then folded from the right,
/// which makes every operator right associative without recursing once per
/// operand.
fn compile_atoms(atoms: &[Atom]) -> Nfa {
    // Each operand with whether a union joins it to the rest.
    let mut chain: Vec<(Nfa, bool)> = Vec::new();
    let mut rest = atoms;
    let last = loop {
        if rest.is_empty() {
            break Nfa::empty();
        }
        let split = first_operand_len(rest);
        let mut operand = compile_operand(&rest[..split]);
        rest = &rest[split..];
        while rest.first() == Some(&Atom::Star) {
            operand = operand.star();
            rest = &rest[1..];
        }
        match rest.first() {
            None => break operand,
            Some(&Atom::Union) => {
                chain.push((operand, true));
                rest = &rest[1..];
            }
            Some(_) => chain.push((operand, false)),
        }
    };
    chain
        .into_iter()
        .rev()
        .fold(last, |acc, (operand, union)| {
            if union {
                operand.union(acc)
            } else {
                operand.concat(acc)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(pattern: &str) -> Vec<Atom> {
        atomize(pattern).unwrap()
    }

    fn matches(pattern: &str, input: &str) -> bool {
        compile(pattern).unwrap().determinize().accepts(input)
    }

    #[test]
    fn validity() {
        assert!(!is_valid(")asdfdf("));
        assert!(!is_valid("((sdaffd)"));
        assert!(is_valid("(((dsaf)|sdf)sdf)"));
        assert!(is_valid("sadfa"));
        assert!(!is_valid("("));
        assert!(!is_valid(")"));
        assert!(is_valid("/("));
        assert!(is_valid("/)"));
        assert!(is_valid("/(/((a)b(c)/)"));
        assert!(!is_valid("ab/"));
    }

    #[test]
    fn compile_errors() {
        assert_eq!(
            compile("(a|b").unwrap_err(),
            PatternError::Unbalanced {
                pattern: "(a|b".into()
            }
        );
        assert_eq!(
            compile("a/").unwrap_err(),
            PatternError::DanglingEscape {
                pattern: "a/".into()
            }
        );
    }

    #[test]
    fn matching_parenthesis() {
        assert_eq!(matching_close(&atoms("((sdaffd))dasfdaf")), Some(9));
        assert_eq!(
            matching_close(&atoms("(((dsaf)|sdf)sdf)(sdafdfadsf)")),
            Some(16)
        );
        assert_eq!(matching_close(&atoms("sadfa")), None);
        // Escaped brackets count as one atom each.
        assert_eq!(matching_close(&atoms("(/[,/])")), Some(4));
        assert_eq!(matching_close(&atoms("/(()abc")), None);
    }

    #[test]
    fn first_operand() {
        assert_eq!(first_operand_len(&atoms("s|f")), 1);
        assert_eq!(first_operand_len(&atoms("(a|f)(c|d)*")), 5);
        assert_eq!(first_operand_len(&atoms("(sdfsdf)*")), 8);
        assert_eq!(first_operand_len(&atoms("/(sdfsdf/)")), 1);
        assert_eq!(first_operand_len(&atoms("(sdf/|/*abc)|(cdf)")), 10);
    }

    #[test]
    fn union_concat_star() {
        assert!(matches("a|b", "a"));
        assert!(matches("a|b", "b"));
        assert!(!matches("a|b", "ab"));
        assert!(matches("abc", "abc"));
        assert!(!matches("abc", "ab"));
        assert!(matches("a*", ""));
        assert!(matches("a*", "aaaa"));
        assert!(matches("a(b|c)*", "abccbbc"));
        assert!(!matches("a(b|c)*", "abccdfdf"));
    }

    #[test]
    fn star_followed_by_more() {
        assert!(matches("(ab)*c", "ababc"));
        assert!(matches("(ab)*c", "c"));
        assert!(!matches("(ab)*c", "abab"));
        assert!(matches("a*|b", "b"));
        assert!(matches("a*|b", "aa"));
    }

    #[test]
    fn right_associative_union() {
        // ab|c is a(b|c)
        assert!(matches("ab|c", "ab"));
        assert!(matches("ab|c", "ac"));
        assert!(!matches("ab|c", "c"));
    }

    #[test]
    fn escapes_and_operator_literals() {
        assert!(matches("/(a/)", "(a)"));
        assert!(matches("/*", "*"));
        assert!(matches("*", "*"));
        assert!(matches("+", "+"));
        assert!(matches("a/|b", "a|b"));
        assert!(matches("//", "/"));
    }

    #[test]
    fn groups() {
        assert!(matches("(0|1|2|3)(0|1|2|3)*", "1231"));
        assert!(!matches("(0|1|2|3)(0|1|2|3)*", ""));
        assert!(matches("( )( )*", "   "));
        assert!(matches("x(a)(b)", "xab"));
        assert!(matches("()", ""));
        assert!(matches("((a|b))*", "abba"));
    }

    #[test]
    fn trailing_union_matches_empty() {
        assert!(matches("a|", ""));
        assert!(matches("a|", "a"));
        assert!(matches("ab|", "a"));
        assert!(!matches("ab|", ""));
    }

    #[test]
    fn long_patterns() {
        let word = "a".repeat(5000);
        let mut dfa = compile(&word).unwrap().determinize();
        assert!(dfa.accepts(&word));
        assert!(!dfa.accepts(&word[1..]));

        let alternatives = format!("{}y", "x|".repeat(2000));
        assert!(matches(&alternatives, "x"));
        assert!(matches(&alternatives, "y"));
        assert!(!matches(&alternatives, "xy"));

        let groups = "(a|b)".repeat(2000);
        let input: String = (0..2000).map(|i| if i % 3 == 0 { 'b' } else { 'a' }).collect();
        assert!(matches(&groups, &input));
        assert!(!matches(&groups, &input[1..]));
    }
}
