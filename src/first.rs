// Copyright (c) 2018 Fabian Schuiki

//! First and follow set computation.
//!
//! The first set of a nonterminal states all terminals that can appear as the
//! first symbol of something it derives. The follow set states all terminals
//! that can appear right after it in a sentential form. Since productions may
//! refer to each other recursively and may be empty, both are computed as a
//! fixpoint: a nonterminal's set is recomputed whenever a set it depends on
//! has changed.

use std::iter::repeat;
use std::mem::swap;

use bit_set::BitSet;

use crate::grammar::{Grammar, NonterminalId, Symbol, TerminalId, END};

/// All first sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirstSets(Vec<FirstSet>);

/// The first set of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirstSet {
    /// The first symbols.
    symbols: BitSet,
    /// Whether the nonterminal can derive the empty string.
    has_epsilon: bool,
}

impl FirstSets {
    /// Compute the first sets of a grammar.
    pub fn compute(grammar: &Grammar) -> FirstSets {
        compute_first(grammar)
    }

    /// Get the first set of a nonterminal.
    pub fn get(&self, id: NonterminalId) -> &FirstSet {
        &self.0[id.as_usize()]
    }

    /// Add the first terminals of a sequence of symbols to `into`.
    ///
    /// Returns `true` if the sequence can derive the empty string.
    pub fn of_sequence(&self, symbols: &[Symbol], into: &mut BitSet) -> bool {
        for symbol in symbols {
            match *symbol {
                Symbol::Terminal(id) => {
                    into.insert(id.as_usize());
                    return false;
                }
                Symbol::Nonterminal(id) => {
                    let fs = &self.0[id.as_usize()];
                    into.union_with(&fs.symbols);
                    if !fs.has_epsilon {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl FirstSet {
    /// The terminals in the set.
    pub fn symbols(&self) -> &BitSet {
        &self.symbols
    }

    /// Check whether a terminal is in the set.
    pub fn contains(&self, id: TerminalId) -> bool {
        self.symbols.contains(id.as_usize())
    }

    /// Whether the nonterminal can derive the empty string.
    pub fn has_epsilon(&self) -> bool {
        self.has_epsilon
    }
}

/// Computes the first set for each nonterminal in a grammar.
fn compute_first(grammar: &Grammar) -> FirstSets {
    let num_term = grammar.terminal_id_bound();
    let num_nonterm = grammar.nonterminal_id_bound();

    // Initially every nonterminal needs to be visited.
    let mut update = BitSet::with_capacity(num_nonterm);
    let mut next_update = BitSet::with_capacity(num_nonterm);
    for production in grammar.productions() {
        update.insert(production.head().as_usize());
    }

    let mut fs = FirstSets(
        repeat(FirstSet {
            symbols: BitSet::with_capacity(num_term),
            has_epsilon: false,
        })
        .take(num_nonterm)
        .collect(),
    );

    // deps[a] holds the nonterminals whose first set includes that of `a`.
    let mut deps: Vec<BitSet> = repeat(BitSet::with_capacity(num_nonterm))
        .take(num_nonterm)
        .collect();

    let mut rounds = 0;
    while !update.is_empty() {
        rounds += 1;
        for current in update.iter() {
            let mut new_fs = fs.0[current].clone();
            let id = NonterminalId::from_usize(current);
            for &pid in grammar.productions_for_nonterminal(id) {
                let mut nullable = true;
                for symbol in grammar.production(pid).body() {
                    match *symbol {
                        Symbol::Terminal(t) => {
                            new_fs.symbols.insert(t.as_usize());
                            nullable = false;
                        }
                        Symbol::Nonterminal(n) => {
                            deps[n.as_usize()].insert(current);
                            let other = &fs.0[n.as_usize()];
                            new_fs.symbols.union_with(&other.symbols);
                            nullable = other.has_epsilon;
                        }
                    }
                    if !nullable {
                        break;
                    }
                }
                new_fs.has_epsilon |= nullable;
            }

            // If the first set has changed, revisit everything that depends
            // on it.
            if new_fs != fs.0[current] {
                fs.0[current] = new_fs;
                next_update.union_with(&deps[current]);
            }
        }
        swap(&mut update, &mut next_update);
        next_update.clear();
    }

    debug!("first sets converged after {} rounds", rounds);
    fs
}

/// All follow sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowSets(Vec<BitSet>);

impl FollowSets {
    /// Compute the follow sets of a grammar.
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> FollowSets {
        let num_term = grammar.terminal_id_bound();
        let mut sets: Vec<BitSet> = repeat(BitSet::with_capacity(num_term))
            .take(grammar.nonterminal_id_bound())
            .collect();
        sets[grammar.start().as_usize()].insert(END.as_usize());

        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions() {
                let body = production.body();
                for (index, symbol) in body.iter().enumerate() {
                    let id = match *symbol {
                        Symbol::Nonterminal(id) => id.as_usize(),
                        Symbol::Terminal(_) => continue,
                    };
                    let mut new_set = sets[id].clone();
                    if first.of_sequence(&body[index + 1..], &mut new_set) {
                        new_set.union_with(&sets[production.head().as_usize()]);
                    }
                    if new_set != sets[id] {
                        sets[id] = new_set;
                        changed = true;
                    }
                }
            }
        }
        FollowSets(sets)
    }

    /// Get the follow set of a nonterminal.
    pub fn get(&self, id: NonterminalId) -> &BitSet {
        &self.0[id.as_usize()]
    }

    /// Iterate over the terminals in the follow set of a nonterminal.
    pub fn terminals(&self, id: NonterminalId) -> impl Iterator<Item = TerminalId> + '_ {
        self.0[id.as_usize()].iter().map(TerminalId::from_usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::arithmetic;
    use crate::grammar::{GrammarBuilder, SemanticRule};

    fn names(grammar: &Grammar, set: &BitSet) -> Vec<String> {
        let mut v: Vec<String> = set
            .iter()
            .map(|t| grammar.terminal_name(TerminalId::from_usize(t)).to_string())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn first_of_arithmetic() {
        let g = arithmetic();
        let fs = FirstSets::compute(&g);
        for name in &["expr'", "expr", "term", "factor"] {
            let set = fs.get(g.nonterminal(name).unwrap());
            assert_eq!(names(&g, set.symbols()), vec!["(", "number"]);
            assert!(!set.has_epsilon());
        }
        assert!(fs.get(g.start()).contains(g.terminal("number").unwrap()));
    }

    #[test]
    fn follow_of_arithmetic() {
        let g = arithmetic();
        let fs = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &fs);
        let nt = |name| g.nonterminal(name).unwrap();
        assert_eq!(names(&g, follow.get(nt("expr'"))), vec!["$"]);
        assert_eq!(names(&g, follow.get(nt("expr"))), vec!["$", ")", "+"]);
        assert_eq!(names(&g, follow.get(nt("term"))), vec!["$", ")", "*", "+"]);
        assert_eq!(names(&g, follow.get(nt("factor"))), vec!["$", ")", "*", "+"]);
    }

    #[test]
    fn nullable_nonterminals() {
        // S' -> S, S -> A b, A -> a A | ε
        let g = GrammarBuilder::new("S'")
            .production("S'", vec!["S"], SemanticRule::None)
            .production("S", vec!["A", "b"], SemanticRule::None)
            .production("A", vec!["a", "A"], SemanticRule::None)
            .production("A", Vec::<String>::new(), SemanticRule::None)
            .build()
            .unwrap();
        let fs = FirstSets::compute(&g);
        let a = g.nonterminal("A").unwrap();
        let s = g.nonterminal("S").unwrap();
        assert!(fs.get(a).has_epsilon());
        assert!(!fs.get(s).has_epsilon());
        assert_eq!(names(&g, fs.get(s).symbols()), vec!["a", "b"]);
        let follow = FollowSets::compute(&g, &fs);
        assert_eq!(names(&g, follow.get(a)), vec!["b"]);
        let follow_a: Vec<_> = follow.terminals(a).collect();
        assert_eq!(follow_a, vec![g.terminal("b").unwrap()]);
    }

    #[test]
    fn left_recursion_terminates() {
        // A -> A a | b, where A also occurs in its own follow context.
        let g = GrammarBuilder::new("S")
            .production("S", vec!["A"], SemanticRule::None)
            .production("A", vec!["A", "a"], SemanticRule::None)
            .production("A", vec!["A", "A"], SemanticRule::None)
            .production("A", vec!["b"], SemanticRule::None)
            .build()
            .unwrap();
        let fs = FirstSets::compute(&g);
        let a = g.nonterminal("A").unwrap();
        assert_eq!(names(&g, fs.get(a).symbols()), vec!["b"]);
        let follow = FollowSets::compute(&g, &fs);
        assert_eq!(names(&g, follow.get(a)), vec!["$", "a", "b"]);
    }
}
