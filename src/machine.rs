// Copyright (c) 2018 Fabian Schuiki

//! Representation of a parsing table.
//!
//! The table maps a parser state and a grammar symbol to at most one action.
//! Shift actions on nonterminals double as goto entries. Reductions are
//! entered for every terminal in the follow set of the production's head.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{ConflictKind, GrammarError};
use crate::first::{FirstSets, FollowSets};
use crate::grammar::{Grammar, ProductionId, Symbol, AUGMENTING, END};
use crate::graph::StateId;
use crate::item_set::ItemSets;
use crate::Pretty;

/// A parsing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingTable {
    states: Vec<State>,
}

/// A parser state.
///
/// This is basically a set of mappings from symbols to actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: StateId,
    actions: BTreeMap<Symbol, Action>,
}

/// An action to be taken upon encountering a symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Shift the symbol and go to the given state.
    Shift(StateId),
    /// Reduce with the given production.
    Reduce(ProductionId),
    /// Accept the input.
    Accept,
}

impl ParsingTable {
    /// Build the parsing table for a grammar.
    ///
    /// Fails on the first cell that would receive two different actions.
    pub fn build(grammar: &Grammar) -> Result<ParsingTable, GrammarError> {
        let item_sets = ItemSets::compute(grammar);
        let first = FirstSets::compute(grammar);
        let follow = FollowSets::compute(grammar, &first);
        ParsingTable::from_item_sets(grammar, &item_sets, &follow)
    }

    /// Build the parsing table from precomputed item sets and follow sets.
    pub fn from_item_sets(
        grammar: &Grammar,
        item_sets: &ItemSets,
        follow: &FollowSets,
    ) -> Result<ParsingTable, GrammarError> {
        let mut table = ParsingTable {
            states: (0..item_sets.len())
                .map(|index| State {
                    id: StateId::from_usize(index),
                    actions: BTreeMap::new(),
                })
                .collect(),
        };

        for (id, set) in item_sets.all() {
            for (&symbol, target) in item_sets.gotos().transitions(id) {
                table.add_action(grammar, id, symbol, Action::Shift(target))?;
            }
            for item in set.items().filter(|item| item.is_complete(grammar)) {
                let production = grammar.production(item.production());
                for terminal in follow.terminals(production.head()) {
                    let action = if item.production() == AUGMENTING && terminal == END {
                        Action::Accept
                    } else {
                        Action::Reduce(item.production())
                    };
                    table.add_action(grammar, id, Symbol::Terminal(terminal), action)?;
                }
            }
        }

        debug!("parsing table with {} states", table.states.len());
        Ok(table)
    }

    /// Enter an action into the table, rejecting conflicts.
    fn add_action(
        &mut self,
        grammar: &Grammar,
        state: StateId,
        symbol: Symbol,
        action: Action,
    ) -> Result<(), GrammarError> {
        let actions = &mut self[state].actions;
        match actions.get(&symbol).cloned() {
            None => {
                actions.insert(symbol, action);
                Ok(())
            }
            Some(existing) if existing == action => Ok(()),
            Some(existing) => {
                let kind = classify(existing, action);
                debug!(
                    "{} conflict in state {} on {}: {:?} vs {:?}",
                    kind,
                    state,
                    symbol.pretty(grammar),
                    existing,
                    action
                );
                Err(GrammarError::Conflict {
                    kind: kind,
                    state: state,
                    symbol: grammar.symbol_name(symbol).into(),
                })
            }
        }
    }

    /// Look up the action for a state and symbol.
    pub fn action(&self, state: StateId, symbol: Symbol) -> Option<Action> {
        self.states
            .get(state.as_usize())
            .and_then(|s| s.actions.get(&symbol).cloned())
    }

    /// All states in the table.
    pub fn states(&self) -> States<'_> {
        States(self.states.iter())
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the table has no states. Never true for a built table.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get a pretty printer for this table.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

/// Determine the kind of conflict between two different actions.
fn classify(a: Action, b: Action) -> ConflictKind {
    match (a, b) {
        (Action::Accept, _) | (_, Action::Accept) => ConflictKind::Accept,
        (Action::Shift(_), Action::Shift(_)) => ConflictKind::ShiftShift,
        (Action::Reduce(_), Action::Reduce(_)) => ConflictKind::ReduceReduce,
        _ => ConflictKind::ShiftReduce,
    }
}

impl Index<StateId> for ParsingTable {
    type Output = State;

    fn index(&self, index: StateId) -> &State {
        &self.states[index.as_usize()]
    }
}

impl IndexMut<StateId> for ParsingTable {
    fn index_mut(&mut self, index: StateId) -> &mut State {
        &mut self.states[index.as_usize()]
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ParsingTable> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for state in self.item.states() {
            write!(f, "s{}:", state.id)?;
            for (symbol, action) in state.actions() {
                write!(f, " {}:", symbol.pretty(self.ctx))?;
                match action {
                    Action::Shift(id) => write!(f, "s{}", id)?,
                    Action::Reduce(id) => write!(f, "r{}", id.as_usize())?,
                    Action::Accept => write!(f, "acc")?,
                }
            }
            write!(f, "\n")?;
        }
        Ok(())
    }
}

impl State {
    /// Get the unique identifier of this state.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// An iterator over the symbols and associated actions.
    pub fn actions(&self) -> Actions<'_> {
        Actions(self.actions.iter())
    }
}

/// An iterator over the states of a parsing table.
pub struct States<'a>(std::slice::Iter<'a, State>);

impl<'a> Iterator for States<'a> {
    type Item = &'a State;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

/// An iterator over the actions of a state.
pub struct Actions<'a>(std::collections::btree_map::Iter<'a, Symbol, Action>);

impl<'a> Iterator for Actions<'a> {
    type Item = (Symbol, Action);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(&s, &a)| (s, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::arithmetic;
    use crate::grammar::{GrammarBuilder, SemanticRule};

    #[test]
    fn arithmetic_builds() {
        let g = arithmetic();
        let table = ParsingTable::build(&g).unwrap();
        assert_eq!(table.len(), 12);
        let number = Symbol::Terminal(g.terminal("number").unwrap());
        let end = Symbol::Terminal(END);
        match table.action(StateId::from_usize(0), number) {
            Some(Action::Shift(_)) => (),
            other => panic!("expected shift on number, got {:?}", other),
        }
        assert_eq!(table.action(StateId::from_usize(0), end), None);
        let accepting: Vec<StateId> = table
            .states()
            .filter(|s| s.actions().any(|(_, a)| a == Action::Accept))
            .map(|s| s.id())
            .collect();
        assert_eq!(accepting.len(), 1);
        let expr = Symbol::Nonterminal(g.nonterminal("expr").unwrap());
        assert_eq!(
            table.action(StateId::from_usize(0), expr),
            Some(Action::Shift(accepting[0]))
        );
    }

    #[test]
    fn ambiguous_sum_conflicts() {
        let g = GrammarBuilder::new("E'")
            .production("E'", vec!["E"], SemanticRule::None)
            .production("E", vec!["E", "+", "E"], SemanticRule::tree("+", vec![0, 2]))
            .production("E", vec!["n"], SemanticRule::None)
            .build()
            .unwrap();
        match ParsingTable::build(&g) {
            Err(GrammarError::Conflict { kind, symbol, .. }) => {
                assert_eq!(kind, ConflictKind::ShiftReduce);
                assert_eq!(symbol, "+");
            }
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn reduce_reduce_conflict() {
        // S -> A | B, A -> x, B -> x
        let g = GrammarBuilder::new("S'")
            .production("S'", vec!["S"], SemanticRule::None)
            .production("S", vec!["A"], SemanticRule::None)
            .production("S", vec!["B"], SemanticRule::None)
            .production("A", vec!["x"], SemanticRule::None)
            .production("B", vec!["x"], SemanticRule::None)
            .build()
            .unwrap();
        match ParsingTable::build(&g) {
            Err(GrammarError::Conflict { kind, symbol, .. }) => {
                assert_eq!(kind, ConflictKind::ReduceReduce);
                assert_eq!(symbol, "$");
            }
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn cc_grammar_builds() {
        let g = GrammarBuilder::new("S'")
            .production("S'", vec!["S"], SemanticRule::None)
            .production("S", vec!["C", "C"], SemanticRule::None)
            .production("C", vec!["c", "C"], SemanticRule::None)
            .production("C", vec!["d"], SemanticRule::None)
            .build()
            .unwrap();
        let table = ParsingTable::build(&g).unwrap();
        assert_eq!(table.len(), 7);
        let printed = format!("{}", table.pretty(&g));
        assert!(printed.contains("acc"));
        assert!(printed.starts_with("s0:"));
    }

    #[test]
    fn classify_conflicts() {
        let s = Action::Shift(StateId::from_usize(1));
        let r = Action::Reduce(ProductionId::from_usize(1));
        assert_eq!(classify(s, r), ConflictKind::ShiftReduce);
        assert_eq!(classify(r, s), ConflictKind::ShiftReduce);
        let r2 = Action::Reduce(ProductionId::from_usize(2));
        let s2 = Action::Shift(StateId::from_usize(2));
        assert_eq!(classify(r, r2), ConflictKind::ReduceReduce);
        assert_eq!(classify(s, s2), ConflictKind::ShiftShift);
        assert_eq!(classify(Action::Accept, r), ConflictKind::Accept);
    }
}
