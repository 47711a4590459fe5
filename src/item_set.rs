// Copyright (c) 2018 Fabian Schuiki

//! Item sets derived from a grammar.
//!
//! An item is a production with a marker that separates the part of its body
//! already matched from the part still expected. The canonical collection of
//! item sets is discovered with the same exploration used for subset
//! construction: item sets take the place of sets of automaton states.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::ops::Index;

use bit_set::BitSet;
use indexmap::IndexSet;

use crate::grammar::{Grammar, ProductionId, Symbol, AUGMENTING};
use crate::graph::{self, DeterministicGraph, StateId};
use crate::Pretty;

/// A single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    /// The production of the item.
    pub(crate) production: ProductionId,
    /// The position of the marker within the production.
    pub(crate) marker: usize,
}

impl Item {
    /// Create an item with the marker at the given position.
    pub fn new(production: ProductionId, marker: usize) -> Item {
        Item {
            production: production,
            marker: marker,
        }
    }

    /// Get the production this item represents.
    pub fn production(&self) -> ProductionId {
        self.production
    }

    /// Get the position of the marker within the production.
    pub fn marker(&self) -> usize {
        self.marker
    }

    /// The symbol right after the marker, if any.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar
            .production(self.production)
            .body()
            .get(self.marker)
            .cloned()
    }

    /// Whether the marker has reached the end of the production.
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.marker >= grammar.production(self.production).body().len()
    }

    /// The item with the marker advanced by one symbol.
    pub fn advance(&self) -> Item {
        Item::new(self.production, self.marker + 1)
    }

    /// Get a pretty printer for this item.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Item> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let production = self.ctx.production(self.item.production);
        write!(f, "[{} ->", production.head().pretty(self.ctx))?;
        let symbols = production.body();
        for symbol in &symbols[0..self.item.marker] {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        write!(f, " .")?;
        for symbol in &symbols[self.item.marker..] {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        write!(f, "]")
    }
}

/// An item set.
///
/// Two item sets are equal if they contain the same items, regardless of the
/// order in which the items were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ItemSet {
    items: BTreeSet<Item>,
}

impl ItemSet {
    /// Create an empty item set.
    pub fn new() -> ItemSet {
        ItemSet::default()
    }

    /// Compute the closure of a single item.
    ///
    /// Every nonterminal that appears after a marker is expanded exactly once,
    /// adding all of its productions with the marker at the start.
    pub fn closure_of(item: Item, grammar: &Grammar) -> ItemSet {
        let mut set = ItemSet::new();
        set.close_over(Some(item), grammar);
        set
    }

    /// Add the closures of the given items to this set.
    fn close_over<I: IntoIterator<Item = Item>>(&mut self, items: I, grammar: &Grammar) {
        let mut expanded = BitSet::with_capacity(grammar.nonterminal_id_bound());
        let mut todo: VecDeque<Item> = items.into_iter().collect();
        while let Some(item) = todo.pop_front() {
            self.items.insert(item);
            let id = match item.next_symbol(grammar) {
                Some(Symbol::Nonterminal(id)) => id,
                _ => continue,
            };
            if !expanded.insert(id.as_usize()) {
                continue;
            }
            for &pid in grammar.productions_for_nonterminal(id) {
                let new_item = Item::new(pid, 0);
                if !self.items.contains(&new_item) {
                    todo.push_back(new_item);
                }
            }
        }
    }

    /// Compute the item set reached by moving past `symbol`.
    ///
    /// Advances every item expecting `symbol` and closes the result. Yields an
    /// empty set if no item expects `symbol`.
    pub fn goto(&self, symbol: Symbol, grammar: &Grammar) -> ItemSet {
        let mut set = ItemSet::new();
        let advanced: Vec<Item> = self
            .items
            .iter()
            .filter(|item| item.next_symbol(grammar) == Some(symbol))
            .map(Item::advance)
            .collect();
        set.close_over(advanced, grammar);
        set
    }

    /// The symbols some item in this set expects next, in ascending order.
    pub fn next_symbols(&self, grammar: &Grammar) -> BTreeSet<Symbol> {
        self.items
            .iter()
            .filter_map(|item| item.next_symbol(grammar))
            .collect()
    }

    /// The successor item sets of this set, keyed by symbol.
    fn successors(&self, grammar: &Grammar) -> BTreeMap<Symbol, ItemSet> {
        self.next_symbols(grammar)
            .into_iter()
            .map(|symbol| (symbol, self.goto(symbol, grammar)))
            .collect()
    }

    /// Check whether the set contains an item.
    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }

    /// The items in the set, in ascending order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// The number of items in the set.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a pretty printer for this item set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, item) in self.item.items.iter().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "{}", item.pretty(self.ctx))?;
        }
        if self.item.items.is_empty() {
            write!(f, "<empty>")?;
        }
        Ok(())
    }
}

/// The canonical collection of item sets of a grammar.
///
/// State 0 is the closure of the augmenting item.
#[derive(Debug, Clone)]
pub struct ItemSets {
    sets: IndexSet<ItemSet>,
    gotos: DeterministicGraph<Symbol>,
}

impl ItemSets {
    /// Compute the item sets for a grammar.
    pub fn compute(grammar: &Grammar) -> ItemSets {
        let root = ItemSet::closure_of(Item::new(AUGMENTING, 0), grammar);
        let (sets, gotos) = graph::explore(root, |set: &ItemSet| {
            trace!("expanding item set of {} items", set.len());
            set.successors(grammar).into_iter().collect()
        });
        debug!(
            "{} item sets with {} transitions",
            sets.len(),
            gotos.num_transitions()
        );
        ItemSets {
            sets: sets,
            gotos: gotos,
        }
    }

    /// The number of item sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether there are no item sets. Never true for a computed collection.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// All item sets, in order of discovery.
    pub fn all(&self) -> impl Iterator<Item = (StateId, &ItemSet)> {
        self.sets
            .iter()
            .enumerate()
            .map(|(index, set)| (StateId::from_usize(index), set))
    }

    /// The state reached from `state` by moving past `symbol`.
    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.gotos.target(state, &symbol)
    }

    /// The transitions between item sets.
    pub fn gotos(&self) -> &DeterministicGraph<Symbol> {
        &self.gotos
    }

    /// Get a pretty printer for this item set collection.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Index<StateId> for ItemSets {
    type Output = ItemSet;

    fn index(&self, index: StateId) -> &ItemSet {
        &self.sets[index.as_usize()]
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSets> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, set) in self.item.all() {
            write!(f, "i{}:\n", id)?;
            for item in set.items() {
                write!(f, "    {}\n", item.pretty(self.ctx))?;
            }
            for (symbol, target) in self.item.gotos.transitions(id) {
                write!(f, "    {} -> i{}\n", symbol.pretty(self.ctx), target)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::arithmetic;
    use crate::grammar::{GrammarBuilder, SemanticRule};

    fn item(p: usize, marker: usize) -> Item {
        Item::new(ProductionId::from_usize(p), marker)
    }

    fn set(items: &[(usize, usize)]) -> ItemSet {
        ItemSet {
            items: items.iter().map(|&(p, m)| item(p, m)).collect(),
        }
    }

    #[test]
    fn closure_of_augmenting_item() {
        let g = arithmetic();
        let closure = ItemSet::closure_of(item(0, 0), &g);
        assert_eq!(
            closure,
            set(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0)])
        );
    }

    #[test]
    fn closure_of_inner_items() {
        let g = arithmetic();
        // term -> term * . factor
        assert_eq!(
            ItemSet::closure_of(item(3, 2), &g),
            set(&[(3, 2), (5, 0), (6, 0)])
        );
        // factor -> ( . expr )
        assert_eq!(
            ItemSet::closure_of(item(6, 1), &g),
            set(&[(6, 1), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0)])
        );
        // factor -> number .
        assert_eq!(ItemSet::closure_of(item(5, 1), &g), set(&[(5, 1)]));
    }

    #[test]
    fn goto_advances_and_closes() {
        let g = arithmetic();
        let root = ItemSet::closure_of(item(0, 0), &g);
        let expr = Symbol::Nonterminal(g.nonterminal("expr").unwrap());
        assert_eq!(root.goto(expr, &g), set(&[(0, 1), (1, 1)]));
        let open = Symbol::Terminal(g.terminal("(").unwrap());
        assert_eq!(
            root.goto(open, &g),
            ItemSet::closure_of(item(6, 1), &g)
        );
        let close = Symbol::Terminal(g.terminal(")").unwrap());
        assert!(root.goto(close, &g).is_empty());
    }

    #[test]
    fn canonical_collection_of_arithmetic() {
        let g = arithmetic();
        let sets = ItemSets::compute(&g);
        assert_eq!(sets.len(), 12);
        assert_eq!(sets[StateId::from_usize(0)], ItemSet::closure_of(item(0, 0), &g));
        let expr = Symbol::Nonterminal(g.nonterminal("expr").unwrap());
        let state = sets.goto(StateId::from_usize(0), expr).unwrap();
        assert!(sets[state].contains(&item(0, 1)));
    }

    #[test]
    fn canonical_collection_of_cc() {
        // The textbook S' -> S, S -> C C, C -> c C | d grammar.
        let g = GrammarBuilder::new("S'")
            .production("S'", vec!["S"], SemanticRule::None)
            .production("S", vec!["C", "C"], SemanticRule::None)
            .production("C", vec!["c", "C"], SemanticRule::None)
            .production("C", vec!["d"], SemanticRule::None)
            .build()
            .unwrap();
        let sets = ItemSets::compute(&g);
        assert_eq!(sets.len(), 7);
        let printed = format!("{}", sets.pretty(&g));
        assert!(printed.contains("[S' -> . S]"));
        assert!(printed.contains("[C -> c . C]"));
    }
}
