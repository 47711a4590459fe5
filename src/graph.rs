// Copyright (c) 2018 Fabian Schuiki

//! Transition graphs shared by the lexer and parser automata.
//!
//! Both the regular expression automata and the LR automaton are represented
//! as explicit adjacency maps keyed by integer state ids. States of a graph
//! are only meaningful within that graph; combining two graphs requires
//! renumbering one of them first.
//!
//! The [`explore`] function implements the worklist/seen-set pattern used to
//! discover a deterministic automaton whose states are sets of some underlying
//! objects. It is applied once to sets of NFA states (subset construction) and
//! once to sets of LR items (canonical collection).

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;

/// A unique state identifier, scoped to one automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl StateId {
    /// Create a state id from a usize.
    pub fn from_usize(id: usize) -> StateId {
        StateId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// The same state shifted by `offset`.
    pub fn offset(self, offset: usize) -> StateId {
        StateId(self.0 + offset)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The label of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label<T> {
    /// A spontaneous move that consumes no input.
    Epsilon,
    /// A move that consumes one input symbol.
    Symbol(T),
}

impl<T: fmt::Display> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Label::Epsilon => write!(f, "ε"),
            Label::Symbol(ref s) => write!(f, "{}", s),
        }
    }
}

/// A nondeterministic transition graph.
///
/// Maps each state to the labels leaving it, and each label to the set of
/// destination states. Transitions are only ever added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph<T: Ord> {
    edges: BTreeMap<StateId, BTreeMap<Label<T>, Vec<StateId>>>,
}

impl<T: Ord + Clone> Graph<T> {
    /// Create a new empty graph.
    pub fn new() -> Graph<T> {
        Graph {
            edges: BTreeMap::new(),
        }
    }

    /// Add a transition from `from` to `to` on `label`.
    ///
    /// Adding a transition that already exists has no effect.
    pub fn add_transition(&mut self, from: StateId, to: StateId, label: Label<T>) {
        let targets = self
            .edges
            .entry(from)
            .or_insert_with(BTreeMap::new)
            .entry(label)
            .or_insert_with(Vec::new);
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    /// The states reachable from `from` on exactly `label`.
    pub fn targets(&self, from: StateId, label: &Label<T>) -> &[StateId] {
        self.edges
            .get(&from)
            .and_then(|row| row.get(label))
            .map(|targets| targets.as_slice())
            .unwrap_or(&[])
    }

    /// All transitions leaving `from`, grouped by label.
    pub fn transitions(&self, from: StateId) -> Transitions<'_, T> {
        Transitions(self.edges.get(&from).map(|row| row.iter()))
    }

    /// Shift every state in the graph by `offset`.
    pub fn renumber(&mut self, offset: usize) {
        if offset == 0 {
            return;
        }
        let edges = std::mem::replace(&mut self.edges, BTreeMap::new());
        self.edges = edges
            .into_iter()
            .map(|(from, row)| {
                let row: BTreeMap<Label<T>, Vec<StateId>> = row
                    .into_iter()
                    .map(|(label, targets)| {
                        let targets = targets.into_iter().map(|t: StateId| t.offset(offset));
                        (label, targets.collect())
                    })
                    .collect();
                (from.offset(offset), row)
            })
            .collect();
    }

    /// Add all transitions of `other` to this graph.
    ///
    /// The caller is responsible for renumbering `other` beforehand if the
    /// two graphs are meant to be disjoint.
    pub fn merge(&mut self, other: Graph<T>) {
        for (from, row) in other.edges {
            for (label, targets) in row {
                for to in targets {
                    self.add_transition(from, to, label.clone());
                }
            }
        }
    }

    /// The total number of transitions in the graph.
    pub fn num_transitions(&self) -> usize {
        self.edges
            .values()
            .flat_map(|row| row.values())
            .map(|targets| targets.len())
            .sum()
    }
}

impl<T: Ord + Clone> Default for Graph<T> {
    fn default() -> Graph<T> {
        Graph::new()
    }
}

/// An iterator over the transitions leaving a state of a graph.
pub struct Transitions<'a, T: 'a>(
    Option<std::collections::btree_map::Iter<'a, Label<T>, Vec<StateId>>>,
);

impl<'a, T> Iterator for Transitions<'a, T> {
    type Item = (&'a Label<T>, &'a [StateId]);

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .as_mut()
            .and_then(|iter| iter.next())
            .map(|(label, targets)| (label, targets.as_slice()))
    }
}

/// A deterministic transition graph.
///
/// A partial function from state and label to the next state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterministicGraph<T: Ord> {
    edges: BTreeMap<StateId, BTreeMap<T, StateId>>,
}

impl<T: Ord> DeterministicGraph<T> {
    /// Create a new empty graph.
    pub fn new() -> DeterministicGraph<T> {
        DeterministicGraph {
            edges: BTreeMap::new(),
        }
    }

    /// Set the transition from `from` on `label` to `to`.
    ///
    /// Returns the previous target if the transition was already defined.
    pub fn add_transition(&mut self, from: StateId, to: StateId, label: T) -> Option<StateId> {
        self.edges
            .entry(from)
            .or_insert_with(BTreeMap::new)
            .insert(label, to)
    }

    /// The state reached from `from` on `label`, if any.
    pub fn target(&self, from: StateId, label: &T) -> Option<StateId> {
        self.edges.get(&from).and_then(|row| row.get(label)).cloned()
    }

    /// All transitions leaving `from`.
    pub fn transitions(&self, from: StateId) -> DeterministicTransitions<'_, T> {
        DeterministicTransitions(self.edges.get(&from).map(|row| row.iter()))
    }

    /// The total number of transitions in the graph.
    pub fn num_transitions(&self) -> usize {
        self.edges.values().map(|row| row.len()).sum()
    }
}

impl<T: Ord> Default for DeterministicGraph<T> {
    fn default() -> DeterministicGraph<T> {
        DeterministicGraph::new()
    }
}

/// An iterator over the transitions leaving a state of a deterministic graph.
pub struct DeterministicTransitions<'a, T: 'a>(
    Option<std::collections::btree_map::Iter<'a, T, StateId>>,
);

impl<'a, T> Iterator for DeterministicTransitions<'a, T> {
    type Item = (&'a T, StateId);

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .as_mut()
            .and_then(|iter| iter.next())
            .map(|(label, &target)| (label, target))
    }
}

/// Discover a deterministic automaton by breadth-first exploration.
///
/// Starting at `root`, the `successors` function is called exactly once for
/// every distinct state and yields the labelled moves out of it. Every state
/// is assigned the id of its position in the returned set, the first time it
/// is observed; `root` is state 0. Terminates as long as the number of
/// distinct states reachable from `root` is finite.
pub fn explore<S, T, F>(root: S, mut successors: F) -> (IndexSet<S>, DeterministicGraph<T>)
where
    S: Hash + Eq,
    T: Ord + fmt::Debug,
    F: FnMut(&S) -> Vec<(T, S)>,
{
    let mut seen = IndexSet::new();
    let mut todo = VecDeque::new();
    let mut graph = DeterministicGraph::new();
    seen.insert(root);
    todo.push_back(0);

    while let Some(index) = todo.pop_front() {
        let moves = successors(&seen[index]);
        for (label, next) in moves {
            let (next_index, inserted) = seen.insert_full(next);
            if inserted {
                trace!("discovered state {} via {:?} from {}", next_index, label, index);
                todo.push_back(next_index);
            }
            graph.add_transition(
                StateId::from_usize(index),
                StateId::from_usize(next_index),
                label,
            );
        }
    }

    (seen, graph)
}
