// Copyright (c) 2018 Fabian Schuiki

//! Nondeterministic finite automata and their determinization.
//!
//! Fragments are built by Thompson's construction: every fragment has exactly
//! one start and one final state, and the combinators preserve this. The
//! states of a fragment are always numbered `0..num_states()`, which allows
//! two fragments to be made disjoint by shifting one of them past the other.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bit_set::BitSet;

use crate::dfa::Dfa;
use crate::graph::{explore, Graph, Label, StateId};

/// A nondeterministic finite automaton fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    start: StateId,
    accept: StateId,
    num_states: usize,
    graph: Graph<char>,
}

impl Nfa {
    /// Create a fragment with a single transition on `label`.
    fn with_label(label: Label<char>) -> Nfa {
        let mut graph = Graph::new();
        graph.add_transition(StateId::from_usize(0), StateId::from_usize(1), label);
        Nfa {
            start: StateId::from_usize(0),
            accept: StateId::from_usize(1),
            num_states: 2,
            graph: graph,
        }
    }

    /// Create a fragment that matches the single character `c`.
    pub fn symbol(c: char) -> Nfa {
        Nfa::with_label(Label::Symbol(c))
    }

    /// Create a fragment that matches the empty string.
    pub fn empty() -> Nfa {
        Nfa::with_label(Label::Epsilon)
    }

    /// The start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The final state.
    pub fn accept(&self) -> StateId {
        self.accept
    }

    /// The number of states in the fragment.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// The transition graph of the fragment.
    pub fn graph(&self) -> &Graph<char> {
        &self.graph
    }

    fn renumber(&mut self, offset: usize) {
        self.start = self.start.offset(offset);
        self.accept = self.accept.offset(offset);
        self.graph.renumber(offset);
    }

    fn fresh_state(&mut self) -> StateId {
        let id = StateId::from_usize(self.num_states);
        self.num_states += 1;
        id
    }

    /// Place `self` and `other` in one graph.
    ///
    /// The smaller fragment is shifted past the larger one, so chains of
    /// combinators only ever renumber the short side. The result keeps the
    /// start and final state of `self`. Those of `other` are returned.
    fn join(mut self, mut other: Nfa) -> (Nfa, StateId, StateId) {
        let num_states = self.num_states + other.num_states;
        if other.num_states <= self.num_states {
            other.renumber(self.num_states);
            self.graph.merge(other.graph);
        } else {
            self.renumber(other.num_states);
            let graph = std::mem::replace(&mut self.graph, Graph::new());
            other.graph.merge(graph);
            self.graph = other.graph;
        }
        self.num_states = num_states;
        (self, other.start, other.accept)
    }

    /// Match `self` followed by `other`.
    pub fn concat(self, other: Nfa) -> Nfa {
        let (mut nfa, other_start, other_accept) = self.join(other);
        nfa.graph
            .add_transition(nfa.accept, other_start, Label::Epsilon);
        nfa.accept = other_accept;
        nfa
    }

    /// Match either `self` or `other`.
    pub fn union(self, other: Nfa) -> Nfa {
        let (mut nfa, other_start, other_accept) = self.join(other);
        let start = nfa.fresh_state();
        let accept = nfa.fresh_state();
        nfa.graph.add_transition(start, nfa.start, Label::Epsilon);
        nfa.graph.add_transition(start, other_start, Label::Epsilon);
        nfa.graph.add_transition(nfa.accept, accept, Label::Epsilon);
        nfa.graph.add_transition(other_accept, accept, Label::Epsilon);
        nfa.start = start;
        nfa.accept = accept;
        nfa
    }

    /// Match `self` zero or more times.
    pub fn star(mut self) -> Nfa {
        self.renumber(1);
        self.num_states += 1;

        let start = StateId::from_usize(0);
        let accept = self.fresh_state();
        self.graph.add_transition(start, self.start, Label::Epsilon);
        self.graph.add_transition(self.accept, accept, Label::Epsilon);
        self.graph.add_transition(self.accept, self.start, Label::Epsilon);
        self.graph.add_transition(start, accept, Label::Epsilon);
        self.start = start;
        self.accept = accept;
        self
    }

    /// Convert the fragment into an equivalent deterministic automaton by
    /// subset construction.
    pub fn determinize(&self) -> Dfa {
        let mut closures = EpsilonClosures::new(&self.graph);
        let root = closures.of(self.start).clone();
        let graph = &self.graph;

        let (sets, transitions) = explore(root, |set: &BitSet| {
            let mut moves: BTreeMap<char, BitSet> = BTreeMap::new();
            for state in set.iter() {
                for (label, targets) in graph.transitions(StateId::from_usize(state)) {
                    if let Label::Symbol(c) = *label {
                        moves
                            .entry(c)
                            .or_insert_with(BitSet::new)
                            .extend(targets.iter().map(|t| t.as_usize()));
                    }
                }
            }
            moves
                .into_iter()
                .map(|(c, targets)| (c, closures.of_set(&targets)))
                .collect()
        });

        let finals: BTreeSet<StateId> = sets
            .iter()
            .enumerate()
            .filter(|&(_, set)| set.contains(self.accept.as_usize()))
            .map(|(index, _)| StateId::from_usize(index))
            .collect();
        debug!(
            "determinized {} nfa states into {} dfa states ({} final)",
            self.num_states,
            sets.len(),
            finals.len()
        );
        Dfa::new(transitions, finals)
    }
}

/// Memoized epsilon closures of the states of one graph.
struct EpsilonClosures<'a> {
    graph: &'a Graph<char>,
    cache: HashMap<StateId, BitSet>,
}

impl<'a> EpsilonClosures<'a> {
    fn new(graph: &'a Graph<char>) -> EpsilonClosures<'a> {
        EpsilonClosures {
            graph: graph,
            cache: HashMap::new(),
        }
    }

    /// The set of states reachable from `state` through epsilon moves alone,
    /// including `state` itself.
    fn of(&mut self, state: StateId) -> &BitSet {
        if !self.cache.contains_key(&state) {
            let mut visited = BitSet::new();
            let mut todo = vec![state];
            visited.insert(state.as_usize());
            while let Some(current) = todo.pop() {
                if let Some(done) = self.cache.get(&current) {
                    visited.union_with(done);
                    continue;
                }
                for &next in self.graph.targets(current, &Label::Epsilon) {
                    if visited.insert(next.as_usize()) {
                        todo.push(next);
                    }
                }
            }
            trace!("closure of {}: {:?}", state, visited);
            self.cache.insert(state, visited);
        }
        &self.cache[&state]
    }

    /// The union of the closures of all states in `states`.
    fn of_set(&mut self, states: &BitSet) -> BitSet {
        let mut result = BitSet::new();
        for state in states.iter() {
            result.union_with(self.of(StateId::from_usize(state)));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(id: usize) -> StateId {
        StateId::from_usize(id)
    }

    #[test]
    fn symbol() {
        let nfa = Nfa::symbol('a');
        assert_eq!(nfa.start(), s(0));
        assert_eq!(nfa.accept(), s(1));
        assert_eq!(nfa.graph().targets(s(0), &Label::Symbol('a')), &[s(1)]);
        assert_eq!(nfa.graph().num_transitions(), 1);
    }

    #[test]
    fn union() {
        let nfa = Nfa::symbol('a').union(Nfa::symbol('b'));
        assert_eq!(nfa.start(), s(4));
        assert_eq!(nfa.accept(), s(5));
        assert_eq!(nfa.num_states(), 6);
        let g = nfa.graph();
        assert_eq!(g.targets(s(4), &Label::Epsilon), &[s(0), s(2)]);
        assert_eq!(g.targets(s(0), &Label::Symbol('a')), &[s(1)]);
        assert_eq!(g.targets(s(2), &Label::Symbol('b')), &[s(3)]);
        assert_eq!(g.targets(s(1), &Label::Epsilon), &[s(5)]);
        assert_eq!(g.targets(s(3), &Label::Epsilon), &[s(5)]);
    }

    #[test]
    fn concat() {
        let nfa = Nfa::symbol('a').concat(Nfa::symbol('b'));
        assert_eq!(nfa.start(), s(0));
        assert_eq!(nfa.accept(), s(3));
        let g = nfa.graph();
        assert_eq!(g.targets(s(0), &Label::Symbol('a')), &[s(1)]);
        assert_eq!(g.targets(s(1), &Label::Epsilon), &[s(2)]);
        assert_eq!(g.targets(s(2), &Label::Symbol('b')), &[s(3)]);
    }

    #[test]
    fn smaller_fragment_is_shifted() {
        // `ab` followed by `c`: `c` moves past the four states of `ab`.
        let ab = Nfa::symbol('a').concat(Nfa::symbol('b'));
        let nfa = ab.clone().concat(Nfa::symbol('c'));
        assert_eq!(nfa.start(), s(0));
        assert_eq!(nfa.accept(), s(5));
        assert_eq!(nfa.graph().targets(s(4), &Label::Symbol('c')), &[s(5)]);

        // `c` followed by `ab`: `c` moves past `ab`, which keeps its ids.
        let nfa = Nfa::symbol('c').concat(ab);
        assert_eq!(nfa.num_states(), 6);
        assert_eq!(nfa.start(), s(4));
        assert_eq!(nfa.accept(), s(3));
        let g = nfa.graph();
        assert_eq!(g.targets(s(4), &Label::Symbol('c')), &[s(5)]);
        assert_eq!(g.targets(s(5), &Label::Epsilon), &[s(0)]);
        assert_eq!(g.targets(s(0), &Label::Symbol('a')), &[s(1)]);
    }

    #[test]
    fn star() {
        let nfa = Nfa::symbol('a').star();
        assert_eq!(nfa.start(), s(0));
        assert_eq!(nfa.accept(), s(3));
        let g = nfa.graph();
        assert_eq!(g.targets(s(0), &Label::Epsilon), &[s(1), s(3)]);
        assert_eq!(g.targets(s(1), &Label::Symbol('a')), &[s(2)]);
        assert_eq!(g.targets(s(2), &Label::Epsilon), &[s(3), s(1)]);
    }

    #[test]
    fn nested_fragments_keep_single_start_and_final() {
        let nfa = Nfa::symbol('a')
            .union(Nfa::symbol('b'))
            .star()
            .concat(Nfa::symbol('c').star())
            .union(Nfa::empty());
        assert_ne!(nfa.start(), nfa.accept());
        assert!(nfa.start().as_usize() < nfa.num_states());
        assert!(nfa.accept().as_usize() < nfa.num_states());
        // Nothing leaves the final state, nothing enters the start state.
        assert_eq!(nfa.graph().transitions(nfa.accept()).count(), 0);
        for from in 0..nfa.num_states() {
            for (_, targets) in nfa.graph().transitions(s(from)) {
                assert!(!targets.contains(&nfa.start()));
            }
        }
    }

    #[test]
    fn closure_survives_cycles() {
        // (a*)* has epsilon cycles through both star constructions.
        let nfa = Nfa::symbol('a').star().star();
        let mut closures = EpsilonClosures::new(nfa.graph());
        let closure = closures.of(nfa.start()).clone();
        assert!(closure.contains(nfa.accept().as_usize()));
        assert_eq!(closure.len(), nfa.num_states() - 1);
    }

    #[test]
    fn determinized_states_are_deterministic() {
        let dfa = Nfa::symbol('a')
            .union(Nfa::symbol('a').concat(Nfa::symbol('b')))
            .determinize();
        // {a, ab}: start -a-> {accepting, expects b} -b-> accepting
        let after_a = dfa.graph().target(dfa.start(), &'a').unwrap();
        assert!(dfa.is_final(after_a));
        let after_ab = dfa.graph().target(after_a, &'b').unwrap();
        assert!(dfa.is_final(after_ab));
        assert_eq!(dfa.graph().target(dfa.start(), &'b'), None);
        assert_eq!(dfa.graph().num_transitions(), 2);
    }
}
