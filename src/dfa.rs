// Copyright (c) 2018 Fabian Schuiki

//! Deterministic finite automata.
//!
//! A `Dfa` couples an immutable transition graph with a small amount of run
//! state (the current state and whether the automaton died or currently
//! accepts). The run state can be reset at any time, so one compiled
//! automaton serves any number of independent matches.

use std::collections::BTreeSet;

use crate::graph::{DeterministicGraph, StateId};

/// A deterministic finite automaton over characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    start: StateId,
    finals: BTreeSet<StateId>,
    graph: DeterministicGraph<char>,
    run: RunState,
}

/// The mutable part of a `Dfa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunState {
    current: StateId,
    dead: bool,
    accepted: bool,
}

impl RunState {
    fn at(start: StateId) -> RunState {
        RunState {
            current: start,
            dead: false,
            accepted: false,
        }
    }
}

impl Dfa {
    /// Create an automaton starting in state 0.
    pub fn new(graph: DeterministicGraph<char>, finals: BTreeSet<StateId>) -> Dfa {
        let start = StateId::from_usize(0);
        Dfa {
            start: start,
            finals: finals,
            graph: graph,
            run: RunState::at(start),
        }
    }

    /// The start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The accepting states.
    pub fn finals(&self) -> &BTreeSet<StateId> {
        &self.finals
    }

    /// Check whether a state is accepting.
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    /// The transition graph.
    pub fn graph(&self) -> &DeterministicGraph<char> {
        &self.graph
    }

    /// The state the automaton is currently in.
    pub fn current(&self) -> StateId {
        self.run.current
    }

    /// Whether the automaton has encountered a character it has no move for.
    pub fn is_dead(&self) -> bool {
        self.run.dead
    }

    /// Whether the automaton is currently in an accepting state.
    pub fn is_accepted(&self) -> bool {
        self.run.accepted
    }

    /// Consume one character.
    ///
    /// Has no effect once the automaton is dead.
    pub fn step(&mut self, c: char) {
        if self.run.dead {
            return;
        }
        match self.graph.target(self.run.current, &c) {
            Some(next) => {
                self.run.current = next;
                self.run.accepted = self.finals.contains(&next);
            }
            None => {
                self.run.dead = true;
                self.run.accepted = false;
            }
        }
    }

    /// Return to the start state and clear the dead and accepted flags.
    pub fn reset(&mut self) {
        self.run = RunState::at(self.start);
    }

    /// Determine the length in bytes of the longest non-empty prefix of
    /// `input` the automaton accepts.
    ///
    /// Returns 0 if no prefix is accepted. The run state is reset before
    /// returning.
    pub fn longest_prefix(&mut self, input: &str) -> usize {
        self.reset();
        let mut longest = 0;
        for (offset, c) in input.char_indices() {
            self.step(c);
            if self.run.dead {
                break;
            }
            if self.run.accepted {
                longest = offset + c.len_utf8();
            }
        }
        self.reset();
        longest
    }

    /// Check whether the automaton accepts all of `input`.
    ///
    /// The run state is reset before returning.
    pub fn accepts(&mut self, input: &str) -> bool {
        self.reset();
        for c in input.chars() {
            self.step(c);
        }
        let accepted = if input.is_empty() {
            self.is_final(self.start)
        } else {
            self.run.accepted
        };
        self.reset();
        accepted
    }
}
