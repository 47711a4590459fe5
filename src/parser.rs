// Copyright (c) 2018 Fabian Schuiki

//! A table-driven shift-reduce parser that builds a syntax graph.
//!
//! The parser keeps a stack of states and a parallel stack of syntax graph
//! nodes. Shifting a token pushes a leaf labeled with its lexeme. Reducing by
//! a production pops as many nodes as the production body is long and applies
//! the production's semantic rule to them.

use crate::ast::{NodeId, SyntaxGraph};
use crate::error::{GrammarError, SyntaxError};
use crate::grammar::{Grammar, ProductionId, SemanticRule, Symbol, END_NAME};
use crate::graph::StateId;
use crate::lexer::Token;
use crate::machine::{Action, ParsingTable};

/// A parser for one grammar.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    table: ParsingTable,
    states: Vec<StateId>,
    nodes: Vec<NodeId>,
    graph: SyntaxGraph,
    dead: bool,
    accepted: bool,
    reductions: Vec<ProductionId>,
}

impl Parser {
    /// Create a parser for a grammar.
    ///
    /// Fails if the grammar has conflicts.
    pub fn new(grammar: Grammar) -> Result<Parser, GrammarError> {
        let table = ParsingTable::build(&grammar)?;
        Ok(Parser {
            grammar: grammar,
            table: table,
            states: vec![StateId::from_usize(0)],
            nodes: Vec::new(),
            graph: SyntaxGraph::new(),
            dead: false,
            accepted: false,
            reductions: Vec::new(),
        })
    }

    /// The grammar this parser recognizes.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The parsing table.
    pub fn table(&self) -> &ParsingTable {
        &self.table
    }

    /// The syntax graph built so far.
    pub fn graph(&self) -> &SyntaxGraph {
        &self.graph
    }

    /// Whether the parser has seen a token it has no action for.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the parser has accepted its input.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// The productions reduced so far, in order.
    pub fn reductions(&self) -> &[ProductionId] {
        &self.reductions
    }

    /// Return to the initial state and discard the syntax graph.
    pub fn reset(&mut self) {
        self.states.clear();
        self.states.push(StateId::from_usize(0));
        self.nodes.clear();
        self.graph.clear();
        self.dead = false;
        self.accepted = false;
        self.reductions.clear();
    }

    /// Feed one token to the parser.
    ///
    /// Has no effect once the parser is dead or has accepted. A token whose
    /// kind the grammar does not know kills the parser.
    pub fn step(&mut self, token: &Token) {
        if self.dead || self.accepted {
            return;
        }
        let symbol = match self.grammar.terminal(token.kind()) {
            Some(id) => Symbol::Terminal(id),
            None => {
                debug!("unknown token kind `{}`", token.kind());
                self.dead = true;
                return;
            }
        };
        loop {
            let state = self.top();
            match self.table.action(state, symbol) {
                Some(Action::Reduce(production)) => {
                    if !self.reduce(production) {
                        self.dead = true;
                        return;
                    }
                }
                Some(Action::Shift(next)) => {
                    trace!("shift {} to state {}", token, next);
                    self.states.push(next);
                    let leaf = self.graph.add_node(token.lexeme());
                    self.nodes.push(leaf);
                    return;
                }
                Some(Action::Accept) => {
                    trace!("accept in state {}", state);
                    self.accepted = true;
                    return;
                }
                None => {
                    debug!("no action in state {} for {}", state, token);
                    self.dead = true;
                    return;
                }
            }
        }
    }

    fn top(&self) -> StateId {
        self.states
            .last()
            .cloned()
            .unwrap_or_else(|| StateId::from_usize(0))
    }

    /// Reduce by a production. Returns `false` if the stacks do not allow it.
    fn reduce(&mut self, id: ProductionId) -> bool {
        let production = self.grammar.production(id);
        let len = production.body().len();
        if self.states.len() <= len || self.nodes.len() < len {
            return false;
        }
        let keep = self.states.len() - len;
        self.states.truncate(keep);
        let head = Symbol::Nonterminal(production.head());
        match self.table.action(self.top(), head) {
            Some(Action::Shift(next)) => self.states.push(next),
            _ => return false,
        }

        let popped = self.nodes.split_off(self.nodes.len() - len);
        let node = match *production.rule() {
            SemanticRule::Tree {
                ref label,
                ref children,
            } => {
                let node = self.graph.add_node(label.as_str());
                for &child in children {
                    self.graph.add_edge(node, popped[child]);
                }
                node
            }
            SemanticRule::Copy(child) => popped[child],
            SemanticRule::None => match popped.first() {
                Some(&first) => first,
                None => self
                    .graph
                    .add_node(self.grammar.nonterminal_name(production.head())),
            },
        };
        self.nodes.push(node);
        self.reductions.push(id);
        trace!("reduce {}", production.pretty(&self.grammar));
        true
    }

    /// Parse a sequence of tokens and return the resulting syntax graph.
    ///
    /// The parser is reset first and an end of input token is fed after the
    /// last token. The graph is rooted at the node on top of the node stack,
    /// whether or not the input was accepted. A rejected parse may therefore
    /// still have a root, so callers check `is_accepted` to tell the two
    /// apart. The root is `None` only if no node was ever pushed.
    pub fn parse(&mut self, tokens: &[Token]) -> SyntaxGraph {
        self.reset();
        for token in tokens {
            self.step(token);
        }
        self.step(&end_token());
        self.finish()
    }

    /// Parse a sequence of tokens, failing with the first offending token.
    pub fn parse_exact(&mut self, tokens: &[Token]) -> Result<SyntaxGraph, SyntaxError> {
        self.reset();
        for (position, token) in tokens.iter().enumerate() {
            self.step(token);
            if self.dead {
                return Err(SyntaxError::Unexpected {
                    position: position,
                    kind: token.kind().into(),
                    lexeme: token.lexeme().into(),
                });
            }
        }
        self.step(&end_token());
        if self.accepted {
            Ok(self.finish())
        } else {
            Err(SyntaxError::UnexpectedEnd)
        }
    }

    fn finish(&mut self) -> SyntaxGraph {
        let root = self.nodes.last().cloned();
        self.graph.set_root(root);
        debug!(
            "parse {} after {} reductions, {} nodes",
            if self.accepted { "accepted" } else { "rejected" },
            self.reductions.len(),
            self.graph.len()
        );
        self.graph.clone()
    }
}

fn end_token() -> Token {
    Token::new(END_NAME, END_NAME)
}
