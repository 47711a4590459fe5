// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a grammar.
//!
//! A grammar is assembled from named productions with a `GrammarBuilder`.
//! Every symbol that heads a production is a nonterminal; every other symbol
//! is a terminal. Symbols are interned into dense ids so that sets of them can
//! be stored as bit sets.

use std::collections::HashMap;
use std::fmt;

use crate::error::GrammarError;
use crate::Pretty;

/// A grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: Vec<Production>,
    start: NonterminalId,
    nonterms: HashMap<String, NonterminalId>,
    terms: HashMap<String, TerminalId>,
    nonterm_names: Vec<String>,
    nonterm_productions: Vec<Vec<ProductionId>>,
    term_names: Vec<String>,
}

/// A single production within a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    head: NonterminalId,
    body: Vec<Symbol>,
    rule: SemanticRule,
}

/// What a reduction by a production contributes to the syntax graph.
///
/// Child indices refer to positions in the production body, 0 being the
/// leftmost symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticRule {
    /// No rule given; passes the leftmost child up unchanged.
    None,
    /// Pass the given child up unchanged.
    Copy(usize),
    /// Create a new node with the given label and children.
    Tree {
        /// The label of the new node.
        label: String,
        /// The body positions whose nodes become the children, in order.
        children: Vec<usize>,
    },
}

impl Default for SemanticRule {
    fn default() -> SemanticRule {
        SemanticRule::None
    }
}

impl SemanticRule {
    /// Create a tree rule.
    pub fn tree<S: Into<String>>(label: S, children: Vec<usize>) -> SemanticRule {
        SemanticRule::Tree {
            label: label.into(),
            children: children,
        }
    }

    /// The body positions this rule refers to.
    pub fn children(&self) -> &[usize] {
        match *self {
            SemanticRule::None => &[],
            SemanticRule::Copy(ref child) => std::slice::from_ref(child),
            SemanticRule::Tree { ref children, .. } => children,
        }
    }
}

/// A symbol of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A terminal.
    Terminal(TerminalId),
    /// A nonterminal.
    Nonterminal(NonterminalId),
}

/// A unique nonterminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(usize);

/// A unique terminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(usize);

/// A unique production identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductionId(usize);

/// The special end of input terminal `$`.
pub const END: TerminalId = TerminalId(0);

/// The name of the end of input terminal.
pub const END_NAME: &str = "$";

/// The augmenting production `S' -> S`.
pub const AUGMENTING: ProductionId = ProductionId(0);

/// An iterator over the productions of a grammar.
pub type ProductionsIter<'a> = std::slice::Iter<'a, Production>;

/// An iterator over the production IDs of a grammar.
pub type ProductionIdsIter<'a> = std::slice::Iter<'a, ProductionId>;

impl Grammar {
    fn new(start: &str) -> Grammar {
        let mut grammar = Grammar {
            productions: Vec::new(),
            start: NonterminalId(0),
            nonterms: HashMap::new(),
            terms: HashMap::new(),
            nonterm_names: Vec::new(),
            nonterm_productions: Vec::new(),
            term_names: Vec::new(),
        };
        grammar.terms.insert(END_NAME.into(), END);
        grammar.start = grammar.add_nonterminal(start);
        grammar
    }

    fn add_nonterminal<S: Into<String>>(&mut self, name: S) -> NonterminalId {
        let name = name.into();
        let next_id = NonterminalId(self.nonterm_names.len());
        if let Some(&id) = self.nonterms.get(&name) {
            id
        } else {
            self.nonterms.insert(name.clone(), next_id);
            self.nonterm_names.push(name);
            self.nonterm_productions.push(Vec::new());
            next_id
        }
    }

    fn add_terminal<S: Into<String>>(&mut self, name: S) -> TerminalId {
        let name = name.into();
        let next_id = TerminalId(self.term_names.len() + 1);
        if let Some(&id) = self.terms.get(&name) {
            id
        } else {
            self.terms.insert(name.clone(), next_id);
            self.term_names.push(name);
            next_id
        }
    }

    fn add_production(&mut self, production: Production) -> ProductionId {
        let id = ProductionId(self.productions.len());
        self.nonterm_productions[production.head.as_usize()].push(id);
        self.productions.push(production);
        id
    }

    /// The start symbol, which heads the augmenting production.
    pub fn start(&self) -> NonterminalId {
        self.start
    }

    /// Get the name of a nonterminal.
    pub fn nonterminal_name(&self, id: NonterminalId) -> &str {
        &self.nonterm_names[id.as_usize()]
    }

    /// Get the name of a terminal.
    pub fn terminal_name(&self, id: TerminalId) -> &str {
        if id == END {
            END_NAME
        } else {
            &self.term_names[id.as_usize() - 1]
        }
    }

    /// Get the name of a symbol.
    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(id) => self.terminal_name(id),
            Symbol::Nonterminal(id) => self.nonterminal_name(id),
        }
    }

    /// Look up a terminal by name.
    pub fn terminal(&self, name: &str) -> Option<TerminalId> {
        self.terms.get(name).cloned()
    }

    /// Look up a nonterminal by name.
    pub fn nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.nonterms.get(name).cloned()
    }

    /// Check whether a symbol name is a terminal, i.e. heads no production.
    pub fn is_terminal(&self, name: &str) -> bool {
        !self.nonterms.contains_key(name)
    }

    /// The upper bound on nonterminal IDs.
    ///
    /// Basically returns the largest nonterminal ID + 1. Can be used as
    /// capacity for containers that will hold nonterminals.
    pub fn nonterminal_id_bound(&self) -> usize {
        self.nonterm_names.len()
    }

    /// The upper bound on terminal IDs.
    ///
    /// Basically returns the largest terminal ID + 1. Can be used as capacity
    /// for containers that will hold terminals.
    pub fn terminal_id_bound(&self) -> usize {
        self.term_names.len() + 1
    }

    /// The productions in this grammar.
    pub fn productions(&self) -> ProductionsIter<'_> {
        self.productions.iter()
    }

    /// The productions for a specific nonterminal in the grammar.
    pub fn productions_for_nonterminal(&self, id: NonterminalId) -> ProductionIdsIter<'_> {
        self.nonterm_productions[id.as_usize()].iter()
    }

    /// Access a single production of this grammar.
    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.as_usize()]
    }

    /// The number of productions.
    pub fn num_productions(&self) -> usize {
        self.productions.len()
    }
}

/// Assembles a grammar from named productions.
///
/// The first production added is the augmenting production and must be the
/// only one headed by the start symbol.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    start: String,
    productions: Vec<(String, Vec<String>, SemanticRule)>,
}

impl GrammarBuilder {
    /// Create a builder for a grammar with the given start symbol.
    pub fn new<S: Into<String>>(start: S) -> GrammarBuilder {
        GrammarBuilder {
            start: start.into(),
            productions: Vec::new(),
        }
    }

    /// Add a production.
    pub fn production<H, I, B>(mut self, head: H, body: I, rule: SemanticRule) -> GrammarBuilder
    where
        H: Into<String>,
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        self.productions.push((
            head.into(),
            body.into_iter().map(Into::into).collect(),
            rule,
        ));
        self
    }

    /// Check and intern the productions.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let start = self.start;
        match self.productions.first() {
            None => return Err(GrammarError::Empty),
            Some(&(ref head, _, _)) if *head != start => {
                return Err(GrammarError::StartMismatch {
                    start: start,
                    head: head.clone(),
                })
            }
            _ => (),
        }
        let count = self
            .productions
            .iter()
            .filter(|&&(ref head, _, _)| *head == start)
            .count();
        if count != 1 {
            return Err(GrammarError::AmbiguousStart {
                start: start,
                count: count,
            });
        }

        // Declare the nonterminals first, such that any symbol which heads a
        // production is never mistaken for a terminal.
        let mut grammar = Grammar::new(start.as_str());
        for &(ref head, _, _) in &self.productions {
            grammar.add_nonterminal(head.as_str());
        }

        for (index, (head, body, rule)) in self.productions.into_iter().enumerate() {
            if body.iter().any(|name| *name == start) {
                return Err(GrammarError::StartInBody {
                    start: start,
                    production: index,
                });
            }
            if let Some(&child) = rule.children().iter().find(|&&c| c >= body.len()) {
                return Err(GrammarError::ChildOutOfRange {
                    production: index,
                    child: child,
                    len: body.len(),
                });
            }
            let head = grammar.add_nonterminal(head);
            let body = body
                .into_iter()
                .map(|name| match grammar.nonterminal(&name) {
                    Some(id) => Symbol::Nonterminal(id),
                    None => Symbol::Terminal(grammar.add_terminal(name)),
                })
                .collect();
            grammar.add_production(Production::new(head, body, rule));
        }

        debug!(
            "grammar with {} productions, {} nonterminals, {} terminals",
            grammar.num_productions(),
            grammar.nonterminal_id_bound(),
            grammar.terminal_id_bound()
        );
        Ok(grammar)
    }
}

impl Production {
    /// Create a new production.
    pub fn new(head: NonterminalId, body: Vec<Symbol>, rule: SemanticRule) -> Production {
        Production {
            head: head,
            body: body,
            rule: rule,
        }
    }

    /// The nonterminal this production derives.
    pub fn head(&self) -> NonterminalId {
        self.head
    }

    /// The symbols in this production.
    pub fn body(&self) -> &[Symbol] {
        &self.body
    }

    /// The semantic rule applied when reducing by this production.
    pub fn rule(&self) -> &SemanticRule {
        &self.rule
    }

    /// Get a pretty printer for this production.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Production> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.item.head.pretty(self.ctx))?;
        for symbol in &self.item.body {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        if self.item.body.is_empty() {
            write!(f, " ε")?;
        }
        Ok(())
    }
}

impl Symbol {
    /// Get a pretty printer for this symbol.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl From<TerminalId> for Symbol {
    fn from(id: TerminalId) -> Symbol {
        Symbol::Terminal(id)
    }
}

impl From<NonterminalId> for Symbol {
    fn from(id: NonterminalId) -> Symbol {
        Symbol::Nonterminal(id)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Symbol> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.symbol_name(*self.item))
    }
}

impl NonterminalId {
    /// Create a nonterminal id from a usize.
    pub fn from_usize(id: usize) -> NonterminalId {
        NonterminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this nonterminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, NonterminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.nonterminal_name(self.item))
    }
}

impl TerminalId {
    /// Create a terminal id from a usize.
    pub fn from_usize(id: usize) -> TerminalId {
        TerminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this terminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, TerminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.terminal_name(self.item))
    }
}

impl ProductionId {
    /// Create a production id from a usize.
    pub fn from_usize(id: usize) -> ProductionId {
        ProductionId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}
