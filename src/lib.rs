// Copyright (c) 2018 Fabian Schuiki

//! A lexer and parser generator driven by regular expressions and a grammar.
//!
//! Patterns are compiled into nondeterministic automata by Thompson's
//! construction and determinized by subset construction. The tokenizer splits
//! input into the longest prefix any pattern accepts. Grammars are turned into
//! SLR parsing tables, and the shift-reduce driver builds a syntax graph as it
//! reduces, following each production's semantic rule.
//!
//! ```
//! use lexpar::grammar::{GrammarBuilder, SemanticRule};
//! use lexpar::lexer::Tokenizer;
//! use lexpar::parser::Parser;
//!
//! let mut tokenizer = Tokenizer::with_patterns(vec![
//!     ("number", "(0|1|2|3|4|5|6|7|8|9)(0|1|2|3|4|5|6|7|8|9)*"),
//!     ("+", "+"),
//! ]).unwrap();
//! let grammar = GrammarBuilder::new("sum'")
//!     .production("sum'", vec!["sum"], SemanticRule::None)
//!     .production("sum", vec!["sum", "+", "number"], SemanticRule::tree("+", vec![0, 2]))
//!     .production("sum", vec!["number"], SemanticRule::None)
//!     .build()
//!     .unwrap();
//! let mut parser = Parser::new(grammar).unwrap();
//! let graph = parser.parse(&tokenizer.tokenize("1+2+3"));
//! assert!(parser.is_accepted());
//! assert_eq!(format!("{}", graph), "+\n  +\n    1\n    2\n  3\n");
//! ```

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

pub mod ast;
pub mod definitions;
pub mod dfa;
pub mod error;
pub mod first;
pub mod grammar;
pub mod graph;
pub mod item_set;
pub mod lexer;
pub mod machine;
pub mod nfa;
pub mod parser;
pub mod regex;

pub use crate::ast::SyntaxGraph;
pub use crate::definitions::Definitions;
pub use crate::lexer::{Token, Tokenizer};
pub use crate::parser::Parser;

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
