// Copyright (c) 2018 Fabian Schuiki

//! Errors reported while compiling definitions or processing input.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::graph::StateId;

/// A regular expression that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The parentheses in the pattern do not balance.
    #[error("unbalanced parentheses in pattern `{pattern}`")]
    Unbalanced {
        /// The offending pattern.
        pattern: String,
    },
    /// The pattern ends in an escape character with nothing to escape.
    #[error("dangling escape at the end of pattern `{pattern}`")]
    DanglingEscape {
        /// The offending pattern.
        pattern: String,
    },
}

/// The kind of a parsing table conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// Two shift actions on the same symbol.
    ShiftShift,
    /// A shift and a reduce action on the same symbol.
    ShiftReduce,
    /// Two reduce actions on the same symbol.
    ReduceReduce,
    /// An accept action collides with any other action.
    Accept,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConflictKind::ShiftShift => write!(f, "shift/shift"),
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
            ConflictKind::Accept => write!(f, "accept"),
        }
    }
}

/// A grammar that cannot be turned into a parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The grammar has no productions.
    #[error("grammar has no productions")]
    Empty,
    /// The first production is not headed by the start symbol.
    #[error("first production is headed by `{head}` instead of start symbol `{start}`")]
    StartMismatch {
        /// The start symbol.
        start: String,
        /// The head of the first production.
        head: String,
    },
    /// The start symbol heads more than one production.
    #[error("start symbol `{start}` heads {count} productions instead of one")]
    AmbiguousStart {
        /// The start symbol.
        start: String,
        /// The number of productions headed by it.
        count: usize,
    },
    /// The start symbol appears in the body of a production.
    #[error("start symbol `{start}` appears in the body of production {production}")]
    StartInBody {
        /// The start symbol.
        start: String,
        /// The index of the production.
        production: usize,
    },
    /// A semantic rule refers to a body position that does not exist.
    #[error("production {production} has {len} symbols, but its rule refers to child {child}")]
    ChildOutOfRange {
        /// The index of the production.
        production: usize,
        /// The child index the rule refers to.
        child: usize,
        /// The length of the production body.
        len: usize,
    },
    /// Two actions collide in the same cell of the parsing table.
    #[error("{kind} conflict in state {state} on `{symbol}`")]
    Conflict {
        /// The kind of conflict.
        kind: ConflictKind,
        /// The parser state in which the conflict occurs.
        state: StateId,
        /// The name of the symbol on which the conflict occurs.
        symbol: String,
    },
}

/// Input that no pattern of a tokenizer matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no pattern matches the input at offset {offset}")]
pub struct UnmatchedInput {
    /// The byte offset of the first character that could not be tokenized.
    pub offset: usize,
}

/// A token sequence the parser rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// No action exists for the token at `position`.
    #[error("unexpected `{lexeme}` ({kind}) at token {position}")]
    Unexpected {
        /// The index of the offending token.
        position: usize,
        /// The type of the offending token.
        kind: String,
        /// The text of the offending token.
        lexeme: String,
    },
    /// The input ended before the start symbol could be reduced.
    #[error("unexpected end of input")]
    UnexpectedEnd,
}

/// A definitions table that cannot be loaded.
#[derive(Debug, Error)]
pub enum DefinitionsError {
    /// The definitions could not be read or written.
    #[error("{0}")]
    Io(#[from] io::Error),
    /// The definitions are not valid JSON of the expected shape.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A semantic rule has a kind other than none, copy or tree.
    #[error("production {production} has unknown rule type `{kind}`")]
    UnknownRule {
        /// The index of the production.
        production: usize,
        /// The rule type as written.
        kind: String,
    },
    /// A copy rule does not name the child to copy.
    #[error("copy rule of production {production} names no child")]
    MissingCopyChild {
        /// The index of the production.
        production: usize,
    },
    /// A pattern failed to compile.
    #[error("pattern `{name}`: {source}")]
    Pattern {
        /// The name of the pattern.
        name: String,
        /// The underlying error.
        source: PatternError,
    },
    /// The grammar is malformed or has conflicts.
    #[error("{0}")]
    Grammar(#[from] GrammarError),
}
