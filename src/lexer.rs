// Copyright (c) 2018 Fabian Schuiki

//! A maximal-munch tokenizer driven by one automaton per named pattern.

use std::fmt;

use indexmap::IndexMap;

use crate::dfa::Dfa;
use crate::error::{PatternError, UnmatchedInput};
use crate::regex;

/// A token produced by the tokenizer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    kind: String,
    lexeme: String,
}

impl Token {
    /// Create a new token.
    pub fn new<K: Into<String>, L: Into<String>>(kind: K, lexeme: L) -> Token {
        Token {
            kind: kind.into(),
            lexeme: lexeme.into(),
        }
    }

    /// The name of the pattern that matched the token.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The text of the token.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {:?})", self.kind, self.lexeme)
    }
}

/// A tokenizer.
///
/// Splits input into the longest prefix any pattern accepts. If two patterns
/// accept prefixes of the same length, the one added first wins.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    patterns: IndexMap<String, Dfa>,
}

impl Tokenizer {
    /// Create a new tokenizer without any patterns.
    pub fn new() -> Tokenizer {
        Tokenizer {
            patterns: IndexMap::new(),
        }
    }

    /// Create a tokenizer from a sequence of name and pattern pairs.
    ///
    /// Fails on the first pattern that does not compile.
    pub fn with_patterns<I, N, P>(patterns: I) -> Result<Tokenizer, PatternError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: AsRef<str>,
    {
        let mut tokenizer = Tokenizer::new();
        for (name, pattern) in patterns {
            tokenizer.add_pattern(name, pattern.as_ref())?;
        }
        Ok(tokenizer)
    }

    /// Compile and add a pattern.
    ///
    /// A pattern with the same name as an existing one replaces it, but keeps
    /// its original position in the tie-break order.
    pub fn add_pattern<N>(&mut self, name: N, pattern: &str) -> Result<(), PatternError>
    where
        N: Into<String>,
    {
        let name = name.into();
        let dfa = regex::compile(pattern)?.determinize();
        debug!(
            "pattern `{}` compiled to {} dfa transitions",
            name,
            dfa.graph().num_transitions()
        );
        self.patterns.insert(name, dfa);
        Ok(())
    }

    /// The names of the patterns, in tie-break order.
    pub fn patterns(&self) -> Patterns<'_> {
        Patterns(self.patterns.keys())
    }

    /// Determine the longest non-empty prefix of `input` that the pattern
    /// `name` accepts.
    ///
    /// Returns an empty string if the pattern accepts no such prefix or if
    /// there is no pattern by that name.
    pub fn longest_match<'a>(&mut self, name: &str, input: &'a str) -> &'a str {
        match self.patterns.get_mut(name) {
            Some(dfa) => &input[..dfa.longest_prefix(input)],
            None => "",
        }
    }

    /// Find the pattern accepting the longest prefix of `input`.
    fn best_match(&mut self, input: &str) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for (index, (_, dfa)) in self.patterns.iter_mut().enumerate() {
            let len = dfa.longest_prefix(input);
            if len > best.map(|(_, l)| l).unwrap_or(0) {
                best = Some((index, len));
            }
        }
        best
    }

    /// Split `input` into tokens.
    ///
    /// Stops at the first position where no pattern matches and returns the
    /// tokens produced up to that point. Callers that need all of the input
    /// to be consumed should use `tokenize_exact`.
    pub fn tokenize(&mut self, input: &str) -> Vec<Token> {
        self.tokenize_prefix(input).0
    }

    /// Split all of `input` into tokens.
    ///
    /// Fails with the offset of the first character no pattern matches.
    pub fn tokenize_exact(&mut self, input: &str) -> Result<Vec<Token>, UnmatchedInput> {
        let (tokens, consumed) = self.tokenize_prefix(input);
        if consumed == input.len() {
            Ok(tokens)
        } else {
            Err(UnmatchedInput { offset: consumed })
        }
    }

    fn tokenize_prefix(&mut self, input: &str) -> (Vec<Token>, usize) {
        let mut tokens = Vec::new();
        let mut offset = 0;
        while offset < input.len() {
            let rest = &input[offset..];
            let (index, len) = match self.best_match(rest) {
                Some(m) => m,
                None => {
                    debug!("no pattern matches at offset {}", offset);
                    break;
                }
            };
            let (name, _) = match self.patterns.get_index(index) {
                Some(entry) => entry,
                None => break,
            };
            let token = Token::new(name.as_str(), &rest[..len]);
            trace!("token {}", token);
            tokens.push(token);
            offset += len;
        }
        (tokens, offset)
    }

    /// Clear the run state of every pattern.
    pub fn reset(&mut self) {
        for dfa in self.patterns.values_mut() {
            dfa.reset();
        }
    }
}

/// An iterator over the pattern names of a tokenizer.
pub struct Patterns<'a>(indexmap::map::Keys<'a, String, Dfa>);

impl<'a> Iterator for Patterns<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.0.next().map(|s| s.as_str())
    }
}
