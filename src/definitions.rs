// Copyright (c) 2018 Fabian Schuiki

//! The definitions table: named patterns plus a grammar, stored as JSON.
//!
//! ```json
//! {
//!     "regularExpressions": { "number": "(0|1)(0|1)*", "+": "+" },
//!     "grammar": {
//!         "Start": "expr'",
//!         "Productions": [
//!             { "Head": "expr'", "Body": ["expr"], "Rule": { "Type": "" } },
//!             ...
//!         ]
//!     }
//! }
//! ```
//!
//! Pattern order is preserved, since it decides ties between patterns that
//! match equally long prefixes.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DefinitionsError, PatternError};
use crate::grammar::{Grammar, GrammarBuilder, SemanticRule};
use crate::lexer::Tokenizer;
use crate::parser::Parser;
use crate::regex;

/// A definitions table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definitions {
    /// The patterns, by token kind.
    #[serde(rename = "regularExpressions", default)]
    pub regular_expressions: IndexMap<String, String>,
    /// The grammar.
    pub grammar: GrammarDefinition,
}

/// A grammar as written in a definitions table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GrammarDefinition {
    /// The start symbol.
    pub start: String,
    /// The productions. The first one must be headed by the start symbol.
    #[serde(default)]
    pub productions: Vec<ProductionDefinition>,
}

/// A production as written in a definitions table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductionDefinition {
    /// The head nonterminal.
    pub head: String,
    /// The body symbols.
    #[serde(default)]
    pub body: Vec<String>,
    /// The semantic rule.
    #[serde(default)]
    pub rule: RuleDefinition,
}

/// A semantic rule as written in a definitions table.
///
/// `Type` is one of `""`, `"none"`, `"copy"` or `"tree"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleDefinition {
    /// The kind of rule.
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// The label of the node a tree rule creates.
    #[serde(default)]
    pub root_label: String,
    /// The body positions the rule refers to.
    #[serde(default)]
    pub children: Option<Vec<usize>>,
}

impl RuleDefinition {
    fn to_rule(&self, production: usize) -> Result<SemanticRule, DefinitionsError> {
        let children = self.children.clone().unwrap_or_default();
        match self.kind.as_str() {
            "" | "none" => Ok(SemanticRule::None),
            "copy" => match children.first() {
                Some(&child) => Ok(SemanticRule::Copy(child)),
                None => Err(DefinitionsError::MissingCopyChild {
                    production: production,
                }),
            },
            "tree" => Ok(SemanticRule::tree(self.root_label.as_str(), children)),
            other => Err(DefinitionsError::UnknownRule {
                production: production,
                kind: other.into(),
            }),
        }
    }
}

impl FromStr for Definitions {
    type Err = DefinitionsError;

    fn from_str(s: &str) -> Result<Definitions, DefinitionsError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Definitions {
    /// Read a definitions table from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Definitions, DefinitionsError> {
        let content = fs::read_to_string(path.as_ref())?;
        let defs: Definitions = content.parse()?;
        debug!(
            "loaded {} patterns and {} productions from {}",
            defs.regular_expressions.len(),
            defs.grammar.productions.len(),
            path.as_ref().display()
        );
        Ok(defs)
    }

    /// Serialize the table as indented JSON.
    pub fn to_json(&self) -> Result<String, DefinitionsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the table to a file, replacing its contents.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<(), DefinitionsError> {
        let json = self.to_json()?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Add or replace a pattern.
    ///
    /// The pattern is only stored if it compiles.
    pub fn set_pattern<N: Into<String>, P: Into<String>>(
        &mut self,
        name: N,
        pattern: P,
    ) -> Result<(), PatternError> {
        let pattern = pattern.into();
        regex::compile(&pattern)?;
        self.regular_expressions.insert(name.into(), pattern);
        Ok(())
    }

    /// Compile the patterns into a tokenizer.
    pub fn tokenizer(&self) -> Result<Tokenizer, DefinitionsError> {
        let mut tokenizer = Tokenizer::new();
        for (name, pattern) in &self.regular_expressions {
            tokenizer
                .add_pattern(name.as_str(), pattern)
                .map_err(|source| DefinitionsError::Pattern {
                    name: name.clone(),
                    source: source,
                })?;
        }
        Ok(tokenizer)
    }

    /// Check and build the grammar.
    pub fn grammar(&self) -> Result<Grammar, DefinitionsError> {
        let mut builder = GrammarBuilder::new(self.grammar.start.as_str());
        for (index, production) in self.grammar.productions.iter().enumerate() {
            builder = builder.production(
                production.head.as_str(),
                &production.body,
                production.rule.to_rule(index)?,
            );
        }
        Ok(builder.build()?)
    }

    /// Build a parser for the grammar.
    pub fn parser(&self) -> Result<Parser, DefinitionsError> {
        Ok(Parser::new(self.grammar()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrammarError;

    const ARITHMETIC: &str = r#"{
        "regularExpressions": {
            "number": "(0|1|2|3|4|5|6|7|8|9)(0|1|2|3|4|5|6|7|8|9)*",
            "+": "+",
            "*": "*",
            "(": "/(",
            ")": "/)",
            "whitespace": "( )( )*"
        },
        "grammar": {
            "Start": "expr'",
            "Productions": [
                {
                    "Head": "expr'",
                    "Body": ["expr"],
                    "Rule": {"Type": "", "RootLabel": "", "Children": null}
                },
                {
                    "Head": "expr",
                    "Body": ["expr", "+", "term"],
                    "Rule": {"Type": "tree", "RootLabel": "+", "Children": [0, 2]}
                },
                {"Head": "expr", "Body": ["term"], "Rule": {"Type": ""}},
                {
                    "Head": "term",
                    "Body": ["term", "*", "factor"],
                    "Rule": {"Type": "tree", "RootLabel": "*", "Children": [0, 2]}
                },
                {"Head": "term", "Body": ["factor"]},
                {"Head": "factor", "Body": ["number"], "Rule": {"Type": "none"}},
                {
                    "Head": "factor",
                    "Body": ["(", "expr", ")"],
                    "Rule": {"Type": "copy", "Children": [1]}
                }
            ]
        }
    }"#;

    #[test]
    fn loads_arithmetic() {
        let defs: Definitions = ARITHMETIC.parse().unwrap();
        let names: Vec<&str> = defs.regular_expressions.keys().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["number", "+", "*", "(", ")", "whitespace"]);
        assert_eq!(defs.grammar.productions.len(), 7);
        assert_eq!(
            defs.grammar.productions[6].rule.to_rule(6).unwrap(),
            SemanticRule::Copy(1)
        );
        assert_eq!(
            defs.grammar.productions[1].rule.to_rule(1).unwrap(),
            SemanticRule::tree("+", vec![0, 2])
        );

        let mut tokenizer = defs.tokenizer().unwrap();
        let mut parser = defs.parser().unwrap();
        let tokens: Vec<_> = tokenizer
            .tokenize("2 * (3 + 4)")
            .into_iter()
            .filter(|t| t.kind() != "whitespace")
            .collect();
        let graph = parser.parse(&tokens);
        assert!(parser.is_accepted());
        assert_eq!(format!("{}", graph), "*\n  2\n  +\n    3\n    4\n");
    }

    #[test]
    fn survives_serialization() {
        let defs: Definitions = ARITHMETIC.parse().unwrap();
        let json = defs.to_json().unwrap();
        assert!(json.contains("\"regularExpressions\""));
        assert!(json.contains("\"RootLabel\""));
        let again: Definitions = json.parse().unwrap();
        assert_eq!(defs, again);
    }

    #[test]
    fn set_pattern_checks_the_pattern() {
        let mut defs: Definitions = ARITHMETIC.parse().unwrap();
        assert!(defs.set_pattern("id", "(a|b)*)").is_err());
        assert!(!defs.regular_expressions.contains_key("id"));
        defs.set_pattern("number", "(0|1)(0|1)*").unwrap();
        assert_eq!(defs.regular_expressions.get_index_of("number"), Some(0));
        assert_eq!(defs.regular_expressions["number"], "(0|1)(0|1)*");
    }

    #[test]
    fn reports_bad_definitions() {
        let mut defs: Definitions = ARITHMETIC.parse().unwrap();
        defs.grammar.productions[1].rule.kind = "subtree".into();
        match defs.grammar() {
            Err(DefinitionsError::UnknownRule { production, kind }) => {
                assert_eq!(production, 1);
                assert_eq!(kind, "subtree");
            }
            other => panic!("expected an unknown rule, got {:?}", other),
        }

        let mut defs: Definitions = ARITHMETIC.parse().unwrap();
        defs.grammar.productions[6].rule.children = None;
        match defs.grammar() {
            Err(DefinitionsError::MissingCopyChild { production: 6 }) => (),
            other => panic!("expected a missing copy child, got {:?}", other),
        }

        let mut defs: Definitions = ARITHMETIC.parse().unwrap();
        defs.grammar.start = "expr".into();
        match defs.parser() {
            Err(DefinitionsError::Grammar(GrammarError::StartMismatch { .. })) => (),
            other => panic!("expected a start mismatch, got {:?}", other.map(|_| ())),
        }

        let mut defs: Definitions = ARITHMETIC.parse().unwrap();
        defs.grammar.productions[6].body[1] = "expr'".into();
        match defs.parser() {
            Err(DefinitionsError::Grammar(GrammarError::StartInBody { production: 6, .. })) => (),
            other => panic!("expected the start symbol in a body, got {:?}", other.map(|_| ())),
        }

        let mut defs: Definitions = ARITHMETIC.parse().unwrap();
        defs.regular_expressions.insert("bad".into(), "((".into());
        match defs.tokenizer() {
            Err(DefinitionsError::Pattern { name, .. }) => assert_eq!(name, "bad"),
            other => panic!("expected a pattern error, got {:?}", other.map(|_| ())),
        }

        assert!("{".parse::<Definitions>().is_err());
    }
}
