// Copyright (c) 2018 Fabian Schuiki
extern crate lexpar;

use std::env;

use lexpar::Definitions;

/// Parses each command line argument as an arithmetic expression and prints
/// its syntax tree.
fn main() {
    let defs: Definitions = include_str!("arithmetic.json")
        .parse()
        .expect("invalid arithmetic definitions");
    let mut tokenizer = defs.tokenizer().expect("invalid patterns");
    let mut parser = defs.parser().expect("grammar has conflicts");
    println!("{}", parser.table().pretty(parser.grammar()));

    let inputs: Vec<String> = env::args().skip(1).collect();
    let inputs = if inputs.is_empty() {
        vec!["12 + 8 * 75".to_string(), "(x + 1) * y2".to_string()]
    } else {
        inputs
    };
    for input in &inputs {
        tokenizer.reset();
        let tokens: Vec<_> = tokenizer
            .tokenize(input)
            .into_iter()
            .filter(|t| t.kind() != "whitespace")
            .collect();
        match parser.parse_exact(&tokens) {
            Ok(graph) => print!("{}:\n{}", input, graph),
            Err(e) => println!("{}: {}", input, e),
        }
    }
}
