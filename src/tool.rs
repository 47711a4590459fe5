// Copyright (c) 2018 Fabian Schuiki
#[macro_use]
extern crate clap;
extern crate lexpar;
#[macro_use]
extern crate log;
extern crate stderrlog;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{App, Arg, ArgMatches};
use lexpar::error::DefinitionsError;
use lexpar::grammar::ProductionId;
use lexpar::{Definitions, Parser, Tokenizer};

/// The token kind that is dropped before parsing.
const WHITESPACE: &str = "whitespace";

fn main() {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about("Tokenizes and parses lines read from stdin")
        .arg(
            Arg::with_name("DEFINITIONS")
                .help("JSON file with the patterns and the grammar")
                .required(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase the log verbosity"),
        )
        .get_matches();

    if let Err(e) = stderrlog::new()
        .module(module_path!())
        .verbosity(matches.occurrences_of("verbose") as usize)
        .init()
    {
        eprintln!("unable to initialize logging: {}", e);
    }

    if let Err(e) = run(&matches) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), DefinitionsError> {
    let path = PathBuf::from(matches.value_of("DEFINITIONS").unwrap_or_default());
    let mut session = Session::load(path)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match Command::parse(line.trim_end_matches(|c: char| c == '\n' || c == '\r')) {
            Command::Quit => break,
            Command::Print => session.print(),
            Command::SetRegex { name, regex } => session.set_regex(name, regex),
            Command::Persist => {
                if let Err(e) = session.persist() {
                    println!("{}", e);
                }
            }
            Command::Usage(usage) => println!("usage: {}", usage),
            Command::Eval(text) => session.eval(text),
        }
    }
    Ok(())
}

/// A line read from the user.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Print,
    SetRegex { name: &'a str, regex: &'a str },
    Persist,
    Usage(&'static str),
    Eval(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Command<'a> {
        let mut words = line.splitn(3, ' ');
        match words.next() {
            Some("quit") => Command::Quit,
            Some("print") => Command::Print,
            Some("persist") => Command::Persist,
            Some("setRegex") => match (words.next(), words.next()) {
                (Some(name), Some(regex)) if !name.is_empty() => Command::SetRegex {
                    name: name,
                    regex: regex,
                },
                _ => Command::Usage("setRegex NAME REGEX"),
            },
            _ => Command::Eval(line),
        }
    }
}

/// The definitions and the tokenizer and parser compiled from them.
struct Session {
    path: PathBuf,
    definitions: Definitions,
    tokenizer: Tokenizer,
    parser: Parser,
}

impl Session {
    fn load(path: PathBuf) -> Result<Session, DefinitionsError> {
        let definitions = Definitions::from_path(&path)?;
        let tokenizer = definitions.tokenizer()?;
        let parser = definitions.parser()?;
        Ok(Session {
            path: path,
            definitions: definitions,
            tokenizer: tokenizer,
            parser: parser,
        })
    }

    fn print(&self) {
        println!("Regular expressions");
        for (name, regex) in &self.definitions.regular_expressions {
            println!("  {}: {}", name, regex);
        }
        println!("Grammar");
        println!("  Start symbol: {}", self.definitions.grammar.start);
        let grammar = self.parser.grammar();
        for production in grammar.productions() {
            println!("  {}", production.pretty(grammar));
        }
    }

    fn set_regex(&mut self, name: &str, regex: &str) {
        if let Err(e) = self.definitions.set_pattern(name, regex) {
            println!("{}", e);
            return;
        }
        match self.definitions.tokenizer() {
            Ok(tokenizer) => self.tokenizer = tokenizer,
            Err(e) => println!("{}", e),
        }
    }

    fn persist(&self) -> Result<(), DefinitionsError> {
        self.definitions.persist(&self.path)?;
        info!("definitions written to {}", self.path.display());
        Ok(())
    }

    fn eval(&mut self, text: &str) {
        self.tokenizer.reset();
        let tokens = match self.tokenizer.tokenize_exact(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                println!("{}", e);
                return;
            }
        };
        let tokens: Vec<_> = tokens
            .into_iter()
            .filter(|t| t.kind() != WHITESPACE)
            .collect();
        let listed: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        println!("Tokens: [{}]", listed.join(", "));

        match self.parser.parse_exact(&tokens) {
            Ok(graph) => {
                let reductions: Vec<usize> = self
                    .parser
                    .reductions()
                    .iter()
                    .map(|&p: &ProductionId| p.as_usize())
                    .collect();
                println!("Reductions: {:?}", reductions);
                print!("{}", graph);
            }
            Err(e) => println!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands() {
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("print"), Command::Print);
        assert_eq!(Command::parse("persist"), Command::Persist);
        assert_eq!(
            Command::parse("setRegex id (a|b) (a|b)*"),
            Command::SetRegex {
                name: "id",
                regex: "(a|b) (a|b)*",
            }
        );
        assert_eq!(Command::parse("setRegex id"), Command::Usage("setRegex NAME REGEX"));
        assert_eq!(Command::parse("12 + 3"), Command::Eval("12 + 3"));
        assert_eq!(Command::parse("quitting"), Command::Eval("quitting"));
    }
}
