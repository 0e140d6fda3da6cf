//! Thin CLI front-end over the `magelang` library.
//!
//! The Mage surface-syntax parser and template-directory discovery are
//! external collaborators out of this crate's core scope (`spec.md` §1), so
//! this binary builds its grammars through the public `grammar` builder API
//! rather than reading Mage source text from disk, and always targets the
//! in-repo interpreter backend. `<template-name>` selects what to do with the
//! named demo grammar: dump its normalized form, dump its inferred treespec,
//! or fuzz it against the reference evaluator.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use magelang::grammar::{CharSet, CharSetElem, ExprKind, Grammar, GrammarBuilder, Rule, RuleFlags, UNBOUNDED};
use magelang::{compile, fuzz, CompileError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Template {
    /// Print the normalized grammar in Mage-like textual form.
    DumpGrammar,
    /// Print the inferred treespec (one line per token/node/variant).
    DumpSpecs,
    /// Fuzz the grammar against the reference evaluator.
    Fuzz,
}

#[derive(Parser, Debug)]
#[command(name = "magelang", about = "Grammar-to-parser toolchain demo CLI")]
struct Cli {
    /// Name of a built-in demo grammar (see `demos::names()` for the list).
    grammar_file: String,
    /// What to do with the grammar.
    template_name: Template,
    /// Write output here instead of stdout.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Seed for `--template fuzz`.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Some(grammar) = demos::lookup(&cli.grammar_file) else {
        eprintln!(
            "unknown demo grammar '{}'; available: {}",
            cli.grammar_file,
            demos::names().join(", ")
        );
        return ExitCode::FAILURE;
    };

    let output = match cli.template_name {
        Template::DumpGrammar => match compile(&grammar) {
            Ok(compiled) => compiled.grammar.to_string(),
            Err(CompileError::Grammar(errors)) => {
                eprintln!("{errors}");
                return ExitCode::FAILURE;
            }
            Err(other) => {
                eprintln!("{other}");
                return ExitCode::FAILURE;
            }
        },
        Template::DumpSpecs => match compile(&grammar) {
            Ok(compiled) => format!("{} spec(s) inferred", compiled.specs.iter().count()),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        Template::Fuzz => {
            let config = fuzz::FuzzConfig::default();
            match fuzz::fuzz_grammar(&grammar, cli.seed, &config) {
                Ok(report) if report.disagreements.is_empty() => {
                    format!("{} sentences succeeded, no disagreements", report.succeeded)
                }
                Ok(report) => {
                    for d in &report.disagreements {
                        eprintln!("{d}");
                    }
                    return ExitCode::FAILURE;
                }
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    match cli.out_dir {
        Some(dir) => {
            if let Err(err) = fs::create_dir_all(&dir).and_then(|_| fs::write(dir.join("output.txt"), &output)) {
                eprintln!("failed to write output: {err}");
                return ExitCode::FAILURE;
            }
        }
        None => println!("{output}"),
    }
    ExitCode::SUCCESS
}

/// Built-in demo grammars, built through the public builder API rather than
/// parsed from Mage source text.
mod demos {
    use super::*;

    pub fn names() -> Vec<&'static str> {
        vec!["digit", "ident", "expr"]
    }

    pub fn lookup(name: &str) -> Option<Grammar> {
        match name {
            "digit" => Some(digit()),
            "ident" => Some(ident()),
            "expr" => Some(expr()),
            _ => None,
        }
    }

    fn charset(low: char, high: char) -> ExprKind {
        ExprKind::CharSet(CharSet { elements: vec![CharSetElem::Range(low, high)], case_insensitive: false, invert: false })
    }

    /// `pub Digit = [0-9]+ ;`
    fn digit() -> Grammar {
        let mut b = GrammarBuilder::new();
        let cs = b.push(charset('0', '9'), None);
        let rep = b.push(ExprKind::Repeat { expr: cs, min: 1, max: UNBOUNDED }, None);
        b.finish(vec![Rule { name: "Digit".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(rep) }])
    }

    /// `pub Ident = [a-zA-Z] [a-zA-Z0-9]* ;`
    fn ident() -> Grammar {
        let mut b = GrammarBuilder::new();
        let start = b.push(
            ExprKind::CharSet(CharSet {
                elements: vec![CharSetElem::Range('a', 'z'), CharSetElem::Range('A', 'Z')],
                case_insensitive: false,
                invert: false,
            }),
            None,
        );
        let part = b.push(
            ExprKind::CharSet(CharSet {
                elements: vec![CharSetElem::Range('a', 'z'), CharSetElem::Range('A', 'Z'), CharSetElem::Range('0', '9')],
                case_insensitive: false,
                invert: false,
            }),
            None,
        );
        let rest = b.push(ExprKind::Repeat { expr: part, min: 0, max: UNBOUNDED }, None);
        let seq = b.push(ExprKind::Seq(vec![start, rest]), None);
        b.finish(vec![Rule { name: "Ident".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(seq) }])
    }

    /// `pub Expr = Digit | '(' Expr '+' Expr ')' ;`
    fn expr() -> Grammar {
        let mut b = GrammarBuilder::new();
        let digit_cs = b.push(charset('0', '9'), None);
        let digit_rep = b.push(ExprKind::Repeat { expr: digit_cs, min: 1, max: UNBOUNDED }, None);
        let digit_ref = b.push(ExprKind::Ref("Digit".to_string()), None);

        let open = b.push(ExprKind::Lit("(".to_string()), None);
        let plus = b.push(ExprKind::Lit("+".to_string()), None);
        let close = b.push(ExprKind::Lit(")".to_string()), None);
        let left = b.push(ExprKind::Ref("Expr".to_string()), Some("left".to_string()));
        let right = b.push(ExprKind::Ref("Expr".to_string()), Some("right".to_string()));
        let paren_seq = b.push(ExprKind::Seq(vec![open, left, plus, right, close]), None);

        let choice = b.push(ExprKind::Choice(vec![digit_ref, paren_seq]), None);

        b.finish(vec![
            Rule { name: "Expr".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(choice) },
            Rule { name: "Digit".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(digit_rep) },
        ])
    }
}
