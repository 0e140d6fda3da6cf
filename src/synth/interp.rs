//! A tree-walking interpreter over a [`Program`], standing in for the
//! generated recursive-descent parser a textual backend would otherwise
//! produce.
//!
//! Deliberately **not** a reimplementation of [`crate::eval`]'s
//! all-derivations evaluator: this walks the `Program` the same way a real
//! generated parser would — ordered-choice (first alternative that matches
//! wins), no backtracking across already-committed rule calls, and no
//! left-recursion guard. A left-recursive grammar makes this stack-overflow,
//! exactly as it would a generated parser; that failure mode is the point, so
//! fuzzing deliberately avoids left-recursive grammars rather than papering
//! over this with a bound this interpreter's real-world counterpart
//! wouldn't have either.

use std::fmt;

use super::program::{ParseExpr, Program, RuleKind};

/// A position within the input, cheap to copy so a `Choice` alternative can
/// fork, try, and discard its cursor without touching the caller's.
#[derive(Debug, Clone, Copy)]
struct CharStream<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> CharStream<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self { chars, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }
}

/// The result of successfully interpreting a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Token(String),
    Node { name: String, fields: Vec<(String, Value)> },
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Unit,
    None_,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub rule: String,
    pub position: usize,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse '{}' at position {}", self.rule, self.position)
    }
}

impl std::error::Error for ParseFailure {}

pub struct Interpreter<'p> {
    program: &'p Program,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    /// Parses `text` starting from `start_rule`, requiring the whole input to
    /// be consumed.
    pub fn parse(&self, start_rule: &str, text: &str) -> Result<Value, ParseFailure> {
        let chars: Vec<char> = text.chars().collect();
        let mut stream = CharStream::new(&chars);
        let value = self.call_rule(start_rule, &mut stream)?;
        if !stream.at_end() {
            return Err(ParseFailure { rule: start_rule.to_string(), position: stream.pos });
        }
        Ok(value)
    }

    fn call_rule(&self, name: &str, stream: &mut CharStream) -> Result<Value, ParseFailure> {
        let rule = self.program.lookup(name).unwrap_or_else(|| {
            panic!("interpreter asked to call undefined rule '{name}'")
        });
        let start = stream.pos;
        match rule.kind {
            RuleKind::Token => {
                let mut probe = *stream;
                if self.match_expr(&rule.body, &mut probe).is_some() {
                    let text = probe.slice(start);
                    *stream = probe;
                    Ok(Value::Token(text))
                } else {
                    Err(ParseFailure { rule: name.to_string(), position: start })
                }
            }
            RuleKind::Variant => {
                let mut probe = *stream;
                if let Some(value) = self.eval_expr(&rule.body, &mut probe) {
                    *stream = probe;
                    Ok(value)
                } else {
                    Err(ParseFailure { rule: name.to_string(), position: start })
                }
            }
            RuleKind::Node => {
                let mut probe = *stream;
                if let Some(value) = self.eval_expr(&rule.body, &mut probe) {
                    let fields = match value {
                        Value::Node { fields, .. } => fields,
                        Value::Unit => vec![],
                        other => vec![("value".to_string(), other)],
                    };
                    *stream = probe;
                    Ok(Value::Node { name: name.to_string(), fields })
                } else {
                    Err(ParseFailure { rule: name.to_string(), position: start })
                }
            }
        }
    }

    /// Consumes input for `expr` against `stream` without building a value,
    /// used for token rules (whose result is just the matched span) and for
    /// `Hide`d sub-expressions.
    fn match_expr(&self, expr: &ParseExpr, stream: &mut CharStream) -> Option<()> {
        self.eval_expr(expr, stream).map(|_| ())
    }

    fn eval_expr(&self, expr: &ParseExpr, stream: &mut CharStream) -> Option<Value> {
        match expr {
            ParseExpr::Lit(text) => {
                for expected in text.chars() {
                    if stream.peek()? != expected {
                        return None;
                    }
                    stream.advance();
                }
                Some(Value::Token(text.clone()))
            }
            ParseExpr::CharSet(cs) => {
                let ch = stream.peek()?;
                if cs.matches(ch) {
                    stream.advance();
                    Some(Value::Token(ch.to_string()))
                } else {
                    None
                }
            }
            ParseExpr::CallRule(name) => self.call_rule(name, stream).ok(),
            ParseExpr::Seq(fields) => {
                let mut out = Vec::new();
                for field in fields {
                    let value = self.eval_expr(&field.expr, stream)?;
                    if let Some(name) = &field.name {
                        out.push((name.clone(), value));
                    }
                }
                if out.is_empty() {
                    Some(Value::Unit)
                } else if out.len() == 1 {
                    Some(out.into_iter().next().unwrap().1)
                } else {
                    Some(Value::Node { name: String::new(), fields: out })
                }
            }
            ParseExpr::Choice(alts) => {
                for alt in alts {
                    let mut probe = *stream;
                    if let Some(value) = self.eval_expr(alt, &mut probe) {
                        *stream = probe;
                        return Some(value);
                    }
                }
                None
            }
            ParseExpr::Repeat { expr, min, max } => {
                let mut items = Vec::new();
                loop {
                    if items.len() >= *max {
                        break;
                    }
                    let mut probe = *stream;
                    match self.eval_expr(expr, &mut probe) {
                        Some(value) if probe.pos > stream.pos || items.len() < *min => {
                            *stream = probe;
                            items.push(value);
                        }
                        _ => break,
                    }
                }
                if items.len() < *min {
                    return None;
                }
                Some(Value::List(items))
            }
            ParseExpr::List { element, separator, min_count } => {
                let mut items = Vec::new();
                loop {
                    let mut probe = *stream;
                    if !items.is_empty() {
                        if self.match_expr(separator, &mut probe).is_none() {
                            break;
                        }
                    }
                    match self.eval_expr(element, &mut probe) {
                        Some(value) => {
                            *stream = probe;
                            items.push(value);
                        }
                        None => break,
                    }
                }
                if items.len() < *min_count {
                    return None;
                }
                Some(Value::List(items))
            }
            ParseExpr::Lookahead { expr, negated } => {
                let mut probe = *stream;
                let matched = self.eval_expr(expr, &mut probe).is_some();
                if matched != *negated {
                    Some(Value::None_)
                } else {
                    None
                }
            }
            ParseExpr::Hide(expr) => {
                self.match_expr(expr, stream)?;
                Some(Value::Unit)
            }
        }
    }
}

pub fn run(program: &Program, start_rule: &str, text: &str) -> Result<Value, ParseFailure> {
    Interpreter::new(program).parse(start_rule, text)
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{CharSet, CharSetElem, UNBOUNDED};
    use crate::synth::program::{ParseRule, SeqField};

    fn digit_charset() -> ParseExpr {
        ParseExpr::CharSet(CharSet {
            elements: vec![CharSetElem::Range('0', '9')],
            case_insensitive: false,
            invert: false,
        })
    }

    #[test]
    fn token_rule_matches_literal_run() {
        let program = Program {
            rules: vec![ParseRule {
                name: "Digit".to_string(),
                kind: RuleKind::Token,
                body: ParseExpr::Repeat { expr: Box::new(digit_charset()), min: 1, max: UNBOUNDED },
            }],
        };
        let value = run(&program, "Digit", "1234").unwrap();
        assert_eq!(value, Value::Token("1234".to_string()));
    }

    #[test]
    fn token_rule_rejects_non_matching_input() {
        let program = Program {
            rules: vec![ParseRule {
                name: "Digit".to_string(),
                kind: RuleKind::Token,
                body: ParseExpr::Repeat { expr: Box::new(digit_charset()), min: 1, max: UNBOUNDED },
            }],
        };
        assert!(run(&program, "Digit", "abc").is_err());
    }

    #[test]
    fn node_rule_builds_named_fields() {
        let program = Program {
            rules: vec![
                ParseRule {
                    name: "Add".to_string(),
                    kind: RuleKind::Node,
                    body: ParseExpr::Seq(vec![
                        SeqField { name: Some("left".to_string()), expr: ParseExpr::CallRule("Digit".to_string()) },
                        SeqField { name: None, expr: ParseExpr::Lit("+".to_string()) },
                        SeqField { name: Some("right".to_string()), expr: ParseExpr::CallRule("Digit".to_string()) },
                    ]),
                },
                ParseRule { name: "Digit".to_string(), kind: RuleKind::Token, body: digit_charset() },
            ],
        };
        let value = run(&program, "Add", "1+2").unwrap();
        match value {
            Value::Node { name, fields } => {
                assert_eq!(name, "Add");
                assert_eq!(fields[0], ("left".to_string(), Value::Token("1".to_string())));
                assert_eq!(fields[1], ("right".to_string(), Value::Token("2".to_string())));
            }
            other => panic!("expected Node, got {other:?}"),
        }
    }

    #[test]
    fn choice_tries_alternatives_in_order() {
        let program = Program {
            rules: vec![ParseRule {
                name: "Bool".to_string(),
                kind: RuleKind::Variant,
                body: ParseExpr::Choice(vec![
                    ParseExpr::Lit("true".to_string()),
                    ParseExpr::Lit("false".to_string()),
                ]),
            }],
        };
        assert_eq!(run(&program, "Bool", "true").unwrap(), Value::Token("true".to_string()));
        assert_eq!(run(&program, "Bool", "false").unwrap(), Value::Token("false".to_string()));
        assert!(run(&program, "Bool", "maybe").is_err());
    }

    #[test]
    fn list_requires_separator_between_elements() {
        let program = Program {
            rules: vec![ParseRule {
                name: "Digits".to_string(),
                kind: RuleKind::Node,
                body: ParseExpr::List {
                    element: Box::new(ParseExpr::CallRule("Digit".to_string())),
                    separator: Box::new(ParseExpr::Lit(",".to_string())),
                    min_count: 1,
                },
            }, ParseRule { name: "Digit".to_string(), kind: RuleKind::Token, body: digit_charset() }],
        };
        let value = run(&program, "Digits", "1,2,3").unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Token("1".to_string()),
                Value::Token("2".to_string()),
                Value::Token("3".to_string()),
            ])
        );
    }
}
