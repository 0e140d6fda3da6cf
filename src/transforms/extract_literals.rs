//! Hoists inline string literals used in parse rules out into their own
//! named, `FORCE_TOKEN` rules.
//!
//! Grounded on `extract_literals.py`: every `LitExpr` reachable from a parse
//! rule is replaced by a `Ref` to a synthesized token rule, deduplicated by
//! literal text, so `"if"` appearing in three different parse rules produces
//! one `if_keyword` rule and three references to it.

use std::collections::HashMap;

use crate::analysis::is_parse_rule;
use crate::grammar::{ExprKind, Grammar, Rule, RuleFlags};

use super::rewrite_expr;

/// `1`..`4` character literals get a name built from a fixed symbol table
/// (`+` -> `plus`, and so on); anything longer that isn't a bare identifier,
/// or that contains even one character with no entry in the table, falls
/// back to a numbered `token_N` name. Identifier-shaped literals (`if`,
/// `else`, ...) always get a `_keyword` suffix regardless of length, since
/// those are overwhelmingly the common case and deserve a readable name.
fn symbol_name(ch: char) -> Option<&'static str> {
    Some(match ch {
        '+' => "plus",
        '-' => "minus",
        '*' => "star",
        '/' => "slash",
        '%' => "percent",
        '=' => "eq",
        '<' => "lt",
        '>' => "gt",
        '!' => "bang",
        '&' => "amp",
        '|' => "pipe",
        '^' => "caret",
        '~' => "tilde",
        '(' => "lparen",
        ')' => "rparen",
        '[' => "lbracket",
        ']' => "rbracket",
        '{' => "lbrace",
        '}' => "rbrace",
        ',' => "comma",
        '.' => "dot",
        ':' => "colon",
        ';' => "semi",
        '?' => "question",
        '@' => "at",
        '#' => "hash",
        '$' => "dollar",
        '\\' => "backslash",
        '\'' => "quote",
        '"' => "dquote",
        '_' => "underscore",
        _ => return None,
    })
}

fn literal_name(text: &str, counter: &mut usize) -> String {
    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        if first.is_alphabetic() && text.chars().skip(1).all(|c| c.is_alphanumeric() || c == '_') {
            return format!("{text}_keyword");
        }
    }
    if text.chars().count() <= 4 && !text.is_empty() {
        if let Some(parts) = text.chars().map(symbol_name).collect::<Option<Vec<_>>>() {
            return parts.join("_");
        }
    }
    let name = format!("token_{counter}");
    *counter += 1;
    name
}

pub fn extract_literals(grammar: &Grammar) -> Grammar {
    let mut literal_to_name: HashMap<String, String> = HashMap::new();
    let mut new_token_rules: Vec<Rule> = Vec::new();
    let mut counter = 0usize;

    let mut builder = crate::grammar::GrammarBuilder::new();
    let mut new_rules: Vec<Rule> = Vec::new();

    for rule in &grammar.rules {
        if is_parse_rule(grammar, rule) {
            let expr = rule.expr.expect("parse rule always has a body");
            let mut rewriter = |b: &mut crate::grammar::GrammarBuilder, kind: crate::grammar::ExprKind, label: Option<String>| {
                if let ExprKind::Lit(text) = &kind {
                    let name = literal_to_name.entry(text.clone()).or_insert_with(|| {
                        let name = literal_name(text, &mut counter);
                        let lit_id = b.push(ExprKind::Lit(text.clone()), None);
                        new_token_rules.push(Rule {
                            name: name.clone(),
                            flags: RuleFlags::PUBLIC | RuleFlags::FORCE_TOKEN,
                            type_name: Some("String".to_string()),
                            expr: Some(lit_id),
                        });
                        name
                    });
                    return (ExprKind::Ref(name.clone()), label);
                }
                (kind, label)
            };
            let new_expr = rewrite_expr(grammar, &mut builder, expr, &mut rewriter);
            new_rules.push(Rule {
                name: rule.name.clone(),
                flags: rule.flags,
                type_name: rule.type_name.clone(),
                expr: Some(new_expr),
            });
        } else {
            // Non-parse rules keep their bodies verbatim; re-push their
            // subtree into the new arena so ids stay valid.
            let rebuilt = rule.expr.map(|id| {
                let mut identity = |_b: &mut crate::grammar::GrammarBuilder, kind: crate::grammar::ExprKind, label: Option<String>| (kind, label);
                rewrite_expr(grammar, &mut builder, id, &mut identity)
            });
            new_rules.push(Rule {
                name: rule.name.clone(),
                flags: rule.flags,
                type_name: rule.type_name.clone(),
                expr: rebuilt,
            });
        }
    }

    new_rules.extend(new_token_rules);
    builder.finish(new_rules)
}
