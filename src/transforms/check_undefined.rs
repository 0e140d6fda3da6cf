//! Checks that every `Ref` in the grammar names a declared rule.

use crate::analysis::is_fragment;
use crate::error::{GrammarError, GrammarErrors};
use crate::grammar::{ExprKind, Grammar};

/// Collects a [`GrammarError::UndefinedRef`] for every reference to a rule
/// that was never declared, and a [`GrammarError::FragmentAtTokenPosition`]
/// when a fragment rule is referenced from a position that requires a token
/// (directly inside another token rule's body). Errors are collected rather
/// than returned on first hit, so a single run reports every problem in the
/// grammar at once.
pub fn check_undefined(grammar: &Grammar) -> GrammarErrors {
    let mut errors = Vec::new();
    let names: std::collections::HashSet<&str> =
        grammar.rules.iter().map(|r| r.name.as_str()).collect();

    for rule in &grammar.rules {
        let Some(expr) = rule.expr else { continue };
        visit(grammar, expr, &names, &rule.name, &mut errors);
    }

    GrammarErrors(errors)
}

fn visit(
    grammar: &Grammar,
    id: crate::grammar::ExprId,
    names: &std::collections::HashSet<&str>,
    rule_name: &str,
    errors: &mut Vec<GrammarError>,
) {
    match grammar.kind(id) {
        ExprKind::Ref(name) => {
            if !names.contains(name.as_str()) {
                errors.push(GrammarError::UndefinedRef {
                    rule: rule_name.to_string(),
                    name: name.clone(),
                });
            } else if let Some(referenced) = grammar.lookup(name) {
                if is_fragment(grammar, referenced) && referenced.is_force_token() {
                    errors.push(GrammarError::FragmentAtTokenPosition {
                        rule: rule_name.to_string(),
                    });
                }
            }
        }
        ExprKind::Lit(_) | ExprKind::CharSet(_) => {}
        ExprKind::Seq(items) | ExprKind::Choice(items) => {
            for item in items {
                visit(grammar, *item, names, rule_name, errors);
            }
        }
        ExprKind::Repeat { expr, .. } | ExprKind::Lookahead { expr, .. } | ExprKind::Hide(expr) => {
            visit(grammar, *expr, names, rule_name, errors);
        }
        ExprKind::List { element, separator, .. } => {
            visit(grammar, *element, names, rule_name, errors);
            visit(grammar, *separator, names, rule_name, errors);
        }
    }
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{GrammarBuilder, Rule, RuleFlags};

    #[test]
    fn reports_undefined_ref() {
        let mut builder = GrammarBuilder::new();
        let r = builder.push(ExprKind::Ref("Missing".to_string()), None);
        let rule = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(r) };
        let grammar = builder.finish(vec![rule]);
        let errors = check_undefined(&grammar);
        assert_eq!(errors.0.len(), 1);
        assert!(matches!(&errors.0[0], GrammarError::UndefinedRef { name, .. } if name == "Missing"));
    }

    #[test]
    fn accepts_defined_ref() {
        let mut builder = GrammarBuilder::new();
        let r = builder.push(ExprKind::Ref("B".to_string()), None);
        let a = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(r) };
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let b = Rule { name: "B".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(lit) };
        let grammar = builder.finish(vec![a, b]);
        assert!(check_undefined(&grammar).is_empty());
    }

    #[test]
    fn reports_private_force_token_ref_as_fragment_at_token_position() {
        // A rule flagged `FORCE_TOKEN` but not `PUBLIC` has no CST node shape
        // of its own — it's a fragment wearing a token flag — so referencing
        // it is exactly the case `FragmentAtTokenPosition` exists to catch.
        let mut builder = GrammarBuilder::new();
        let r = builder.push(ExprKind::Ref("frag".to_string()), None);
        let a = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(r) };
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let frag = Rule { name: "frag".to_string(), flags: RuleFlags::FORCE_TOKEN, type_name: None, expr: Some(lit) };
        let grammar = builder.finish(vec![a, frag]);
        let errors = check_undefined(&grammar);
        assert_eq!(errors.0.len(), 1);
        assert!(matches!(&errors.0[0], GrammarError::FragmentAtTokenPosition { rule } if rule == "A"));
    }
}
