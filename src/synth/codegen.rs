//! Lowers a normalized [`Grammar`] into a [`Program`]: one [`ParseRule`] per
//! token/node/variant rule, built by recursively lowering each rule's
//! [`ExprKind`] tree into the corresponding [`ParseExpr`].
//!
//! Grounded on `mage_to_python_parser.py`'s per-rule dispatch
//! (`is_parse_rule` / `is_variant_rule` / `is_token_rule`): a rule becomes a
//! call to another rule's own parse method when it is public, and gets
//! inlined directly otherwise — which is already true of every rule surviving
//! the `inline` transform, so lowering here is a straightforward structural
//! walk rather than a second inlining pass.

use crate::analysis::{is_parse_rule, is_skip_rule, is_token_rule, is_variant_rule};
use crate::error::ImplementationError;
use crate::grammar::{ExprId, ExprKind, Grammar};

use super::program::{ParseExpr, ParseRule, Program, RuleKind, SeqField};

pub fn synthesize(grammar: &Grammar) -> Result<Program, ImplementationError> {
    let mut rules = Vec::new();
    for rule in &grammar.rules {
        // The magic `skip` rule is still synthesized (as a `RuleKind::Token`,
        // since `insert_magic_rules` flags it `FORCE_TOKEN`) so the `CallRule`
        // a bare `Ref` to it lowers to has something to resolve against at
        // interpretation time; only its *field name* is suppressed, by
        // `field_name_for` below.
        if rule.is_extern() {
            continue;
        }
        let kind = if is_token_rule(grammar, rule) {
            RuleKind::Token
        } else if is_variant_rule(grammar, rule) {
            RuleKind::Variant
        } else if is_parse_rule(grammar, rule) {
            RuleKind::Node
        } else {
            // A fragment that survived `inline` unreferenced; nothing calls
            // it, so it contributes no parse rule of its own.
            continue;
        };
        let expr = rule.expr.ok_or_else(|| {
            ImplementationError::new("codegen", format!("rule '{}' has no body to synthesize", rule.name))
        })?;
        let body = lower(grammar, expr)?;
        rules.push(ParseRule { name: rule.name.clone(), kind, body });
    }
    Ok(Program { rules })
}

fn lower(grammar: &Grammar, id: ExprId) -> Result<ParseExpr, ImplementationError> {
    let node = grammar.get(id);
    match &node.kind {
        ExprKind::Lit(text) => Ok(ParseExpr::Lit(text.clone())),
        ExprKind::CharSet(cs) => Ok(ParseExpr::CharSet(cs.clone())),
        ExprKind::Ref(name) => Ok(ParseExpr::CallRule(name.clone())),
        ExprKind::Seq(items) => {
            let mut fields = Vec::with_capacity(items.len());
            for item in items {
                let field_name = field_name_for(grammar, *item);
                fields.push(SeqField { name: field_name, expr: lower(grammar, *item)? });
            }
            Ok(ParseExpr::Seq(fields))
        }
        ExprKind::Choice(items) => {
            let lowered = items.iter().map(|id| lower(grammar, *id)).collect::<Result<_, _>>()?;
            Ok(ParseExpr::Choice(lowered))
        }
        ExprKind::Repeat { expr, min, max } => Ok(ParseExpr::Repeat {
            expr: Box::new(lower(grammar, *expr)?),
            min: *min,
            max: *max,
        }),
        ExprKind::List { element, separator, min_count } => Ok(ParseExpr::List {
            element: Box::new(lower(grammar, *element)?),
            separator: Box::new(lower(grammar, *separator)?),
            min_count: *min_count,
        }),
        ExprKind::Lookahead { expr, negated } => Ok(ParseExpr::Lookahead {
            expr: Box::new(lower(grammar, *expr)?),
            negated: *negated,
        }),
        ExprKind::Hide(expr) => Ok(ParseExpr::Hide(Box::new(lower(grammar, *expr)?))),
    }
}

fn field_name_for(grammar: &Grammar, id: ExprId) -> Option<String> {
    let node = grammar.get(id);
    if let Some(label) = &node.label {
        return Some(label.clone());
    }
    match &node.kind {
        ExprKind::Ref(name) => match grammar.lookup(name) {
            Some(rule) if is_skip_rule(rule) => None,
            _ => Some(name.clone()),
        },
        ExprKind::Hide(_) | ExprKind::Lookahead { .. } | ExprKind::CharSet(_) | ExprKind::Choice(_) => None,
        ExprKind::Repeat { expr, .. } => field_name_for(grammar, *expr),
        _ => None,
    }
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{CharSet, CharSetElem, ExprKind, GrammarBuilder, Rule, RuleFlags, UNBOUNDED};

    #[test]
    fn synthesizes_token_rule() {
        let mut builder = GrammarBuilder::new();
        let cs = builder.push(
            ExprKind::CharSet(CharSet { elements: vec![CharSetElem::Range('0', '9')], case_insensitive: false, invert: false }),
            None,
        );
        let rep = builder.push(ExprKind::Repeat { expr: cs, min: 1, max: UNBOUNDED }, None);
        let rule = Rule { name: "Digit".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(rep) };
        let grammar = builder.finish(vec![rule]);

        let program = synthesize(&grammar).unwrap();
        let rule = program.lookup("Digit").unwrap();
        assert_eq!(rule.kind, RuleKind::Token);
        assert!(matches!(rule.body, ParseExpr::Repeat { .. }));
    }

    #[test]
    fn synthesizes_node_rule_with_field_names() {
        let mut builder = GrammarBuilder::new();
        let a = builder.push(ExprKind::Ref("Digit".to_string()), None);
        let b = builder.push(ExprKind::Ref("plus".to_string()), None);
        let seq = builder.push(ExprKind::Seq(vec![a, b]), None);
        let rule = Rule { name: "Add".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(seq) };
        let digit = Rule { name: "Digit".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: None };
        let plus = Rule { name: "plus".to_string(), flags: RuleFlags::PUBLIC | RuleFlags::FORCE_TOKEN, type_name: None, expr: None };
        let grammar = builder.finish(vec![rule, digit, plus]);

        let program = synthesize(&grammar).unwrap();
        let add = program.lookup("Add").unwrap();
        match &add.body {
            ParseExpr::Seq(fields) => {
                assert_eq!(fields[0].name.as_deref(), Some("Digit"));
                assert_eq!(fields[1].name.as_deref(), Some("plus"));
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn skip_ref_lowers_to_unnamed_callable_field() {
        // Run the real `insert_magic_rules`/`insert_skip`/`remove_hidden`
        // passes over a >1-element Seq, the way `normalize` does, instead of
        // hand-building a Seq that never goes near `insert_skip`. `Digit` and
        // `plus` need real bodies here (unlike `build_specs`, `synthesize`
        // errors on a bodyless rule rather than skipping it).
        let mut builder = GrammarBuilder::new();
        let lhs = builder.push(ExprKind::Ref("Digit".to_string()), None);
        let plus = builder.push(ExprKind::Ref("plus".to_string()), None);
        let rhs = builder.push(ExprKind::Ref("Digit".to_string()), None);
        let seq = builder.push(ExprKind::Seq(vec![lhs, plus, rhs]), None);
        let add = Rule { name: "Add".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(seq) };
        let digit_cs = builder.push(
            ExprKind::CharSet(CharSet { elements: vec![CharSetElem::Range('0', '9')], case_insensitive: false, invert: false }),
            None,
        );
        let digit_rep = builder.push(ExprKind::Repeat { expr: digit_cs, min: 1, max: UNBOUNDED }, None);
        let digit = Rule { name: "Digit".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(digit_rep) };
        let plus_lit = builder.push(ExprKind::Lit("+".to_string()), None);
        let plus_rule = Rule { name: "plus".to_string(), flags: RuleFlags::PUBLIC | RuleFlags::FORCE_TOKEN, type_name: None, expr: Some(plus_lit) };
        let grammar = builder.finish(vec![add, digit, plus_rule]);

        let grammar = crate::transforms::insert_magic_rules(&grammar);
        let grammar = crate::transforms::insert_skip(&grammar);
        let grammar = crate::transforms::remove_hidden(&grammar);

        let program = synthesize(&grammar).unwrap();
        // The skip rule must still resolve as a callable rule...
        assert!(program.lookup("skip").is_some());
        // ...but never shows up as a named field on Add.
        let add = program.lookup("Add").unwrap();
        match &add.body {
            ParseExpr::Seq(fields) => {
                assert!(fields.iter().all(|f| f.name.as_deref() != Some("skip")));
                assert_eq!(fields.iter().filter(|f| f.name.is_some()).count(), 3);
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }
}
