//! Inlines every fragment rule into its call sites and drops the fragment
//! from the rule list, leaving only `pub`/`extern` rules behind.
//!
//! Grounded on `inline.py`: a `Ref` to a private, non-extern rule is replaced
//! by a (recursively inlined) copy of that rule's body, labeled with the
//! rule's name so the field derived from it keeps a meaningful name even
//! though the fragment itself no longer exists as a rule.

use crate::grammar::{ExprId, ExprKind, Grammar, GrammarBuilder, Rule};

pub fn inline(grammar: &Grammar) -> Grammar {
    let mut builder = GrammarBuilder::new();
    let mut new_rules = Vec::new();

    for rule in &grammar.rules {
        if rule.is_extern() {
            new_rules.push(rule.clone_shallow());
            continue;
        }
        if rule.is_public() {
            let expr = rule.expr.expect("public rule always has a body");
            let new_expr = inline_expr(grammar, &mut builder, expr);
            new_rules.push(Rule {
                name: rule.name.clone(),
                flags: rule.flags,
                type_name: rule.type_name.clone(),
                expr: Some(new_expr),
            });
        }
    }

    builder.finish(new_rules)
}

fn inline_expr(grammar: &Grammar, builder: &mut GrammarBuilder, id: ExprId) -> ExprId {
    let node = grammar.get(id);
    let label = node.label.clone();
    match &node.kind {
        ExprKind::Ref(name) => {
            if let Some(rule) = grammar.lookup(name) {
                if !rule.is_public() && !rule.is_extern() {
                    let body = rule.expr.expect("fragment rule always has a body");
                    let inlined = inline_expr(grammar, builder, body);
                    builder.get_mut(inlined).label = Some(rule.name.clone());
                    return inlined;
                }
            }
            builder.push(ExprKind::Ref(name.clone()), label)
        }
        ExprKind::Lit(text) => builder.push(ExprKind::Lit(text.clone()), label),
        ExprKind::CharSet(cs) => builder.push(ExprKind::CharSet(cs.clone()), label),
        ExprKind::Seq(items) => {
            let items = items.iter().map(|c| inline_expr(grammar, builder, *c)).collect();
            builder.push(ExprKind::Seq(items), label)
        }
        ExprKind::Choice(items) => {
            let items = items.iter().map(|c| inline_expr(grammar, builder, *c)).collect();
            builder.push(ExprKind::Choice(items), label)
        }
        ExprKind::Repeat { expr, min, max } => {
            let expr = inline_expr(grammar, builder, *expr);
            builder.push(ExprKind::Repeat { expr, min: *min, max: *max }, label)
        }
        ExprKind::List { element, separator, min_count } => {
            let element = inline_expr(grammar, builder, *element);
            let separator = inline_expr(grammar, builder, *separator);
            builder.push(ExprKind::List { element, separator, min_count: *min_count }, label)
        }
        ExprKind::Lookahead { expr, negated } => {
            let expr = inline_expr(grammar, builder, *expr);
            builder.push(ExprKind::Lookahead { expr, negated: *negated }, label)
        }
        ExprKind::Hide(expr) => {
            let expr = inline_expr(grammar, builder, *expr);
            builder.push(ExprKind::Hide(expr), label)
        }
    }
}

impl Rule {
    fn clone_shallow(&self) -> Rule {
        Rule {
            name: self.name.clone(),
            flags: self.flags,
            type_name: self.type_name.clone(),
            expr: self.expr,
        }
    }
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{GrammarBuilder, RuleFlags};

    #[test]
    fn inlines_private_rule_and_drops_it() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let frag = Rule { name: "helper".to_string(), flags: RuleFlags::empty(), type_name: None, expr: Some(lit) };

        let frag_ref = builder.push(ExprKind::Ref("helper".to_string()), None);
        let public = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(frag_ref) };

        let grammar = builder.finish(vec![public, frag]);
        let out = inline(&grammar);

        assert_eq!(out.rules.len(), 1);
        assert_eq!(out.rules[0].name, "A");
        let top = out.rules[0].expr.unwrap();
        assert!(matches!(out.kind(top), ExprKind::Lit(text) if text == "x"));
        assert_eq!(out.get(top).label.as_deref(), Some("helper"));
    }

    #[test]
    fn chain_of_fragments_inlines_transitively() {
        // A -> b -> c -> 'x'
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let c = Rule { name: "c".to_string(), flags: RuleFlags::empty(), type_name: None, expr: Some(lit) };
        let c_ref = builder.push(ExprKind::Ref("c".to_string()), None);
        let b = Rule { name: "b".to_string(), flags: RuleFlags::empty(), type_name: None, expr: Some(c_ref) };
        let b_ref = builder.push(ExprKind::Ref("b".to_string()), None);
        let a = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(b_ref) };

        let grammar = builder.finish(vec![a, b, c]);
        let out = inline(&grammar);

        assert_eq!(out.rules.len(), 1);
        let top = out.rules[0].expr.unwrap();
        assert!(matches!(out.kind(top), ExprKind::Lit(text) if text == "x"));
    }
}
