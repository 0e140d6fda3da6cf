//! Structural cleanup passes run after inlining has flattened fragments into
//! their call sites: `flatten` collapses nested `Seq`/`Choice` of the same
//! kind, `simplify` drops single-child wrappers that have become
//! redundant, and `distill` removes `Choice`/`Seq` nodes that now carry
//! exactly one alternative/element.

use crate::grammar::{ExprId, ExprKind, Grammar, GrammarBuilder};

use super::rewrite_grammar;

/// Splices a nested `Seq` into its parent `Seq`, and a nested `Choice` into
/// its parent `Choice` — `Seq(a, Seq(b, c))` becomes `Seq(a, b, c)`. Mage
/// grammars commonly end up with this shape after literal extraction and
/// skip insertion each wrap their own `Seq`.
pub fn flatten(grammar: &Grammar) -> Grammar {
    rewrite_grammar(grammar, |builder, kind, label| match kind {
        ExprKind::Seq(items) => (ExprKind::Seq(flatten_same(builder, items, is_seq)), label),
        ExprKind::Choice(items) => (ExprKind::Choice(flatten_same(builder, items, is_choice)), label),
        other => (other, label),
    })
}

fn is_seq(builder: &GrammarBuilder, id: ExprId) -> Option<Vec<ExprId>> {
    match &builder.get(id).kind {
        ExprKind::Seq(items) => Some(items.clone()),
        _ => None,
    }
}

fn is_choice(builder: &GrammarBuilder, id: ExprId) -> Option<Vec<ExprId>> {
    match &builder.get(id).kind {
        ExprKind::Choice(items) => Some(items.clone()),
        _ => None,
    }
}

fn flatten_same(
    builder: &GrammarBuilder,
    items: Vec<ExprId>,
    same_kind: fn(&GrammarBuilder, ExprId) -> Option<Vec<ExprId>>,
) -> Vec<ExprId> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        // Only splice when the nested node carries no label of its own —
        // a labeled sub-sequence is a field boundary and must stay intact.
        if builder.get(item).label.is_none() {
            if let Some(children) = same_kind(builder, item) {
                out.extend(children);
                continue;
            }
        }
        out.push(item);
    }
    out
}

/// Drops `Seq`/`Choice` wrappers that (after flattening) carry exactly one
/// child, replacing the wrapper with the child itself.
pub fn distill(grammar: &Grammar) -> Grammar {
    rewrite_grammar(grammar, |builder, kind, label| match kind {
        ExprKind::Seq(items) | ExprKind::Choice(items) if items.len() == 1 => {
            let only = items[0];
            let merged_label = label.or_else(|| builder.get(only).label.clone());
            (builder.get(only).kind.clone(), merged_label)
        }
        other => (other, label),
    })
}

/// Simplifies character sets and repeats that reduce to a simpler form:
/// `Repeat(e, 1, 1)` becomes `e` itself, and a `CharSet` with a single
/// non-inverted element already canonical is left untouched (kept distinct
/// from `distill` since it does not collapse rule *structure*, only a node's
/// own redundant parameters).
pub fn simplify(grammar: &Grammar) -> Grammar {
    rewrite_grammar(grammar, |builder, kind, label| match kind {
        ExprKind::Repeat { expr, min: 1, max: 1 } => (builder.get(expr).kind.clone(), label),
        other => (other, label),
    })
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{GrammarBuilder, Rule, RuleFlags};

    #[test]
    fn flattens_nested_seq() {
        let mut builder = GrammarBuilder::new();
        let a = builder.push(ExprKind::Lit("a".to_string()), None);
        let b = builder.push(ExprKind::Lit("b".to_string()), None);
        let inner = builder.push(ExprKind::Seq(vec![a, b]), None);
        let c = builder.push(ExprKind::Lit("c".to_string()), None);
        let outer = builder.push(ExprKind::Seq(vec![inner, c]), None);
        let rule = Rule { name: "R".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(outer) };
        let grammar = builder.finish(vec![rule]);

        let out = flatten(&grammar);
        let top = out.rules[0].expr.unwrap();
        match out.kind(top) {
            ExprKind::Seq(items) => assert_eq!(items.len(), 3),
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn distills_single_element_choice() {
        let mut builder = GrammarBuilder::new();
        let a = builder.push(ExprKind::Lit("a".to_string()), None);
        let choice = builder.push(ExprKind::Choice(vec![a]), None);
        let rule = Rule { name: "R".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(choice) };
        let grammar = builder.finish(vec![rule]);

        let out = distill(&grammar);
        let top = out.rules[0].expr.unwrap();
        assert!(matches!(out.kind(top), ExprKind::Lit(text) if text == "a"));
    }

    #[test]
    fn simplify_collapses_exact_one_repeat() {
        let mut builder = GrammarBuilder::new();
        let a = builder.push(ExprKind::Lit("a".to_string()), None);
        let rep = builder.push(ExprKind::Repeat { expr: a, min: 1, max: 1 }, None);
        let rule = Rule { name: "R".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(rep) };
        let grammar = builder.finish(vec![rule]);

        let out = simplify(&grammar);
        let top = out.rules[0].expr.unwrap();
        assert!(matches!(out.kind(top), ExprKind::Lit(text) if text == "a"));
    }
}
