//! Wraps every lookahead in a `Hide`, since a lookahead never consumes input
//! and therefore never contributes a field to its enclosing node — treespec
//! inference already treats `Hide` as "produces the unit type", so folding
//! lookaheads into that representation means the inference rules in
//! `treespec` don't need a separate case for them.

use crate::grammar::ExprKind;

use super::rewrite_grammar;
use crate::grammar::Grammar;

pub fn hide_lookaheads(grammar: &Grammar) -> Grammar {
    rewrite_grammar(grammar, |builder, kind, label| match kind {
        ExprKind::Lookahead { .. } => {
            let inner = builder.push(kind, None);
            (ExprKind::Hide(inner), label)
        }
        other => (other, label),
    })
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{ExprKind, GrammarBuilder, Rule, RuleFlags};

    #[test]
    fn wraps_lookahead_in_hide() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let la = builder.push(ExprKind::Lookahead { expr: lit, negated: false }, None);
        let rule = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(la) };
        let grammar = builder.finish(vec![rule]);

        let out = hide_lookaheads(&grammar);
        let top = out.rules[0].expr.unwrap();
        assert!(matches!(out.kind(top), ExprKind::Hide(_)));
    }
}
