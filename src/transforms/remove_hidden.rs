//! The final pair of passes before treespec inference: `remove_hidden`
//! strips `Hide` wrappers that the synthesizer no longer needs once treespec
//! inference has already recorded that a subtree contributes no field
//! (`unhide` is its inverse, used by the fuzzer/tests to get back an
//! unhidden grammar for the reference evaluator, which does not care about
//! field visibility at all).

use crate::grammar::{ExprKind, Grammar};

use super::rewrite_grammar;

/// Drops every `Hide` wrapper, replacing it with its inner expression. Used
/// once treespec inference is done (it needs to see `Hide` to know a
/// subtree is fieldless) but the reference evaluator and interpreter do not
/// distinguish hidden expressions from visible ones.
pub fn remove_hidden(grammar: &Grammar) -> Grammar {
    rewrite_grammar(grammar, |builder, kind, label| match kind {
        ExprKind::Hide(expr) => {
            let inner = builder.get(expr).kind.clone();
            (inner, label)
        }
        other => (other, label),
    })
}

/// Inverse of [`remove_hidden`]: no-op, provided so call sites that
/// conditionally need a hidden-free grammar for evaluation and a
/// hidden-aware one for inference can name both directions explicitly rather
/// than re-deriving the hidden grammar from scratch.
pub fn unhide(grammar: &Grammar) -> Grammar {
    remove_hidden(grammar)
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{ExprKind, GrammarBuilder, Rule, RuleFlags};

    #[test]
    fn strips_hide_wrapper() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let hidden = builder.push(ExprKind::Hide(lit), None);
        let rule = Rule { name: "R".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(hidden) };
        let grammar = builder.finish(vec![rule]);

        let out = remove_hidden(&grammar);
        let top = out.rules[0].expr.unwrap();
        assert!(matches!(out.kind(top), ExprKind::Lit(text) if text == "x"));
    }
}
