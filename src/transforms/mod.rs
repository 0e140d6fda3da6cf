//! The ordered grammar-to-grammar passes that turn a raw grammar into one
//! ready for treespec inference and synthesis.
//!
//! Every pass is a pure function `Grammar -> Grammar` (or, for the checking
//! passes, `&Grammar -> GrammarErrors`): none of them mutate their input.
//! `rewrite_expr` is the one recursive-rebuild helper every rewriting pass is
//! built on, mirroring the source's own `rewrite_expr(expr, rewriter)`
//! helper used throughout `extract_literals.py` / `inline.py`.

mod check_charsets;
mod check_undefined;
mod extract_literals;
mod hide_lookaheads;
mod inline;
mod insert_magic_rules;
mod remove_hidden;
mod simplify;

pub use check_charsets::check_charsets;
pub use check_undefined::check_undefined;
pub use extract_literals::extract_literals;
pub use hide_lookaheads::hide_lookaheads;
pub use inline::inline;
pub use insert_magic_rules::{insert_magic_rules, insert_skip};
pub use remove_hidden::{remove_hidden, unhide};
pub use simplify::{distill, flatten, simplify};

use crate::grammar::{ExprId, ExprKind, Grammar, GrammarBuilder, Rule};

/// Rebuild `id`'s subtree bottom-up, calling `rewriter` on each freshly
/// rebuilt node. If `rewriter` returns `Some(kind)`, that replaces the node;
/// otherwise the rebuilt (but otherwise unchanged) node is kept. Children are
/// always visited first, so a rewriter that replaces a `Ref` with an inlined
/// subtree (as `inline`'s does) sees a tree already free of any rewritten
/// descendants.
pub fn rewrite_expr(
    grammar: &Grammar,
    builder: &mut GrammarBuilder,
    id: ExprId,
    rewriter: &mut dyn FnMut(&mut GrammarBuilder, ExprKind, Option<String>) -> (ExprKind, Option<String>),
) -> ExprId {
    let node = grammar.get(id);
    let label = node.label.clone();
    let new_kind = match &node.kind {
        ExprKind::Lit(_) | ExprKind::CharSet(_) | ExprKind::Ref(_) => node.kind.clone(),
        ExprKind::Seq(items) => ExprKind::Seq(
            items
                .iter()
                .map(|child| rewrite_expr(grammar, builder, *child, rewriter))
                .collect(),
        ),
        ExprKind::Choice(items) => ExprKind::Choice(
            items
                .iter()
                .map(|child| rewrite_expr(grammar, builder, *child, rewriter))
                .collect(),
        ),
        ExprKind::Repeat { expr, min, max } => ExprKind::Repeat {
            expr: rewrite_expr(grammar, builder, *expr, rewriter),
            min: *min,
            max: *max,
        },
        ExprKind::List { element, separator, min_count } => ExprKind::List {
            element: rewrite_expr(grammar, builder, *element, rewriter),
            separator: rewrite_expr(grammar, builder, *separator, rewriter),
            min_count: *min_count,
        },
        ExprKind::Lookahead { expr, negated } => ExprKind::Lookahead {
            expr: rewrite_expr(grammar, builder, *expr, rewriter),
            negated: *negated,
        },
        ExprKind::Hide(expr) => ExprKind::Hide(rewrite_expr(grammar, builder, *expr, rewriter)),
    };
    let (final_kind, final_label) = rewriter(builder, new_kind, label);
    builder.push(final_kind, final_label)
}

/// Apply `rewrite_expr` to every rule's top-level expression, leaving rules
/// without a body (externs) untouched, and re-deriving parent pointers on
/// the resulting grammar.
pub fn rewrite_grammar(
    grammar: &Grammar,
    mut rewriter: impl FnMut(&mut GrammarBuilder, ExprKind, Option<String>) -> (ExprKind, Option<String>),
) -> Grammar {
    let mut builder = GrammarBuilder::new();
    let new_rules: Vec<Rule> = grammar
        .rules
        .iter()
        .map(|rule| Rule {
            name: rule.name.clone(),
            flags: rule.flags,
            type_name: rule.type_name.clone(),
            expr: rule
                .expr
                .map(|id| rewrite_expr(grammar, &mut builder, id, &mut rewriter)),
        })
        .collect();
    builder.finish(new_rules)
}
