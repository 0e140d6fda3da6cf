//! Rule classification predicates.
//!
//! Every later stage (treespec inference, the synthesizer) dispatches on
//! *what kind of rule* it is looking at rather than switching on `ExprKind`
//! directly. These predicates are the single place that answers that
//! question, mirroring how the source keeps `grammar.is_token_rule(rule)` /
//! `grammar.is_variant_rule(rule)` style calls at every pass boundary
//! (`mage_to_treespec.py`, `mage_to_python_parser.py`) instead of letting each
//! pass re-derive the answer.

use crate::grammar::{ExprId, ExprKind, Grammar, Rule};

/// A rule is a *token rule* if its body recursively consists only of
/// literals, character sets, hidden/lookahead wrappers around those, and
/// references to other token rules. Nothing in its expansion can ever
/// produce a child node, so it emits a single token rather than a tree.
pub fn is_token_rule(grammar: &Grammar, rule: &Rule) -> bool {
    if rule.is_extern() {
        return false;
    }
    if rule.is_force_token() {
        // Visibility still matters here: a hand-authored private `FORCE_TOKEN`
        // rule with no other use is a fragment, not a token rule, so
        // `is_fragment` can flag it via `check_undefined`'s
        // `FragmentAtTokenPosition` check. The one private `FORCE_TOKEN` rule
        // that genuinely must classify as a token regardless of visibility is
        // the magic `skip` rule, carved out by name via `is_skip_rule`.
        return rule.is_public() || is_skip_rule(rule);
    }
    match rule.expr {
        Some(expr) => expr_is_token_shaped(grammar, expr),
        None => false,
    }
}

/// The synthesized whitespace/comment-skipping rule threaded between `Seq`
/// elements and `List` separators by `insert_magic_rules::insert_skip`. It is
/// never public, so ordinary fragment/token classification would otherwise
/// swallow it; callers that need to recognize a bare `Ref` to it (treespec
/// field collection, codegen's field naming) go through this helper instead
/// of inlining the flag check.
pub fn is_skip_rule(rule: &Rule) -> bool {
    rule.is_skip()
}

fn expr_is_token_shaped(grammar: &Grammar, id: ExprId) -> bool {
    match grammar.kind(id) {
        ExprKind::Lit(_) | ExprKind::CharSet(_) => true,
        ExprKind::Ref(name) => grammar
            .lookup(name)
            .map(|r| is_token_rule(grammar, r))
            .unwrap_or(false),
        ExprKind::Seq(items) | ExprKind::Choice(items) => {
            items.iter().all(|id| expr_is_token_shaped(grammar, *id))
        }
        ExprKind::Repeat { expr, .. } => expr_is_token_shaped(grammar, *expr),
        ExprKind::List { element, separator, .. } => {
            expr_is_token_shaped(grammar, *element) && expr_is_token_shaped(grammar, *separator)
        }
        ExprKind::Lookahead { .. } => true,
        ExprKind::Hide(expr) => expr_is_token_shaped(grammar, *expr),
    }
}

/// A token rule is *static* when its expansion is built purely from literal
/// text with no character set anywhere in it — the whole token is known
/// ahead of time, so it behaves like a keyword (`FORCE_TOKEN` rules that spell
/// out `"if"`, `"else"`, punctuation, etc). Matching against such a rule never
/// needs to consult the input beyond a literal comparison.
pub fn is_static_token_rule(grammar: &Grammar, rule: &Rule) -> bool {
    if !is_token_rule(grammar, rule) {
        return false;
    }
    match rule.expr {
        Some(expr) => expr_is_static(grammar, expr),
        None => false,
    }
}

fn expr_is_static(grammar: &Grammar, id: ExprId) -> bool {
    match grammar.kind(id) {
        ExprKind::Lit(_) => true,
        ExprKind::CharSet(_) => false,
        ExprKind::Ref(name) => grammar
            .lookup(name)
            .map(|r| is_static_token_rule(grammar, r))
            .unwrap_or(false),
        ExprKind::Seq(items) | ExprKind::Choice(items) => {
            items.iter().all(|id| expr_is_static(grammar, *id))
        }
        ExprKind::Repeat { min, max, expr } => *min == *max && expr_is_static(grammar, *expr),
        ExprKind::List { .. } => false,
        ExprKind::Lookahead { .. } => true,
        ExprKind::Hide(expr) => expr_is_static(grammar, *expr),
    }
}

/// A rule is a *variant rule* if its top-level body is a bare choice between
/// references to other parse rules, each contributing nothing but its own
/// node — no sequence, no fields of its own. Such a rule is just naming a
/// union of node kinds, so treespec inference gives it a `VariantSpec`
/// instead of a `NodeSpec`.
pub fn is_variant_rule(grammar: &Grammar, rule: &Rule) -> bool {
    if is_token_rule(grammar, rule) || rule.is_extern() {
        return false;
    }
    let Some(expr) = rule.expr else { return false };
    match grammar.kind(expr) {
        ExprKind::Choice(items) => items
            .iter()
            .all(|id| matches!(unwrap_hide(grammar, *id), ExprKind::Ref(_))),
        _ => false,
    }
}

fn unwrap_hide<'g>(grammar: &'g Grammar, mut id: ExprId) -> &'g ExprKind {
    loop {
        match grammar.kind(id) {
            ExprKind::Hide(inner) => id = *inner,
            kind => return kind,
        }
    }
}

/// A rule is a *parse rule* (produces its own `NodeSpec` or `VariantSpec`)
/// when it is public and is not a token rule. Private non-token rules are
/// fragments, destined to be inlined away rather than to appear as a node of
/// their own (`extract_literals.py`'s `is_parse_rule` check mirrors exactly
/// this split when deciding which rules need their own synthesized parse
/// function).
pub fn is_parse_rule(grammar: &Grammar, rule: &Rule) -> bool {
    rule.is_public() && !is_token_rule(grammar, rule) && !rule.is_extern()
}

/// A rule is a *fragment*: private, non-extern, and not shaped like a token —
/// pure grammar-composition sugar that gets folded into whoever references it
/// by the `inline` transform, and never receives its own CST type
/// (`rule.is_extern or grammar.is_fragment(rule) or rule.is_skip` is the
/// precise skip condition `mage_to_treespec.py` uses when walking rules).
pub fn is_fragment(grammar: &Grammar, rule: &Rule) -> bool {
    !rule.is_public() && !rule.is_extern() && !is_token_rule(grammar, rule)
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{CharSet, CharSetElem, ExprKind, GrammarBuilder, RuleFlags};

    fn token_rule(name: &str, flags: RuleFlags, builder: &mut GrammarBuilder) -> Rule {
        let digit = builder.push(
            ExprKind::CharSet(CharSet {
                elements: vec![CharSetElem::Range('0', '9')],
                case_insensitive: false,
                invert: false,
            }),
            None,
        );
        let body = builder.push(
            ExprKind::Repeat { expr: digit, min: 1, max: crate::grammar::UNBOUNDED },
            None,
        );
        Rule { name: name.to_string(), flags, type_name: None, expr: Some(body) }
    }

    #[test]
    fn charset_rule_is_token_but_not_static() {
        let mut builder = GrammarBuilder::new();
        let rule = token_rule("Digit", RuleFlags::PUBLIC, &mut builder);
        let grammar = builder.finish(vec![rule]);
        let rule = &grammar.rules[0];
        assert!(is_token_rule(&grammar, rule));
        assert!(!is_static_token_rule(&grammar, rule));
        assert!(!is_parse_rule(&grammar, rule));
        assert!(!is_fragment(&grammar, rule));
    }

    #[test]
    fn literal_only_rule_is_static() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("if".to_string()), None);
        let rule = Rule {
            name: "KwIf".to_string(),
            flags: RuleFlags::PUBLIC | RuleFlags::FORCE_TOKEN | RuleFlags::KEYWORD,
            type_name: None,
            expr: Some(lit),
        };
        let grammar = builder.finish(vec![rule]);
        let rule = &grammar.rules[0];
        assert!(is_token_rule(&grammar, rule));
        assert!(is_static_token_rule(&grammar, rule));
    }

    #[test]
    fn choice_of_refs_is_variant() {
        let mut builder = GrammarBuilder::new();
        let a_ref = builder.push(ExprKind::Ref("A".to_string()), None);
        let b_ref = builder.push(ExprKind::Ref("B".to_string()), None);
        let choice = builder.push(ExprKind::Choice(vec![a_ref, b_ref]), None);
        let variant = Rule {
            name: "Expr".to_string(),
            flags: RuleFlags::PUBLIC,
            type_name: None,
            expr: Some(choice),
        };
        let a = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: None };
        let b = Rule { name: "B".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: None };
        let grammar = builder.finish(vec![variant, a, b]);
        let rule = &grammar.rules[0];
        assert!(is_variant_rule(&grammar, rule));
        assert!(is_parse_rule(&grammar, rule));
    }

    #[test]
    fn private_force_token_rule_is_fragment() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let rule = Rule { name: "frag".to_string(), flags: RuleFlags::FORCE_TOKEN, type_name: None, expr: Some(lit) };
        let grammar = builder.finish(vec![rule]);
        let rule = &grammar.rules[0];
        assert!(is_fragment(&grammar, rule));
        assert!(!is_token_rule(&grammar, rule));
    }

    #[test]
    fn skip_rule_is_token_but_not_fragment() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit(" ".to_string()), None);
        let rule = Rule {
            name: "skip".to_string(),
            flags: RuleFlags::FORCE_TOKEN | RuleFlags::SKIP,
            type_name: None,
            expr: Some(lit),
        };
        let grammar = builder.finish(vec![rule]);
        let rule = &grammar.rules[0];
        assert!(is_token_rule(&grammar, rule));
        assert!(!is_fragment(&grammar, rule));
    }

    #[test]
    fn private_non_token_rule_is_fragment() {
        let mut builder = GrammarBuilder::new();
        let a_ref = builder.push(ExprKind::Ref("A".to_string()), None);
        let seq = builder.push(ExprKind::Seq(vec![a_ref]), None);
        let frag = Rule { name: "helper".to_string(), flags: RuleFlags::empty(), type_name: None, expr: Some(seq) };
        let a = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: None };
        let grammar = builder.finish(vec![frag, a]);
        let rule = &grammar.rules[0];
        assert!(is_fragment(&grammar, rule));
        assert!(!is_parse_rule(&grammar, rule));
        assert!(!is_token_rule(&grammar, rule));
    }
}
