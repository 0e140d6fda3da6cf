//! Inserts the two "magic" rules a generated parser always needs: a `skip`
//! rule consulted between tokens, and (if the grammar does not already
//! define one) threading it through every sequence and list so whitespace
//! and comments are consumed automatically between elements.

use crate::grammar::{ExprId, ExprKind, Grammar, GrammarBuilder, Rule, RuleFlags};

use super::rewrite_grammar;

/// Name of the magic skip rule, matched by convention rather than
/// configuration — a grammar that already declares `skip` opts into
/// controlling its own whitespace handling and `insert_skip` leaves it alone.
pub const SKIP_RULE_NAME: &str = "skip";

/// Ensures a `skip` rule exists. If the grammar already declares one (public
/// or not) it is left untouched; otherwise a default rule matching one or
/// more ASCII whitespace characters is appended.
pub fn insert_magic_rules(grammar: &Grammar) -> Grammar {
    if grammar.lookup(SKIP_RULE_NAME).is_some() {
        return grammar.clone();
    }
    let mut builder = GrammarBuilder::new();
    let mut new_rules: Vec<Rule> = Vec::new();
    for rule in &grammar.rules {
        let rebuilt = rule.expr.map(|id| {
            let mut identity = |_b: &mut GrammarBuilder, kind: ExprKind, label: Option<String>| (kind, label);
            super::rewrite_expr(grammar, &mut builder, id, &mut identity)
        });
        new_rules.push(Rule {
            name: rule.name.clone(),
            flags: rule.flags,
            type_name: rule.type_name.clone(),
            expr: rebuilt,
        });
    }
    let whitespace = builder.push(
        ExprKind::CharSet(crate::grammar::CharSet {
            elements: vec![
                crate::grammar::CharSetElem::Char(' '),
                crate::grammar::CharSetElem::Char('\t'),
                crate::grammar::CharSetElem::Char('\n'),
                crate::grammar::CharSetElem::Char('\r'),
            ],
            case_insensitive: false,
            invert: false,
        }),
        None,
    );
    let repeated = builder.push(
        ExprKind::Repeat { expr: whitespace, min: 0, max: crate::grammar::UNBOUNDED },
        None,
    );
    new_rules.push(Rule {
        name: SKIP_RULE_NAME.to_string(),
        flags: RuleFlags::FORCE_TOKEN | RuleFlags::SKIP,
        type_name: None,
        expr: Some(repeated),
    });
    builder.finish(new_rules)
}

/// Wraps every element of a `Seq` (other than the first) and every separator
/// slot of a `List` in an implicit `Hide(Ref(skip))` prefix, so the
/// synthesizer threads skip-consumption between sequence and list elements
/// without every grammar author having to write it by hand.
pub fn insert_skip(grammar: &Grammar) -> Grammar {
    if grammar.lookup(SKIP_RULE_NAME).is_none() {
        return grammar.clone();
    }
    rewrite_grammar(grammar, |builder, kind, label| match kind {
        ExprKind::Seq(items) if items.len() > 1 => {
            let mut with_skip = Vec::with_capacity(items.len() * 2 - 1);
            for (i, item) in items.into_iter().enumerate() {
                if i != 0 {
                    with_skip.push(skip_ref(builder));
                }
                with_skip.push(item);
            }
            (ExprKind::Seq(with_skip), label)
        }
        ExprKind::List { element, separator, min_count } => {
            let sep_with_skip_before = skip_ref(builder);
            let sep_seq = builder.push(ExprKind::Seq(vec![sep_with_skip_before, separator]), None);
            let hidden_sep = builder.push(ExprKind::Hide(sep_seq), None);
            (ExprKind::List { element, separator: hidden_sep, min_count }, label)
        }
        other => (other, label),
    })
}

fn skip_ref(builder: &mut GrammarBuilder) -> ExprId {
    let r = builder.push(ExprKind::Ref(SKIP_RULE_NAME.to_string()), None);
    builder.push(ExprKind::Hide(r), None)
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::ExprKind;

    #[test]
    fn adds_default_skip_rule_when_absent() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let rule = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(lit) };
        let grammar = builder.finish(vec![rule]);

        let out = insert_magic_rules(&grammar);
        assert!(out.lookup(SKIP_RULE_NAME).is_some());
    }

    #[test]
    fn leaves_existing_skip_rule_alone() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit(" ".to_string()), None);
        let skip = Rule { name: SKIP_RULE_NAME.to_string(), flags: RuleFlags::FORCE_TOKEN, type_name: None, expr: Some(lit) };
        let grammar = builder.finish(vec![skip]);

        let out = insert_magic_rules(&grammar);
        assert_eq!(out.rules.len(), 1);
    }
}
