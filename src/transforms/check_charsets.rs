//! Checks character-set literals for overlapping or degenerate ranges.

use crate::error::{GrammarError, GrammarErrors};
use crate::grammar::{CharSetElem, ExprId, ExprKind, Grammar};

/// Reports a [`GrammarError::OverlappingCharsetInterval`] for a character
/// set whose elements overlap each other (e.g. `[a-zA-Z a-z]` where `a-z` is
/// named twice) and a [`GrammarError::NegatedCharsetInterval`] for an
/// inverted set that is empty or whose ranges are inverted (`high < low`).
pub fn check_charsets(grammar: &Grammar) -> GrammarErrors {
    let mut errors = Vec::new();
    for rule in &grammar.rules {
        let Some(expr) = rule.expr else { continue };
        visit(grammar, expr, &rule.name, &mut errors);
    }
    GrammarErrors(errors)
}

fn visit(grammar: &Grammar, id: ExprId, rule_name: &str, errors: &mut Vec<GrammarError>) {
    match grammar.kind(id) {
        ExprKind::CharSet(cs) => {
            for elem in &cs.elements {
                if let CharSetElem::Range(low, high) = elem {
                    if high < low {
                        errors.push(GrammarError::NegatedCharsetInterval { rule: rule_name.to_string() });
                    }
                }
            }
            if cs.invert && cs.elements.is_empty() {
                errors.push(GrammarError::NegatedCharsetInterval { rule: rule_name.to_string() });
            }
            for i in 0..cs.elements.len() {
                for j in (i + 1)..cs.elements.len() {
                    if elems_overlap(&cs.elements[i], &cs.elements[j]) {
                        errors.push(GrammarError::OverlappingCharsetInterval { rule: rule_name.to_string() });
                    }
                }
            }
        }
        ExprKind::Lit(_) | ExprKind::Ref(_) => {}
        ExprKind::Seq(items) | ExprKind::Choice(items) => {
            for item in items {
                visit(grammar, *item, rule_name, errors);
            }
        }
        ExprKind::Repeat { expr, .. } | ExprKind::Lookahead { expr, .. } | ExprKind::Hide(expr) => {
            visit(grammar, *expr, rule_name, errors);
        }
        ExprKind::List { element, separator, .. } => {
            visit(grammar, *element, rule_name, errors);
            visit(grammar, *separator, rule_name, errors);
        }
    }
}

fn elems_overlap(a: &CharSetElem, b: &CharSetElem) -> bool {
    let (a_lo, a_hi) = span(a);
    let (b_lo, b_hi) = span(b);
    a_lo <= b_hi && b_lo <= a_hi
}

fn span(elem: &CharSetElem) -> (char, char) {
    match *elem {
        CharSetElem::Char(c) => (c, c),
        CharSetElem::Range(lo, hi) => (lo, hi),
    }
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{CharSet, GrammarBuilder, Rule, RuleFlags};

    #[test]
    fn detects_overlap() {
        let mut builder = GrammarBuilder::new();
        let cs = builder.push(
            ExprKind::CharSet(CharSet {
                elements: vec![CharSetElem::Range('a', 'z'), CharSetElem::Range('m', 'p')],
                case_insensitive: false,
                invert: false,
            }),
            None,
        );
        let rule = Rule { name: "Letter".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(cs) };
        let grammar = builder.finish(vec![rule]);
        let errors = check_charsets(&grammar);
        assert_eq!(errors.0.len(), 1);
    }

    #[test]
    fn accepts_disjoint_ranges() {
        let mut builder = GrammarBuilder::new();
        let cs = builder.push(
            ExprKind::CharSet(CharSet {
                elements: vec![CharSetElem::Range('a', 'z'), CharSetElem::Range('0', '9')],
                case_insensitive: false,
                invert: false,
            }),
            None,
        );
        let rule = Rule { name: "Ident".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(cs) };
        let grammar = builder.finish(vec![rule]);
        assert!(check_charsets(&grammar).is_empty());
    }
}
