//! The reference evaluator: a small, deliberately naive backtracking
//! matcher used as the ground truth the fuzzer checks the synthesized
//! parser against. It is not meant to be fast — it exists to be obviously
//! correct, the way a hand-written interpreter doubles as a spec for a
//! compiled implementation.

use std::collections::{HashMap, HashSet};

use crate::grammar::{ExprId, ExprKind, Grammar};

/// Default bound on how many times a single `(rule, position)` pair may
/// recur on the current call stack before the evaluator gives up and
/// reports divergence. Three recurrences is enough to distinguish "this
/// grammar is left-recursive and will never terminate" from the normal
/// depth of a few nested non-left-recursive calls.
pub const DEFAULT_RECURSION_BOUND: usize = 3;

struct Evaluator<'g> {
    grammar: &'g Grammar,
    chars: Vec<char>,
    bound: usize,
    stack: Vec<(String, usize)>,
    memo: HashMap<(String, usize), Option<HashSet<usize>>>,
}

/// Checks whether `rule_name` accepts `text` in its entirety.
///
/// Returns:
/// - `Some(true)` if some derivation of the rule consumes all of `text`.
/// - `Some(false)` if every derivation fails or under-consumes.
/// - `None` if evaluating the rule diverges (left recursion beyond the
///   configured bound) before an answer can be determined.
pub fn accepts(grammar: &Grammar, rule_name: &str, text: &str) -> Option<bool> {
    accepts_with_bound(grammar, rule_name, text, DEFAULT_RECURSION_BOUND)
}

pub fn accepts_with_bound(
    grammar: &Grammar,
    rule_name: &str,
    text: &str,
    bound: usize,
) -> Option<bool> {
    let mut eval = Evaluator {
        grammar,
        chars: text.chars().collect(),
        bound,
        stack: Vec::new(),
        memo: HashMap::new(),
    };
    let len = eval.chars.len();
    let ends = eval.eval_rule(rule_name, 0)?;
    Some(ends.contains(&len))
}

impl<'g> Evaluator<'g> {
    /// Evaluates a rule reference at `pos`, returning the set of positions
    /// reachable after consuming it. `None` signals divergence.
    fn eval_rule(&mut self, name: &str, pos: usize) -> Option<HashSet<usize>> {
        let key = (name.to_string(), pos);
        if let Some(cached) = self.memo.get(&key) {
            return cached.clone();
        }
        let recurrences = self.stack.iter().filter(|entry| **entry == key).count();
        if recurrences >= self.bound {
            return None;
        }
        let Some(rule) = self.grammar.lookup(name) else {
            return Some(HashSet::new());
        };
        let Some(expr) = rule.expr else {
            // Extern rules with no body are treated as opaque; the reference
            // evaluator cannot judge them and reports no derivation.
            return Some(HashSet::new());
        };
        self.stack.push(key.clone());
        let result = self.eval_expr(expr, pos);
        self.stack.pop();
        if let Some(set) = &result {
            self.memo.insert(key, Some(set.clone()));
        }
        result
    }

    fn eval_expr(&mut self, id: ExprId, pos: usize) -> Option<HashSet<usize>> {
        match self.grammar.kind(id).clone() {
            ExprKind::Lit(text) => {
                let chars: Vec<char> = text.chars().collect();
                let end = pos + chars.len();
                if end <= self.chars.len() && self.chars[pos..end] == chars[..] {
                    Some(HashSet::from([end]))
                } else {
                    Some(HashSet::new())
                }
            }
            ExprKind::CharSet(cs) => {
                if pos < self.chars.len() && cs.matches(self.chars[pos]) {
                    Some(HashSet::from([pos + 1]))
                } else {
                    Some(HashSet::new())
                }
            }
            ExprKind::Ref(name) => self.eval_rule(&name, pos),
            ExprKind::Seq(items) => self.eval_seq(&items, pos),
            ExprKind::Choice(items) => {
                let mut out = HashSet::new();
                let mut any_converged = false;
                for item in items {
                    if let Some(set) = self.eval_expr(item, pos) {
                        any_converged = true;
                        out.extend(set);
                    }
                }
                if any_converged { Some(out) } else { None }
            }
            ExprKind::Repeat { expr, min, max } => self.eval_repeat(expr, min, max, pos),
            ExprKind::List { element, separator, min_count } => {
                self.eval_list(element, separator, min_count, pos)
            }
            ExprKind::Lookahead { expr, negated } => {
                let matched = !self.eval_expr(expr, pos)?.is_empty();
                if matched != negated {
                    Some(HashSet::from([pos]))
                } else {
                    Some(HashSet::new())
                }
            }
            ExprKind::Hide(expr) => self.eval_expr(expr, pos),
        }
    }

    fn eval_seq(&mut self, items: &[ExprId], pos: usize) -> Option<HashSet<usize>> {
        let mut frontier = HashSet::from([pos]);
        for item in items {
            let mut next = HashSet::new();
            let mut any_converged = false;
            for p in frontier {
                if let Some(set) = self.eval_expr(*item, p) {
                    any_converged = true;
                    next.extend(set);
                }
            }
            if !any_converged {
                return None;
            }
            frontier = next;
            if frontier.is_empty() {
                break;
            }
        }
        Some(frontier)
    }

    fn eval_repeat(&mut self, expr: ExprId, min: usize, max: usize, pos: usize) -> Option<HashSet<usize>> {
        let mut reachable_by_count: Vec<HashSet<usize>> = vec![HashSet::from([pos])];
        let mut frontier = HashSet::from([pos]);
        let mut count = 0;
        while count < max && !frontier.is_empty() {
            let mut next = HashSet::new();
            for p in &frontier {
                next.extend(self.eval_expr(expr, *p)?);
            }
            // Guard against a sub-expression that matches the empty string,
            // which would otherwise make the repeat loop forever.
            next.retain(|p| !frontier.contains(p));
            if next.is_empty() {
                break;
            }
            count += 1;
            reachable_by_count.push(next.clone());
            frontier = next;
        }
        let mut out = HashSet::new();
        for set in reachable_by_count.iter().skip(min) {
            out.extend(set.iter().copied());
        }
        Some(out)
    }

    fn eval_list(
        &mut self,
        element: ExprId,
        separator: ExprId,
        min_count: usize,
        pos: usize,
    ) -> Option<HashSet<usize>> {
        // A list is `element (separator element)*` with at least
        // `min_count` elements; `reachable_by_count[k]` is the set of
        // positions reachable after parsing exactly `k` elements. Positions
        // are bounded by the text length, so capping the element count at
        // `len + 1` is enough to guarantee termination even if `element`
        // can match the empty string.
        let max_count = self.chars.len() + 1;
        let mut reachable_by_count: Vec<HashSet<usize>> = vec![HashSet::from([pos])];
        for k in 1..=max_count {
            let bases = reachable_by_count[k - 1].clone();
            let candidates = if k == 1 {
                bases
            } else {
                let mut after_sep = HashSet::new();
                for p in &bases {
                    after_sep.extend(self.eval_expr(separator, *p)?);
                }
                after_sep
            };
            let mut after_elem = HashSet::new();
            for p in &candidates {
                after_elem.extend(self.eval_expr(element, *p)?);
            }
            if after_elem.is_empty() {
                break;
            }
            reachable_by_count.push(after_elem);
        }
        let mut out = HashSet::new();
        for set in reachable_by_count.iter().skip(min_count) {
            out.extend(set.iter().copied());
        }
        Some(out)
    }
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{CharSet, CharSetElem, ExprKind, GrammarBuilder, Rule, RuleFlags, UNBOUNDED};

    #[test]
    fn literal_rule_accepts_exact_text() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("if".to_string()), None);
        let rule = Rule { name: "Kw".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(lit) };
        let grammar = builder.finish(vec![rule]);

        assert_eq!(accepts(&grammar, "Kw", "if"), Some(true));
        assert_eq!(accepts(&grammar, "Kw", "ifx"), Some(false));
        assert_eq!(accepts(&grammar, "Kw", "i"), Some(false));
    }

    #[test]
    fn digit_plus_rule_accepts_digit_sequences() {
        let mut builder = GrammarBuilder::new();
        let digit = builder.push(
            ExprKind::CharSet(CharSet { elements: vec![CharSetElem::Range('0', '9')], case_insensitive: false, invert: false }),
            None,
        );
        let rep = builder.push(ExprKind::Repeat { expr: digit, min: 1, max: UNBOUNDED }, None);
        let rule = Rule { name: "Digit".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(rep) };
        let grammar = builder.finish(vec![rule]);

        assert_eq!(accepts(&grammar, "Digit", "7"), Some(true));
        assert_eq!(accepts(&grammar, "Digit", "1234"), Some(true));
        assert_eq!(accepts(&grammar, "Digit", ""), Some(false));
        assert_eq!(accepts(&grammar, "Digit", "12a"), Some(false));
    }

    #[test]
    fn left_recursive_branch_does_not_suppress_sibling_acceptance() {
        // `A = A | 'x'` is left-recursive through its first branch, but the
        // second branch accepts "x" on its own; the recursive branch's
        // divergence must not poison a sibling derivation that actually
        // reaches an answer.
        let mut builder = GrammarBuilder::new();
        let self_ref = builder.push(ExprKind::Ref("A".to_string()), None);
        let lit = builder.push(ExprKind::Lit("x".to_string()), None);
        let choice = builder.push(ExprKind::Choice(vec![self_ref, lit]), None);
        let rule = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(choice) };
        let grammar = builder.finish(vec![rule]);

        assert_eq!(accepts(&grammar, "A", "x"), Some(true));
    }

    #[test]
    fn pure_left_recursion_with_no_base_case_diverges() {
        // `A = A` has no non-recursive branch at all, so every derivation
        // recurs without ever bottoming out; this must still report `None`.
        let mut builder = GrammarBuilder::new();
        let self_ref = builder.push(ExprKind::Ref("A".to_string()), None);
        let rule = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(self_ref) };
        let grammar = builder.finish(vec![rule]);

        assert_eq!(accepts(&grammar, "A", "x"), None);
    }
}
