//! Generates a `(sentence, expected_to_fail)` pair for an expression, biased
//! to usually produce a matching sentence and occasionally mutate it into one
//! that shouldn't match. Grounded on `fuzz.py`'s `random_sentence`.

use std::collections::HashMap;

use rand::Rng;

use crate::grammar::{ExprId, ExprKind, Grammar, UNBOUNDED};

use super::grammar_gen::random_char;

pub struct SentenceConfig {
    pub failure_rate: f64,
    pub max_recurse: usize,
    pub max_inf_repeat: usize,
    pub max_char_delta: i64,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.1,
            max_recurse: 3,
            max_inf_repeat: 10,
            max_char_delta: 5,
        }
    }
}

struct Generator<'g, 'c, R> {
    grammar: &'g Grammar,
    config: &'c SentenceConfig,
    rng: &'c mut R,
    fails: bool,
    visits: HashMap<String, usize>,
}

/// Generates a candidate sentence for `expr`, plus whether it was
/// deliberately perturbed away from what `expr` accepts.
pub fn random_sentence(grammar: &Grammar, expr: ExprId, rng: &mut impl Rng, config: &SentenceConfig) -> (String, bool) {
    let mut gen = Generator { grammar, config, rng, fails: false, visits: HashMap::new() };
    let text = gen.visit(expr);
    (text, gen.fails)
}

impl<'g, 'c, R: Rng> Generator<'g, 'c, R> {
    fn visit(&mut self, id: ExprId) -> String {
        match self.grammar.kind(id).clone() {
            ExprKind::Lit(text) => self.visit_lit(&text),
            ExprKind::CharSet(cs) => {
                if self.rng.gen::<f64>() < self.config.failure_rate {
                    self.fails = true;
                    random_char(self.rng).to_string()
                } else {
                    pick_matching_char(&cs, self.rng).map(|c| c.to_string()).unwrap_or_else(|| {
                        self.fails = true;
                        random_char(self.rng).to_string()
                    })
                }
            }
            ExprKind::Ref(name) => {
                let n = *self.visits.get(&name).unwrap_or(&0);
                if n >= self.config.max_recurse {
                    return String::new();
                }
                self.visits.insert(name.clone(), n + 1);
                match self.grammar.lookup(&name).and_then(|r| r.expr) {
                    Some(target) => self.visit(target),
                    None => String::new(),
                }
            }
            ExprKind::Hide(expr) => self.visit(expr),
            ExprKind::Lookahead { .. } => String::new(),
            ExprKind::Seq(items) => items.iter().map(|id| self.visit(*id)).collect(),
            ExprKind::Choice(items) => {
                let pick = items[self.rng.gen_range(0..items.len())];
                self.visit(pick)
            }
            ExprKind::Repeat { expr, min, max } => {
                let count = if max == UNBOUNDED {
                    min + self.rng.gen_range(0..self.config.max_inf_repeat.max(1))
                } else if max > min {
                    self.rng.gen_range(min..max)
                } else {
                    min
                };
                (0..count).map(|_| self.visit(expr)).collect()
            }
            ExprKind::List { element, separator, min_count } => {
                let count = min_count + self.rng.gen_range(0..self.config.max_inf_repeat.max(1));
                let mut out = String::new();
                for i in 0..count {
                    if i != 0 {
                        out.push_str(&self.visit(separator));
                    }
                    out.push_str(&self.visit(element));
                }
                out
            }
        }
    }

    fn visit_lit(&mut self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() || self.rng.gen::<f64>() >= self.config.failure_rate {
            return text.to_string();
        }
        self.fails = true;
        let k = self.rng.gen_range(0..chars.len());
        let n = self.rng.gen_range(0..chars.len() - k);
        let left = self.rng.gen_range(-self.config.max_char_delta..self.config.max_char_delta);
        let right = self.rng.gen_range(-self.config.max_char_delta..self.config.max_char_delta);
        let mut out = String::new();
        for _ in 0..(left + self.config.max_char_delta) {
            out.push(random_char(self.rng));
        }
        for i in 0..n {
            if self.rng.gen_bool(0.5) {
                out.push(random_char(self.rng));
            } else {
                out.push(chars[i + k]);
            }
        }
        for _ in 0..(right + self.config.max_char_delta) {
            out.push(random_char(self.rng));
        }
        out
    }
}

fn pick_matching_char(cs: &crate::grammar::CharSet, rng: &mut impl Rng) -> Option<char> {
    // `CharSet::matches` already applies `invert`, so a direct rejection
    // sample over the printable ASCII range is both simpler and faithful to
    // `matches`'s own semantics (unlike the source's closed-form table, which
    // assumes non-inverted element lists).
    let candidates: Vec<char> = (0x20u32..=0x7e).filter_map(char::from_u32).filter(|c| cs.matches(*c)).collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}
