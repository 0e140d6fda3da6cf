//! Random grammar and random-expression generation, used to drive
//! [`super::fuzz_grammar`] against an endless supply of grammars rather than
//! a fixed hand-written test suite.
//!
//! Grounded on `fuzz.py`'s `random_grammar`/`random_expr`/`random_name`: the
//! same seven-way constructor choice, the same ASCII-range random character
//! picker, and the same identifier-shaped name generator.

use rand::Rng;

use crate::grammar::{CharSet, CharSetElem, ExprId, ExprKind, Grammar, GrammarBuilder, Rule, RuleFlags, UNBOUNDED};

const ASCII_MIN: u32 = 0x20;
const ASCII_MAX: u32 = 0x7e;

/// Caps recursive expression depth. The source relies on the seven-way
/// choice's terminal branches (literal, charset, ref) being likely enough
/// that `generate()` almost surely terminates; we additionally force a
/// terminal branch past this depth so a pathological run of bad luck can't
/// blow the stack.
const MAX_EXPR_DEPTH: usize = 24;

pub fn random_char(rng: &mut impl Rng) -> char {
    char::from_u32(rng.gen_range(ASCII_MIN..=ASCII_MAX)).unwrap()
}

pub fn random_name(rng: &mut impl Rng) -> String {
    const START: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const PART: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let n = rng.gen_range(2..10);
    let mut out = String::new();
    out.push(START[rng.gen_range(0..START.len())] as char);
    for _ in 0..n - 1 {
        out.push(PART[rng.gen_range(0..PART.len())] as char);
    }
    out
}

pub struct RandomExprConfig {
    pub max_choices: usize,
    pub max_repeat_min: usize,
    pub max_lit_chars: usize,
    pub max_repeat_min_max: usize,
    pub max_charset_elements: usize,
}

impl Default for RandomExprConfig {
    fn default() -> Self {
        Self {
            max_choices: 2,
            max_repeat_min: 5,
            max_lit_chars: 10,
            max_repeat_min_max: 5,
            max_charset_elements: 20,
        }
    }
}

pub fn random_expr(
    builder: &mut GrammarBuilder,
    rng: &mut impl Rng,
    rule_names: &[String],
    config: &RandomExprConfig,
) -> ExprId {
    generate(builder, rng, rule_names, config, 0)
}

fn generate(
    builder: &mut GrammarBuilder,
    rng: &mut impl Rng,
    rule_names: &[String],
    config: &RandomExprConfig,
    depth: usize,
) -> ExprId {
    let n = if depth >= MAX_EXPR_DEPTH {
        [0usize, 4, 6][rng.gen_range(0..3)]
    } else {
        rng.gen_range(0..7)
    };
    match n {
        0 => {
            let count = rng.gen_range(0..config.max_lit_chars.max(1));
            let text: String = (0..count).map(|_| random_char(rng)).collect();
            builder.push(ExprKind::Lit(text), None)
        }
        1 => {
            let count = rng.gen_range(1..config.max_choices.max(2));
            let elements = (0..count).map(|_| generate(builder, rng, rule_names, config, depth + 1)).collect();
            builder.push(ExprKind::Choice(elements), None)
        }
        2 => {
            let count = rng.gen_range(1..config.max_choices.max(2));
            let elements = (0..count).map(|_| generate(builder, rng, rule_names, config, depth + 1)).collect();
            builder.push(ExprKind::Seq(elements), None)
        }
        3 => {
            let min = rng.gen_range(0..config.max_repeat_min.max(1));
            let d = rng.gen_range(0..=config.max_repeat_min_max);
            let max = if d == config.max_repeat_min_max { UNBOUNDED } else { min + d };
            let expr = generate(builder, rng, rule_names, config, depth + 1);
            builder.push(ExprKind::Repeat { expr, min, max }, None)
        }
        4 => {
            let case_insensitive = rng.gen_bool(0.5);
            let invert = rng.gen_bool(0.5);
            let count = rng.gen_range(0..config.max_charset_elements.max(1));
            let mut elements = Vec::with_capacity(count);
            for _ in 0..count {
                let l = rng.gen_range(ASCII_MIN..ASCII_MAX);
                let h = rng.gen_range(l..ASCII_MAX);
                elements.push(CharSetElem::Range(char::from_u32(l).unwrap(), char::from_u32(h).unwrap()));
            }
            builder.push(ExprKind::CharSet(CharSet { elements, case_insensitive, invert }), None)
        }
        5 => {
            let inner = generate(builder, rng, rule_names, config, depth + 1);
            builder.push(ExprKind::Hide(inner), None)
        }
        6 => {
            let name = rule_names[rng.gen_range(0..rule_names.len())].clone();
            builder.push(ExprKind::Ref(name), None)
        }
        _ => unreachable!(),
    }
}

pub fn random_grammar(rng: &mut impl Rng, min_rules: usize, max_rules: usize) -> Grammar {
    let n = if max_rules > min_rules { rng.gen_range(min_rules..max_rules) } else { min_rules };
    let rule_names: Vec<String> = (0..n).map(|_| random_name(rng)).collect();
    let config = RandomExprConfig::default();
    let mut builder = GrammarBuilder::new();
    let mut rules = Vec::with_capacity(n);
    for name in &rule_names {
        let expr = if rule_names.is_empty() {
            None
        } else {
            Some(random_expr(&mut builder, rng, &rule_names, &config))
        };
        rules.push(Rule { name: name.clone(), flags: RuleFlags::PUBLIC, type_name: None, expr });
    }
    builder.finish(rules)
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_grammar_produces_requested_rule_count_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let grammar = random_grammar(&mut rng, 3, 6);
        assert!(grammar.rules.len() >= 3 && grammar.rules.len() < 6);
        for rule in &grammar.rules {
            assert!(rule.is_public());
            assert!(rule.expr.is_some());
        }
    }

    #[test]
    fn random_name_is_identifier_shaped() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let name = random_name(&mut rng);
            assert!(name.chars().next().unwrap().is_ascii_alphabetic());
            assert!(name.len() >= 2 && name.len() < 10);
        }
    }
}
