//! Oracle-comparison fuzzing: generate a random grammar, generate candidate
//! sentences for each public rule, and check that [`crate::eval::accepts`]
//! (the reference evaluator) agrees with the synthesized parser run through
//! [`crate::synth::interp`] on every one of them.
//!
//! Grounded on `fuzz.py`'s `fuzz_grammar`: same seeded-per-sentence
//! reproducibility (`sentence_seed = seed + n`), same divergence handling
//! (skip sentences the evaluator can't decide), same disagreement shape.

mod grammar_gen;
mod sentence;

pub use grammar_gen::{random_expr, random_grammar, random_name, RandomExprConfig};
pub use sentence::{random_sentence, SentenceConfig};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FuzzDisagreement;
use crate::eval::accepts;
use crate::grammar::Grammar;
use crate::synth;

pub struct FuzzConfig {
    pub min_sentences_per_rule: usize,
    pub max_sentences_per_rule: usize,
    pub break_on_failure: bool,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            min_sentences_per_rule: 10,
            max_sentences_per_rule: 100,
            break_on_failure: false,
        }
    }
}

pub struct FuzzReport {
    pub succeeded: usize,
    pub disagreements: Vec<FuzzDisagreement>,
}

/// Fuzzes every public rule of `grammar`, comparing the reference evaluator
/// against the interpreted synthesized parser for `seed`-reproducible random
/// sentences. Stops at the first disagreement when `config.break_on_failure`
/// is set; otherwise collects every disagreement found.
pub fn fuzz_grammar(grammar: &Grammar, seed: u64, config: &FuzzConfig) -> Result<FuzzReport, ImplementationFailure> {
    let program = synth::synthesize(grammar).map_err(ImplementationFailure::Codegen)?;
    let sentence_config = SentenceConfig::default();
    let mut succeeded = 0usize;
    let mut disagreements = Vec::new();
    let mut n: u64 = 0;

    for rule in &grammar.rules {
        if !rule.is_public() {
            continue;
        }
        let Some(expr) = rule.expr else { continue };
        let mut seed_rng = StdRng::seed_from_u64(seed.wrapping_add(n));
        let count = seed_rng.gen_range(config.min_sentences_per_rule..config.max_sentences_per_rule);
        for _ in 0..count {
            let sentence_seed = seed.wrapping_add(n);
            n += 1;
            let mut rng = StdRng::seed_from_u64(sentence_seed);
            let (sentence, fails) = random_sentence(grammar, expr, &mut rng, &sentence_config);

            let Some(valid) = accepts(grammar, &rule.name, &sentence) else {
                // Divergent grammar (generated example was left-recursive);
                // the source skips these rather than failing the run.
                continue;
            };
            if (!fails && !valid) || (fails && valid) {
                continue;
            }

            let parsed = synth::run(&program, &rule.name, &sentence);
            let parser_succeeded = parsed.is_ok();
            if parser_succeeded == fails {
                let disagreement = FuzzDisagreement {
                    rule: rule.name.clone(),
                    sentence: sentence.clone(),
                    seed: sentence_seed,
                    expected_accept: !fails,
                };
                if config.break_on_failure {
                    return Ok(FuzzReport { succeeded, disagreements: vec![disagreement] });
                }
                disagreements.push(disagreement);
            } else {
                succeeded += 1;
            }
        }
    }

    Ok(FuzzReport { succeeded, disagreements })
}

#[derive(Debug)]
pub enum ImplementationFailure {
    Codegen(crate::error::ImplementationError),
}

impl std::fmt::Display for ImplementationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImplementationFailure::Codegen(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ImplementationFailure {}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{ExprKind, GrammarBuilder, Rule, RuleFlags};

    #[test]
    fn literal_rule_has_no_disagreements() {
        let mut builder = GrammarBuilder::new();
        let lit = builder.push(ExprKind::Lit("ok".to_string()), None);
        let rule = Rule { name: "Ok".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(lit) };
        let grammar = builder.finish(vec![rule]);

        let config = FuzzConfig { min_sentences_per_rule: 5, max_sentences_per_rule: 10, break_on_failure: false };
        let report = fuzz_grammar(&grammar, 42, &config).unwrap();
        assert!(report.disagreements.is_empty(), "unexpected disagreements: {:?}", report.disagreements);
    }

    #[test]
    fn charset_repeat_rule_has_no_disagreements() {
        let mut builder = GrammarBuilder::new();
        let cs = builder.push(
            crate::grammar::ExprKind::CharSet(crate::grammar::CharSet {
                elements: vec![crate::grammar::CharSetElem::Range('0', '9')],
                case_insensitive: false,
                invert: false,
            }),
            None,
        );
        let rep = builder.push(ExprKind::Repeat { expr: cs, min: 1, max: crate::grammar::UNBOUNDED }, None);
        let rule = Rule { name: "Digits".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(rep) };
        let grammar = builder.finish(vec![rule]);

        let config = FuzzConfig { min_sentences_per_rule: 10, max_sentences_per_rule: 20, break_on_failure: false };
        let report = fuzz_grammar(&grammar, 7, &config).unwrap();
        assert!(report.disagreements.is_empty(), "unexpected disagreements: {:?}", report.disagreements);
    }
}
