//! magelang is a grammar-to-parser toolchain: it takes a grammar built from
//! a small set of expression primitives (literals, character sets,
//! references, sequencing, choice, repetition, separated lists, lookahead,
//! and hiding), normalizes it through an ordered series of transforms, infers
//! a typed concrete-syntax-tree specification from the result, and
//! synthesizes a parser for it.
//!
//! # Pipeline
//!
//! ```text
//! Grammar -> transforms::* -> Grammar (normalized)
//!         -> treespec::build_specs -> Specs
//!         -> synth::synthesize -> Program
//!         -> synth::run (interpreter) -> Value
//! ```
//!
//! [`eval::accepts`] is a second, independent way to decide whether a
//! normalized grammar's rule accepts a string — a deliberately naive
//! backtracking matcher kept around as ground truth. [`fuzz`] drives both
//! paths with the same random sentences and reports any disagreement.
//!
//! A synthesized [`synth::Program`] is target-language-agnostic; rather than
//! emit source text for some particular target language, this crate runs it
//! directly with a tree-walking interpreter ([`synth::run`]). A textual
//! backend would consume the same `Program` the interpreter does.

pub mod analysis;
pub mod error;
pub mod eval;
pub mod fuzz;
pub mod grammar;
pub mod synth;
pub mod transforms;
pub mod treespec;

pub use error::{FuzzDisagreement, GrammarError, GrammarErrors, ImplementationError, InferenceError};
pub use eval::accepts;
pub use grammar::Grammar;
pub use synth::{Program, Value};
pub use treespec::Specs;

/// Runs the full normalization pipeline (every transform in `spec.md`'s
/// prescribed order) over `grammar`, returning the collected errors from
/// `check_undefined`/`check_charsets` if either finds any, and the
/// normalized grammar otherwise.
pub fn normalize(grammar: &Grammar) -> Result<Grammar, GrammarErrors> {
    let mut errors = transforms::check_undefined(grammar);
    errors.0.extend(transforms::check_charsets(grammar).0);
    if !errors.is_empty() {
        return Err(errors);
    }
    let g = transforms::extract_literals(grammar);
    let g = transforms::insert_magic_rules(&g);
    let g = transforms::insert_skip(&g);
    let g = transforms::hide_lookaheads(&g);
    let g = transforms::inline(&g);
    let g = transforms::flatten(&g);
    let g = transforms::distill(&g);
    let g = transforms::simplify(&g);
    let g = transforms::remove_hidden(&g);
    Ok(g)
}

/// Runs [`normalize`], then [`treespec::build_specs`] and
/// [`synth::synthesize`] over the result, bundling the three pipeline
/// outputs a caller typically wants together.
pub fn compile(grammar: &Grammar) -> Result<Compiled, CompileError> {
    let normalized = normalize(grammar).map_err(CompileError::Grammar)?;
    let specs = treespec::build_specs(&normalized);
    let program = synth::synthesize(&normalized).map_err(CompileError::Implementation)?;
    Ok(Compiled { grammar: normalized, specs, program })
}

pub struct Compiled {
    pub grammar: Grammar,
    pub specs: Specs,
    pub program: Program,
}

#[derive(Debug)]
pub enum CompileError {
    Grammar(GrammarErrors),
    Implementation(ImplementationError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Grammar(e) => write!(f, "{e}"),
            CompileError::Implementation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}
