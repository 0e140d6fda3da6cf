//! Error types for each stage of the pipeline.
//!
//! Each stage gets its own `Display`-implementing type rather than a single
//! crate-wide error enum, mirroring how a hand-rolled parser library keeps
//! `ProductionError` and `ParseError` distinct from one another.

use std::fmt::{self, Display, Formatter};

/// A diagnostic raised while checking or normalizing a [`Grammar`](crate::grammar::Grammar).
///
/// Grammar errors are collected rather than raised on first occurrence: a run
/// reports every undefined reference or charset misuse it finds before
/// bailing out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    UndefinedRef { rule: String, name: String },
    OverlappingCharsetInterval { rule: String },
    NegatedCharsetInterval { rule: String },
    FragmentAtTokenPosition { rule: String },
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UndefinedRef { rule, name } => {
                write!(f, "rule '{rule}' references undefined rule '{name}'")
            }
            GrammarError::OverlappingCharsetInterval { rule } => {
                write!(f, "rule '{rule}' has an overlapping character set interval")
            }
            GrammarError::NegatedCharsetInterval { rule } => {
                write!(f, "rule '{rule}' has an invalid negated character set interval")
            }
            GrammarError::FragmentAtTokenPosition { rule } => {
                write!(f, "rule '{rule}' is a fragment used at token position")
            }
        }
    }
}

/// A collected list of [`GrammarError`]s, returned by the `check-*` transforms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarErrors(pub Vec<GrammarError>);

impl GrammarErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for GrammarErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GrammarErrors {}

/// Raised by treespec inference when a rule's expression cannot be assigned a
/// type, e.g. an unresolved reference surviving past grammar checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceError {
    pub rule: String,
    pub message: String,
}

impl Display for InferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "cannot infer type for rule '{}': {}", self.rule, self.message)
    }
}

impl std::error::Error for InferenceError {}

/// A codegen invariant violation: the kind of error that indicates a bug in
/// this crate rather than a problem with the user's grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationError {
    what: String,
    message: String,
}

impl ImplementationError {
    pub fn new(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            message: message.into(),
        }
    }
}

impl Display for ImplementationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ImplementationError: {}: {}", self.what, self.message)
    }
}

impl std::error::Error for ImplementationError {}

/// A single disagreement observed by the fuzzer between the reference
/// evaluator and the synthesized parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzDisagreement {
    pub rule: String,
    pub sentence: String,
    pub seed: u64,
    pub expected_accept: bool,
}

impl Display for FuzzDisagreement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let verb = if self.expected_accept {
            "parser returned failure where success was expected"
        } else {
            "parser returned success where failure was expected"
        };
        write!(
            f,
            "on sentence {:?} and rule '{}' with seed {}: {}",
            self.sentence, self.rule, self.seed, verb
        )
    }
}

impl std::error::Error for FuzzDisagreement {}
