//! The parser synthesizer: lowers a normalized grammar into an abstract
//! [`Program`] ([`codegen`]) and, since emitting a concrete target
//! language's source text is out of scope here, runs that program directly
//! with a tree-walking interpreter ([`interp`]) instead of handing it to a
//! textual backend.

mod codegen;
mod interp;
mod program;

pub use codegen::synthesize;
pub use interp::{run, Interpreter, ParseFailure, Value};
pub use program::{ParseExpr, ParseRule, Program, RuleKind, SeqField};
