//! Programmer-error signal, distinct from ordinary parse failure (§7).
//!
//! Parse failure is not an error type in this crate at all — it is the
//! `bool` returned by `Parser::run`, fully backtrackable. `GrammarError`
//! exists only for the two ways a grammar can be malformed before a parse
//! even starts: a `Rule` consulted with no body assigned, and indirect left
//! recursion (§9's resolved Open Question). Following the teacher's
//! `ParseError` (`parse_context.rs`), this is a hand-rolled enum with a
//! manual `Display`/`Error` impl — no `thiserror`/`anyhow` dependency.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A `Rule` was invoked but `set_body` was never called on it.
    UnassignedRule { name: String },

    /// Two distinct rules were found left-recursing into each other at the
    /// same position. This core only resolves *direct* left recursion
    /// (§4.2); indirect recursion is a grammar-construction error.
    IndirectLeftRecursion { seeding: String, reentered: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UnassignedRule { name } => {
                write!(f, "rule '{name}' was referenced but never given a body")
            }
            GrammarError::IndirectLeftRecursion { seeding, reentered } => write!(
                f,
                "indirect left recursion detected: rule '{seeding}' is seeding at this \
                 position and was re-entered through rule '{reentered}'; only direct \
                 left recursion (a rule recursing into itself) is supported"
            ),
        }
    }
}

impl std::error::Error for GrammarError {}
