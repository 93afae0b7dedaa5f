//! Crate-wide error type, one variant per failure kind this system defines.

use thiserror::Error;

/// All public fallible operations in this crate return `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// A `TransitionSystem` could not be constructed: an out-of-range index
    /// in `T`/`L`, an empty or out-of-range `init` set, or similar.
    #[error("invalid transition system: {0}")]
    InvalidTransitionSystem(String),

    /// A CTL formula could not be parsed. `position` is a byte offset into
    /// the input string at the first offending token.
    #[error("syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    /// A BDD variable name was used that the engine never declared.
    #[error("unknown BDD variable: {0}")]
    UnknownVariable(String),

    /// A requested variable order was not a permutation of `0..expected`.
    #[error("variable order must be a permutation of 0..{expected}")]
    BadPermutation { expected: usize },

    /// An internal invariant of the BDD engine was violated. Should never
    /// happen; indicates a bug in this crate rather than misuse by a caller.
    #[error("internal invariant violation: {0}")]
    Internal(String),
}
