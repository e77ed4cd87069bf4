//! Error types for token library construction and lookup.

use thiserror::Error;

/// Errors raised while building or querying a [`Library`](crate::Library).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// A token name was referenced that the library does not contain.
    #[error("token {0:?} is not in the library")]
    TokenNotFound(String),

    /// Two tokens were registered under the same name.
    #[error("duplicate token {0:?}")]
    DuplicateToken(String),

    /// Only terminals, unary and binary tokens are supported.
    #[error("token {name:?} has unsupported arity {arity}")]
    InvalidArity { name: String, arity: usize },

    /// Input variables must be terminals.
    #[error("input token {0:?} must have arity 0")]
    InputNotTerminal(String),
}
