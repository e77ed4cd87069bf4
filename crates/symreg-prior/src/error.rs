//! Error types for prior construction.

use symreg_core::LibraryError;
use thiserror::Error;

/// Errors raised while configuring or assembling priors.
///
/// Per-step evaluation never fails; everything here surfaces at build time.
#[derive(Debug, Error)]
pub enum PriorError {
    /// The configuration names a rule the registry does not know.
    #[error("unrecognized prior type: {0}")]
    UnknownRule(String),

    /// Rule parameters are malformed or contradictory.
    #[error("invalid parameters for {rule}: {reason}")]
    InvalidParameters { rule: String, reason: String },

    /// The requested behavior has no defined semantics yet.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A file or collaborator the rule depends on is unavailable.
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// The rule references tokens the library cannot resolve.
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// A prior was built against a different library than the joint prior.
    #[error("all priors must share the joint prior's library")]
    LibraryMismatch,

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PriorError {
    pub(crate) fn invalid(rule: &str, reason: impl Into<String>) -> Self {
        PriorError::InvalidParameters {
            rule: rule.to_owned(),
            reason: reason.into(),
        }
    }
}
