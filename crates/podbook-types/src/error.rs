use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid resource url {input:?}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("invalid entity id {input:?}: {reason}")]
    InvalidEntityId { input: String, reason: String },
}
