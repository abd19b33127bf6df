//! Error types for directory operations.

use podbook_client::{ClientError, ErrorKind};
use podbook_types::{ResourceUrl, TypeError};

use crate::kind::EntityKind;

/// Errors that can occur while maintaining the directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// A resource client call failed.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// A URL or identifier could not be built.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// Temporary and unregistered entities never reach storage.
    #[error("{kind} entities exist only client-side and cannot be stored")]
    NotPersistable { kind: EntityKind },

    /// The operation needs a different kind of entity.
    #[error("expected a {expected} entity, got {found}")]
    UnexpectedKind { expected: EntityKind, found: EntityKind },

    /// The entity is not a group.
    #[error("not a group: {0}")]
    NotAGroup(ResourceUrl),

    /// A document was fetched but does not hold the expected subject.
    #[error("record {subject} missing from {document}")]
    MissingRecord {
        document: ResourceUrl,
        subject: ResourceUrl,
    },

    /// The record exists but is not typed as the expected kind.
    #[error("record {subject} is not a {expected}")]
    WrongType {
        subject: ResourceUrl,
        expected: EntityKind,
    },

    /// The entity document was saved but its index entry was not written.
    #[error("{url} saved but not indexed: {reason}")]
    NotIndexed { url: ResourceUrl, reason: String },

    /// Directory containers must be container URLs.
    #[error("not a container url: {0}")]
    NotAContainer(ResourceUrl),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DirectoryError {
    /// Classification of the underlying client error, if this is one.
    pub fn client_kind(&self) -> Option<ErrorKind> {
        match self {
            DirectoryError::Client(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.client_kind() == Some(ErrorKind::NotFound)
    }
}

/// Convenience alias for directory results.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
