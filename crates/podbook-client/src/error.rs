//! Error taxonomy for resource client operations.

use podbook_types::ResourceUrl;
use serde::{Deserialize, Serialize};

/// Coarse classification every client error maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Unauthorized,
    Other,
}

/// Errors returned by a [`ResourceClient`](crate::ResourceClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No resource exists at the URL.
    #[error("resource not found: {0}")]
    NotFound(ResourceUrl),

    /// The agent is known but may not access the resource.
    #[error("access forbidden: {0}")]
    Forbidden(ResourceUrl),

    /// The request carried no (or invalid) credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(ResourceUrl),

    /// Network, server or protocol failure.
    #[error("request for {url} failed: {message}")]
    Other { url: ResourceUrl, message: String },
}

impl ClientError {
    /// Build an error of the given kind.
    pub fn of_kind(kind: ErrorKind, url: ResourceUrl) -> Self {
        match kind {
            ErrorKind::NotFound => ClientError::NotFound(url),
            ErrorKind::Forbidden => ClientError::Forbidden(url),
            ErrorKind::Unauthorized => ClientError::Unauthorized(url),
            ErrorKind::Other => ClientError::Other {
                url,
                message: "request failed".to_string(),
            },
        }
    }

    pub fn other(url: ResourceUrl, message: impl Into<String>) -> Self {
        ClientError::Other {
            url,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Forbidden(_) => ErrorKind::Forbidden,
            ClientError::Unauthorized(_) => ErrorKind::Unauthorized,
            ClientError::Other { .. } => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_kind_round_trips_through_kind() {
        let url = ResourceUrl::parse("https://pod.example/contacts/index.ttl").unwrap();
        for kind in [
            ErrorKind::NotFound,
            ErrorKind::Forbidden,
            ErrorKind::Unauthorized,
            ErrorKind::Other,
        ] {
            let err = ClientError::of_kind(kind, url.clone());
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn display_names_the_url() {
        let url = ResourceUrl::parse("https://pod.example/private/").unwrap();
        let err = ClientError::other(url, "connection reset");
        assert_eq!(
            err.to_string(),
            "request for https://pod.example/private/ failed: connection reset"
        );
        assert!(!err.is_not_found());
    }
}
