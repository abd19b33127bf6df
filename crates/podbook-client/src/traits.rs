//! The [`ResourceClient`] trait: the only way Podbook touches storage.

use async_trait::async_trait;
use podbook_types::{Document, ResourceUrl};

use crate::error::{ClientError, ClientResult};

/// Access to a remote store of documents and containers.
///
/// The store offers no transactions, no locking and no conditional writes:
/// every `save` blindly replaces whatever the document held before. Callers
/// that need a consistent view must fetch fresh before each mutation.
///
/// Errors must be classifiable through [`ClientError::kind`].
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Fetch a document. A fragment on `url` is ignored.
    async fn get(&self, url: &ResourceUrl) -> ClientResult<Document>;

    /// Write a whole document at its URL and return the stored revision.
    async fn save(&self, document: &Document) -> ClientResult<Document>;

    /// Delete a document or an empty container.
    async fn delete(&self, url: &ResourceUrl) -> ClientResult<()>;

    /// Create a container (and any missing ancestors).
    async fn create_container(&self, url: &ResourceUrl) -> ClientResult<()>;

    /// List the direct children of a container.
    async fn list_container(&self, url: &ResourceUrl) -> ClientResult<Vec<ResourceUrl>>;

    /// Fetch a document, treating "not found" as an empty document.
    async fn get_or_empty(&self, url: &ResourceUrl) -> ClientResult<Document> {
        match self.get(url).await {
            Ok(document) => Ok(document),
            Err(ClientError::NotFound(_)) => Ok(Document::new(url.clone())),
            Err(e) => Err(e),
        }
    }
}
