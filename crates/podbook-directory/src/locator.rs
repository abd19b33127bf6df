//! Finding, and on first use creating, the index document of an entity kind.

use podbook_client::ResourceClient;
use podbook_types::{Document, ResourceUrl, Value};
use tracing::{debug, info};

use crate::config::DirectoryConfig;
use crate::directory::{Directory, IndexDocument};
use crate::error::{DirectoryError, DirectoryResult};
use crate::kind::EntityKind;

/// Resolves the index document for an entity kind.
///
/// The write path ([`resolve`](Self::resolve)) creates a missing index and
/// persists its link on the main index before returning, so no entry is ever
/// written to an index the main index does not point at. The read path
/// ([`read`](Self::read)) never writes.
#[derive(Clone, Copy)]
pub struct IndexLocator<'a> {
    client: &'a dyn ResourceClient,
    config: &'a DirectoryConfig,
}

impl<'a> IndexLocator<'a> {
    pub fn new(client: &'a dyn ResourceClient, config: &'a DirectoryConfig) -> Self {
        Self { client, config }
    }

    /// `<container><index file>` for the kind.
    pub fn default_index_url(&self, directory: &Directory, kind: EntityKind) -> DirectoryResult<ResourceUrl> {
        let file = kind
            .index_file(self.config)
            .ok_or(DirectoryError::NotPersistable { kind })?;
        Ok(directory.container().join(file)?)
    }

    /// Resolve the kind's index, creating and linking it if needed.
    ///
    /// Returns the directory the caller must adopt: it carries the main index
    /// revision holding the link and the resolved index document.
    pub async fn resolve(
        &self,
        directory: Directory,
        kind: EntityKind,
    ) -> DirectoryResult<(Directory, IndexDocument)> {
        let link = kind.index_link().ok_or(DirectoryError::NotPersistable { kind })?;
        let vocab = &self.config.vocabulary;

        if let Some(url) = directory.linked_index_url(kind, vocab) {
            debug!(%kind, url = %url, "index already linked");
            let index = IndexDocument::new(self.client.get_or_empty(&url).await?);
            return Ok((directory.with_index(kind, index.clone()), index));
        }

        // The cached main index may be stale; another client may have linked
        // the index since this directory was opened.
        let main_url = directory.main_index().url.clone();
        let mut main = self.client.get(&main_url).await?;
        let record_url = directory.record_url().clone();
        let linked = main
            .record(&record_url)
            .and_then(|record| record.first_url(vocab.iri(link)))
            .cloned();
        if let Some(url) = linked {
            debug!(%kind, url = %url, "adopting index linked by another writer");
            let index = IndexDocument::new(self.client.get_or_empty(&url).await?);
            let directory = directory.with_main_index(main).with_index(kind, index.clone());
            return Ok((directory, index));
        }

        let url = self.default_index_url(&directory, kind)?;
        let document = match self.client.get(&url).await {
            Ok(document) => document,
            Err(e) if e.is_not_found() => {
                debug!(%kind, url = %url, "creating index document");
                self.client.save(&Document::new(url.clone())).await?
            }
            Err(e) => return Err(e.into()),
        };

        main.record_entry(&record_url)
            .set(vocab.iri(link), Value::Url(url.clone()));
        let main = self.client.save(&main).await?;
        info!(%kind, index = %url, main = %main_url, "linked index on main index");

        let index = IndexDocument::new(document);
        let directory = directory.with_main_index(main).with_index(kind, index.clone());
        Ok((directory, index))
    }

    /// Read the kind's index without writing anything.
    ///
    /// Uses the linked URL, else the default one; a missing index reads as
    /// empty.
    pub async fn read(&self, directory: &Directory, kind: EntityKind) -> DirectoryResult<IndexDocument> {
        kind.ensure_persistent()?;
        let url = match directory.linked_index_url(kind, &self.config.vocabulary) {
            Some(url) => url,
            None => self.default_index_url(directory, kind)?,
        };
        let document = self.client.get_or_empty(&url).await?;
        debug!(%kind, url = %url, entries = document.len(), "read index");
        Ok(IndexDocument::new(document))
    }
}
