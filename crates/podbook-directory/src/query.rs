//! Read-only listing across index documents.

use podbook_client::ResourceClient;
use podbook_types::ResourceUrl;
use tracing::debug;

use crate::codec::EntityCodec;
use crate::config::DirectoryConfig;
use crate::directory::Directory;
use crate::entity::Entity;
use crate::error::DirectoryResult;
use crate::kind::EntityKind;
use crate::locator::IndexLocator;

/// Lists entities from the index documents.
///
/// Never writes and never changes the directory: an index that does not
/// exist yet lists as empty.
#[derive(Clone, Copy)]
pub struct DirectoryQuery<'a> {
    client: &'a dyn ResourceClient,
    config: &'a DirectoryConfig,
}

impl<'a> DirectoryQuery<'a> {
    pub fn new(client: &'a dyn ResourceClient, config: &'a DirectoryConfig) -> Self {
        Self { client, config }
    }

    /// All indexed entities of the given kinds, in kind order.
    ///
    /// Entries whose type tag does not match the kind are skipped. Kinds
    /// without an index contribute nothing. Duplicates are kept.
    pub async fn list(&self, directory: &Directory, kinds: &[EntityKind]) -> DirectoryResult<Vec<Entity>> {
        let codec = EntityCodec::new(self.config);
        let vocab = codec.vocabulary();
        let locator = IndexLocator::new(self.client, self.config);

        let mut entities = Vec::new();
        for &kind in kinds {
            if !kind.is_persistent() {
                continue;
            }
            let index = locator.read(directory, kind).await?;
            let before = entities.len();
            entities.extend(
                index
                    .document
                    .records()
                    .filter(|entry| kind.is_of_type(entry, vocab))
                    .map(|entry| codec.decode_entry(kind, entry)),
            );
            debug!(
                %kind,
                listed = entities.len() - before,
                skipped = index.len() - (entities.len() - before),
                "listed index"
            );
        }
        Ok(entities)
    }

    /// Entities whose name contains `needle`, ignoring case.
    pub async fn search(
        &self,
        directory: &Directory,
        kinds: &[EntityKind],
        needle: &str,
    ) -> DirectoryResult<Vec<Entity>> {
        let needle = needle.to_lowercase();
        let mut entities = self.list(directory, kinds).await?;
        entities.retain(|entity| entity.name().to_lowercase().contains(&needle));
        Ok(entities)
    }

    /// The indexed entity with this URL, if listed.
    pub async fn find(
        &self,
        directory: &Directory,
        kind: EntityKind,
        url: &ResourceUrl,
    ) -> DirectoryResult<Option<Entity>> {
        let entities = self.list(directory, &[kind]).await?;
        Ok(entities.into_iter().find(|entity| entity.url() == url))
    }

    /// Fetch an entity from its own document.
    pub async fn load(&self, url: &ResourceUrl, kind: EntityKind) -> DirectoryResult<Entity> {
        kind.ensure_persistent()?;
        let document = self.client.get(&url.document()).await?;
        EntityCodec::new(self.config).decode(kind, document, url)
    }
}
