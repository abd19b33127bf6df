//! Create, rename and delete of one entity across its own document and its
//! entry in the kind's index.
//!
//! None of these operations is atomic. Each runs its steps in a fixed order
//! and stops at the first failure without undoing earlier steps:
//!
//! - create writes the entity document first, then the index entry. A failed
//!   index write leaves an unindexed entity, which a retry (or
//!   [`EntityWriter::index_entity`]) repairs without duplicating the entry.
//! - rename writes the entity document first, then the index entry's name. A
//!   failed index write leaves a stale name, never a dangling entry.
//! - delete removes the index entry first, then the entity document. A failed
//!   document delete leaves an unindexed document, never a dangling entry.

use podbook_client::ResourceClient;
use podbook_types::{Attribute, EntityId, ResourceUrl};
use tracing::{debug, info, warn};

use crate::codec::{Attributes, EntityCodec};
use crate::config::DirectoryConfig;
use crate::directory::{Directory, IndexDocument};
use crate::entity::Entity;
use crate::error::{DirectoryError, DirectoryResult};
use crate::kind::EntityKind;
use crate::locator::IndexLocator;

/// Result of a create.
#[derive(Clone, Debug)]
pub struct Created {
    /// The directory to adopt; it may carry a newly linked index.
    pub directory: Directory,
    pub entity: Entity,
    pub index: IndexDocument,
}

/// Result of a rename.
#[derive(Clone, Debug)]
pub struct Renamed {
    /// The directory to adopt; recreating a missing entry may link an index.
    pub directory: Directory,
    pub entity: Entity,
    pub index: IndexDocument,
}

#[derive(Clone, Copy)]
pub struct EntityWriter<'a> {
    client: &'a dyn ResourceClient,
    config: &'a DirectoryConfig,
}

impl<'a> EntityWriter<'a> {
    pub fn new(client: &'a dyn ResourceClient, config: &'a DirectoryConfig) -> Self {
        Self { client, config }
    }

    fn codec(&self) -> EntityCodec<'a> {
        EntityCodec::new(self.config)
    }

    fn locator(&self) -> IndexLocator<'a> {
        IndexLocator::new(self.client, self.config)
    }

    /// Create a new entity under a freshly generated id.
    pub async fn create(
        &self,
        directory: Directory,
        kind: EntityKind,
        attributes: &Attributes,
    ) -> DirectoryResult<Created> {
        self.create_with_id(directory, kind, EntityId::new(), attributes).await
    }

    /// Create an entity under a caller-chosen id.
    ///
    /// Retrying with the same id after a partial failure rewrites the entity
    /// document and leaves exactly one index entry.
    pub async fn create_with_id(
        &self,
        directory: Directory,
        kind: EntityKind,
        id: EntityId,
        attributes: &Attributes,
    ) -> DirectoryResult<Created> {
        let entity = self.write_entity(&directory, kind, id, attributes).await?;

        let (directory, index) = match self.index_entity(directory, &entity).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(%kind, url = %entity.url(), error = %e, "entity saved but not indexed");
                return Err(e);
            }
        };

        info!(%kind, url = %entity.url(), name = entity.name(), "created entity");
        Ok(Created {
            directory,
            entity,
            index,
        })
    }

    /// Save an entity document without touching any index.
    pub(crate) async fn write_entity(
        &self,
        directory: &Directory,
        kind: EntityKind,
        id: EntityId,
        attributes: &Attributes,
    ) -> DirectoryResult<Entity> {
        kind.ensure_persistent()?;
        let codec = self.codec();
        let document = codec.encode(directory, kind, id, attributes)?;
        let subject = codec.entity_url(directory, kind, id)?;

        debug!(%kind, url = %subject, "saving entity document");
        let saved = self.client.save(&document).await?;
        codec.decode(kind, saved, &subject)
    }

    /// Write (or overwrite) the index entry of a stored entity.
    ///
    /// Resolves the kind's index first, linking it on the main index if it
    /// did not exist yet.
    pub async fn index_entity(
        &self,
        directory: Directory,
        entity: &Entity,
    ) -> DirectoryResult<(Directory, IndexDocument)> {
        self.index_entities(directory, entity.kind(), std::slice::from_ref(entity))
            .await
    }

    /// Write the index entries of several stored entities of one kind with a
    /// single read and a single save of the index.
    ///
    /// Either every entry lands or none does.
    pub async fn index_entities(
        &self,
        directory: Directory,
        kind: EntityKind,
        entities: &[Entity],
    ) -> DirectoryResult<(Directory, IndexDocument)> {
        kind.ensure_persistent()?;
        if let Some(other) = entities.iter().find(|entity| entity.kind() != kind) {
            return Err(DirectoryError::UnexpectedKind {
                expected: kind,
                found: other.kind(),
            });
        }
        let (directory, mut index) = self.locator().resolve(directory, kind).await?;

        let codec = self.codec();
        for entity in entities {
            let entry = codec.index_entry(&directory, kind, entity.record())?;
            let replaced = index.document.upsert(entry).is_some();
            codec.link_entry(&mut index.document, &directory, kind, entity.url());
            debug!(%kind, url = %entity.url(), index = %index.url, replaced, "staging index entry");
        }

        let index = IndexDocument::new(self.client.save(&index.document).await?);
        let directory = directory.with_index(kind, index.clone());
        Ok((directory, index))
    }

    /// Change an entity's name, and optionally further attributes.
    ///
    /// The entity document is fetched fresh; a missing document fails the
    /// rename before the index is touched. A missing index entry is
    /// recreated through [`index_entity`](Self::index_entity), which links
    /// the index first if nothing points at it yet.
    pub async fn rename(
        &self,
        directory: &Directory,
        entity: &Entity,
        new_name: &str,
        extra: Option<&Attributes>,
    ) -> DirectoryResult<Renamed> {
        let kind = entity.kind();
        kind.ensure_persistent()?;
        let codec = self.codec();
        let vocab = codec.vocabulary();
        let subject = entity.url().clone();

        let mut document = self.client.get(&entity.document_url()).await?;
        let record = document
            .record_mut(&subject)
            .ok_or_else(|| DirectoryError::MissingRecord {
                document: entity.document_url(),
                subject: subject.clone(),
            })?;
        let mut changes = Attributes::named(new_name);
        if let Some(extra) = extra {
            changes = changes.then(extra.clone());
        }
        changes.apply(record, vocab);
        debug!(%kind, url = %subject, name = new_name, "saving renamed entity");
        let renamed = codec.decode(kind, self.client.save(&document).await?, &subject)?;

        let mut index = self.locator().read(directory, kind).await?;
        let entry = codec.index_entry(directory, kind, renamed.record())?;
        let updated = match index.document.record_mut(&subject) {
            Some(existing) => {
                let name = vocab.iri(Attribute::FormattedName);
                existing.clear(name);
                for value in entry.values(name) {
                    existing.add(name, value.clone());
                }
                true
            }
            None => false,
        };

        let stored = if updated {
            self.client
                .save(&index.document)
                .await
                .map(|saved| {
                    let index = IndexDocument::new(saved);
                    (directory.clone().with_index(kind, index.clone()), index)
                })
                .map_err(DirectoryError::from)
        } else {
            warn!(%kind, url = %subject, index = %index.url, "index entry missing; recreating it");
            self.index_entity(directory.clone(), &renamed).await
        };
        let (directory, index) = match stored {
            Ok(stored) => stored,
            Err(e) => {
                warn!(%kind, url = %subject, error = %e, "entity renamed but index name is stale");
                return Err(e);
            }
        };

        info!(%kind, url = %subject, name = renamed.name(), "renamed entity");
        Ok(Renamed {
            directory,
            entity: renamed,
            index,
        })
    }

    /// Delete an entity: its index entry first, then its document, then
    /// (best effort) its now empty container.
    ///
    /// The entity document is fetched before the index is read, so a repeated
    /// delete fails with a not-found error without touching the index.
    pub async fn delete(&self, directory: &Directory, entity: &Entity) -> DirectoryResult<IndexDocument> {
        let kind = entity.kind();
        kind.ensure_persistent()?;
        let subject = entity.url();
        let document_url = entity.document_url();

        self.client.get(&document_url).await?;

        let codec = self.codec();
        let mut index = self.locator().read(directory, kind).await?;
        let removed = index.document.remove(subject).is_some();
        let unlinked = codec.unlink_entry(&mut index.document, directory, kind, subject);
        if removed || unlinked {
            debug!(%kind, url = %subject, index = %index.url, "removing index entry");
            index = IndexDocument::new(self.client.save(&index.document).await?);
        } else {
            debug!(%kind, url = %subject, index = %index.url, "no index entry to remove");
        }

        if let Err(e) = self.client.delete(&document_url).await {
            warn!(%kind, url = %subject, error = %e, "index entry removed but entity document remains");
            return Err(e.into());
        }

        self.remove_empty_container(directory, &document_url).await;
        info!(%kind, url = %subject, "deleted entity");
        Ok(index)
    }

    /// Delete the entity's container if nothing else lives in it.
    ///
    /// Never fails: a non-empty container is kept and errors are logged.
    async fn remove_empty_container(&self, directory: &Directory, document_url: &ResourceUrl) {
        let Some(container) = document_url.parent() else {
            return;
        };
        if !directory.container().contains(&container) {
            return;
        }
        match self.client.list_container(&container).await {
            Ok(children) if children.is_empty() => {
                match self.client.delete(&container).await {
                    Ok(()) => debug!(container = %container, "removed empty entity container"),
                    Err(e) => warn!(container = %container, error = %e, "failed to remove entity container"),
                }
            }
            Ok(children) => {
                debug!(container = %container, remaining = children.len(), "entity container not empty; keeping it");
            }
            Err(e) => warn!(container = %container, error = %e, "failed to list entity container"),
        }
    }
}
