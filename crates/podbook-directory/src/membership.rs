//! Group membership.
//!
//! Members live in the group's own document, so every change is a fetch,
//! an in-memory edit and one whole-document save. There is no conflict
//! detection: two concurrent updates both read the same revision and the
//! later save wins.

use std::collections::BTreeSet;

use podbook_client::ResourceClient;
use podbook_types::{Attribute, ResourceUrl, Value};
use tracing::info;

use crate::codec::EntityCodec;
use crate::config::DirectoryConfig;
use crate::entity::Entity;
use crate::error::{DirectoryError, DirectoryResult};
use crate::kind::EntityKind;

#[derive(Clone, Copy)]
pub struct MembershipManager<'a> {
    client: &'a dyn ResourceClient,
    config: &'a DirectoryConfig,
}

impl<'a> MembershipManager<'a> {
    pub fn new(client: &'a dyn ResourceClient, config: &'a DirectoryConfig) -> Self {
        Self { client, config }
    }

    fn codec(&self) -> EntityCodec<'a> {
        EntityCodec::new(self.config)
    }

    /// Current members, read fresh from the group document.
    pub async fn members(&self, group: &Entity) -> DirectoryResult<BTreeSet<ResourceUrl>> {
        ensure_group(group)?;
        let document = self.client.get(&group.document_url()).await?;
        let group = self.codec().decode(EntityKind::Group, document, group.url())?;
        Ok(group.members().clone())
    }

    /// Apply additions, then removals, and save the group document once.
    ///
    /// A URL both added and removed ends up absent.
    pub async fn update_members(
        &self,
        group: &Entity,
        to_add: &[ResourceUrl],
        to_remove: &[ResourceUrl],
    ) -> DirectoryResult<Entity> {
        ensure_group(group)?;
        let codec = self.codec();
        let predicate = codec.vocabulary().iri(Attribute::HasMember);
        let subject = group.url();

        let mut document = self.client.get(&group.document_url()).await?;
        let record = document
            .record_mut(subject)
            .ok_or_else(|| DirectoryError::MissingRecord {
                document: group.document_url(),
                subject: subject.clone(),
            })?;

        let mut added = 0usize;
        for url in to_add {
            if record.add(predicate, Value::Url(url.clone())) {
                added += 1;
            }
        }
        let mut removed = 0usize;
        for url in to_remove {
            if record.remove(predicate, &Value::Url(url.clone())) {
                removed += 1;
            }
        }

        let updated = codec.decode(EntityKind::Group, self.client.save(&document).await?, subject)?;
        info!(
            group = %subject,
            added,
            removed,
            members = updated.members().len(),
            "updated group members"
        );
        Ok(updated)
    }

    pub async fn add_member(&self, group: &Entity, member: &ResourceUrl) -> DirectoryResult<Entity> {
        self.update_members(group, std::slice::from_ref(member), &[]).await
    }

    pub async fn remove_member(&self, group: &Entity, member: &ResourceUrl) -> DirectoryResult<Entity> {
        self.update_members(group, &[], std::slice::from_ref(member)).await
    }
}

fn ensure_group(entity: &Entity) -> DirectoryResult<()> {
    if entity.is_group() {
        Ok(())
    } else {
        Err(DirectoryError::NotAGroup(entity.url().clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use podbook_client::{ClientResult, ErrorKind, InMemoryResourceClient, Operation};
    use podbook_types::Document;
    use tokio::sync::Barrier;

    use super::*;
    use crate::book::AddressBook;
    use crate::testing::{url, Fixture};

    fn alice() -> ResourceUrl {
        url("https://alice.example/profile/card#me")
    }

    fn bob() -> ResourceUrl {
        url("https://bob.example/profile/card#me")
    }

    #[tokio::test]
    async fn adds_then_removes_in_one_write() {
        let mut fx = Fixture::new().await;
        let team = fx.create(EntityKind::Group, "Team").await.entity;
        fx.client.clear_journal();

        let updated = fx
            .book
            .membership()
            .update_members(&team, &[alice(), bob(), alice()], &[bob()])
            .await
            .unwrap();

        assert_eq!(updated.members().iter().cloned().collect::<Vec<_>>(), vec![alice()]);
        assert_eq!(fx.client.writes(), vec![(Operation::Save, team.document_url())]);
        assert_eq!(
            fx.book.membership().members(&team).await.unwrap(),
            BTreeSet::from([alice()])
        );
    }

    #[tokio::test]
    async fn single_member_helpers() {
        let mut fx = Fixture::new().await;
        let team = fx.create(EntityKind::Group, "Team").await.entity;
        let membership = fx.book.membership();

        membership.add_member(&team, &alice()).await.unwrap();
        let updated = membership.add_member(&team, &bob()).await.unwrap();
        assert_eq!(updated.members().len(), 2);

        let updated = membership.remove_member(&team, &alice()).await.unwrap();
        assert_eq!(updated.members().iter().collect::<Vec<_>>(), vec![&bob()]);
    }

    #[tokio::test]
    async fn membership_does_not_touch_indexes() {
        let mut fx = Fixture::new().await;
        let team = fx.create(EntityKind::Group, "Team").await.entity;
        fx.book.membership().add_member(&team, &alice()).await.unwrap();

        let groups = fx.book.query().list(&fx.directory, &[EntityKind::Group]).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].members().is_empty());
    }

    #[tokio::test]
    async fn rejects_non_groups_before_io() {
        let mut fx = Fixture::new().await;
        let person = fx.create(EntityKind::Person, "Alice").await.entity;
        fx.client.clear_journal();

        let err = fx.book.membership().add_member(&person, &bob()).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotAGroup(_)));
        assert!(fx.client.journal().is_empty());
    }

    #[tokio::test]
    async fn missing_group_document_fails() {
        let mut fx = Fixture::new().await;
        let team = fx.create(EntityKind::Group, "Team").await.entity;
        fx.client.fail_next(Operation::Get, &team.document_url(), ErrorKind::NotFound);

        let err = fx.book.membership().add_member(&team, &alice()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    /// Holds every save of one document until two callers are waiting.
    struct GatedClient {
        inner: Arc<InMemoryResourceClient>,
        gated: ResourceUrl,
        barrier: Barrier,
    }

    #[async_trait]
    impl ResourceClient for GatedClient {
        async fn get(&self, url: &ResourceUrl) -> ClientResult<Document> {
            self.inner.get(url).await
        }

        async fn save(&self, document: &Document) -> ClientResult<Document> {
            if document.url() == &self.gated {
                self.barrier.wait().await;
            }
            self.inner.save(document).await
        }

        async fn delete(&self, url: &ResourceUrl) -> ClientResult<()> {
            self.inner.delete(url).await
        }

        async fn create_container(&self, url: &ResourceUrl) -> ClientResult<()> {
            self.inner.create_container(url).await
        }

        async fn list_container(&self, url: &ResourceUrl) -> ClientResult<Vec<ResourceUrl>> {
            self.inner.list_container(url).await
        }
    }

    #[tokio::test]
    async fn concurrent_updates_race_and_last_write_wins() {
        let mut fx = Fixture::new().await;
        let team = fx.create(EntityKind::Group, "Team").await.entity;

        let gated = Arc::new(GatedClient {
            inner: fx.client.clone(),
            gated: team.document_url(),
            barrier: Barrier::new(2),
        });
        let book = AddressBook::with_defaults(gated);
        let membership = book.membership();

        let (alice, bob) = (alice(), bob());
        let (first, second) = tokio::join!(
            membership.add_member(&team, &alice),
            membership.add_member(&team, &bob),
        );
        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first.members().len(), 1);
        assert_eq!(second.members().len(), 1);

        let stored = fx.book.membership().members(&team).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored == BTreeSet::from([alice]) || stored == BTreeSet::from([bob]));
    }
}
