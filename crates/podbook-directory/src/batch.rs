//! Best-effort batches: everything is started at once, everything settles,
//! nothing is rolled back.

use std::future::Future;

use futures::future::{join, join_all};
use podbook_client::ResourceClient;
use podbook_types::{Attribute, EntityId, ResourceUrl};
use tracing::{debug, info, warn};

use crate::codec::Attributes;
use crate::config::DirectoryConfig;
use crate::directory::Directory;
use crate::entity::Entity;
use crate::error::{DirectoryError, DirectoryResult};
use crate::kind::EntityKind;
use crate::membership::MembershipManager;
use crate::writer::EntityWriter;

/// Run every future to completion and collect the outputs in input order.
///
/// A failing future does not cancel the others.
pub async fn settle_all<I, F>(futures: I) -> Vec<F::Output>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    join_all(futures).await
}

/// One sub-operation of a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchItem {
    /// Create a contact for an agent.
    CreateContact { name: String, agent: ResourceUrl },
    /// Change a group's members.
    UpdateMembers {
        group: ResourceUrl,
        added: Vec<ResourceUrl>,
        removed: Vec<ResourceUrl>,
    },
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub item: BatchItem,
    pub result: DirectoryResult<()>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// New contacts to create and add to a group.
#[derive(Clone, Debug)]
pub struct Onboarding {
    pub group: Entity,
    /// Temporary entities, one per newly entered agent.
    pub new_contacts: Vec<Entity>,
    /// Members to add that already have contacts.
    pub existing_members: Vec<ResourceUrl>,
    pub remove: Vec<ResourceUrl>,
}

/// Settled outcomes of an onboarding batch.
#[derive(Debug)]
pub struct OnboardingReport {
    /// One outcome per new contact, in input order, then the membership
    /// update.
    pub outcomes: Vec<BatchOutcome>,
    /// Contacts that were created and indexed.
    pub contacts: Vec<Entity>,
    /// The group after the membership update, if it succeeded.
    pub group: Option<Entity>,
    /// The directory after indexing the created contacts, if that succeeded.
    pub directory: Option<Directory>,
}

impl OnboardingReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(BatchOutcome::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ok())
    }

    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }
}

#[derive(Clone, Copy)]
pub struct BatchRunner<'a> {
    client: &'a dyn ResourceClient,
    config: &'a DirectoryConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(client: &'a dyn ResourceClient, config: &'a DirectoryConfig) -> Self {
        Self { client, config }
    }

    /// Create a contact per new agent and update the group's members, all
    /// concurrently.
    ///
    /// The contact documents are saved concurrently; once they have all
    /// settled, the saved contacts are indexed with a single write to the
    /// people index. The group gains every new agent's URL and every
    /// existing member, and loses the URLs in `remove`. Contacts that are
    /// not temporary entities fail without I/O and are left out of the
    /// membership update. The batch itself never fails; each outcome is
    /// reported, and a failed index write is reported against every contact
    /// it covered.
    pub async fn onboard(&self, directory: &Directory, onboarding: &Onboarding) -> OnboardingReport {
        let writer = EntityWriter::new(self.client, self.config);
        let membership = MembershipManager::new(self.client, self.config);

        let mut added: Vec<ResourceUrl> = onboarding
            .new_contacts
            .iter()
            .filter(|contact| contact.kind() == EntityKind::Temporary)
            .map(|contact| contact.original_url().clone())
            .collect();
        added.extend(onboarding.existing_members.iter().cloned());

        let writes = onboarding.new_contacts.iter().map(|contact| {
            let item = BatchItem::CreateContact {
                name: contact.name().to_string(),
                agent: contact.original_url().clone(),
            };
            async move {
                if contact.kind() != EntityKind::Temporary {
                    let err = DirectoryError::UnexpectedKind {
                        expected: EntityKind::Temporary,
                        found: contact.kind(),
                    };
                    return (item, Err(err));
                }
                let attributes = Attributes::named(contact.name())
                    .set(Attribute::SameAs, contact.original_url().clone());
                let result = writer
                    .write_entity(directory, EntityKind::Person, EntityId::new(), &attributes)
                    .await;
                (item, result)
            }
        });
        let creates = async {
            let written = settle_all(writes).await;
            let saved: Vec<Entity> = written
                .iter()
                .filter_map(|(_, result)| result.as_ref().ok().cloned())
                .collect();
            if saved.is_empty() {
                return (written, None);
            }
            let indexed = writer
                .index_entities(directory.clone(), EntityKind::Person, &saved)
                .await;
            (written, Some(indexed))
        };

        let update_item = BatchItem::UpdateMembers {
            group: onboarding.group.url().clone(),
            added: added.clone(),
            removed: onboarding.remove.clone(),
        };
        let update = membership.update_members(&onboarding.group, &added, &onboarding.remove);

        let ((written, indexed), updated) = join(creates, update).await;

        let mut report = OnboardingReport {
            outcomes: Vec::with_capacity(written.len() + 1),
            contacts: Vec::new(),
            group: None,
            directory: None,
        };
        let index_error = match indexed {
            Some(Ok((directory, index))) => {
                debug!(index = %index.url, entries = index.len(), "indexed onboarded contacts");
                report.directory = Some(directory);
                None
            }
            Some(Err(e)) => {
                warn!(error = %e, "contacts saved but not indexed");
                Some(e.to_string())
            }
            None => None,
        };
        for (item, result) in written {
            let result = match (result, &index_error) {
                (Ok(entity), None) => {
                    report.contacts.push(entity);
                    Ok(())
                }
                (Ok(entity), Some(reason)) => Err(DirectoryError::NotIndexed {
                    url: entity.url().clone(),
                    reason: reason.clone(),
                }),
                (Err(e), _) => Err(e),
            };
            if let Err(e) = &result {
                warn!(?item, error = %e, "batch item failed");
            }
            report.outcomes.push(BatchOutcome { item, result });
        }
        let result = match updated {
            Ok(group) => {
                report.group = Some(group);
                Ok(())
            }
            Err(e) => {
                warn!(item = ?update_item, error = %e, "batch item failed");
                Err(e)
            }
        };
        report.outcomes.push(BatchOutcome {
            item: update_item,
            result,
        });

        info!(
            group = %onboarding.group.url(),
            completed = report.completed(),
            failed = report.outcomes.len() - report.completed(),
            "onboarding settled"
        );
        report
    }
}
