use std::collections::BTreeSet;

use podbook_types::{Document, Record, ResourceUrl};

use crate::kind::EntityKind;

/// A contact, a group, or a client-side placeholder for one.
///
/// Stored entities are built by the [`EntityCodec`](crate::codec::EntityCodec)
/// either from their own document (`document` is set) or from an index entry
/// (`document` is `None`). The record subject is the entity's URL and never
/// changes after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    kind: EntityKind,
    record: Record,
    document: Option<Document>,
    name: String,
    members: BTreeSet<ResourceUrl>,
    agent: Option<ResourceUrl>,
}

impl Entity {
    pub(crate) fn from_parts(
        kind: EntityKind,
        record: Record,
        document: Option<Document>,
        name: String,
        members: BTreeSet<ResourceUrl>,
        agent: Option<ResourceUrl>,
    ) -> Self {
        Self {
            kind,
            record,
            document,
            name,
            members,
            agent,
        }
    }

    /// A contact the user has entered but not saved.
    pub fn temporary(name: impl Into<String>, agent: ResourceUrl) -> Self {
        Self {
            kind: EntityKind::Temporary,
            record: Record::new(agent.clone()),
            document: None,
            name: name.into(),
            members: BTreeSet::new(),
            agent: Some(agent),
        }
    }

    /// A member URL that has no contact in the address book.
    pub fn unregistered(url: ResourceUrl) -> Self {
        let name = url
            .last_segment()
            .or_else(|| url.host())
            .unwrap_or(url.as_str())
            .to_string();
        Self {
            kind: EntityKind::Unregistered,
            record: Record::new(url.clone()),
            document: None,
            name,
            members: BTreeSet::new(),
            agent: Some(url),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn is_group(&self) -> bool {
        self.kind == EntityKind::Group
    }

    /// The entity's own URL (its record subject).
    pub fn url(&self) -> &ResourceUrl {
        self.record.subject()
    }

    /// URL of the document holding the entity's record.
    pub fn document_url(&self) -> ResourceUrl {
        self.url().document()
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// The entity's own document, when it was loaded from it.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member URLs. Always empty for anything but a group.
    pub fn members(&self) -> &BTreeSet<ResourceUrl> {
        &self.members
    }

    /// The agent a contact stands for, if recorded.
    pub fn agent(&self) -> Option<&ResourceUrl> {
        self.agent.as_ref()
    }

    /// The URL this entity originally came from.
    ///
    /// For stored entities that is their own URL; placeholders answer with
    /// the agent URL they were created for.
    pub fn original_url(&self) -> &ResourceUrl {
        match self.kind {
            EntityKind::Person | EntityKind::Group => self.url(),
            EntityKind::Temporary | EntityKind::Unregistered => {
                self.agent.as_ref().unwrap_or_else(|| self.url())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> ResourceUrl {
        ResourceUrl::parse(s).unwrap()
    }

    #[test]
    fn temporary_keeps_typed_name_and_agent() {
        let agent = url("https://alice.example/profile/card#me");
        let entity = Entity::temporary("Alice", agent.clone());
        assert_eq!(entity.kind(), EntityKind::Temporary);
        assert_eq!(entity.name(), "Alice");
        assert_eq!(entity.original_url(), &agent);
        assert!(entity.document().is_none());
    }

    #[test]
    fn unregistered_is_named_after_its_url() {
        let entity = Entity::unregistered(url("https://bob.example/profile/card#me"));
        assert_eq!(entity.name(), "card");
        assert_eq!(entity.original_url().as_str(), "https://bob.example/profile/card#me");
        assert!(entity.members().is_empty());
        assert!(!entity.is_group());

        let bare = Entity::unregistered(url("https://carol.example/"));
        assert_eq!(bare.name(), "carol.example");
    }

    #[test]
    fn document_url_strips_fragment() {
        let entity = Entity::unregistered(url("https://pod.example/contacts/Person/1/index.ttl#this"));
        assert_eq!(
            entity.document_url().as_str(),
            "https://pod.example/contacts/Person/1/index.ttl"
        );
    }
}
