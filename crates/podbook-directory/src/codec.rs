//! Building and reading entity records.
//!
//! Records are produced by folding an ordered list of [`Mutation`]s over a
//! fresh record. Order matters: a later `Set` replaces what an earlier one
//! wrote, so caller-supplied [`Attributes`] always win over the base record.

use std::collections::BTreeSet;

use podbook_types::{Attribute, Document, EntityId, Record, ResourceUrl, TypeTag, Value, Vocabulary};

use crate::config::DirectoryConfig;
use crate::directory::Directory;
use crate::entity::Entity;
use crate::error::{DirectoryError, DirectoryResult};
use crate::kind::EntityKind;

/// One change to a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Replace all values of the attribute.
    Set(Attribute, Value),
    /// Add a value to the attribute's set.
    Add(Attribute, Value),
    /// Remove a value from the attribute's set.
    Remove(Attribute, Value),
    /// Drop every value of the attribute.
    Clear(Attribute),
}

impl Mutation {
    pub fn apply(&self, record: &mut Record, vocabulary: &Vocabulary) {
        match self {
            Mutation::Set(attribute, value) => record.set(vocabulary.iri(*attribute), value.clone()),
            Mutation::Add(attribute, value) => {
                record.add(vocabulary.iri(*attribute), value.clone());
            }
            Mutation::Remove(attribute, value) => {
                record.remove(vocabulary.iri(*attribute), value);
            }
            Mutation::Clear(attribute) => {
                record.clear(vocabulary.iri(*attribute));
            }
        }
    }
}

/// An ordered chain of mutations, applied left to right.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    mutations: Vec<Mutation>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes that set the display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().set(Attribute::FormattedName, Value::literal(name))
    }

    pub fn set(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.mutations.push(Mutation::Set(attribute, value.into()));
        self
    }

    pub fn add(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.mutations.push(Mutation::Add(attribute, value.into()));
        self
    }

    pub fn remove(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.mutations.push(Mutation::Remove(attribute, value.into()));
        self
    }

    pub fn clear(mut self, attribute: Attribute) -> Self {
        self.mutations.push(Mutation::Clear(attribute));
        self
    }

    /// Append another chain after this one.
    pub fn then(mut self, other: Attributes) -> Self {
        self.mutations.extend(other.mutations);
        self
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Fold every mutation over `record`, in order.
    pub fn apply(&self, record: &mut Record, vocabulary: &Vocabulary) {
        for mutation in &self.mutations {
            mutation.apply(record, vocabulary);
        }
    }
}

/// Encodes entities into documents and decodes them back.
#[derive(Clone, Copy, Debug)]
pub struct EntityCodec<'a> {
    config: &'a DirectoryConfig,
}

impl<'a> EntityCodec<'a> {
    pub fn new(config: &'a DirectoryConfig) -> Self {
        Self { config }
    }

    pub fn vocabulary(&self) -> &'a Vocabulary {
        &self.config.vocabulary
    }

    /// `<container>/<kind container>/<id>/<entity file>#<fragment>`
    pub fn entity_url(&self, directory: &Directory, kind: EntityKind, id: EntityId) -> DirectoryResult<ResourceUrl> {
        let container = kind
            .container(self.config)
            .ok_or(DirectoryError::NotPersistable { kind })?;
        let document = directory
            .container()
            .join(&format!("{container}/{id}/{}", self.config.entity_file))?;
        Ok(document.with_fragment(&self.config.record_fragment))
    }

    /// The stored value of a type tag.
    pub fn type_value(&self, tag: TypeTag) -> DirectoryResult<Value> {
        Ok(Value::Url(ResourceUrl::parse(self.vocabulary().type_iri(tag))?))
    }

    /// Build the entity document for a new entity.
    ///
    /// The base record carries the type tag, the back-reference to the
    /// address book and the `urn:uuid:` id; `attributes` are applied after
    /// it and may override any of them.
    pub fn encode(
        &self,
        directory: &Directory,
        kind: EntityKind,
        id: EntityId,
        attributes: &Attributes,
    ) -> DirectoryResult<Document> {
        let tag = kind.type_tag().ok_or(DirectoryError::NotPersistable { kind })?;
        let subject = self.entity_url(directory, kind, id)?;

        let chain = Attributes::new()
            .set(Attribute::Type, self.type_value(tag)?)
            .set(Attribute::InAddressBook, directory.record_url().clone())
            .set(Attribute::HasUid, id.urn())
            .then(attributes.clone());

        let mut record = Record::new(subject.clone());
        chain.apply(&mut record, self.vocabulary());

        let mut document = Document::new(subject);
        document.upsert(record);
        Ok(document)
    }

    /// Read an entity from its own document.
    pub fn decode(&self, kind: EntityKind, document: Document, subject: &ResourceUrl) -> DirectoryResult<Entity> {
        let record = document
            .record(subject)
            .cloned()
            .ok_or_else(|| DirectoryError::MissingRecord {
                document: document.url().clone(),
                subject: subject.clone(),
            })?;
        if !kind.is_of_type(&record, self.vocabulary()) {
            return Err(DirectoryError::WrongType {
                subject: subject.clone(),
                expected: kind,
            });
        }
        Ok(self.assemble(kind, record, Some(document)))
    }

    /// Materialize an entity from its index entry, without its document.
    pub fn decode_entry(&self, kind: EntityKind, entry: &Record) -> Entity {
        self.assemble(kind, entry.clone(), None)
    }

    /// The reduced copy of `record` stored in the kind's index.
    pub fn index_entry(&self, directory: &Directory, kind: EntityKind, record: &Record) -> DirectoryResult<Record> {
        kind.ensure_persistent()?;
        let vocab = self.vocabulary();
        let mut entry = Record::new(record.subject().clone());
        for attribute in kind.mirrored_attributes() {
            let predicate = vocab.iri(*attribute);
            for value in record.values(predicate) {
                entry.add(predicate, value.clone());
            }
        }
        if kind.entry_references_book() {
            entry.set(
                vocab.iri(Attribute::InAddressBook),
                Value::Url(directory.record_url().clone()),
            );
        }
        Ok(entry)
    }

    /// List `subject` on the address book record of the index, for kinds
    /// whose entries reference the book.
    pub fn link_entry(&self, index: &mut Document, directory: &Directory, kind: EntityKind, subject: &ResourceUrl) {
        if kind.entry_references_book() {
            index
                .record_entry(directory.record_url())
                .add(self.vocabulary().iri(Attribute::IncludesGroup), Value::Url(subject.clone()));
        }
    }

    /// Undo [`link_entry`](Self::link_entry). Returns `true` if the index
    /// changed.
    pub fn unlink_entry(&self, index: &mut Document, directory: &Directory, kind: EntityKind, subject: &ResourceUrl) -> bool {
        if !kind.entry_references_book() {
            return false;
        }
        let Some(book) = index.record_mut(directory.record_url()) else {
            return false;
        };
        let removed = book.remove(
            self.vocabulary().iri(Attribute::IncludesGroup),
            &Value::Url(subject.clone()),
        );
        if book.is_empty() {
            index.remove(directory.record_url());
        }
        removed
    }

    pub fn name_of<'r>(&self, record: &'r Record) -> Option<&'r str> {
        record.first_literal(self.vocabulary().iri(Attribute::FormattedName))
    }

    pub fn members_of(&self, record: &Record) -> BTreeSet<ResourceUrl> {
        record
            .urls(self.vocabulary().iri(Attribute::HasMember))
            .cloned()
            .collect()
    }

    fn assemble(&self, kind: EntityKind, record: Record, document: Option<Document>) -> Entity {
        let name = self.name_of(&record).unwrap_or_default().to_string();
        let members = match kind {
            EntityKind::Group => self.members_of(&record),
            _ => BTreeSet::new(),
        };
        let agent = record
            .first_url(self.vocabulary().iri(Attribute::SameAs))
            .cloned();
        Entity::from_parts(kind, record, document, name, members, agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> ResourceUrl {
        ResourceUrl::parse(s).unwrap()
    }

    fn directory(config: &DirectoryConfig) -> Directory {
        let main_url = url("https://pod.example/contacts/index.ttl");
        let record = main_url.with_fragment(&config.record_fragment);
        let mut main = Document::new(main_url);
        main.record_entry(&record)
            .set(config.vocabulary.iri(Attribute::FormattedName), Value::literal("Contacts"));
        Directory::new(url("https://pod.example/contacts/"), main, record).unwrap()
    }

    #[test]
    fn later_setters_overwrite_earlier_ones() {
        let vocab = Vocabulary::default();
        let attributes = Attributes::named("First")
            .add(Attribute::HasEmail, "mailto:a@example.org")
            .set(Attribute::FormattedName, "Second")
            .add(Attribute::HasEmail, "mailto:b@example.org")
            .remove(Attribute::HasEmail, "mailto:a@example.org");

        let mut record = Record::new(url("https://pod.example/x#this"));
        attributes.apply(&mut record, &vocab);

        assert_eq!(record.first_literal(vocab.iri(Attribute::FormattedName)), Some("Second"));
        let emails: Vec<_> = record
            .values(vocab.iri(Attribute::HasEmail))
            .filter_map(Value::as_literal)
            .collect();
        assert_eq!(emails, vec!["mailto:b@example.org"]);
    }

    #[test]
    fn clear_drops_all_values() {
        let vocab = Vocabulary::default();
        let mut record = Record::new(url("https://pod.example/x#this"));
        Attributes::new()
            .add(Attribute::Note, "one")
            .add(Attribute::Note, "two")
            .clear(Attribute::Note)
            .apply(&mut record, &vocab);
        assert!(record.is_empty());
    }

    #[test]
    fn entity_url_follows_layout() {
        let config = DirectoryConfig::default();
        let codec = EntityCodec::new(&config);
        let dir = directory(&config);
        let id = EntityId::new();

        let person = codec.entity_url(&dir, EntityKind::Person, id).unwrap();
        assert_eq!(
            person.as_str(),
            format!("https://pod.example/contacts/Person/{id}/index.ttl#this")
        );
        let group = codec.entity_url(&dir, EntityKind::Group, id).unwrap();
        assert!(group.as_str().contains("/contacts/Group/"));
        assert!(matches!(
            codec.entity_url(&dir, EntityKind::Temporary, id),
            Err(DirectoryError::NotPersistable { .. })
        ));
    }

    #[test]
    fn encode_builds_base_record_then_caller_attributes() {
        let config = DirectoryConfig::default();
        let vocab = &config.vocabulary;
        let codec = EntityCodec::new(&config);
        let dir = directory(&config);
        let id = EntityId::new();

        let doc = codec
            .encode(&dir, EntityKind::Person, id, &Attributes::named("Alice"))
            .unwrap();
        let subject = codec.entity_url(&dir, EntityKind::Person, id).unwrap();
        assert_eq!(doc.url(), &subject.document());

        let record = doc.record(&subject).unwrap();
        assert!(EntityKind::Person.is_of_type(record, vocab));
        assert_eq!(record.first_literal(vocab.iri(Attribute::FormattedName)), Some("Alice"));
        assert_eq!(record.first_url(vocab.iri(Attribute::InAddressBook)), Some(dir.record_url()));
        assert_eq!(
            record.first_literal(vocab.iri(Attribute::HasUid)).unwrap(),
            id.urn()
        );
    }

    #[test]
    fn decode_round_trips_groups_with_members() {
        let config = DirectoryConfig::default();
        let codec = EntityCodec::new(&config);
        let dir = directory(&config);
        let id = EntityId::new();
        let alice = url("https://alice.example/profile/card#me");

        let attributes = Attributes::named("Friends").add(Attribute::HasMember, alice.clone());
        let doc = codec.encode(&dir, EntityKind::Group, id, &attributes).unwrap();
        let subject = codec.entity_url(&dir, EntityKind::Group, id).unwrap();

        let group = codec.decode(EntityKind::Group, doc, &subject).unwrap();
        assert_eq!(group.name(), "Friends");
        assert_eq!(group.url(), &subject);
        assert!(group.document().is_some());
        assert_eq!(group.members().iter().collect::<Vec<_>>(), vec![&alice]);
    }

    #[test]
    fn decode_rejects_wrong_type_and_missing_record() {
        let config = DirectoryConfig::default();
        let codec = EntityCodec::new(&config);
        let dir = directory(&config);
        let id = EntityId::new();
        let doc = codec
            .encode(&dir, EntityKind::Person, id, &Attributes::named("Alice"))
            .unwrap();
        let subject = codec.entity_url(&dir, EntityKind::Person, id).unwrap();

        assert!(matches!(
            codec.decode(EntityKind::Group, doc.clone(), &subject),
            Err(DirectoryError::WrongType { .. })
        ));
        assert!(matches!(
            codec.decode(EntityKind::Person, doc, &subject.document().with_fragment("other")),
            Err(DirectoryError::MissingRecord { .. })
        ));
    }

    #[test]
    fn index_entry_is_reduced() {
        let config = DirectoryConfig::default();
        let vocab = &config.vocabulary;
        let codec = EntityCodec::new(&config);
        let dir = directory(&config);

        let attributes = Attributes::named("Alice")
            .set(Attribute::HasEmail, "mailto:alice@example.org")
            .set(Attribute::Note, "met at the conference");
        let id = EntityId::new();
        let doc = codec.encode(&dir, EntityKind::Person, id, &attributes).unwrap();
        let subject = codec.entity_url(&dir, EntityKind::Person, id).unwrap();
        let record = doc.record(&subject).unwrap();

        let entry = codec.index_entry(&dir, EntityKind::Person, record).unwrap();
        assert_eq!(entry.subject(), &subject);
        assert_eq!(entry.first_literal(vocab.iri(Attribute::FormattedName)), Some("Alice"));
        assert!(EntityKind::Person.is_of_type(&entry, vocab));
        assert!(entry.first(vocab.iri(Attribute::HasEmail)).is_none());
        assert!(entry.first(vocab.iri(Attribute::InAddressBook)).is_none());
    }

    #[test]
    fn group_index_entry_references_the_book() {
        let config = DirectoryConfig::default();
        let vocab = &config.vocabulary;
        let codec = EntityCodec::new(&config);
        let dir = directory(&config);
        let id = EntityId::new();
        let doc = codec
            .encode(&dir, EntityKind::Group, id, &Attributes::named("Team"))
            .unwrap();
        let subject = codec.entity_url(&dir, EntityKind::Group, id).unwrap();

        let entry = codec
            .index_entry(&dir, EntityKind::Group, doc.record(&subject).unwrap())
            .unwrap();
        assert_eq!(entry.first_url(vocab.iri(Attribute::InAddressBook)), Some(dir.record_url()));
        assert!(entry.first(vocab.iri(Attribute::HasUid)).is_none());
    }

    #[test]
    fn groups_are_listed_on_the_book_record() {
        let config = DirectoryConfig::default();
        let vocab = &config.vocabulary;
        let codec = EntityCodec::new(&config);
        let dir = directory(&config);
        let team = url("https://pod.example/contacts/Group/1/index.ttl#this");
        let mut index = Document::new(url("https://pod.example/contacts/groups.ttl"));

        codec.link_entry(&mut index, &dir, EntityKind::Group, &team);
        let book = index.record(dir.record_url()).unwrap();
        assert_eq!(book.first_url(vocab.iri(Attribute::IncludesGroup)), Some(&team));

        assert!(codec.unlink_entry(&mut index, &dir, EntityKind::Group, &team));
        assert!(index.is_empty());
        assert!(!codec.unlink_entry(&mut index, &dir, EntityKind::Group, &team));

        let mut people = Document::new(url("https://pod.example/contacts/people.ttl"));
        codec.link_entry(&mut people, &dir, EntityKind::Person, &team);
        assert!(people.is_empty());
    }

    #[test]
    fn decode_entry_reads_agent() {
        let config = DirectoryConfig::default();
        let vocab = &config.vocabulary;
        let codec = EntityCodec::new(&config);
        let agent = url("https://alice.example/profile/card#me");
        let mut record = Record::new(url("https://pod.example/contacts/Person/1/index.ttl#this"));
        record.set(vocab.iri(Attribute::FormattedName), Value::literal("Alice"));
        record.set(vocab.iri(Attribute::SameAs), Value::Url(agent.clone()));

        let entity = codec.decode_entry(EntityKind::Person, &record);
        assert_eq!(entity.agent(), Some(&agent));
        assert!(entity.document().is_none());
        assert_eq!(entity.original_url(), record.subject());
    }
}
