//! In-memory model of an address book.

use podbook_types::{Attribute, Document, Record, ResourceUrl, Vocabulary};

use crate::error::{DirectoryError, DirectoryResult};
use crate::kind::EntityKind;

/// An index document together with the URL it lives at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDocument {
    pub url: ResourceUrl,
    pub document: Document,
}

impl IndexDocument {
    pub fn new(document: Document) -> Self {
        Self {
            url: document.url().clone(),
            document,
        }
    }

    pub fn empty(url: ResourceUrl) -> Self {
        Self::new(Document::new(url))
    }

    /// The entry for an entity URL.
    pub fn entry(&self, subject: &ResourceUrl) -> Option<&Record> {
        self.document.record(subject)
    }

    pub fn contains(&self, subject: &ResourceUrl) -> bool {
        self.document.contains(subject)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// An address book: its container, its main index, and the people and
/// group indexes once they have been resolved.
///
/// Links to the people and group indexes are data on the main index record,
/// not fields of this struct; the cached index documents are only the last
/// revisions this process resolved. Operations that change the main index
/// return a new `Directory` which callers must adopt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directory {
    container: ResourceUrl,
    record: ResourceUrl,
    main_index: IndexDocument,
    people_index: Option<IndexDocument>,
    group_index: Option<IndexDocument>,
}

impl Directory {
    /// Build a directory from its fetched main index document.
    ///
    /// `record` is the address book subject inside the main index.
    pub fn new(container: ResourceUrl, main_index: Document, record: ResourceUrl) -> DirectoryResult<Self> {
        if !container.is_container() {
            return Err(DirectoryError::NotAContainer(container));
        }
        if !main_index.contains(&record) {
            return Err(DirectoryError::MissingRecord {
                document: main_index.url().clone(),
                subject: record,
            });
        }
        Ok(Self {
            container,
            record,
            main_index: IndexDocument::new(main_index),
            people_index: None,
            group_index: None,
        })
    }

    pub fn container(&self) -> &ResourceUrl {
        &self.container
    }

    /// The address book subject other records point back to.
    pub fn record_url(&self) -> &ResourceUrl {
        &self.record
    }

    pub fn main_index(&self) -> &IndexDocument {
        &self.main_index
    }

    pub fn main_record(&self) -> Option<&Record> {
        self.main_index.entry(&self.record)
    }

    pub fn name<'a>(&'a self, vocabulary: &Vocabulary) -> Option<&'a str> {
        self.main_record()?
            .first_literal(vocabulary.iri(Attribute::FormattedName))
    }

    /// The last resolved index document for a kind.
    pub fn index(&self, kind: EntityKind) -> Option<&IndexDocument> {
        match kind {
            EntityKind::Person => self.people_index.as_ref(),
            EntityKind::Group => self.group_index.as_ref(),
            EntityKind::Temporary | EntityKind::Unregistered => None,
        }
    }

    /// The index URL the main index links for a kind, if linked.
    pub fn linked_index_url(&self, kind: EntityKind, vocabulary: &Vocabulary) -> Option<ResourceUrl> {
        let link = kind.index_link()?;
        self.main_record()?
            .first_url(vocabulary.iri(link))
            .cloned()
    }

    pub(crate) fn with_main_index(mut self, document: Document) -> Self {
        self.main_index = IndexDocument::new(document);
        self
    }

    pub(crate) fn with_index(mut self, kind: EntityKind, index: IndexDocument) -> Self {
        match kind {
            EntityKind::Person => self.people_index = Some(index),
            EntityKind::Group => self.group_index = Some(index),
            EntityKind::Temporary | EntityKind::Unregistered => {}
        }
        self
    }
}
