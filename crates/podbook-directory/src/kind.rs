//! Entity kinds and the capabilities attached to each.
//!
//! Every entity carries an explicit [`EntityKind`] tag. What a kind can do
//! (which index it lives in, how its records are recognised, which
//! attributes its index entry mirrors) is answered by `match`ing on the tag.
//! Person and Group are stored and indexed; Temporary and Unregistered are
//! client-side placeholders that never reach storage.

use std::fmt;

use podbook_types::{Attribute, Record, TypeTag, Value, Vocabulary};
use serde::{Deserialize, Serialize};

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A stored contact.
    Person,
    /// A stored group of member URLs.
    Group,
    /// A contact typed in by the user but not saved yet.
    Temporary,
    /// A member URL with no contact behind it.
    Unregistered,
}

impl EntityKind {
    /// Kinds that have an index document.
    pub const INDEXED: [EntityKind; 2] = [EntityKind::Person, EntityKind::Group];

    pub fn is_persistent(self) -> bool {
        matches!(self, EntityKind::Person | EntityKind::Group)
    }

    /// Fail with [`DirectoryError::NotPersistable`] for client-side kinds.
    pub fn ensure_persistent(self) -> DirectoryResult<()> {
        if self.is_persistent() {
            Ok(())
        } else {
            Err(DirectoryError::NotPersistable { kind: self })
        }
    }

    /// The type tag stored records of this kind declare.
    pub fn type_tag(self) -> Option<TypeTag> {
        match self {
            EntityKind::Person => Some(TypeTag::Individual),
            EntityKind::Group => Some(TypeTag::Group),
            EntityKind::Temporary | EntityKind::Unregistered => None,
        }
    }

    /// Attribute on the main index record that links this kind's index.
    pub fn index_link(self) -> Option<Attribute> {
        match self {
            EntityKind::Person => Some(Attribute::NameEmailIndex),
            EntityKind::Group => Some(Attribute::GroupIndex),
            EntityKind::Temporary | EntityKind::Unregistered => None,
        }
    }

    /// Default index document name, relative to the directory container.
    pub fn index_file(self, config: &DirectoryConfig) -> Option<&str> {
        match self {
            EntityKind::Person => Some(&config.people_index_file),
            EntityKind::Group => Some(&config.group_index_file),
            EntityKind::Temporary | EntityKind::Unregistered => None,
        }
    }

    /// Sub-container holding the entity containers of this kind.
    pub fn container(self, config: &DirectoryConfig) -> Option<&str> {
        match self {
            EntityKind::Person => Some(&config.person_container),
            EntityKind::Group => Some(&config.group_container),
            EntityKind::Temporary | EntityKind::Unregistered => None,
        }
    }

    /// Attributes copied from the entity record into its index entry.
    pub fn mirrored_attributes(self) -> &'static [Attribute] {
        match self {
            EntityKind::Person | EntityKind::Group => &[Attribute::Type, Attribute::FormattedName],
            EntityKind::Temporary | EntityKind::Unregistered => &[],
        }
    }

    /// Whether the index entry carries a back-reference to the address book.
    pub fn entry_references_book(self) -> bool {
        matches!(self, EntityKind::Group)
    }

    /// Whether a stored record declares this kind's type tag.
    ///
    /// Placeholder kinds never match a stored record.
    pub fn is_of_type(self, record: &Record, vocabulary: &Vocabulary) -> bool {
        let Some(tag) = self.type_tag() else {
            return false;
        };
        let expected = vocabulary.type_iri(tag);
        record
            .values(vocabulary.iri(Attribute::Type))
            .any(|value| match value {
                Value::Url(url) => url.as_str() == expected,
                Value::Literal(literal) => literal == expected,
            })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Person => "person",
            EntityKind::Group => "group",
            EntityKind::Temporary => "temporary",
            EntityKind::Unregistered => "unregistered",
        };
        f.write_str(name)
    }
}
