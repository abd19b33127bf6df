//! Logical attribute names and the map to their storage identifiers.
//!
//! Code always talks about [`Attribute`] and [`TypeTag`]; only a
//! [`Vocabulary`] knows which identifier a store actually uses. The map is a
//! plain struct with one field per variant, so a missing entry is a compile
//! error rather than a runtime lookup failure.

use serde::{Deserialize, Serialize};

const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const VCARD: &str = "http://www.w3.org/2006/vcard/ns#";
const OWL: &str = "http://www.w3.org/2002/07/owl#";

/// Attributes the directory reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Declared type of a record (its type tag).
    Type,
    /// Display name.
    FormattedName,
    /// Back-reference from an entity or index entry to the address book.
    InAddressBook,
    IncludesGroup,
    /// Member reference on a group record.
    HasMember,
    /// Link from the main index to the people index.
    NameEmailIndex,
    /// Link from the main index to the group index.
    GroupIndex,
    HasUid,
    HasEmail,
    Note,
    /// The agent (e.g. a WebID) a contact stands for.
    SameAs,
}

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::Type,
        Attribute::FormattedName,
        Attribute::InAddressBook,
        Attribute::IncludesGroup,
        Attribute::HasMember,
        Attribute::NameEmailIndex,
        Attribute::GroupIndex,
        Attribute::HasUid,
        Attribute::HasEmail,
        Attribute::Note,
        Attribute::SameAs,
    ];
}

/// Record type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    AddressBook,
    Individual,
    Group,
}

impl TypeTag {
    pub const ALL: [TypeTag; 3] = [TypeTag::AddressBook, TypeTag::Individual, TypeTag::Group];
}

/// Storage identifiers for every [`Attribute`] and [`TypeTag`].
///
/// Defaults to the vCard vocabulary. Deserialization fills unspecified
/// fields from the defaults, so a configuration only lists overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub type_predicate: String,
    pub formatted_name: String,
    pub in_address_book: String,
    pub includes_group: String,
    pub has_member: String,
    pub name_email_index: String,
    pub group_index: String,
    pub has_uid: String,
    pub has_email: String,
    pub note: String,
    pub same_as: String,
    pub address_book_type: String,
    pub individual_type: String,
    pub group_type: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            type_predicate: format!("{RDF}type"),
            formatted_name: format!("{VCARD}fn"),
            in_address_book: format!("{VCARD}inAddressBook"),
            includes_group: format!("{VCARD}includesGroup"),
            has_member: format!("{VCARD}hasMember"),
            name_email_index: format!("{VCARD}nameEmailIndex"),
            group_index: format!("{VCARD}groupIndex"),
            has_uid: format!("{VCARD}hasUID"),
            has_email: format!("{VCARD}hasEmail"),
            note: format!("{VCARD}note"),
            same_as: format!("{OWL}sameAs"),
            address_book_type: format!("{VCARD}AddressBook"),
            individual_type: format!("{VCARD}Individual"),
            group_type: format!("{VCARD}Group"),
        }
    }
}

impl Vocabulary {
    /// Storage identifier of an attribute.
    pub fn iri(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Type => &self.type_predicate,
            Attribute::FormattedName => &self.formatted_name,
            Attribute::InAddressBook => &self.in_address_book,
            Attribute::IncludesGroup => &self.includes_group,
            Attribute::HasMember => &self.has_member,
            Attribute::NameEmailIndex => &self.name_email_index,
            Attribute::GroupIndex => &self.group_index,
            Attribute::HasUid => &self.has_uid,
            Attribute::HasEmail => &self.has_email,
            Attribute::Note => &self.note,
            Attribute::SameAs => &self.same_as,
        }
    }

    /// Storage identifier of a type tag.
    pub fn type_iri(&self, tag: TypeTag) -> &str {
        match tag {
            TypeTag::AddressBook => &self.address_book_type,
            TypeTag::Individual => &self.individual_type,
            TypeTag::Group => &self.group_type,
        }
    }
}
