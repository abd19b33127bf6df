//! Address book maintenance over a remote document store.
//!
//! An address book is a container holding a main index, a people index, a
//! group index and one document per contact or group. The store has no
//! transactions, so every operation here is a fixed sequence of independent
//! reads and writes. This crate defines that sequence and what is left
//! behind when a step fails.
//!
//! # Layout
//!
//! ```text
//! <container>/index.ttl               main index, links the two below
//! <container>/people.ttl              one entry per contact
//! <container>/groups.ttl              one entry per group
//! <container>/Person/<id>/index.ttl   a contact
//! <container>/Group/<id>/index.ttl    a group and its members
//! ```
//!
//! # Components
//!
//! - [`AddressBook`] -- entry point binding a client to a configuration
//! - [`IndexLocator`] -- finds, creates and links index documents
//! - [`EntityCodec`] -- builds and reads entity records and index entries
//! - [`EntityWriter`] -- create, rename and delete
//! - [`MembershipManager`] -- group member changes
//! - [`DirectoryQuery`] -- listing across indexes
//! - [`BatchRunner`] -- concurrent all-settle batches
//!
//! # Ordering rules
//!
//! 1. Create writes the entity before its index entry.
//! 2. Delete removes the index entry before the entity.
//! 3. A new index is linked on the main index before its first entry.
//! 4. Failed steps are never rolled back; retries converge.

pub mod batch;
pub mod book;
pub mod codec;
pub mod config;
pub mod directory;
pub mod entity;
pub mod error;
pub mod kind;
pub mod locator;
pub mod membership;
pub mod query;
pub mod writer;

#[cfg(test)]
mod testing;

pub use batch::{settle_all, BatchItem, BatchOutcome, BatchRunner, Onboarding, OnboardingReport};
pub use book::AddressBook;
pub use codec::{Attributes, EntityCodec, Mutation};
pub use config::DirectoryConfig;
pub use directory::{Directory, IndexDocument};
pub use entity::Entity;
pub use error::{DirectoryError, DirectoryResult};
pub use kind::EntityKind;
pub use locator::IndexLocator;
pub use membership::MembershipManager;
pub use query::DirectoryQuery;
pub use writer::{Created, EntityWriter, Renamed};

// Re-export the types callers need to build requests.
pub use podbook_client::{ClientError, ErrorKind, ResourceClient};
pub use podbook_types::{Attribute, EntityId, ResourceUrl, Vocabulary};
