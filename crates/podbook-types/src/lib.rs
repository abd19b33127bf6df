//! Foundation types for Podbook.
//!
//! Podbook maintains an address book (contacts and groups) stored as a set of
//! independent documents on a remote personal data store. This crate holds
//! the types every other Podbook crate shares.
//!
//! # Key Types
//!
//! - [`ResourceUrl`] -- Validated absolute URL of a container, document or subject
//! - [`EntityId`] -- UUID v7 identifier minted for every stored contact or group
//! - [`Document`] / [`Record`] / [`Value`] -- The document shape the directory reads and writes
//! - [`Attribute`] / [`TypeTag`] -- Logical attribute and type names
//! - [`Vocabulary`] -- Map from logical names to storage identifiers

pub mod document;
pub mod error;
pub mod id;
pub mod resource;
pub mod vocab;

pub use document::{Document, Record, Value};
pub use error::TypeError;
pub use id::EntityId;
pub use resource::ResourceUrl;
pub use vocab::{Attribute, TypeTag, Vocabulary};
