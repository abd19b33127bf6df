//! Resource client interface for Podbook.
//!
//! Everything Podbook knows about storage goes through the async
//! [`ResourceClient`] trait: get, save, delete, create a container, list a
//! container. Authentication and the HTTP transport live behind
//! implementations of that trait and are not part of this workspace.
//!
//! # Modules
//!
//! - [`error`] -- [`ClientError`] and its coarse [`ErrorKind`] classification
//! - [`traits`] -- The [`ResourceClient`] trait
//! - [`memory`] -- [`InMemoryResourceClient`] with fault injection and a call journal

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ClientError, ClientResult, ErrorKind};
pub use memory::{InMemoryResourceClient, JournalEntry, Operation};
pub use traits::ResourceClient;
