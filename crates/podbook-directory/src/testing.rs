//! Shared fixtures for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use podbook_client::{ClientResult, InMemoryResourceClient, ResourceClient};
use podbook_types::{Document, ResourceUrl};

use crate::book::AddressBook;
use crate::codec::Attributes;
use crate::directory::Directory;
use crate::kind::EntityKind;
use crate::writer::Created;

pub(crate) const CONTAINER: &str = "https://pod.example/contacts/";

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub(crate) fn url(s: &str) -> ResourceUrl {
    ResourceUrl::parse(s).unwrap()
}

/// Hands control back to the runtime before every call, so futures driven
/// together interleave their reads and writes.
pub(crate) struct YieldingClient {
    pub inner: Arc<InMemoryResourceClient>,
}

#[async_trait]
impl ResourceClient for YieldingClient {
    async fn get(&self, url: &ResourceUrl) -> ClientResult<Document> {
        tokio::task::yield_now().await;
        self.inner.get(url).await
    }

    async fn save(&self, document: &Document) -> ClientResult<Document> {
        tokio::task::yield_now().await;
        self.inner.save(document).await
    }

    async fn delete(&self, url: &ResourceUrl) -> ClientResult<()> {
        tokio::task::yield_now().await;
        self.inner.delete(url).await
    }

    async fn create_container(&self, url: &ResourceUrl) -> ClientResult<()> {
        tokio::task::yield_now().await;
        self.inner.create_container(url).await
    }

    async fn list_container(&self, url: &ResourceUrl) -> ClientResult<Vec<ResourceUrl>> {
        tokio::task::yield_now().await;
        self.inner.list_container(url).await
    }
}

/// An address book freshly created in an in-memory store, with an empty
/// journal.
pub(crate) struct Fixture {
    pub client: Arc<InMemoryResourceClient>,
    pub book: AddressBook,
    pub directory: Directory,
}

impl Fixture {
    pub async fn new() -> Self {
        init_tracing();
        let client = Arc::new(InMemoryResourceClient::new());
        let book = AddressBook::with_defaults(client.clone());
        let directory = book.create(&url(CONTAINER), "Contacts").await.unwrap();
        client.clear_journal();
        Self {
            client,
            book,
            directory,
        }
    }

    /// Create an entity and adopt the returned directory.
    pub async fn create(&mut self, kind: EntityKind, name: &str) -> Created {
        let created = self
            .book
            .writer()
            .create(self.directory.clone(), kind, &Attributes::named(name))
            .await
            .unwrap();
        self.directory = created.directory.clone();
        created
    }

    /// A second handle on the same store whose calls interleave.
    pub fn interleaved(&self) -> AddressBook {
        AddressBook::with_defaults(Arc::new(YieldingClient {
            inner: self.client.clone(),
        }))
    }

    pub async fn names(&self, kinds: &[EntityKind]) -> Vec<String> {
        let mut names: Vec<String> = self
            .book
            .query()
            .list(&self.directory, kinds)
            .await
            .unwrap()
            .into_iter()
            .map(|entity| entity.name().to_string())
            .collect();
        names.sort();
        names
    }
}
