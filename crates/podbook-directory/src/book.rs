use std::sync::Arc;

use podbook_client::ResourceClient;
use podbook_types::{Attribute, Document, ResourceUrl, TypeTag, Value};
use tracing::info;

use crate::batch::BatchRunner;
use crate::codec::EntityCodec;
use crate::config::DirectoryConfig;
use crate::directory::Directory;
use crate::error::{DirectoryError, DirectoryResult};
use crate::locator::IndexLocator;
use crate::membership::MembershipManager;
use crate::query::DirectoryQuery;
use crate::writer::EntityWriter;

/// Entry point: a resource client bound to an address book layout.
///
/// The components it hands out borrow the client and configuration; they
/// hold no state of their own and are cheap to create per call.
#[derive(Clone)]
pub struct AddressBook {
    client: Arc<dyn ResourceClient>,
    config: Arc<DirectoryConfig>,
}

impl AddressBook {
    /// Bind a client to a validated configuration.
    pub fn new(client: Arc<dyn ResourceClient>, config: DirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn with_defaults(client: Arc<dyn ResourceClient>) -> Self {
        Self {
            client,
            config: Arc::new(DirectoryConfig::default()),
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn client(&self) -> &dyn ResourceClient {
        self.client.as_ref()
    }

    pub fn codec(&self) -> EntityCodec<'_> {
        EntityCodec::new(&self.config)
    }

    pub fn locator(&self) -> IndexLocator<'_> {
        IndexLocator::new(self.client.as_ref(), &self.config)
    }

    pub fn writer(&self) -> EntityWriter<'_> {
        EntityWriter::new(self.client.as_ref(), &self.config)
    }

    pub fn membership(&self) -> MembershipManager<'_> {
        MembershipManager::new(self.client.as_ref(), &self.config)
    }

    pub fn query(&self) -> DirectoryQuery<'_> {
        DirectoryQuery::new(self.client.as_ref(), &self.config)
    }

    pub fn batch(&self) -> BatchRunner<'_> {
        BatchRunner::new(self.client.as_ref(), &self.config)
    }

    /// URL of the main index document of the address book in `container`.
    pub fn main_index_url(&self, container: &ResourceUrl) -> DirectoryResult<ResourceUrl> {
        if !container.is_container() {
            return Err(DirectoryError::NotAContainer(container.clone()));
        }
        Ok(container.join(&self.config.main_index_file)?)
    }

    /// Open an existing address book.
    pub async fn open(&self, container: &ResourceUrl) -> DirectoryResult<Directory> {
        let main_url = self.main_index_url(container)?;
        let main = self.client.get(&main_url).await?;
        let record = main_url.with_fragment(&self.config.record_fragment);
        Directory::new(container.clone(), main, record)
    }

    /// Create an address book in `container`, or open it if one is there.
    ///
    /// Only the container and the main index are written; the people and
    /// group indexes are created on first use.
    pub async fn create(&self, container: &ResourceUrl, name: &str) -> DirectoryResult<Directory> {
        let main_url = self.main_index_url(container)?;
        let record = main_url.with_fragment(&self.config.record_fragment);

        let mut main = match self.client.get(&main_url).await {
            Ok(document) if document.contains(&record) => {
                info!(container = %container, "address book already exists");
                return Directory::new(container.clone(), document, record);
            }
            Ok(document) => document,
            Err(e) if e.is_not_found() => {
                self.client.create_container(container).await?;
                Document::new(main_url.clone())
            }
            Err(e) => return Err(e.into()),
        };

        let vocab = &self.config.vocabulary;
        let book_type = self.codec().type_value(TypeTag::AddressBook)?;
        let entry = main.record_entry(&record);
        entry.set(vocab.iri(Attribute::Type), book_type);
        entry.set(vocab.iri(Attribute::FormattedName), Value::literal(name));
        let main = self.client.save(&main).await?;

        info!(container = %container, name, "created address book");
        Directory::new(container.clone(), main, record)
    }
}

impl std::fmt::Debug for AddressBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressBook")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
