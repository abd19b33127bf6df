//! In-memory resource client for tests and embedding.
//!
//! [`InMemoryResourceClient`] behaves like a personal data store: saving a
//! document creates its ancestor containers, a non-empty container cannot be
//! deleted, and listing a container returns its direct children. Faults can
//! be injected per operation and URL, and every call is journaled so tests
//! can assert the order in which a multi-step operation touched storage.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use podbook_types::{Document, ResourceUrl};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult, ErrorKind};
use crate::traits::ResourceClient;

/// The client operation a journal entry or fault refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Get,
    Save,
    Delete,
    CreateContainer,
    ListContainer,
}

/// One recorded client call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEntry {
    pub operation: Operation,
    pub url: ResourceUrl,
    pub succeeded: bool,
}

#[derive(Debug)]
struct Fault {
    operation: Operation,
    url: ResourceUrl,
    kind: ErrorKind,
    /// `None` fails forever.
    remaining: Option<usize>,
}

/// An in-memory implementation of [`ResourceClient`].
pub struct InMemoryResourceClient {
    documents: RwLock<BTreeMap<ResourceUrl, Document>>,
    containers: RwLock<BTreeSet<ResourceUrl>>,
    faults: Mutex<Vec<Fault>>,
    journal: Mutex<Vec<JournalEntry>>,
}

impl InMemoryResourceClient {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            containers: RwLock::new(BTreeSet::new()),
            faults: Mutex::new(Vec::new()),
            journal: Mutex::new(Vec::new()),
        }
    }

    // ---------------------------------------------------------------
    // Seeding and inspection (never journaled)
    // ---------------------------------------------------------------

    /// Store a document directly, bypassing faults and the journal.
    pub fn insert(&self, document: Document) {
        self.add_ancestors(document.url());
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(document.url().clone(), document);
    }

    /// Create a container directly, bypassing faults and the journal.
    pub fn insert_container(&self, url: &ResourceUrl) {
        self.add_ancestors(url);
        self.containers.write().expect("lock poisoned").insert(url.clone());
    }

    /// Current revision of a document, if any.
    pub fn document(&self, url: &ResourceUrl) -> Option<Document> {
        self.documents
            .read()
            .expect("lock poisoned")
            .get(&url.document())
            .cloned()
    }

    pub fn contains_document(&self, url: &ResourceUrl) -> bool {
        self.documents
            .read()
            .expect("lock poisoned")
            .contains_key(&url.document())
    }

    pub fn contains_container(&self, url: &ResourceUrl) -> bool {
        self.containers.read().expect("lock poisoned").contains(url)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Serialize every stored document as a JSON array.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        let documents: Vec<Document> = self
            .documents
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect();
        serde_json::to_string_pretty(&documents)
    }

    /// Load documents from a JSON array produced by [`export_json`](Self::export_json).
    pub fn import_json(&self, json: &str) -> Result<usize, serde_json::Error> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        let count = documents.len();
        for document in documents {
            self.insert(document);
        }
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Fault injection
    // ---------------------------------------------------------------

    /// Fail the next `operation` on `url` once.
    pub fn fail_next(&self, operation: Operation, url: &ResourceUrl, kind: ErrorKind) {
        self.fail_times(operation, url, kind, 1);
    }

    /// Fail the next `times` calls of `operation` on `url`.
    pub fn fail_times(&self, operation: Operation, url: &ResourceUrl, kind: ErrorKind, times: usize) {
        if times > 0 {
            self.push_fault(operation, url, kind, Some(times));
        }
    }

    /// Fail every call of `operation` on `url` until faults are cleared.
    pub fn fail_always(&self, operation: Operation, url: &ResourceUrl, kind: ErrorKind) {
        self.push_fault(operation, url, kind, None);
    }

    pub fn clear_faults(&self) {
        self.faults.lock().expect("lock poisoned").clear();
    }

    fn push_fault(&self, operation: Operation, url: &ResourceUrl, kind: ErrorKind, remaining: Option<usize>) {
        self.faults.lock().expect("lock poisoned").push(Fault {
            operation,
            url: url.document(),
            kind,
            remaining,
        });
    }

    /// Consume a matching fault, if one is armed.
    fn take_fault(&self, operation: Operation, url: &ResourceUrl) -> Option<ClientError> {
        let mut faults = self.faults.lock().expect("lock poisoned");
        let position = faults
            .iter()
            .position(|f| f.operation == operation && &f.url == url)?;
        let kind = faults[position].kind;
        if let Some(remaining) = faults[position].remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                faults.remove(position);
            }
        }
        debug!(?operation, url = %url, ?kind, "injected fault");
        Some(ClientError::of_kind(kind, url.clone()))
    }

    // ---------------------------------------------------------------
    // Journal
    // ---------------------------------------------------------------

    /// Every call made so far, in order.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().expect("lock poisoned").clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().expect("lock poisoned").clear();
    }

    /// Successful writes (save, delete, create-container) in call order.
    pub fn writes(&self) -> Vec<(Operation, ResourceUrl)> {
        self.journal()
            .into_iter()
            .filter(|e| e.succeeded && e.operation != Operation::Get && e.operation != Operation::ListContainer)
            .map(|e| (e.operation, e.url))
            .collect()
    }

    fn record<T>(&self, operation: Operation, url: &ResourceUrl, result: &ClientResult<T>) {
        self.journal.lock().expect("lock poisoned").push(JournalEntry {
            operation,
            url: url.clone(),
            succeeded: result.is_ok(),
        });
    }

    // ---------------------------------------------------------------
    // Container bookkeeping
    // ---------------------------------------------------------------

    fn add_ancestors(&self, url: &ResourceUrl) {
        let mut containers = self.containers.write().expect("lock poisoned");
        let mut current = url.parent();
        while let Some(container) = current {
            current = container.parent();
            containers.insert(container);
        }
    }

    fn children(&self, container: &ResourceUrl) -> Vec<ResourceUrl> {
        let documents = self.documents.read().expect("lock poisoned");
        let containers = self.containers.read().expect("lock poisoned");
        let mut children: Vec<ResourceUrl> = documents
            .keys()
            .chain(containers.iter())
            .filter(|child| child.parent().as_ref() == Some(container))
            .cloned()
            .collect();
        children.sort();
        children
    }

    fn do_get(&self, url: &ResourceUrl) -> ClientResult<Document> {
        if let Some(err) = self.take_fault(Operation::Get, url) {
            return Err(err);
        }
        self.document(url)
            .ok_or_else(|| ClientError::NotFound(url.clone()))
    }

    fn do_save(&self, document: &Document) -> ClientResult<Document> {
        let url = document.url();
        if let Some(err) = self.take_fault(Operation::Save, url) {
            return Err(err);
        }
        if url.is_container() {
            return Err(ClientError::other(url.clone(), "cannot save a document at a container url"));
        }
        if self.contains_container(url) {
            return Err(ClientError::other(url.clone(), "a container exists at this url"));
        }
        self.insert(document.clone());
        Ok(document.clone())
    }

    fn do_delete(&self, url: &ResourceUrl) -> ClientResult<()> {
        if let Some(err) = self.take_fault(Operation::Delete, url) {
            return Err(err);
        }
        if url.is_container() {
            if !self.contains_container(url) {
                return Err(ClientError::NotFound(url.clone()));
            }
            if !self.children(url).is_empty() {
                return Err(ClientError::other(url.clone(), "container is not empty"));
            }
            self.containers.write().expect("lock poisoned").remove(url);
            return Ok(());
        }
        self.documents
            .write()
            .expect("lock poisoned")
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(url.clone()))
    }

    fn do_create_container(&self, url: &ResourceUrl) -> ClientResult<()> {
        if let Some(err) = self.take_fault(Operation::CreateContainer, url) {
            return Err(err);
        }
        if !url.is_container() {
            return Err(ClientError::other(url.clone(), "container urls must end with '/'"));
        }
        self.insert_container(url);
        Ok(())
    }

    fn do_list_container(&self, url: &ResourceUrl) -> ClientResult<Vec<ResourceUrl>> {
        if let Some(err) = self.take_fault(Operation::ListContainer, url) {
            return Err(err);
        }
        if !self.contains_container(url) {
            return Err(ClientError::NotFound(url.clone()));
        }
        Ok(self.children(url))
    }
}

impl Default for InMemoryResourceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryResourceClient")
            .field("documents", &self.len())
            .field(
                "containers",
                &self.containers.read().expect("lock poisoned").len(),
            )
            .finish()
    }
}

#[async_trait]
impl ResourceClient for InMemoryResourceClient {
    async fn get(&self, url: &ResourceUrl) -> ClientResult<Document> {
        let url = url.document();
        let result = self.do_get(&url);
        self.record(Operation::Get, &url, &result);
        result
    }

    async fn save(&self, document: &Document) -> ClientResult<Document> {
        let result = self.do_save(document);
        self.record(Operation::Save, document.url(), &result);
        result
    }

    async fn delete(&self, url: &ResourceUrl) -> ClientResult<()> {
        let url = url.document();
        let result = self.do_delete(&url);
        self.record(Operation::Delete, &url, &result);
        result
    }

    async fn create_container(&self, url: &ResourceUrl) -> ClientResult<()> {
        let result = self.do_create_container(url);
        self.record(Operation::CreateContainer, url, &result);
        result
    }

    async fn list_container(&self, url: &ResourceUrl) -> ClientResult<Vec<ResourceUrl>> {
        let result = self.do_list_container(url);
        self.record(Operation::ListContainer, url, &result);
        result
    }
}
