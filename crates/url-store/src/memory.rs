//! In-process backend.
//!
//! [`InMemoryUrlRepository`] keeps URL records in a shared table. Each
//! transaction reads from a private snapshot and journals its writes; commit
//! replays the journal onto the current table. Uncommitted changes are never
//! visible and a dropped handle leaves nothing behind. Transactions on
//! different records commit independently; a commit whose writes clash with
//! one committed in between fails with [`TransactionError::Conflict`] and
//! applies nothing.
//!
//! IDs come from one shared counter, so they stay unique across overlapping
//! transactions. Like a database sequence, IDs handed to a transaction that
//! never commits are not reused.
//!
//! State sits behind a `std::sync::Mutex`; no guard is held across an
//! `.await`.
//!
//! The repository also records committed operations and can inject failures,
//! which makes it the backend of choice for reconciler tests and for
//! `url-store urls preview`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use product_url_store_core::{Store, UrlId, UrlKey, UrlRecord};

use crate::catalog::{CatalogError, StoreCatalog};
use crate::repository::{RepositoryError, TransactionError, UrlRepository, UrlTransaction};

/// A committed write, in commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOperation {
    /// A record was created; carries the stored record.
    Create(UrlRecord),
    /// A record was overwritten; carries the new state.
    Update(UrlRecord),
    /// A record was removed; carries its last state.
    Delete(UrlRecord),
}

#[derive(Debug, Clone, Default)]
struct UrlTable {
    records: BTreeMap<UrlId, UrlRecord>,
}

impl UrlTable {
    fn find(&self, key: &UrlKey) -> Option<&UrlRecord> {
        self.records.values().find(|record| record.key() == *key)
    }

    /// Fail if `key` is held by a record other than `owner`.
    fn ensure_free(&self, key: &UrlKey, owner: Option<UrlId>) -> Result<(), RepositoryError> {
        match self.find(key) {
            Some(existing) if existing.id != owner => Err(RepositoryError::Conflict(format!(
                "URL {} already exists for {key:?}",
                existing.url
            ))),
            _ => Ok(()),
        }
    }

    fn insert(&mut self, id: UrlId, url: &UrlRecord) -> Result<UrlRecord, RepositoryError> {
        self.ensure_free(&url.key(), None)?;

        let mut stored = url.clone();
        stored.id = Some(id);
        self.records.insert(id, stored.clone());
        Ok(stored)
    }

    fn update(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError> {
        let id = url.id.ok_or(RepositoryError::NotFound)?;
        if !self.records.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        self.ensure_free(&url.key(), Some(id))?;

        self.records.insert(id, url.clone());
        Ok(url.clone())
    }

    fn delete(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError> {
        let id = url.id.ok_or(RepositoryError::NotFound)?;
        self.records.remove(&id).ok_or(RepositoryError::NotFound)
    }

    fn apply(&mut self, operation: &UrlOperation) -> Result<(), RepositoryError> {
        match operation {
            UrlOperation::Create(url) => {
                let id = url.id.ok_or(RepositoryError::NotFound)?;
                self.insert(id, url).map(drop)
            }
            UrlOperation::Update(url) => self.update(url).map(drop),
            UrlOperation::Delete(url) => self.delete(url).map(drop),
        }
    }

    fn sorted(&self) -> Vec<UrlRecord> {
        let mut urls: Vec<_> = self.records.values().cloned().collect();
        urls.sort_by_key(UrlRecord::key);
        urls
    }
}

#[derive(Debug, Default)]
struct Shared {
    table: UrlTable,
    last_id: i32,
    operations: Vec<UrlOperation>,
    writes_left: Option<usize>,
    fail_next_commit: bool,
    transactions_started: usize,
    commits: usize,
    rollbacks: usize,
}

impl Shared {
    fn next_id(&mut self) -> UrlId {
        self.last_id += 1;
        UrlId::new(self.last_id)
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// URL repository backed by process memory.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUrlRepository {
    shared: Arc<Mutex<Shared>>,
}

impl InMemoryUrlRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record outside of any transaction, assigning it an ID.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the natural key is taken.
    pub fn seed(&self, url: UrlRecord) -> Result<UrlRecord, RepositoryError> {
        let mut shared = lock(&self.shared);
        shared.table.ensure_free(&url.key(), None)?;
        let id = shared.next_id();
        shared.table.insert(id, &url)
    }

    /// All committed records, ordered by natural key.
    #[must_use]
    pub fn urls(&self) -> Vec<UrlRecord> {
        lock(&self.shared).table.sorted()
    }

    /// Committed operations, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<UrlOperation> {
        lock(&self.shared).operations.clone()
    }

    /// Forget the recorded operations.
    pub fn clear_operations(&self) {
        lock(&self.shared).operations.clear();
    }

    /// Let `writes` more writes succeed, then fail the next one.
    ///
    /// The failure fires once; later writes succeed again.
    pub fn fail_after_writes(&self, writes: usize) {
        lock(&self.shared).writes_left = Some(writes);
    }

    /// Make the next commit fail without applying anything.
    pub fn fail_next_commit(&self) {
        lock(&self.shared).fail_next_commit = true;
    }

    /// Number of transactions begun so far.
    #[must_use]
    pub fn transactions_started(&self) -> usize {
        lock(&self.shared).transactions_started
    }

    /// Number of successful commits.
    #[must_use]
    pub fn commits(&self) -> usize {
        lock(&self.shared).commits
    }

    /// Number of explicit rollbacks.
    #[must_use]
    pub fn rollbacks(&self) -> usize {
        lock(&self.shared).rollbacks
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    type Transaction = InMemoryUrlTransaction;

    async fn begin(&self) -> Result<Self::Transaction, TransactionError> {
        let mut shared = lock(&self.shared);
        shared.transactions_started += 1;

        Ok(InMemoryUrlTransaction {
            shared: Arc::clone(&self.shared),
            staged: shared.table.clone(),
            operations: Vec::new(),
        })
    }
}

/// Transaction over an [`InMemoryUrlRepository`].
#[derive(Debug)]
pub struct InMemoryUrlTransaction {
    shared: Arc<Mutex<Shared>>,
    staged: UrlTable,
    operations: Vec<UrlOperation>,
}

impl InMemoryUrlTransaction {
    fn check_write(&self) -> Result<(), RepositoryError> {
        let mut shared = lock(&self.shared);
        match shared.writes_left {
            Some(0) => {
                shared.writes_left = None;
                Err(RepositoryError::Unavailable("injected write failure".to_string()))
            }
            Some(n) => {
                shared.writes_left = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UrlTransaction for InMemoryUrlTransaction {
    async fn create_url(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError> {
        self.check_write()?;
        self.staged.ensure_free(&url.key(), None)?;
        let id = lock(&self.shared).next_id();
        let stored = self.staged.insert(id, url)?;
        self.operations.push(UrlOperation::Create(stored.clone()));
        Ok(stored)
    }

    async fn update_url(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError> {
        self.check_write()?;
        let stored = self.staged.update(url)?;
        self.operations.push(UrlOperation::Update(stored.clone()));
        Ok(stored)
    }

    async fn delete_url(&mut self, url: &UrlRecord) -> Result<(), RepositoryError> {
        self.check_write()?;
        let removed = self.staged.delete(url)?;
        self.operations.push(UrlOperation::Delete(removed));
        Ok(())
    }

    async fn find_url(&mut self, key: &UrlKey) -> Result<Option<UrlRecord>, RepositoryError> {
        Ok(self.staged.find(key).cloned())
    }

    async fn commit(self) -> Result<(), TransactionError> {
        let mut shared = lock(&self.shared);
        if shared.fail_next_commit {
            shared.fail_next_commit = false;
            return Err(TransactionError::Unavailable(
                "injected commit failure".to_string(),
            ));
        }

        let mut table = shared.table.clone();
        for operation in &self.operations {
            table
                .apply(operation)
                .map_err(|e| TransactionError::Conflict(format!("{operation:?}: {e}")))?;
        }

        shared.table = table;
        shared.operations.extend(self.operations);
        shared.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), TransactionError> {
        lock(&self.shared).rollbacks += 1;
        Ok(())
    }
}

/// Fixed store catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoreCatalog {
    stores: Option<Vec<Store>>,
}

impl InMemoryStoreCatalog {
    /// A catalog listing `stores` in the given order.
    #[must_use]
    pub const fn new(stores: Vec<Store>) -> Self {
        Self {
            stores: Some(stores),
        }
    }

    /// A catalog whose every read fails.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { stores: None }
    }
}

#[async_trait]
impl StoreCatalog for InMemoryStoreCatalog {
    async fn all_stores(&self) -> Result<Vec<Store>, CatalogError> {
        self.stores
            .clone()
            .ok_or_else(|| CatalogError::Unavailable("store catalog is offline".to_string()))
    }
}
