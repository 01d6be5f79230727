//! In-memory implementation of the backing store.
//!
//! Mirrors Redis hash semantics closely enough for the party engine:
//! collections vanish with their last field and batches apply atomically
//! under a single lock. State is not durable and not shared across
//! processes; it exists for tests and local development.
//!
//! `set_available(false)` makes every call fail with `StoreUnavailable`,
//! which is how tests exercise the outage path without a real server.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{glob_matches, Guard, KvStore, Mutation, StoreResult};
use crate::errors::domain::DomainError;

type Collections = HashMap<String, BTreeMap<String, String>>;

#[derive(Debug)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    available: AtomicBool,
    round_trips: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            round_trips: AtomicU64::new(0),
        }
    }

    /// Toggle simulated connectivity.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of calls served so far, failed ones included.
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Copy of one collection, for assertions.
    pub fn snapshot(&self, collection: &str) -> BTreeMap<String, String> {
        self.collections
            .lock()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self) -> StoreResult<()> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::store_unavailable("in-memory store marked unavailable"))
        }
    }

    fn apply_one(collections: &mut Collections, mutation: Mutation) {
        match mutation {
            Mutation::SetField {
                collection,
                field,
                value,
            } => {
                collections.entry(collection).or_default().insert(field, value);
            }
            Mutation::DeleteField { collection, field } => {
                if let Some(fields) = collections.get_mut(&collection) {
                    fields.remove(&field);
                    if fields.is_empty() {
                        collections.remove(&collection);
                    }
                }
            }
            Mutation::DeleteCollection { collection } => {
                collections.remove(&collection);
            }
        }
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set_field(&self, collection: &str, field: &str, value: &str) -> StoreResult<()> {
        self.check()?;
        Self::apply_one(
            &mut self.collections.lock(),
            Mutation::set(collection, field, value),
        );
        Ok(())
    }

    async fn get_field(&self, collection: &str, field: &str) -> StoreResult<Option<String>> {
        self.check()?;
        Ok(self
            .collections
            .lock()
            .get(collection)
            .and_then(|fields| fields.get(field))
            .cloned())
    }

    async fn delete_field(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.check()?;
        Self::apply_one(&mut self.collections.lock(), Mutation::delete(collection, field));
        Ok(())
    }

    async fn field_exists(&self, collection: &str, field: &str) -> StoreResult<bool> {
        self.check()?;
        Ok(self
            .collections
            .lock()
            .get(collection)
            .is_some_and(|fields| fields.contains_key(field)))
    }

    async fn get_all_fields(&self, collection: &str) -> StoreResult<HashMap<String, String>> {
        self.check()?;
        Ok(self
            .collections
            .lock()
            .get(collection)
            .map(|fields| fields.clone().into_iter().collect())
            .unwrap_or_default())
    }

    async fn delete_collection(&self, collection: &str) -> StoreResult<()> {
        self.check()?;
        self.collections.lock().remove(collection);
        Ok(())
    }

    async fn collection_exists(&self, collection: &str) -> StoreResult<bool> {
        self.check()?;
        Ok(self.collections.lock().contains_key(collection))
    }

    async fn list_collection_keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        self.check()?;
        let mut keys: Vec<String> = self
            .collections
            .lock()
            .keys()
            .filter(|key| glob_matches(pattern, key))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn apply(&self, batch: Vec<Mutation>) -> StoreResult<()> {
        self.check()?;
        let mut collections = self.collections.lock();
        for mutation in batch {
            Self::apply_one(&mut collections, mutation);
        }
        Ok(())
    }

    async fn apply_guarded(&self, guard: Guard, batch: Vec<Mutation>) -> StoreResult<bool> {
        self.check()?;
        let mut collections = self.collections.lock();
        let holds = match &guard {
            Guard::Absent { collection } => !collections.contains_key(collection),
            Guard::FieldEquals {
                collection,
                field,
                value,
            } => collections
                .get(collection)
                .and_then(|fields| fields.get(field))
                .is_some_and(|current| current == value),
        };
        if !holds {
            return Ok(false);
        }
        for mutation in batch {
            Self::apply_one(&mut collections, mutation);
        }
        Ok(true)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
}
