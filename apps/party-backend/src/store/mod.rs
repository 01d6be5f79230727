//! Backing store client.
//!
//! A thin operation set over a hash-collection key-value store: every call
//! performs one round trip and either succeeds or fails with
//! `DomainError::Infra(StoreUnavailable | Timeout, ..)`. Nothing at this
//! layer retries.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::domain::DomainError;

pub mod memory;
pub mod redis_store;
pub mod redis_errors;

pub use memory::MemoryStore;
pub use redis_store::{RedisConnector, RedisStore};

pub type StoreResult<T> = Result<T, DomainError>;

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetField {
        collection: String,
        field: String,
        value: String,
    },
    DeleteField {
        collection: String,
        field: String,
    },
    DeleteCollection {
        collection: String,
    },
}

impl Mutation {
    pub fn set(
        collection: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::SetField {
            collection: collection.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn delete(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::DeleteField {
            collection: collection.into(),
            field: field.into(),
        }
    }

    pub fn drop_collection(collection: impl Into<String>) -> Self {
        Self::DeleteCollection {
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Self::SetField { collection, .. }
            | Self::DeleteField { collection, .. }
            | Self::DeleteCollection { collection } => collection,
        }
    }
}

/// Precondition checked atomically with a guarded batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// The collection has no fields.
    Absent { collection: String },
    /// The field currently holds exactly this value.
    FieldEquals {
        collection: String,
        field: String,
        value: String,
    },
}

impl Guard {
    pub fn absent(collection: impl Into<String>) -> Self {
        Self::Absent {
            collection: collection.into(),
        }
    }

    pub fn field_equals(
        collection: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::FieldEquals {
            collection: collection.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Hash-collection store. A collection whose last field is deleted no
/// longer exists.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn set_field(&self, collection: &str, field: &str, value: &str) -> StoreResult<()>;
    async fn get_field(&self, collection: &str, field: &str) -> StoreResult<Option<String>>;
    async fn delete_field(&self, collection: &str, field: &str) -> StoreResult<()>;
    async fn field_exists(&self, collection: &str, field: &str) -> StoreResult<bool>;
    async fn get_all_fields(&self, collection: &str) -> StoreResult<HashMap<String, String>>;
    async fn delete_collection(&self, collection: &str) -> StoreResult<()>;
    async fn collection_exists(&self, collection: &str) -> StoreResult<bool>;

    /// Collection keys matching a glob pattern where `*` matches any run of
    /// characters.
    async fn list_collection_keys(&self, pattern: &str) -> StoreResult<Vec<String>>;

    /// Apply every mutation or none of them.
    async fn apply(&self, batch: Vec<Mutation>) -> StoreResult<()>;

    /// Apply the batch atomically if `guard` holds at that moment. Returns
    /// `false`, writing nothing, when it does not.
    async fn apply_guarded(&self, guard: Guard, batch: Vec<Mutation>) -> StoreResult<bool>;

    /// Liveness probe.
    async fn ping(&self) -> StoreResult<()>;
}

/// Glob match supporting `*` only, which is all the key schema needs.
pub(crate) fn glob_matches(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let (first, rest) = (parts[0], &parts[1..]);
    let Some(mut remaining) = key.strip_prefix(first) else {
        return false;
    };

    let last = rest[rest.len() - 1];
    for middle in &rest[..rest.len() - 1] {
        match remaining.find(middle) {
            Some(idx) => remaining = &remaining[idx + middle.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}
