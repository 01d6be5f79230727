//! Pending invite records, keyed by target.

use crate::errors::domain::DomainError;
use crate::repos::keys::{invite_key, sender_field, sender_from_field, PRESENT};
use crate::store::KvStore;

pub async fn save(store: &dyn KvStore, sender: &str, target: &str) -> Result<(), DomainError> {
    store
        .set_field(&invite_key(target), &sender_field(sender), PRESENT)
        .await
}

pub async fn exists(store: &dyn KvStore, sender: &str, target: &str) -> Result<bool, DomainError> {
    store
        .field_exists(&invite_key(target), &sender_field(sender))
        .await
}

/// True when the target has at least one pending invite.
pub async fn any_pending(store: &dyn KvStore, target: &str) -> Result<bool, DomainError> {
    store.collection_exists(&invite_key(target)).await
}

pub async fn remove(store: &dyn KvStore, sender: &str, target: &str) -> Result<(), DomainError> {
    store
        .delete_field(&invite_key(target), &sender_field(sender))
        .await
}

pub async fn remove_all(store: &dyn KvStore, target: &str) -> Result<(), DomainError> {
    store.delete_collection(&invite_key(target)).await
}

/// Senders with an outstanding invite to `target`, sorted by name.
pub async fn senders(store: &dyn KvStore, target: &str) -> Result<Vec<String>, DomainError> {
    let fields = store.get_all_fields(&invite_key(target)).await?;
    let mut senders: Vec<String> = fields
        .keys()
        .filter_map(|field| sender_from_field(field))
        .map(str::to_string)
        .collect();
    senders.sort();
    Ok(senders)
}

/// The sender accept/refuse act on when several invites are pending: the
/// smallest name, so the answer does not depend on store enumeration order.
pub async fn first_sender(store: &dyn KvStore, target: &str) -> Result<Option<String>, DomainError> {
    Ok(senders(store, target).await?.into_iter().next())
}
