//! Behaviour every `KvStore` implementation must share.

use party_backend::store::{Guard, KvStore, MemoryStore, Mutation};
use party_test_support::unique_helpers::unique_player;

/// Unique collection names so runs against a shared Redis do not collide.
pub struct Keys {
    pub group: String,
    pub other: String,
    pub prefix: String,
}

impl Keys {
    pub fn new() -> Self {
        let prefix = format!("conformance_{}", unique_player("kv"));
        Self {
            group: format!("{prefix}:group"),
            other: format!("{prefix}:other"),
            prefix,
        }
    }
}

pub async fn fields_round_trip(store: &dyn KvStore) {
    let keys = Keys::new();

    assert!(!store.collection_exists(&keys.group).await.unwrap());
    assert_eq!(store.get_field(&keys.group, "Alice").await.unwrap(), None);

    store.set_field(&keys.group, "Alice", "true").await.unwrap();
    store.set_field(&keys.group, "Bob", "false").await.unwrap();
    store.set_field(&keys.group, "Bob", "true").await.unwrap();

    assert!(store.collection_exists(&keys.group).await.unwrap());
    assert!(store.field_exists(&keys.group, "Bob").await.unwrap());
    assert!(!store.field_exists(&keys.group, "Carol").await.unwrap());
    assert_eq!(
        store.get_field(&keys.group, "Bob").await.unwrap().as_deref(),
        Some("true")
    );

    let all = store.get_all_fields(&keys.group).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("Alice").map(String::as_str), Some("true"));

    store.delete_collection(&keys.group).await.unwrap();
}

pub async fn last_field_removal_drops_collection(store: &dyn KvStore) {
    let keys = Keys::new();
    store.set_field(&keys.group, "Alice", "true").await.unwrap();

    store.delete_field(&keys.group, "Alice").await.unwrap();
    store.delete_field(&keys.group, "Missing").await.unwrap();

    assert!(!store.collection_exists(&keys.group).await.unwrap());
    assert!(store.get_all_fields(&keys.group).await.unwrap().is_empty());
}

pub async fn batch_is_applied_whole(store: &dyn KvStore) {
    let keys = Keys::new();
    store.set_field(&keys.other, "stale", "x").await.unwrap();

    store
        .apply(vec![
            Mutation::set(keys.group.as_str(), "Alice", "true"),
            Mutation::set(keys.group.as_str(), "Bob", "false"),
            Mutation::delete(keys.group.as_str(), "Bob"),
            Mutation::drop_collection(keys.other.as_str()),
        ])
        .await
        .unwrap();
    store.apply(Vec::new()).await.unwrap();

    let all = store.get_all_fields(&keys.group).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all.contains_key("Alice"));
    assert!(!store.collection_exists(&keys.other).await.unwrap());

    store.delete_collection(&keys.group).await.unwrap();
}

pub async fn keys_match_prefix_pattern(store: &dyn KvStore) {
    let keys = Keys::new();
    store.set_field(&keys.group, "Alice", "true").await.unwrap();
    store.set_field(&keys.other, "Bob", "true").await.unwrap();

    let listed = store
        .list_collection_keys(&format!("{}:*", keys.prefix))
        .await
        .unwrap();
    assert_eq!(listed, vec![keys.group.clone(), keys.other.clone()]);

    let listed = store
        .list_collection_keys(&format!("{}:gr*", keys.prefix))
        .await
        .unwrap();
    assert_eq!(listed, vec![keys.group.clone()]);

    store.delete_collection(&keys.group).await.unwrap();
    store.delete_collection(&keys.other).await.unwrap();
}

pub async fn guarded_batch_checks_before_writing(store: &dyn KvStore) {
    let keys = Keys::new();
    assert!(store
        .apply_guarded(
            Guard::absent(keys.group.as_str()),
            vec![
                Mutation::set(keys.group.as_str(), "Alice", "true"),
                Mutation::set(keys.other.as_str(), "Alice", "g"),
            ],
        )
        .await
        .unwrap());
    assert!(!store
        .apply_guarded(
            Guard::absent(keys.group.as_str()),
            vec![Mutation::set(keys.group.as_str(), "Bob", "true")],
        )
        .await
        .unwrap());
    assert!(!store.field_exists(&keys.group, "Bob").await.unwrap());

    // Compare-and-delete only fires on the expected value.
    assert!(!store
        .apply_guarded(
            Guard::field_equals(keys.other.as_str(), "Alice", "h"),
            vec![Mutation::delete(keys.other.as_str(), "Alice")],
        )
        .await
        .unwrap());
    assert!(!store
        .apply_guarded(
            Guard::field_equals(keys.other.as_str(), "Missing", "g"),
            vec![Mutation::drop_collection(keys.other.as_str())],
        )
        .await
        .unwrap());
    assert_eq!(
        store.get_field(&keys.other, "Alice").await.unwrap().as_deref(),
        Some("g")
    );
    assert!(store
        .apply_guarded(
            Guard::field_equals(keys.other.as_str(), "Alice", "g"),
            vec![
                Mutation::delete(keys.other.as_str(), "Alice"),
                Mutation::drop_collection(keys.group.as_str()),
            ],
        )
        .await
        .unwrap());
    assert!(!store.collection_exists(&keys.other).await.unwrap());
    assert!(!store.collection_exists(&keys.group).await.unwrap());
}

pub async fn run_all(store: &dyn KvStore) {
    store.ping().await.unwrap();
    fields_round_trip(store).await;
    last_field_removal_drops_collection(store).await;
    batch_is_applied_whole(store).await;
    keys_match_prefix_pattern(store).await;
    guarded_batch_checks_before_writing(store).await;
}

#[tokio::test]
async fn memory_store_conforms() {
    let store = MemoryStore::new();
    run_all(&store).await;
}

#[tokio::test]
async fn unavailable_memory_store_fails_every_call() {
    let store = MemoryStore::new();
    store.set_available(false);

    assert!(store.ping().await.unwrap_err().is_store_unavailable());
    assert!(store
        .set_field("c", "f", "v")
        .await
        .unwrap_err()
        .is_store_unavailable());
    assert!(store
        .apply(vec![Mutation::set("c", "f", "v")])
        .await
        .unwrap_err()
        .is_store_unavailable());
    assert!(store
        .list_collection_keys("*")
        .await
        .unwrap_err()
        .is_store_unavailable());
}
