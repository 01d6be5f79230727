use party_backend::store::KvStore;

use crate::support::fixtures::{memory_parties, party_with};

#[tokio::test]
async fn stale_index_entry_reads_as_not_in_party_and_is_removed() {
    let (store, parties) = memory_parties();
    party_with(&parties, "Alice", &[]).await;
    store
        .set_field("group_index", "Ghost", "group_1")
        .await
        .unwrap();

    assert!(!parties.is_player_in_party("Ghost").await.unwrap());
    assert!(!store.snapshot("group_index").contains_key("Ghost"));

    // A healed player can start a party of their own.
    parties.create_party("Ghost").await.unwrap();
    assert!(parties.is_player_leader("Ghost").await.unwrap());
}

#[tokio::test]
async fn index_pointing_at_missing_group_is_healed() {
    let (store, parties) = memory_parties();
    store
        .set_field("group_index", "Bob", "group_42")
        .await
        .unwrap();

    assert!(parties.get_party_members("Bob").await.unwrap().is_empty());
    assert!(store.snapshot("group_index").is_empty());
}

#[tokio::test]
async fn rebuild_makes_unindexed_parties_reachable() {
    let (store, parties) = memory_parties();
    store.set_field("group:group_3", "Alice", "true").await.unwrap();
    store.set_field("group:group_3", "Bob", "false").await.unwrap();

    assert!(!parties.is_player_in_party("Bob").await.unwrap());

    assert_eq!(parties.rebuild_index().await.unwrap(), 2);
    assert!(parties.is_player_in_party("Bob").await.unwrap());
    assert!(parties.is_player_leader("Alice").await.unwrap());

    parties.create_party("Carol").await.unwrap();
    assert_eq!(
        parties.get_party("Carol").await.unwrap().unwrap().name,
        "group_1"
    );
}

#[tokio::test]
async fn index_tracks_every_membership_change() {
    let (store, parties) = memory_parties();
    party_with(&parties, "Alice", &["Bob", "Carol"]).await;
    party_with(&parties, "Dave", &[]).await;

    let index = store.snapshot("group_index");
    assert_eq!(index.len(), 4);
    assert_eq!(index.get("Carol").map(String::as_str), Some("group_1"));
    assert_eq!(index.get("Dave").map(String::as_str), Some("group_2"));

    parties.exclude_player("Bob").await.unwrap();
    parties.disband_party("Dave").await.unwrap();

    let index = store.snapshot("group_index");
    assert_eq!(index.len(), 2);
    assert!(index.contains_key("Alice"));
    assert!(index.contains_key("Carol"));
}
