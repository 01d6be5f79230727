use std::sync::Arc;

use party_backend::infra::state::build_state;
use party_backend::services::succession::FirstByName;
use party_backend::state::app_state::AppState;
use party_backend::store::MemoryStore;
use party_backend::PartyManager;

/// Party manager over a fresh in-memory store with deterministic succession.
pub fn memory_parties() -> (Arc<MemoryStore>, PartyManager) {
    let store = Arc::new(MemoryStore::new());
    let parties = PartyManager::new(store.clone()).with_succession(Box::new(FirstByName));
    (store, parties)
}

/// `leader`'s party with every name in `members` invited and accepted.
pub async fn party_with(parties: &PartyManager, leader: &str, members: &[&str]) {
    parties.create_party(leader).await.expect("create party");
    for member in members {
        parties
            .invite_player(leader, member)
            .await
            .expect("invite member");
        assert!(
            parties
                .accept_invite(leader, member)
                .await
                .expect("accept invite"),
            "{member} should join {leader}'s party"
        );
    }
}

/// App state over a caller-visible in-memory store.
pub async fn memory_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = build_state()
        .with_memory_store(store.clone())
        .with_succession(Box::new(FirstByName))
        .build()
        .await
        .expect("build state");
    (store, state)
}
