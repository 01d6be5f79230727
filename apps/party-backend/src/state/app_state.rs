use std::sync::Arc;

use crate::infra::supervisor::ConnectionSupervisor;
use crate::services::PartyManager;
use crate::store::{KvStore, RedisConnector};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Party engine shared by every handler
    pub parties: Arc<PartyManager>,
    /// Redis connection supervisor (absent when running on the in-memory store)
    pub supervisor: Option<Arc<ConnectionSupervisor<RedisConnector>>>,
}

impl AppState {
    pub fn new(parties: Arc<PartyManager>) -> Self {
        Self {
            parties,
            supervisor: None,
        }
    }

    pub fn with_supervisor(mut self, supervisor: Arc<ConnectionSupervisor<RedisConnector>>) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        self.parties.store()
    }

    /// Stop the store probe, if one is running.
    pub async fn shutdown(&self) {
        if let Some(supervisor) = &self.supervisor {
            supervisor.shutdown().await;
        }
    }
}
