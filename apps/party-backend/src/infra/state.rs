use std::sync::Arc;

use tracing::info;

use crate::config::{Config, StoreBackend, StoreConfig, SuccessionKind};
use crate::error::AppError;
use crate::infra::supervisor::ConnectionSupervisor;
use crate::services::succession::{policy_for, SuccessionPolicy};
use crate::services::PartyManager;
use crate::state::app_state::AppState;
use crate::store::{KvStore, MemoryStore, RedisConnector, RedisStore};

enum StoreChoice {
    Redis(StoreConfig),
    Memory(Arc<MemoryStore>),
}

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    store: StoreChoice,
    succession: Option<Box<dyn SuccessionPolicy>>,
    succession_kind: SuccessionKind,
    max_members: Option<usize>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            store: StoreChoice::Memory(Arc::new(MemoryStore::new())),
            succession: None,
            succession_kind: SuccessionKind::Random,
            max_members: None,
        }
    }

    /// Apply every setting from a loaded `Config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.store = match config.backend {
            StoreBackend::Redis => StoreChoice::Redis(config.store.clone()),
            StoreBackend::Memory => StoreChoice::Memory(Arc::new(MemoryStore::new())),
        };
        self.succession_kind = config.succession;
        self.max_members = config.max_members;
        self
    }

    /// Use a caller-owned in-memory store so tests can inspect it.
    pub fn with_memory_store(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = StoreChoice::Memory(store);
        self
    }

    pub fn with_succession(mut self, policy: Box<dyn SuccessionPolicy>) -> Self {
        self.succession = Some(policy);
        self
    }

    pub fn with_max_members(mut self, max_members: Option<usize>) -> Self {
        self.max_members = max_members;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let succession = self
            .succession
            .unwrap_or_else(|| policy_for(self.succession_kind));

        let (store, supervisor) = match self.store {
            StoreChoice::Redis(config) => {
                let connector = RedisConnector::new(&config)?;
                let supervisor =
                    ConnectionSupervisor::start(connector, config.supervisor_settings()).await?;
                let store: Arc<dyn KvStore> = Arc::new(RedisStore::new(supervisor.clone()));
                (store, Some(supervisor))
            }
            StoreChoice::Memory(store) => {
                info!("using in-memory party store; state is not persisted");
                let store: Arc<dyn KvStore> = store;
                (store, None)
            }
        };

        let parties = PartyManager::new(store)
            .with_succession(succession)
            .with_max_members(self.max_members);

        // Parties written before the index existed stay reachable.
        if let Some(supervisor) = &supervisor {
            if let Err(err) = parties.rebuild_index().await {
                supervisor.shutdown().await;
                return Err(err.into());
            }
        }

        let state = AppState::new(Arc::new(parties));
        Ok(match supervisor {
            Some(supervisor) => state.with_supervisor(supervisor),
            None => state,
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
