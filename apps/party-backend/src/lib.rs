#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod error;
pub mod errors;
pub mod infra;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

// Re-exports for public API
pub use config::{Config, StoreConfig};
pub use error::AppError;
pub use errors::domain::DomainError;
pub use infra::state::build_state;
pub use infra::supervisor::{ConnectionSupervisor, Connector, SupervisorSettings};
pub use middleware::request_trace::RequestTrace;
pub use services::PartyManager;
pub use state::app_state::AppState;
pub use store::{Guard, KvStore, MemoryStore, Mutation};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    party_test_support::logging::init();
}
