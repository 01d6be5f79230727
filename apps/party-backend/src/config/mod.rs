//! Configuration loaded from environment variables.

pub mod app;
pub mod store;

pub use app::{Config, StoreBackend, SuccessionKind};
pub use store::StoreConfig;
