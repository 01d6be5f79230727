//! Centralized application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::store::StoreConfig;
use crate::error::AppError;

/// Which backing store implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    /// Process-local store for development; state is lost on restart.
    Memory,
}

/// Leader selection policy used when a leader leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessionKind {
    Random,
    FirstByName,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Store configuration
    pub backend: StoreBackend,
    pub store: StoreConfig,

    // Party rules
    pub max_members: Option<usize>,
    pub succession: SuccessionKind,
}

impl Config {
    /// Load and validate all configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("BACKEND_PORT", 3001u16)?;

        let backend = match env::var("PARTY_STORE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "redis" => StoreBackend::Redis,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::config(format!(
                    "PARTY_STORE must be 'redis' or 'memory', got '{other}'"
                )))
            }
        };

        let defaults = StoreConfig::default();
        let probe_secs = parse_var("REDIS_PROBE_INTERVAL_SECS", 5u64)?;
        if probe_secs == 0 {
            return Err(AppError::config("REDIS_PROBE_INTERVAL_SECS must be greater than 0"));
        }
        let timeout_ms = parse_var("REDIS_TIMEOUT_MS", 2000u64)?;
        if timeout_ms == 0 {
            return Err(AppError::config("REDIS_TIMEOUT_MS must be greater than 0"));
        }

        let store = StoreConfig {
            host: env::var("REDIS_HOST").unwrap_or(defaults.host),
            port: parse_var("REDIS_PORT", defaults.port)?,
            password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            db: parse_var("REDIS_DB", defaults.db)?,
            probe_interval: Duration::from_secs(probe_secs),
            timeout: Duration::from_millis(timeout_ms),
        };

        let max_members = match env::var("PARTY_MAX_MEMBERS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let limit = raw.trim().parse::<usize>().map_err(|_| {
                    AppError::config(format!(
                        "PARTY_MAX_MEMBERS must be a positive integer, got '{raw}'"
                    ))
                })?;
                if limit < 2 {
                    return Err(AppError::config("PARTY_MAX_MEMBERS must be at least 2"));
                }
                Some(limit)
            }
            _ => None,
        };

        let succession = match env::var("PARTY_SUCCESSION")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "random" => SuccessionKind::Random,
            "first" => SuccessionKind::FirstByName,
            other => {
                return Err(AppError::config(format!(
                    "PARTY_SUCCESSION must be 'random' or 'first', got '{other}'"
                )))
            }
        };

        Ok(Config {
            host,
            port,
            backend,
            store,
            max_members,
            succession,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|_| {
            AppError::config(format!("{name} has an invalid value '{raw}'"))
        }),
        _ => Ok(default),
    }
}
