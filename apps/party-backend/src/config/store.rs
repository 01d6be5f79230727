use std::fmt;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::infra::supervisor::SupervisorSettings;

/// Connection settings for the backing Redis store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u32,
    pub probe_interval: Duration,
    /// One deadline for connect, rebuild and every store call.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            probe_interval: Duration::from_secs(5),
            timeout: Duration::from_millis(2000),
        }
    }
}

impl StoreConfig {
    /// `redis://` URL with the password percent-encoded.
    pub fn redis_url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                utf8_percent_encode(password, NON_ALPHANUMERIC),
                self.host,
                self.port,
                self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Address for logs; never includes the password.
    pub fn display_target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }

    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            probe_interval: self.probe_interval,
            timeout: self.timeout,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("db", &self.db)
            .field("probe_interval", &self.probe_interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}
