//! Redis -> DomainError translation.
//!
//! Connectivity failures become `StoreUnavailable`, deadline overruns become
//! `Timeout`. Everything else is a data or protocol problem the caller
//! cannot fix by retrying.

use redis::RedisError;
use tracing::warn;

use crate::errors::domain::{DomainError, InfraErrorKind};

pub fn map_redis_err(op: &str, err: RedisError) -> DomainError {
    if err.is_timeout() {
        return DomainError::infra(InfraErrorKind::Timeout, format!("{op} timed out: {err}"));
    }

    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        return DomainError::store_unavailable(format!("{op} failed: {err}"));
    }

    let message = err.to_string();
    if message.contains("WRONGTYPE") || message.contains("incompatible type") {
        warn!(op, error = %message, "store returned an unexpected value type");
        return DomainError::infra(InfraErrorKind::DataCorruption, format!("{op}: {message}"));
    }

    DomainError::infra(InfraErrorKind::Other(op.to_string()), message)
}

impl From<RedisError> for DomainError {
    fn from(err: RedisError) -> Self {
        map_redis_err("redis", err)
    }
}
