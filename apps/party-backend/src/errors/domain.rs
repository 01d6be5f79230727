//! Domain-level error type used across services, repos and store adapters.
//!
//! This error type is HTTP- and Redis-agnostic. Handlers should return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    StoreUnavailable,
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Caller lacks the party role required for the action
    Forbidden(String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Forbidden(d) => write!(f, "forbidden: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden(detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Shorthand for the error every store call returns when the backing
    /// store cannot be reached.
    pub fn store_unavailable(detail: impl Into<String>) -> Self {
        Self::Infra(InfraErrorKind::StoreUnavailable, detail.into())
    }

    /// True for failures a caller should answer with "try again".
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            DomainError::Infra(InfraErrorKind::StoreUnavailable | InfraErrorKind::Timeout, _)
        )
    }
}
