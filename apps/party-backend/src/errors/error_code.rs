//! Error codes for the party backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the party backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authorization
    /// Caller is not the leader of their party
    NotPartyLeader,

    // Request Validation
    /// Invalid player name in path
    InvalidPlayerName,

    // Resource Not Found
    /// Player is not in a party
    PartyNotFound,
    /// No matching pending invite
    InviteNotFound,

    // Business Logic Conflicts
    /// Target already belongs to a party
    AlreadyInParty,
    /// Player tried to invite themselves
    SelfInvite,

    // System Errors
    /// Backing store unreachable; caller should try again
    StoreUnavailable,
    /// Backing store did not answer in time
    StoreTimeout,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
    /// Data corruption detected
    DataCorruption,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotPartyLeader => "NOT_PARTY_LEADER",

            Self::InvalidPlayerName => "INVALID_PLAYER_NAME",

            Self::PartyNotFound => "PARTY_NOT_FOUND",
            Self::InviteNotFound => "INVITE_NOT_FOUND",

            Self::AlreadyInParty => "ALREADY_IN_PARTY",
            Self::SelfInvite => "SELF_INVITE",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
