use actix_web::web;

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod health;
pub mod invites;
pub mod parties;

const MAX_PLAYER_NAME_LEN: usize = 32;

/// Configure application routes for tests and non-HttpServer contexts.
///
/// `main.rs` registers the same tree with the request tracing middleware
/// on top.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.configure(health::configure_routes);

    // Party routes: /api/parties/**
    cfg.service(web::scope("/api/parties").configure(parties::configure_routes));

    // Invite routes: /api/invites/**
    cfg.service(web::scope("/api/invites").configure(invites::configure_routes));
}

/// Player names are 1-32 characters of ASCII letters, digits, `_` or `-`.
pub(crate) fn validate_player(name: &str) -> Result<&str, AppError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_PLAYER_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(name)
    } else {
        Err(AppError::invalid(
            ErrorCode::InvalidPlayerName,
            format!("'{name}' is not a valid player name"),
        ))
    }
}
