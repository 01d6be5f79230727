//! Invite HTTP routes, addressed by the invited player.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::parties::party_view;
use super::validate_player;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct PendingInvitesResponse {
    player: String,
    pending: Vec<String>,
    /// The sender accept/refuse act on.
    sender: Option<String>,
}

/// GET /api/invites/{player}
async fn pending_invites(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = validate_player(&path)?;

    let pending = app_state.parties.get_pending_invites(player).await?;
    let sender = pending.first().cloned();

    Ok(HttpResponse::Ok().json(PendingInvitesResponse {
        player: player.to_string(),
        pending,
        sender,
    }))
}

/// POST /api/invites/{player}/accept/{sender}
async fn accept_invite(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (player, sender) = path.into_inner();
    let player = validate_player(&player)?;
    let sender = validate_player(&sender)?;

    if !app_state.parties.accept_invite(sender, player).await? {
        return Err(AppError::not_found(
            ErrorCode::InviteNotFound,
            format!("no acceptable invite from {sender} for {player}"),
        ));
    }

    let party = party_view(&app_state, player).await?;
    Ok(HttpResponse::Ok().json(party))
}

/// POST /api/invites/{player}/refuse/{sender}
async fn refuse_invite(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (player, sender) = path.into_inner();
    let player = validate_player(&player)?;
    let sender = validate_player(&sender)?;

    if !app_state.parties.refuse_invite(sender, player).await? {
        return Err(AppError::not_found(
            ErrorCode::InviteNotFound,
            format!("{player} has no pending invite"),
        ));
    }

    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{player}", web::get().to(pending_invites))
        .route("/{player}/accept/{sender}", web::post().to(accept_invite))
        .route("/{player}/refuse/{sender}", web::post().to(refuse_invite));
}
