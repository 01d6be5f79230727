//! Party HTTP routes.
//!
//! Path segments name the acting player; authentication is out of scope
//! here and expected from a gateway in front of this service.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::validate_player;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::groups::Group;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct PartyResponse {
    pub name: String,
    pub leader: Option<String>,
    pub members: Vec<String>,
}

impl From<Group> for PartyResponse {
    fn from(group: Group) -> Self {
        Self {
            name: group.name,
            leader: group.leader,
            members: group.members,
        }
    }
}

#[derive(Debug, Serialize)]
struct InviteSentResponse {
    sender: String,
    target: String,
}

pub(crate) async fn party_view(app_state: &AppState, player: &str) -> Result<PartyResponse, AppError> {
    app_state
        .parties
        .get_party(player)
        .await?
        .map(PartyResponse::from)
        .ok_or_else(|| {
            AppError::not_found(
                ErrorCode::PartyNotFound,
                format!("{player} is not in a party"),
            )
        })
}

/// POST /api/parties/{player}
async fn create_party(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = validate_player(&path)?;

    if app_state.parties.is_player_in_party(player).await? {
        return Err(AppError::conflict(
            ErrorCode::AlreadyInParty,
            format!("{player} is already in a party"),
        ));
    }

    app_state.parties.create_party(player).await?;
    let party = party_view(&app_state, player).await?;
    Ok(HttpResponse::Created().json(party))
}

/// GET /api/parties/{player}
async fn get_party(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = validate_player(&path)?;
    let party = party_view(&app_state, player).await?;
    Ok(HttpResponse::Ok().json(party))
}

/// DELETE /api/parties/{player}
///
/// Leader only.
async fn disband_party(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = validate_player(&path)?;
    app_state.parties.disband_as(player).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/parties/{player}/leave
async fn leave_party(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = validate_player(&path)?;
    app_state.parties.leave_party(player).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/parties/{player}/exclude/{target}
///
/// Leader only; the target must be in the leader's party.
async fn exclude_player(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (player, target) = path.into_inner();
    let player = validate_player(&player)?;
    let target = validate_player(&target)?;

    app_state.parties.exclude_as(player, target).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/parties/{player}/invites/{target}
///
/// Creates the sender's party first when they have none.
async fn invite_player(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (sender, target) = path.into_inner();
    let sender = validate_player(&sender)?;
    let target = validate_player(&target)?;

    if sender == target {
        return Err(AppError::conflict(
            ErrorCode::SelfInvite,
            "players cannot invite themselves",
        ));
    }
    if app_state.parties.is_player_in_party(target).await? {
        return Err(AppError::conflict(
            ErrorCode::AlreadyInParty,
            format!("{target} is already in a party"),
        ));
    }

    app_state.parties.create_party(sender).await?;
    app_state.parties.invite_player(sender, target).await?;

    Ok(HttpResponse::Created().json(InviteSentResponse {
        sender: sender.to_string(),
        target: target.to_string(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{player}")
            .route(web::post().to(create_party))
            .route(web::get().to(get_party))
            .route(web::delete().to(disband_party)),
    )
    .route("/{player}/leave", web::post().to(leave_party))
    .route("/{player}/exclude/{target}", web::post().to(exclude_player))
    .route("/{player}/invites/{target}", web::post().to(invite_player));
}
