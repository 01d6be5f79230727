use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    app_version: String,
    store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
    /// Completed store reconnects; absent on the in-memory store.
    #[serde(skip_serializing_if = "Option::is_none")]
    store_generation: Option<u64>,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let app_version = env!("CARGO_PKG_VERSION").to_string();

    let (status, store, store_error) = match app_state.store().ping().await {
        Ok(()) => ("ok", "ok", None),
        Err(err) => ("degraded", "error", Some(err.to_string())),
    };

    let response = HealthResponse {
        status: status.to_string(),
        app_version,
        store: store.to_string(),
        store_error,
        store_generation: app_state.supervisor.as_ref().map(|s| s.generation()),
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
