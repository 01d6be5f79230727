use actix_web::{web, App, HttpServer};
use party_backend::config::Config;
use party_backend::infra::state::build_state;
use party_backend::middleware::request_trace::RequestTrace;
use party_backend::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        host = %config.host,
        port = config.port,
        backend = ?config.backend,
        store = %config.store.display_target(),
        max_members = ?config.max_members,
        succession = ?config.succession,
        "starting party backend"
    );

    let app_state = match build_state().with_config(&config).build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    let data = web::Data::new(app_state.clone());

    let served = HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    app_state.shutdown().await;
    info!("party backend stopped");
    served
}
