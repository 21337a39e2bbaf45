use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use mv_api::telemetry::init_tracing;
use mv_api::{configure, AppState};
use mv_core::VerificationService;
use mv_infra::{build_ports, load_config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to initialise tracing")?;

    info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting MilVerify API server"
    );

    for setting in config.unsafe_settings() {
        warn!(setting = setting, "Unsafe setting active; do not use in production");
    }

    let infrastructure = build_ports(&config)
        .await
        .context("failed to initialise infrastructure")?;

    let service = Arc::new(
        VerificationService::new(
            infrastructure.ports,
            config.verification.clone(),
            config.encryption.clone(),
            config.mail.site_title.clone(),
        )
        .context("failed to build verification service")?,
    );

    service.scheduler().start_background_task();

    let state = web::Data::new(
        AppState::new(service, config.server.admin_token.clone()).with_redis(infrastructure.redis),
    );

    let (host, port) = config.server.bind_address();
    info!(host = %host, port = port, "Binding HTTP server");

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind((host, port))
        .context("failed to bind HTTP server")?
        .run()
        .await
        .context("HTTP server terminated with an error")
}
